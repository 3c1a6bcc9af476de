use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;
use tracing::debug;

use crate::models::{InvitationRecord, InvitationStatus, StatusFilter};

/// Recent invitations with a live search box and a status selector.
pub struct InvitationTable {
    records: Vec<InvitationRecord>,
    query: String,
    filter: StatusFilter,
    visible: Vec<usize>,
}

impl InvitationTable {
    pub fn new(records: Vec<InvitationRecord>) -> Self {
        let mut table = Self {
            records,
            query: String::new(),
            filter: StatusFilter::All,
            visible: Vec::new(),
        };
        table.apply_filter();
        table
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.apply_filter();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Rows passing both the status filter and the query, in source order.
    pub fn visible_rows(&self) -> impl Iterator<Item = &InvitationRecord> + '_ {
        self.visible.iter().map(|index| &self.records[*index])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_len(&self) -> usize {
        self.records.len()
    }

    fn apply_filter(&mut self) {
        let filter = self.filter;
        let query = &self.query;
        self.visible = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| filter.matches(record.status) && record.matches_query(query))
            .map(|(index, _)| index)
            .collect();
        debug!(
            query = %self.query,
            filter = %self.filter,
            visible = self.visible.len(),
            "invitation rows refiltered"
        );
    }

    pub(crate) fn draw(&self, frame: &mut Frame, area: Rect, searching: bool) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Recent Invitations ");
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(Paragraph::new(self.controls_line(searching)), chunks[0]);

        if self.visible.is_empty() {
            let empty = Paragraph::new(Span::styled(
                "No invitations match the current search.",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(empty, chunks[1]);
            return;
        }

        let header = Row::new(["ID", "Email", "Status", "Date"]).style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        );
        let rows = self.visible_rows().map(|record| {
            Row::new(vec![
                Cell::from(Span::styled(
                    record.id.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(record.email.clone()),
                Cell::from(status_badge(record.status)),
                Cell::from(Span::styled(
                    record.display_date(),
                    Style::default().fg(Color::Gray),
                )),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .column_spacing(2);
        frame.render_widget(table, chunks[1]);
    }

    fn controls_line(&self, searching: bool) -> Line<'static> {
        let search_style = if searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let query = if self.query.is_empty() && !searching {
            Span::styled("Search by email or ID", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.query.clone(), search_style)
        };

        let mut spans = vec![Span::raw("🔍 "), query, Span::raw("   Status: ")];
        for option in StatusFilter::OPTIONS {
            let style = if option == self.filter {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Rgb(99, 102, 241))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {option} "), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("  {}/{} shown", self.visible.len(), self.records.len()),
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    }
}

/// Colored tag for an invitation status.
pub(crate) fn status_badge(status: InvitationStatus) -> Span<'static> {
    let (icon, color) = match status {
        InvitationStatus::Accepted => ("✔", Color::Rgb(4, 120, 87)),
        InvitationStatus::Pending => ("◷", Color::Rgb(180, 83, 9)),
        InvitationStatus::Sent => ("✉", Color::Rgb(3, 105, 161)),
    };
    Span::styled(
        format!("{icon} {status}"),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InvitationSource, MockInvitations};

    fn table() -> InvitationTable {
        InvitationTable::new(MockInvitations.invitations())
    }

    fn visible_ids(table: &InvitationTable) -> Vec<&str> {
        table.visible_rows().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn starts_with_every_row_visible() {
        let table = table();
        assert_eq!(table.query(), "");
        assert_eq!(table.filter(), StatusFilter::All);
        assert_eq!(table.visible_len(), 5);
        assert_eq!(table.total_len(), 5);
    }

    #[test]
    fn query_lee_finds_single_row() {
        let mut table = table();
        table.set_query("lee");
        assert_eq!(visible_ids(&table), ["INV-1003"]);
    }

    #[test]
    fn pending_filter_keeps_source_order() {
        let mut table = table();
        table.set_filter(StatusFilter::Pending);
        assert_eq!(visible_ids(&table), ["INV-1002", "INV-1004"]);
    }

    #[test]
    fn nomatch_is_empty_under_every_filter() {
        let mut table = table();
        table.set_query("nomatch");
        for filter in StatusFilter::OPTIONS {
            table.set_filter(filter);
            assert_eq!(table.visible_len(), 0, "{filter}");
        }
    }

    #[test]
    fn query_matches_ids_case_insensitively() {
        let mut table = table();
        table.set_query("inv-100");
        assert_eq!(table.visible_len(), 5);
        table.set_query("INV-1005");
        assert_eq!(visible_ids(&table), ["INV-1005"]);
        table.set_query("EXAMPLE.COM");
        assert_eq!(table.visible_len(), 5);
    }

    #[test]
    fn query_and_filter_combine() {
        let mut table = table();
        table.set_query("a");
        table.set_filter(StatusFilter::Accepted);
        // Every address contains "a" through example.com.
        assert_eq!(visible_ids(&table), ["INV-1001", "INV-1003"]);
        table.set_filter(StatusFilter::Sent);
        assert_eq!(visible_ids(&table), ["INV-1005"]);
    }

    #[test]
    fn visible_rows_follow_the_matching_rule_exhaustively() {
        let source = MockInvitations.invitations();
        let queries = ["", "a", "lee", "1004", "MARIA", "@", "x", "nomatch"];
        let mut table = table();
        for query in queries {
            for filter in StatusFilter::OPTIONS {
                table.set_query(query);
                table.set_filter(filter);
                let expected: Vec<&str> = source
                    .iter()
                    .filter(|record| {
                        filter.matches(record.status)
                            && (record.email.to_lowercase().contains(&query.to_lowercase())
                                || record.id.to_lowercase().contains(&query.to_lowercase()))
                    })
                    .map(|record| record.id.as_str())
                    .collect();
                assert_eq!(visible_ids(&table), expected, "{query:?} / {filter}");
            }
        }
    }

    #[test]
    fn badge_carries_status_label() {
        assert_eq!(status_badge(InvitationStatus::Pending).content, "◷ Pending");
        assert_eq!(status_badge(InvitationStatus::Sent).content, "✉ Sent");
    }
}
