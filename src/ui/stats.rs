use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::StatsSnapshot;

/// One labelled figure of the overview row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub icon: &'static str,
    pub accent: Color,
}

/// The four overview cards for a snapshot: sent, accepted, pending and the
/// conversion rate.
pub fn stat_cards(stats: &StatsSnapshot) -> [StatCard; 4] {
    [
        StatCard {
            label: "Sent",
            value: stats.sent.to_string(),
            icon: "✉",
            accent: Color::Rgb(14, 165, 233),
        },
        StatCard {
            label: "Accepted",
            value: stats.accepted.to_string(),
            icon: "✔",
            accent: Color::Rgb(16, 185, 129),
        },
        StatCard {
            label: "Pending",
            value: stats.pending.to_string(),
            icon: "◷",
            accent: Color::Rgb(245, 158, 11),
        },
        StatCard {
            label: "Conversion",
            value: format!("{}%", stats.conversion_percent),
            icon: "↗",
            accent: Color::Rgb(139, 92, 246),
        },
    ]
}

pub(crate) fn draw_stats(frame: &mut Frame, area: Rect, stats: &StatsSnapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (card, column) in stat_cards(stats).into_iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let lines = vec![
            Line::from(vec![
                Span::styled(
                    card.label.to_uppercase(),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(card.icon, Style::default().fg(card.accent)),
            ]),
            Line::from(Span::styled(
                card.value,
                Style::default()
                    .fg(card.accent)
                    .add_modifier(Modifier::BOLD),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(block);
        frame.render_widget(paragraph, *column);
    }
}
