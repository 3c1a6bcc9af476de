//! Designer screen: the control sections on the left and the live preview on
//! the right. Nothing here owns template state; it reads the designer draft
//! and translates cursor positions into actions for the root.

use std::time::Instant;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::designer::{
    builtin_sound, describe_data_uri, is_session_url, sample_image_index, terminal_color,
    PlaybackState, TemplateDesigner, BUILTIN_SOUNDS, PRESET_COLORS, SAMPLE_IMAGES,
};
use crate::models::TemplateConfig;

use super::helpers::shorten;

const SLATE_600: (u8, u8, u8) = (71, 85, 105);
const SLATE_900: (u8, u8, u8) = (15, 23, 42);
/// Overlay opacity at the top and bottom edges of the preview.
const OVERLAY_TOP: f64 = 0.2;
const OVERLAY_BOTTOM: f64 = 0.6;
const LIGHT: Color = Color::Rgb(241, 245, 249);
const INK: Color = Color::Rgb(30, 41, 59);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum DesignerSection {
    #[default]
    Colors,
    Image,
    Sound,
}

impl DesignerSection {
    const ORDER: [DesignerSection; 3] = [
        DesignerSection::Colors,
        DesignerSection::Image,
        DesignerSection::Sound,
    ];

    fn item_count(self) -> usize {
        match self {
            DesignerSection::Colors => PRESET_COLORS.len() + 1,
            DesignerSection::Image => SAMPLE_IMAGES.len() + 1,
            DesignerSection::Sound => BUILTIN_SOUNDS.len() + 2,
        }
    }

    fn title(self) -> &'static str {
        match self {
            DesignerSection::Colors => " Colors ",
            DesignerSection::Image => " Cover Image ",
            DesignerSection::Sound => " Sound ",
        }
    }
}

/// What activating the highlighted item asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DesignerAction {
    PresetColor(&'static str),
    CustomColor,
    SampleImage(&'static str),
    UploadImage,
    PresetSound(&'static str),
    UploadSound,
    TogglePlayback,
}

/// Keyboard focus within the designer controls.
#[derive(Debug, Clone, Default)]
pub(crate) struct DesignerCursor {
    section: DesignerSection,
    item: usize,
}

impl DesignerCursor {
    pub(crate) fn section(&self) -> DesignerSection {
        self.section
    }

    pub(crate) fn move_section(&mut self, delta: isize) {
        let len = DesignerSection::ORDER.len() as isize;
        let current = DesignerSection::ORDER
            .iter()
            .position(|section| *section == self.section)
            .unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len - 1) as usize;
        if DesignerSection::ORDER[next] != self.section {
            self.section = DesignerSection::ORDER[next];
            self.item = 0;
        }
    }

    pub(crate) fn move_item(&mut self, delta: isize) {
        let len = self.section.item_count() as isize;
        self.item = (self.item as isize + delta).clamp(0, len - 1) as usize;
    }

    pub(crate) fn action(&self) -> DesignerAction {
        match self.section {
            DesignerSection::Colors => match PRESET_COLORS.get(self.item) {
                Some(color) => DesignerAction::PresetColor(*color),
                None => DesignerAction::CustomColor,
            },
            DesignerSection::Image => match SAMPLE_IMAGES.get(self.item) {
                Some(url) => DesignerAction::SampleImage(*url),
                None => DesignerAction::UploadImage,
            },
            DesignerSection::Sound => match BUILTIN_SOUNDS.get(self.item) {
                Some(sound) => DesignerAction::PresetSound(sound.url),
                None if self.item == BUILTIN_SOUNDS.len() => DesignerAction::UploadSound,
                None => DesignerAction::TogglePlayback,
            },
        }
    }

    fn is_at(&self, section: DesignerSection, item: usize) -> bool {
        self.section == section && self.item == item
    }
}

/// Human label for the cover image behind `url`.
pub(crate) fn image_label(url: &str) -> String {
    if url.is_empty() {
        return "Default cover (sample 1)".to_string();
    }
    if let Some(index) = sample_image_index(url) {
        return format!("Sample image {}", index + 1);
    }
    if let Some((mime, bytes)) = describe_data_uri(url) {
        return format!("Uploaded image ({mime}, {:.1} KB)", bytes as f64 / 1024.0);
    }
    url.to_string()
}

/// Human label for the sound behind `url`.
pub(crate) fn sound_label(url: &str) -> String {
    if url.is_empty() {
        return format!("{} (default)", BUILTIN_SOUNDS[0].name);
    }
    if let Some(sound) = builtin_sound(url) {
        return sound.name.to_string();
    }
    if is_session_url(url) {
        return "Uploaded sound".to_string();
    }
    if let Some((mime, _)) = describe_data_uri(url) {
        return format!("Embedded {mime}");
    }
    url.to_string()
}

/// Background of preview row `row` out of `height`: slate-900 laid over a
/// slate-600 base, heavier towards the bottom.
pub(crate) fn overlay_shade(row: u16, height: u16) -> Color {
    let alpha = if height <= 1 {
        OVERLAY_BOTTOM
    } else {
        let t = f64::from(row.min(height - 1)) / f64::from(height - 1);
        OVERLAY_TOP + (OVERLAY_BOTTOM - OVERLAY_TOP) * t
    };
    let blend = |base: u8, over: u8| {
        (f64::from(base) * (1.0 - alpha) + f64::from(over) * alpha).round() as u8
    };
    Color::Rgb(
        blend(SLATE_600.0, SLATE_900.0),
        blend(SLATE_600.1, SLATE_900.1),
        blend(SLATE_600.2, SLATE_900.2),
    )
}

/// Rows of the invitation mock-up for a draft, exactly `height` lines of
/// `width` cells each.
pub(crate) fn preview_lines(draft: &TemplateConfig, width: u16, height: u16) -> Vec<Line<'static>> {
    let accent = terminal_color(&draft.primary_color, Color::Rgb(99, 102, 241));
    let width = width as usize;

    let cover = Line::from(Span::styled(
        format!(" ▣ {}", shorten(&image_label(&draft.image_url), width.saturating_sub(4))),
        Style::default().fg(LIGHT),
    ));
    let content = vec![
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                " • You are invited ",
                Style::default()
                    .fg(accent)
                    .bg(LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            " Celebration Night 2025",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Sat, Dec 20 · 7:00 PM · Grand Hall",
            Style::default().fg(LIGHT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                " RSVP Now ",
                Style::default()
                    .fg(Color::White)
                    .bg(accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                " View Details ",
                Style::default().fg(INK).bg(LIGHT).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let height = height as usize;
    let mut rows: Vec<Line<'static>> = Vec::with_capacity(height);
    if height > content.len() + 1 {
        rows.push(cover);
        let gap = height - content.len() - 2;
        rows.extend(std::iter::repeat_with(|| Line::from("")).take(gap));
        rows.extend(content);
        rows.push(Line::from(""));
    } else {
        rows.extend(content.into_iter().take(height));
    }

    rows.into_iter()
        .enumerate()
        .map(|(index, line)| fill_row(line, width, overlay_shade(index as u16, height as u16)))
        .collect()
}

/// Pad a line to `width` and paint the gaps with `background`.
fn fill_row(line: Line<'static>, width: usize, background: Color) -> Line<'static> {
    let used: usize = line.spans.iter().map(|span| span.content.chars().count()).sum();
    let mut spans: Vec<Span<'static>> = line
        .spans
        .into_iter()
        .map(|span| {
            let style = if span.style.bg.is_none() {
                span.style.bg(background)
            } else {
                span.style
            };
            Span::styled(span.content, style)
        })
        .collect();
    if used < width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(background),
        ));
    }
    Line::from(spans)
}

pub(crate) fn draw_designer(
    frame: &mut Frame,
    area: Rect,
    designer: &TemplateDesigner,
    cursor: &DesignerCursor,
    now: Instant,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let draft = designer.draft();
    draw_colors(frame, sections[0], draft, cursor);
    draw_images(frame, sections[1], draft, cursor, designer.is_converting());
    draw_sounds(frame, sections[2], designer, cursor, now);
    draw_preview(frame, columns[1], draft);
}

fn section_block(section: DesignerSection, cursor: &DesignerCursor) -> Block<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(section.title());
    if cursor.section() == section {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block.border_style(Style::default().fg(Color::DarkGray))
    }
}

fn item_style(
    cursor: &DesignerCursor,
    section: DesignerSection,
    item: usize,
    chosen: bool,
) -> Style {
    let mut style = if chosen {
        Style::default()
            .fg(Color::Rgb(99, 102, 241))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    if cursor.is_at(section, item) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

fn draw_colors(frame: &mut Frame, area: Rect, draft: &TemplateConfig, cursor: &DesignerCursor) {
    let section = DesignerSection::Colors;
    let mut swatches = Vec::new();
    for (index, color) in PRESET_COLORS.iter().enumerate() {
        let chosen = draft.primary_color.eq_ignore_ascii_case(color);
        let mut style = Style::default().fg(terminal_color(color, Color::Reset));
        if cursor.is_at(section, index) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        swatches.push(Span::styled(if chosen { "[██]" } else { " ██ " }, style));
        swatches.push(Span::raw(" "));
    }
    let custom = PRESET_COLORS.len();
    swatches.push(Span::styled(
        " Custom… ",
        item_style(cursor, section, custom, false),
    ));

    let current = Line::from(vec![
        Span::styled("Current ", Style::default().fg(Color::Gray)),
        Span::styled(
            "■ ",
            Style::default().fg(terminal_color(&draft.primary_color, Color::Reset)),
        ),
        Span::raw(draft.primary_color.clone()),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(swatches), current])
        .block(section_block(section, cursor));
    frame.render_widget(paragraph, area);
}

fn draw_images(
    frame: &mut Frame,
    area: Rect,
    draft: &TemplateConfig,
    cursor: &DesignerCursor,
    converting: bool,
) {
    let section = DesignerSection::Image;
    let mut items = Vec::new();
    for (index, url) in SAMPLE_IMAGES.iter().enumerate() {
        let chosen = draft.image_url == *url;
        items.push(Span::styled(
            format!(" Sample {} ", index + 1),
            item_style(cursor, section, index, chosen),
        ));
        items.push(Span::raw(" "));
    }
    items.push(Span::styled(
        " Upload Image… ",
        item_style(cursor, section, SAMPLE_IMAGES.len(), false),
    ));

    let detail = if converting {
        Line::from(Span::styled(
            "Converting upload…",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let width = area.width.saturating_sub(2) as usize;
        Line::from(Span::styled(
            shorten(&image_label(&draft.image_url), width),
            Style::default().fg(Color::Gray),
        ))
    };

    let paragraph =
        Paragraph::new(vec![Line::from(items), detail]).block(section_block(section, cursor));
    frame.render_widget(paragraph, area);
}

fn draw_sounds(
    frame: &mut Frame,
    area: Rect,
    designer: &TemplateDesigner,
    cursor: &DesignerCursor,
    now: Instant,
) {
    let section = DesignerSection::Sound;
    let draft = designer.draft();
    let mut items = Vec::new();
    for (index, sound) in BUILTIN_SOUNDS.iter().enumerate() {
        let chosen = draft.sound_url == sound.url;
        items.push(Span::styled(
            format!(" {} ", sound.name),
            item_style(cursor, section, index, chosen),
        ));
        items.push(Span::raw(" "));
    }
    items.push(Span::styled(
        " Upload Sound… ",
        item_style(cursor, section, BUILTIN_SOUNDS.len(), false),
    ));
    items.push(Span::raw(" "));

    let playing = designer.playback_state() == PlaybackState::Playing;
    let toggle_label = if playing {
        " ■ Stop Preview "
    } else {
        " ▶ Play Preview "
    };
    items.push(Span::styled(
        toggle_label,
        item_style(cursor, section, BUILTIN_SOUNDS.len() + 1, false),
    ));

    let source = Line::from(vec![
        Span::styled("♪ ", Style::default().fg(Color::Gray)),
        Span::raw(sound_label(&draft.sound_url)),
    ]);
    let status = match designer.playback().progress(now) {
        Some((position, length)) => Line::from(Span::styled(
            format!(
                "Playing {:.1}s / {:.1}s",
                position.as_secs_f64(),
                length.as_secs_f64()
            ),
            Style::default().fg(Color::Green),
        )),
        None => Line::from(Span::styled("Stopped", Style::default().fg(Color::DarkGray))),
    };

    let paragraph = Paragraph::new(vec![Line::from(items), source, status])
        .block(section_block(section, cursor));
    frame.render_widget(paragraph, area);
}

fn draw_preview(frame: &mut Frame, area: Rect, draft: &TemplateConfig) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Live Preview ");
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let card = Paragraph::new(preview_lines(draft, chunks[0].width, chunks[0].height));
    frame.render_widget(card, chunks[0]);

    let footer = Line::from(vec![
        Span::styled("Primary color ", Style::default().fg(Color::Gray)),
        Span::styled(
            "■ ",
            Style::default().fg(terminal_color(&draft.primary_color, Color::Reset)),
        ),
        Span::raw(draft.primary_color.clone()),
        Span::styled("   Live preview", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(footer), chunks[1]);
}
