use std::mem;
use std::time::Instant;

use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::designer::{ImageConverted, PlaybackState, TemplateDesigner, DEFAULT_IMAGE_URL};
use crate::models::{StatsSnapshot, StatusFilter, TemplateConfig};
use crate::source::{InvitationSource, StatsSource};

use super::designer_view::{draw_designer, DesignerAction, DesignerCursor};
use super::forms::{ColorForm, PathForm, UploadTarget};
use super::helpers::{centered_rect, key_hint, surface_error};
use super::stats::draw_stats;
use super::table::InvitationTable;

/// Header space reserved for the title and screen tabs.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of the overview stat cards.
const STATS_HEIGHT: u16 = 4;

/// Work finished off the UI thread, delivered back to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    ImageConverted(ImageConverted),
}

impl From<ImageConverted> for AppEvent {
    fn from(done: ImageConverted) -> Self {
        AppEvent::ImageConverted(done)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Screen {
    Overview,
    Designer,
}

impl Screen {
    fn toggle(self) -> Self {
        match self {
            Screen::Overview => Screen::Designer,
            Screen::Designer => Screen::Overview,
        }
    }

    fn index(self) -> usize {
        match self {
            Screen::Overview => 0,
            Screen::Designer => 1,
        }
    }
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Searching,
    CustomColor(ColorForm),
    Upload(PathForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application root. Owns the canonical template and the stats snapshot;
/// the designer only ever proposes replacements which are committed here.
pub struct App {
    template: TemplateConfig,
    default_template: TemplateConfig,
    stats: StatsSnapshot,
    table: InvitationTable,
    designer: TemplateDesigner,
    cursor: DesignerCursor,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    runtime: Handle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(
        settings: &Settings,
        invitations: &dyn InvitationSource,
        stats: &dyn StatsSource,
        runtime: Handle,
    ) -> Self {
        let template = settings.initial_template();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            designer: TemplateDesigner::new(&template, settings.fallback_clip()),
            default_template: template.clone(),
            template,
            stats: stats.snapshot(),
            table: InvitationTable::new(invitations.invitations()),
            cursor: DesignerCursor::default(),
            screen: Screen::Overview,
            mode: Mode::Normal,
            status: None,
            runtime,
            events_tx,
            events_rx,
        }
    }

    /// The canonical template.
    pub fn template(&self) -> &TemplateConfig {
        &self.template
    }

    pub fn stats(&self) -> &StatsSnapshot {
        &self.stats
    }

    pub fn table(&self) -> &InvitationTable {
        &self.table
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Searching => self.handle_search(code),
            Mode::CustomColor(form) => self.handle_custom_color(code, form),
            Mode::Upload(form) => self.handle_upload(code, form),
        };

        exit
    }

    /// Apply everything background tasks have delivered so far.
    pub fn drain_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            match self.events_rx.try_recv() {
                Ok(event) => {
                    self.handle_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ImageConverted(done) => match self.designer.finish_image_upload(done) {
                Ok(Some(next)) => {
                    self.commit(next);
                    self.set_status("Cover image uploaded.", StatusKind::Info);
                }
                Ok(None) => {}
                Err(err) => {
                    warn!("image upload failed: {err}");
                    self.set_status(format!("Upload failed: {}", err.notice()), StatusKind::Error);
                }
            },
        }
    }

    /// Clock tick from the event loop; drives the natural end of playback.
    pub fn tick(&mut self, now: Instant) {
        if self.designer.tick(now) {
            debug!("preview playback reached the end");
        }
    }

    /// Make `next` the canonical template and push it back down to the
    /// designer.
    fn commit(&mut self, next: TemplateConfig) {
        if next != self.template {
            info!(
                color = %next.primary_color,
                image_bytes = next.image_url.len(),
                sound = %shorten_for_log(&next.sound_url),
                "template updated"
            );
        }
        self.template = next;
        self.designer.sync(&self.template);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.screen = self.screen.toggle();
                self.clear_status();
                return Mode::Normal;
            }
            _ => {}
        }

        match self.screen {
            Screen::Overview => self.handle_overview_key(code),
            Screen::Designer => self.handle_designer_key(code),
        }
    }

    fn handle_overview_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Searching;
            }
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Right => {
                self.table.set_filter(self.table.filter().next());
            }
            KeyCode::Left => {
                self.table.set_filter(self.table.filter().previous());
            }
            KeyCode::Esc => {
                self.table.set_query("");
                self.table.set_filter(StatusFilter::All);
                self.clear_status();
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_designer_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Up => self.cursor.move_section(-1),
            KeyCode::Down => self.cursor.move_section(1),
            KeyCode::Left => self.cursor.move_item(-1),
            KeyCode::Right => self.cursor.move_item(1),
            KeyCode::Enter => {
                let action = self.cursor.action();
                return self.run_designer_action(action);
            }
            KeyCode::Char(' ') => {
                return self.run_designer_action(DesignerAction::TogglePlayback);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                return self.run_designer_action(DesignerAction::CustomColor);
            }
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_image(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.commit(self.default_template.clone());
                self.set_status("Template reset to defaults.", StatusKind::Info);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn run_designer_action(&mut self, action: DesignerAction) -> Mode {
        self.clear_status();
        match action {
            DesignerAction::PresetColor(color) => match self.designer.set_color(color) {
                Ok(next) => self.commit(next),
                Err(err) => self.set_status(err.notice(), StatusKind::Error),
            },
            DesignerAction::CustomColor => {
                return Mode::CustomColor(ColorForm::from_color(&self.template.primary_color));
            }
            DesignerAction::SampleImage(url) => {
                let next = self.designer.set_image_from_sample(url);
                self.commit(next);
            }
            DesignerAction::UploadImage => return Mode::Upload(PathForm::new(UploadTarget::Image)),
            DesignerAction::PresetSound(url) => {
                let next = self.designer.set_sound_from_preset(url);
                self.commit(next);
            }
            DesignerAction::UploadSound => return Mode::Upload(PathForm::new(UploadTarget::Sound)),
            DesignerAction::TogglePlayback => {
                let state = self.designer.toggle_playback(Instant::now());
                debug!(?state, "playback toggled from the designer");
            }
        }
        Mode::Normal
    }

    fn handle_search(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Esc => {
                self.table.set_query("");
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                let mut query = self.table.query().to_string();
                query.pop();
                self.table.set_query(query);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let mut query = self.table.query().to_string();
                query.push(ch);
                self.table.set_query(query);
            }
            _ => {}
        }
        Mode::Searching
    }

    fn handle_custom_color(&mut self, code: KeyCode, mut form: ColorForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.designer.set_color(&form.candidate()) {
                Ok(next) => {
                    self.commit(next);
                    return Mode::Normal;
                }
                Err(err) => form.error = Some(err.notice()),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::CustomColor(form)
    }

    fn handle_upload(&mut self, code: KeyCode, mut form: PathForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Upload cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let path = match form.parse_path() {
                    Ok(path) => path,
                    Err(err) => {
                        form.error = Some(surface_error(&err));
                        return Mode::Upload(form);
                    }
                };
                match form.target {
                    UploadTarget::Image => {
                        let ticket = self.designer.begin_image_upload(
                            path,
                            &self.runtime,
                            self.events_tx.clone(),
                        );
                        debug!(ticket, "image upload queued");
                        self.set_status("Converting image…", StatusKind::Info);
                        return Mode::Normal;
                    }
                    UploadTarget::Sound => match self.designer.set_sound_from_upload(&path) {
                        Ok(next) => {
                            self.commit(next);
                            self.set_status("Sound uploaded.", StatusKind::Info);
                            return Mode::Normal;
                        }
                        Err(err) => {
                            warn!("sound upload failed: {err}");
                            let message = format!("Upload failed: {}", err.notice());
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    },
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::Upload(form)
    }

    fn open_image(&mut self) {
        let url = if self.template.image_url.is_empty() {
            DEFAULT_IMAGE_URL
        } else {
            self.template.image_url.as_str()
        };
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            self.set_status(
                "Uploaded images are embedded and cannot be opened externally.",
                StatusKind::Info,
            );
            return;
        }
        match open_link(url) {
            Ok(()) => self.set_status("Opened cover image.", StatusKind::Info),
            Err(err) => {
                warn!("failed to open {url}: {err}");
                self.set_status(format!("Could not open image: {err}"), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT.min(area.height)),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Overview => self.draw_overview(frame, chunks[1]),
            Screen::Designer => {
                draw_designer(frame, chunks[1], &self.designer, &self.cursor, Instant::now())
            }
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::CustomColor(form) => self.draw_color_form(frame, area, form),
            Mode::Upload(form) => self.draw_path_form(frame, area, form),
            Mode::Normal | Mode::Searching => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::BOTTOM);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("▰ ", Style::default().fg(Color::Rgb(139, 92, 246))),
                Span::styled(
                    "Invitation Dashboard",
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(Span::styled(
                "Monitor invitations and design templates",
                Style::default().fg(Color::Gray),
            )),
        ]);
        frame.render_widget(title, columns[0]);

        let tabs = Tabs::new(["Overview", "Designer"])
            .select(self.screen.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, columns[1]);
    }

    fn draw_overview(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(STATS_HEIGHT), Constraint::Min(0)])
            .split(area);
        draw_stats(frame, chunks[0], &self.stats);
        self.table
            .draw(frame, chunks[1], matches!(self.mode, Mode::Searching));
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: Vec<[Span<'static>; 2]> = match (&self.mode, self.screen) {
            (Mode::Searching, _) => vec![
                key_hint("[type]", " Search   "),
                key_hint("[Enter]", " Keep   "),
                key_hint("[Esc]", " Clear"),
            ],
            (Mode::CustomColor(_), _) | (Mode::Upload(_), _) => vec![
                key_hint("[Enter]", " Apply   "),
                key_hint("[Esc]", " Cancel"),
            ],
            (Mode::Normal, Screen::Overview) => vec![
                key_hint("[/]", " Search   "),
                key_hint("[f/←→]", " Status filter   "),
                key_hint("[Esc]", " Reset filters   "),
                key_hint("[Tab]", " Designer   "),
                key_hint("[q]", " Quit"),
            ],
            (Mode::Normal, Screen::Designer) => {
                let playback = if self.designer.playback_state() == PlaybackState::Playing {
                    " Stop   "
                } else {
                    " Play   "
                };
                vec![
                    key_hint("[↑↓]", " Section   "),
                    key_hint("[←→]", " Item   "),
                    key_hint("[Enter]", " Apply   "),
                    key_hint("[Space]", playback),
                    key_hint("[c]", " Custom color   "),
                    key_hint("[o]", " Open image   "),
                    key_hint("[r]", " Reset   "),
                    key_hint("[Tab]", " Overview   "),
                    key_hint("[q]", " Quit"),
                ]
            }
        };
        Line::from(hints.into_iter().flatten().collect::<Vec<_>>())
    }

    fn draw_color_form(&self, frame: &mut Frame, area: Rect, form: &ColorForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(" Custom Color ").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line("Color"), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to apply • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = "Color: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn draw_path_form(&self, frame: &mut Frame, area: Rect, form: &PathForm) {
        let popup_area = centered_rect(70, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(format!(" {} ", form.target.title()))
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![form.build_line("File"), Line::from("")];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to upload • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = "File: ".len() as u16;
        frame.set_cursor_position((inner.x + prefix + form.value_len() as u16, inner.y));
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn shorten_for_log(url: &str) -> &str {
    if url.starts_with("data:") {
        "<embedded>"
    } else {
        url
    }
}
