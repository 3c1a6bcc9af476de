use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// Longest value the custom color field accepts (`#RRGGBB`).
const COLOR_INPUT_MAX: usize = 7;

/// Free-form color entry, the terminal stand-in for a color picker.
#[derive(Default, Clone)]
pub(crate) struct ColorForm {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl ColorForm {
    /// Start from the template's current color.
    pub(crate) fn from_color(current: &str) -> Self {
        Self {
            value: current.to_string(),
            error: None,
        }
    }

    /// Only hex digits and a leading `#` are accepted.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let allowed = ch.is_ascii_hexdigit() || (ch == '#' && self.value.is_empty());
        if allowed && self.value.chars().count() < COLOR_INPUT_MAX {
            self.value.push(ch);
            true
        } else {
            false
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// The value to hand to the designer, with `#` added when omitted.
    pub(crate) fn candidate(&self) -> String {
        let trimmed = self.value.trim();
        if trimmed.starts_with('#') {
            trimmed.to_string()
        } else {
            format!("#{trimmed}")
        }
    }

    pub(crate) fn build_line(&self, field_name: &str) -> Line<'static> {
        let display = if self.value.is_empty() {
            "#RRGGBB".to_string()
        } else {
            self.value.clone()
        };
        let style = if self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

/// What an upload prompt feeds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum UploadTarget {
    Image,
    Sound,
}

impl UploadTarget {
    pub(crate) fn title(self) -> &'static str {
        match self {
            UploadTarget::Image => "Upload Image",
            UploadTarget::Sound => "Upload Sound",
        }
    }
}

/// Path prompt standing in for a file picker.
#[derive(Clone)]
pub(crate) struct PathForm {
    pub(crate) target: UploadTarget,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl PathForm {
    pub(crate) fn new(target: UploadTarget) -> Self {
        Self {
            target,
            value: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.value.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Resolve the typed path, expanding a leading `~/`.
    pub(crate) fn parse_path(&self) -> Result<PathBuf> {
        let raw = self.value.trim();
        if raw.is_empty() {
            return Err(anyhow!("A file path is required."));
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            let base_dirs =
                BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
            return Ok(base_dirs.home_dir().join(rest));
        }
        Ok(PathBuf::from(raw))
    }

    pub(crate) fn build_line(&self, field_name: &str) -> Line<'static> {
        let display = if self.value.is_empty() {
            "<path to file>".to_string()
        } else {
            self.value.clone()
        };
        let style = if self.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self) -> usize {
        self.value.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_form_accepts_hex_only() {
        let mut form = ColorForm::default();
        assert!(form.push_char('#'));
        assert!(!form.push_char('#'));
        for ch in "a1b2c3".chars() {
            assert!(form.push_char(ch));
        }
        assert!(!form.push_char('d'), "field is full");
        assert!(!form.push_char('z'));
        assert_eq!(form.candidate(), "#a1b2c3");
    }

    #[test]
    fn color_form_adds_missing_hash() {
        let mut form = ColorForm::default();
        for ch in "10B981".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.candidate(), "#10B981");
        form.backspace();
        assert_eq!(form.value_len(), 5);
    }

    #[test]
    fn path_form_requires_a_value() {
        let mut form = PathForm::new(UploadTarget::Image);
        assert!(form.parse_path().is_err());
        for ch in " /tmp/cover.png ".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.parse_path().unwrap(), PathBuf::from("/tmp/cover.png"));
        assert!(!form.push_char('\n'));
    }
}
