//! Domain models shared by the dashboard views and the template designer.
//! These stay plain data holders; the derivations that matter (filtering,
//! conversion rate, one-field replacement) live next to the types they touch.

use std::fmt;

use chrono::NaiveDate;

/// Primary color every new template starts with.
pub const DEFAULT_PRIMARY_COLOR: &str = "#6366F1";

/// Customizable visual and audio parameters of an invitation.
///
/// Values are never patched in place: every edit goes through one of the
/// `with_*` builders and yields a complete replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Color string in `#RRGGBB` form.
    pub primary_color: String,
    /// Cover image URL or embedded `data:` reference. Empty means "use the
    /// default cover".
    pub image_url: String,
    /// Sound URL, embedded `data:` reference or session handle. Empty means
    /// "use the first built-in sound".
    pub sound_url: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            image_url: String::new(),
            sound_url: String::new(),
        }
    }
}

impl TemplateConfig {
    pub fn with_primary_color(&self, color: impl Into<String>) -> Self {
        Self {
            primary_color: color.into(),
            ..self.clone()
        }
    }

    pub fn with_image_url(&self, url: impl Into<String>) -> Self {
        Self {
            image_url: url.into(),
            ..self.clone()
        }
    }

    pub fn with_sound_url(&self, url: impl Into<String>) -> Self {
        Self {
            sound_url: url.into(),
            ..self.clone()
        }
    }
}

/// Delivery state of a single invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvitationStatus {
    Sent,
    Accepted,
    Pending,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvitationStatus::Sent => "Sent",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Pending => "Pending",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One row of the invitation table. Records are immutable for the session;
/// the `id` is unique and stable.
pub struct InvitationRecord {
    pub id: String,
    pub email: String,
    pub status: InvitationStatus,
    pub date: NaiveDate,
}

impl InvitationRecord {
    pub fn new(id: &str, email: &str, status: InvitationStatus, date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            email: email.to_string(),
            status,
            date,
        }
    }

    /// Short US-style date, e.g. `11/2/2025`.
    pub fn display_date(&self) -> String {
        self.date.format("%-m/%-d/%Y").to_string()
    }

    /// Case-insensitive substring match against the email and the id. An
    /// empty query matches every record.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.email.to_lowercase().contains(&needle) || self.id.to_lowercase().contains(&needle)
    }
}

/// Point-in-time aggregate of invitation counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub sent: u64,
    pub accepted: u64,
    pub pending: u64,
    pub conversion_percent: u64,
}

impl StatsSnapshot {
    /// Build a snapshot and derive the conversion rate as
    /// `round(accepted / sent * 100)`. Nothing sent means 0%.
    pub fn new(sent: u64, accepted: u64, pending: u64) -> Self {
        let conversion_percent = if sent == 0 {
            0
        } else {
            (accepted as f64 / sent as f64 * 100.0).round() as u64
        };
        Self {
            sent,
            accepted,
            pending,
            conversion_percent,
        }
    }
}

/// Status selector of the invitation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Sent,
    Accepted,
    Pending,
}

impl StatusFilter {
    /// Options in the order the selector presents them.
    pub const OPTIONS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Sent,
        StatusFilter::Accepted,
        StatusFilter::Pending,
    ];

    pub fn matches(self, status: InvitationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Sent => status == InvitationStatus::Sent,
            StatusFilter::Accepted => status == InvitationStatus::Accepted,
            StatusFilter::Pending => status == InvitationStatus::Pending,
        }
    }

    pub fn next(self) -> Self {
        let index = self.position();
        Self::OPTIONS[(index + 1) % Self::OPTIONS.len()]
    }

    pub fn previous(self) -> Self {
        let index = self.position();
        Self::OPTIONS[(index + Self::OPTIONS.len() - 1) % Self::OPTIONS.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Sent => "Sent",
            StatusFilter::Accepted => "Accepted",
            StatusFilter::Pending => "Pending",
        }
    }

    fn position(self) -> usize {
        Self::OPTIONS
            .iter()
            .position(|option| *option == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
