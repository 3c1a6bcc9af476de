//! Invitation dashboard: campaign statistics, a searchable invitation list
//! and a live template designer, rendered in the terminal.
//!
//! The UI-independent pieces (models, data sources, the designer core) are
//! public so they can be driven without a terminal.
pub mod config;
pub mod designer;
pub mod error;
pub mod logging;
pub mod models;
pub mod source;
pub mod ui;

pub use config::{load_settings, Settings};
pub use designer::TemplateDesigner;
pub use error::DesignerError;
pub use models::{InvitationRecord, InvitationStatus, StatsSnapshot, StatusFilter, TemplateConfig};
pub use source::{FixedStats, InvitationSource, MockInvitations, StatsSource};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
