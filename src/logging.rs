//! File-based tracing setup. The terminal belongs to the UI, so nothing is
//! ever logged to stdout or stderr.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "INVITATION_DASHBOARD_LOG";

/// Install the global subscriber writing daily files into `log_dir`.
///
/// ```bash
/// INVITATION_DASHBOARD_LOG=debug invitation-dashboard
/// ```
pub fn init(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir).context("failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "dashboard.log");

    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("invitation_dashboard=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::info!("Invitation Dashboard starting");
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(())
}
