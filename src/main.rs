//! Binary entry point: logging, settings and the async runtime come up first,
//! then the Ratatui event loop runs until the user exits.
use anyhow::Context;
use invitation_dashboard::config::{config_path, data_dir};
use invitation_dashboard::{load_settings, logging, run_app, App, FixedStats, MockInvitations};

fn main() -> anyhow::Result<()> {
    let data_dir = data_dir()?;
    logging::init(&data_dir.join("logs"))?;

    let settings = load_settings(&config_path()?);

    // Upload conversions run here; the UI thread never blocks on them.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut app = App::new(
        &settings,
        &MockInvitations,
        &FixedStats,
        runtime.handle().clone(),
    );
    let result = run_app(&mut app, settings.tick_rate());
    if let Err(err) = &result {
        tracing::error!("dashboard exited with an error: {err:#}");
    }
    tracing::info!("Invitation Dashboard exiting");
    result
}
