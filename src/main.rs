#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use std::sync::Arc;

use anyhow::Context as _;
use portfolio_gantt::config::ViewerConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let config_path = ViewerConfig::default_path();
    let (config, config_error) = ViewerConfig::load_or_default(&config_path);
    let config = config.with_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    if let Some(e) = config_error {
        tracing::warn!(path = %config_path.display(), error = %e, "ignoring malformed config");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("task-fetch")
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let runtime = Arc::new(runtime);

    let external_source = match config.build_source() {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "invalid task source, using portfolio tasks");
            None
        }
    };
    tracing::info!(config = %config_path.display(), "starting viewer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Portfolio Gantt"),
        ..Default::default()
    };

    eframe::run_native(
        "Portfolio Gantt",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::PortfolioApp::new(
                cc,
                runtime,
                config,
                config_path,
                external_source,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("viewer exited with error: {e}"))
}
