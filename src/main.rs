use anyhow::Result;
use rrd_archiver::plugin::{MetricPlugin, RrdPlugin};
use rrd_archiver::rrd::RrdtoolCli;
use rrd_archiver::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let policy = app_config.archive_policy();
    if policy.archive_specs().is_empty() {
        tracing::warn!("RRAs directive is empty; every archive creation will fail");
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        root = %policy.root_directory().display(),
        archives = policy.archive_specs().len(),
        grid_summary = policy.grid_summary(),
        "rrd archiver starting"
    );

    std::fs::create_dir_all(&app_config.spool.dir)?;

    let engine = Arc::new(RrdtoolCli::new(&app_config.engine.rrdtool_path));
    let plugin: Arc<dyn MetricPlugin> = Arc::new(RrdPlugin::new(
        policy,
        app_config.data_sources.clone(),
        engine,
    ));
    plugin.start();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            plugin: plugin.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            spool_dir: app_config.spool.dir.clone(),
            poll_interval_ms: app_config.spool.poll_interval_ms,
            stats_log_interval_secs: app_config.spool.stats_log_interval_secs,
        },
    );
    tracing::info!(spool = %app_config.spool.dir.display(), "Watching spool directory");

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    plugin.stop();

    Ok(())
}
