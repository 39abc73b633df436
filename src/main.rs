//! Marketpulse Orchestrator
//!
//! Single long-lived process: scheduler loop, delegated job workers, and
//! the status HTTP server. Managed externally through the pid file and
//! OS signals.

use dotenvy::dotenv;
use marketpulse::config::Settings;
use marketpulse::core::http::{start_server, AppState};
use marketpulse::core::pidfile::PidFile;
use marketpulse::jobs::context::JobContext;
use marketpulse::jobs::handlers::default_executors;
use marketpulse::logging;
use marketpulse::metrics::Metrics;
use marketpulse::publish::Publisher;
use marketpulse::scheduler::{Calendar, CheckpointLog, Scheduler};
use marketpulse::services::provider::HttpMarketDataProvider;
use marketpulse::services::renderer::ScoreCardRenderer;
use marketpulse::services::store::SeriesStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::{watch, RwLock};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let settings = Settings::from_env()?;
    let env = marketpulse::config::get_environment();
    info!("Starting Marketpulse Orchestrator");
    info!(environment = %env, symbols = ?settings.symbols, "Environment");

    // A malformed calendar must abort startup loudly, never run partially.
    let calendar = match &settings.calendar_path {
        Some(path) => Calendar::from_file(path)?,
        None => Calendar::default_calendar(),
    };
    for job in calendar.jobs() {
        info!(
            job = %job.name,
            trigger = ?job.trigger,
            depends_on = ?job.depends_on,
            "job scheduled"
        );
    }

    let metrics = Arc::new(Metrics::new()?);
    let provider = Arc::new(HttpMarketDataProvider::new(&settings.provider_base_url)?);
    let renderer = Arc::new(ScoreCardRenderer::new(&settings.artifact_dir));
    let store = Arc::new(SeriesStore::new());

    let ctx = Arc::new(JobContext {
        provider,
        renderer,
        store,
        publisher: Publisher::new(&settings.serve_dir),
        portfolio_publisher: Publisher::new(&settings.portfolio_serve_dir),
        symbols: settings.symbols.clone(),
        portfolio_symbols: settings.portfolio_symbols.clone(),
        scoring: settings.scoring.clone(),
        artifact_dir: settings.artifact_dir.clone(),
        metrics: Some(metrics.clone()),
        staged_artifacts: RwLock::new(Vec::new()),
    });

    let checkpoint = CheckpointLog::new(&settings.checkpoint_path);
    let mut scheduler = Scheduler::new(
        calendar,
        default_executors(ctx),
        checkpoint,
        Some(metrics.clone()),
    )?;
    scheduler.restore(chrono::Utc::now())?;
    let jobs_rx = scheduler.subscribe();

    let _pid_file = PidFile::create(&settings.pid_file)?;

    let state = AppState {
        metrics: metrics.clone(),
        start_time: Arc::new(Instant::now()),
        jobs: jobs_rx,
    };
    let http_port = settings.http_port;
    tokio::spawn(async move {
        if let Err(e) = start_server(http_port, state).await {
            error!(error = %e, "status server exited");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll = Duration::from_secs(settings.poll_interval_secs.max(1));
    let scheduler_handle = tokio::spawn(scheduler.run(poll, shutdown_rx));

    shutdown_signal().await;
    info!("shutdown signal received, stopping scheduler");
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;
    info!("Marketpulse Orchestrator stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
