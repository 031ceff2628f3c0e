use ccmonitor::cli::{Cli, Command};
use ccmonitor::engine::config::EngineConfig;
use ccmonitor::engine::domain::{CheckConfiguration, Target, TargetType};
use ccmonitor::engine::health::EngineHealthTracker;
use ccmonitor::engine::logging::EngineLogger;
use ccmonitor::engine::notify::RegistryNotificationConsumer;
use ccmonitor::engine::pipeline::dispatcher::AlertDispatcher;
use ccmonitor::engine::pipeline::orchestrator::Orchestrator;
use ccmonitor::engine::pipeline::probe::IsahcHttpClient;
use ccmonitor::engine::pipeline::scheduler::{completion_callback, InFlightSet, PollingScheduler};
use ccmonitor::engine::pipeline::stability::{StabilityChecker, TokioClock};
use ccmonitor::engine::pipeline::state_updater::StateUpdater;
use ccmonitor::engine::pipeline::statistics_engine::StatisticsEngine;
use ccmonitor::engine::pipeline::worker_pool::WorkerPool;
use ccmonitor::engine::repository::memory::{
    AlwaysActiveNotificationChecker, InMemoryCheckResultRepository, InMemoryMetricRepository, InMemoryStatisticsRepository, InMemoryTargetRepository,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct TargetSeed {
    #[serde(default = "Uuid::new_v4")]
    owner_user_id: Uuid,
    name: String,
    url: String,
    target_type: TargetType,
    #[serde(default)]
    configuration: Option<CheckConfiguration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    match cli.command {
        Command::Run { targets, config } => run(targets, config).await,
        Command::ProbeOnce { url, timeout_seconds } => probe_once(url, timeout_seconds).await,
    }
}

async fn run(targets_path: std::path::PathBuf, config_path: Option<std::path::PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load(config_path.as_deref())?;
    let logger = Arc::new(EngineLogger::new());

    let seeds: Vec<TargetSeed> = serde_json::from_str(&std::fs::read_to_string(&targets_path)?)?;
    let targets: Vec<Target> = seeds
        .into_iter()
        .map(|seed| {
            let mut target = Target::new(seed.owner_user_id, seed.name, seed.url, seed.target_type);
            if let Some(configuration) = seed.configuration {
                target.configuration = configuration.sanitized();
            }
            target
        })
        .collect();

    let target_repo = Arc::new(InMemoryTargetRepository::new());
    target_repo.seed(targets);
    let metric_repo = Arc::new(InMemoryMetricRepository::new());
    let check_result_repo = Arc::new(InMemoryCheckResultRepository::new());
    let statistics_repo = Arc::new(InMemoryStatisticsRepository::new());

    let consumer = Arc::new(RegistryNotificationConsumer::with_log_channel(logger.clone()));
    let dispatcher = Arc::new(AlertDispatcher::start(config.alert_buffer_size, consumer));

    let state_updater = StateUpdater::new(target_repo.clone(), metric_repo, check_result_repo, logger.clone());
    let statistics_engine = StatisticsEngine::new(statistics_repo);

    let in_flight = Arc::new(InFlightSet::new());
    let on_complete = completion_callback(in_flight.clone());

    let orchestrator = Arc::new(Orchestrator::new(
        IsahcHttpClient::new(),
        TokioClock,
        state_updater,
        statistics_engine,
        dispatcher,
        Arc::new(AlwaysActiveNotificationChecker),
        config.clone(),
        logger.clone(),
        on_complete,
    ));

    let handler: ccmonitor::engine::pipeline::worker_pool::TargetHandler = {
        let orchestrator = orchestrator.clone();
        Arc::new(move |target: Target| {
            let orchestrator = orchestrator.clone();
            Box::pin(async move { orchestrator.process(target).await }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        })
    };

    let worker_pool = Arc::new(WorkerPool::start(config.worker_count, config.buffer_size, handler, logger.clone()));
    let health_tracker = EngineHealthTracker::new(config.worker_count);
    let scheduler = Arc::new(PollingScheduler::new(target_repo, worker_pool, in_flight.clone(), config, logger));

    let run_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run().await }
    });

    tokio::signal::ctrl_c().await?;
    let health = health_tracker.snapshot(&in_flight);
    eprintln!(
        "ccmonitor shutting down: uptime={}s workers={} in_flight={}",
        health.uptime_secs, health.worker_count, health.in_flight_count
    );
    scheduler.stop();
    run_handle.await?;

    Ok(())
}

async fn probe_once(url: String, timeout_seconds: u32) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::default();
    let checker = StabilityChecker::new(
        ccmonitor::engine::pipeline::probe::ProbeEngine::new(IsahcHttpClient::new()),
        TokioClock,
        config.n_max_probes,
        config.inter_probe_delay_ms,
    );

    let session = checker.run(&url, timeout_seconds).await;
    let metrics = ccmonitor::engine::pipeline::metrics::calculate(&session);

    println!("stable: {}", session.stable);
    println!("total_checks: {}", metrics.total_checks);
    println!("last_status: {}", metrics.last_status);
    println!("avg_response_time_ms: {}", metrics.avg_response_time_ms);
    println!("max_response_time_ms: {}", metrics.max_response_time_ms);

    Ok(())
}
