//! Cron-based scheduler running pipeline cycles at a fixed interval

use crate::config::PipelineConfig;
use crate::core::pipeline::PipelineCoordinator;
use crate::models::series::Entity;
use crate::models::signal::SignalEvent;
use crate::signals::alerts::PriceSnapshot;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Convert an interval in seconds to a six-field cron expression
pub fn cron_expression(interval_seconds: u64) -> Result<String, String> {
    match interval_seconds {
        0 => Err("Scheduler disabled: interval_seconds is 0".to_string()),
        s if s < 60 => Ok(format!("*/{} * * * * *", s)),
        s if s % 60 == 0 && s < 3600 => Ok(format!("0 */{} * * * *", s / 60)),
        s if s % 3600 == 0 && s < 86_400 => Ok(format!("0 0 */{} * * *", s / 3600)),
        s => Err(format!(
            "interval of {}s cannot be expressed as a cron step (use < 60s, whole minutes or whole hours)",
            s
        )),
    }
}

/// Runs one cycle per cron tick. The previous cycle's price snapshot is
/// owned by the scheduler task and handed to the next cycle.
pub struct CycleScheduler {
    pipeline: Arc<PipelineCoordinator>,
    config: PipelineConfig,
    universe: Option<Vec<Entity>>,
    schedule: Schedule,
    latest: Arc<RwLock<Vec<SignalEvent>>>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl CycleScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `pipeline` - Coordinator used for every cycle
    /// * `config` - Cycle configuration
    /// * `universe` - Fixed entity list, or `None` to list the provider's markets each tick
    /// * `interval_seconds` - Interval between cycles
    pub fn new(
        pipeline: Arc<PipelineCoordinator>,
        config: PipelineConfig,
        universe: Option<Vec<Entity>>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let cron_expr = cron_expression(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| format!("Invalid cron expression '{}': {}", cron_expr, e))?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "CycleScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            pipeline,
            config,
            universe,
            schedule,
            latest: Arc::new(RwLock::new(Vec::new())),
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the scheduler
    pub async fn start(&self) {
        let pipeline = self.pipeline.clone();
        let config = self.config.clone();
        let universe = self.universe.clone();
        let schedule = self.schedule.clone();
        let latest = self.latest.clone();

        let handle = tokio::spawn(async move {
            info!("CycleScheduler: started, waiting for cron schedule...");
            let mut prior = PriceSnapshot::new();

            loop {
                match schedule.upcoming(chrono::Utc).next() {
                    Some(next_tick) => {
                        let now = chrono::Utc::now();
                        if next_tick > now {
                            let duration = (next_tick - now).to_std().unwrap_or_default();
                            tokio::time::sleep(duration).await;
                        }
                    }
                    None => {
                        tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                        continue;
                    }
                }

                let cycle = match universe {
                    Some(ref fixed) => pipeline.run_cycle_with_report(fixed, &config, &prior).await,
                    None => pipeline.run_discovered_cycle(&config, &prior).await,
                };

                match cycle {
                    Ok(report) => {
                        for signal in &report.signals {
                            info!(
                                entity = %signal.entity,
                                score = signal.score,
                                crossover = signal.crossover.as_str(),
                                price = signal.price,
                                "CycleScheduler: {} scored {:.2} ({})",
                                signal.entity,
                                signal.score,
                                signal.crossover.as_str()
                            );
                        }
                        prior = report.snapshot;
                        *latest.write().await = report.signals;
                    }
                    Err(e) => {
                        error!(error = %e, "CycleScheduler: cycle aborted");
                    }
                }
            }
        });

        *self.handle.write().await = Some(handle);
        info!("CycleScheduler: started successfully");
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("CycleScheduler: stopped");
        }
    }

    /// Check if the scheduler is running
    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }

    /// Ranked signals from the most recent successful cycle
    pub async fn latest_signals(&self) -> Vec<SignalEvent> {
        self.latest.read().await.clone()
    }
}
