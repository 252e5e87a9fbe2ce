use crate::config::{AppConfig, SchedulerConfig, MAX_MONITOR_INTERVAL_MINUTES};
use crate::db::job_run_queries;
use crate::errors::AppError;
use crate::external::market_data::{MarketDataCache, MarketDataProvider};
use crate::jobs::portfolio_monitor_job;
use crate::services::dashboard_service::SentimentEngine;
use crate::services::notification_service::Notifier;
use crate::state::AppState;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub engine: SentimentEngine,
    pub notifier: Arc<dyn Notifier>,
    pub cache: MarketDataCache,
}

impl JobContext {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            config: state.config.clone(),
            market_data: state.market_data.clone(),
            engine: state.engine.clone(),
            notifier: state.notifier.clone(),
            cache: state.cache.clone(),
        }
    }
}

#[derive(Debug)]
pub struct JobResult {
    pub items_processed: i32,
    pub items_failed: i32,
}

pub struct JobSchedulerService {
    scheduler: JobScheduler,
    context: JobContext,
}

impl JobSchedulerService {
    pub async fn new(context: JobContext) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::External(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, context })
    }

    /// Start all scheduled jobs
    pub async fn start(&mut self) -> Result<(), AppError> {
        info!("🚀 Starting job scheduler...");

        self.schedule_repeated(
            monitor_interval(&self.context.config.scheduler),
            "monitor_portfolios",
            portfolio_monitor_job::monitor_all_portfolios,
        )
        .await?;

        // format: sec min hour day month weekday
        self.schedule_job(
            "0 */10 * * * *",
            "cleanup_cache",
            "Every 10 minutes",
            cleanup_expired_caches,
        )
        .await?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::External(format!("Failed to start scheduler: {}", e)))?;

        info!("✅ Job scheduler started successfully with 2 jobs");
        Ok(())
    }

    /// Stop the scheduler gracefully
    pub async fn stop(&mut self) -> Result<(), AppError> {
        info!("🛑 Stopping job scheduler...");
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::External(format!("Failed to stop scheduler: {}", e)))?;
        info!("✅ Job scheduler stopped");
        Ok(())
    }

    /// Helper to schedule a cron job with tracking
    async fn schedule_job<F, Fut>(
        &mut self,
        schedule: &str,
        job_name: &'static str,
        description: &str,
        job_fn: F,
    ) -> Result<(), AppError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<JobResult, AppError>> + Send + 'static,
    {
        let context = self.context.clone();
        let job_fn = Arc::new(job_fn);

        let job = Job::new_async(schedule, move |_uuid, _l| {
            let context = context.clone();
            let job_fn = job_fn.clone();
            Box::pin(async move {
                execute_job_with_tracking(job_name, context, job_fn).await;
            })
        })
        .map_err(|e| AppError::External(format!("Failed to create job {}: {}", job_name, e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::External(format!("Failed to add job {}: {}", job_name, e)))?;

        info!("📅 Scheduled: {} - {} [cron: {}]", job_name, description, schedule);
        Ok(())
    }

    /// Helper to schedule a fixed-interval job with tracking
    async fn schedule_repeated<F, Fut>(
        &mut self,
        interval: Duration,
        job_name: &'static str,
        job_fn: F,
    ) -> Result<(), AppError>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<JobResult, AppError>> + Send + 'static,
    {
        let context = self.context.clone();
        let job_fn = Arc::new(job_fn);

        let job = Job::new_repeated_async(interval, move |_uuid, _l| {
            let context = context.clone();
            let job_fn = job_fn.clone();
            Box::pin(async move {
                execute_job_with_tracking(job_name, context, job_fn).await;
            })
        })
        .map_err(|e| AppError::External(format!("Failed to create job {}: {}", job_name, e)))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::External(format!("Failed to add job {}: {}", job_name, e)))?;

        info!("📅 Scheduled: {} - every {}s", job_name, interval.as_secs());
        Ok(())
    }
}

/// Interval between portfolio monitor runs, kept within 1 minute..1 day.
pub fn monitor_interval(config: &SchedulerConfig) -> Duration {
    let minutes = config
        .monitor_interval_minutes
        .clamp(1, MAX_MONITOR_INTERVAL_MINUTES);
    Duration::from_secs(minutes.saturating_mul(60))
}

// Job tracking wrapper
async fn execute_job_with_tracking<F, Fut>(job_name: &str, context: JobContext, job_fn: Arc<F>)
where
    F: Fn(JobContext) -> Fut,
    Fut: std::future::Future<Output = Result<JobResult, AppError>>,
{
    info!("🏃 Starting job: {}", job_name);
    let started_at = Utc::now();
    let pool = context.pool.clone();

    let job_id = match job_run_queries::start_run(&pool, job_name).await {
        Ok(id) => id,
        Err(e) => {
            error!("Failed to record job start: {}", e);
            return;
        }
    };

    let result = job_fn(context).await;

    let duration_ms = (Utc::now() - started_at).num_milliseconds();

    match result {
        Ok(job_result) => {
            info!(
                "✅ Job completed: {} (processed: {}, failed: {}, duration: {}ms)",
                job_name, job_result.items_processed, job_result.items_failed, duration_ms
            );

            if let Err(e) = job_run_queries::complete_run(
                &pool,
                job_id,
                job_result.items_processed,
                job_result.items_failed,
                duration_ms,
            )
            .await
            {
                error!("Failed to record job success: {}", e);
            }
        }
        Err(e) => {
            error!("❌ Job failed: {} - {}", job_name, e);

            if let Err(e) = job_run_queries::fail_run(&pool, job_id, &e.to_string(), duration_ms).await {
                error!("Failed to record job failure: {}", e);
            }
        }
    }
}

pub async fn cleanup_expired_caches(ctx: JobContext) -> Result<JobResult, AppError> {
    info!("🧹 Cleaning up expired caches...");

    let removed = ctx.cache.cleanup_expired();
    info!("🗑️ Evicted {} expired market data entries", removed);

    Ok(JobResult {
        items_processed: i32::try_from(removed).unwrap_or(i32::MAX),
        items_failed: 0,
    })
}
