//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring dashboard refresh.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    refresh_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, state, refresh_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    state: AppState,
    refresh_cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(refresh_cron, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            if !state.gate.is_live() {
                return;
            }
            tracing::info!("scheduler: starting dashboard refresh");
            match state.refresh().await {
                Ok(decision) => {
                    tracing::info!(?decision, "scheduler: dashboard refresh complete");
                }
                Err(e) => tracing::error!(error = %e, "scheduler: dashboard refresh failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = refresh_cron, "scheduler: refresh job registered");
    Ok(())
}
