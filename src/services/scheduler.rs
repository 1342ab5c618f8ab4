use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::domain::events::NotificationEvent;
use crate::state::SharedState;

/// Cron-driven background jobs: the analytics refresh and, when enabled,
/// unattended news generation.
pub struct Scheduler {
    state: Arc<SharedState>,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>) -> Self {
        Self {
            state,
            running: Arc::new(RwLock::new(false)),
        }
    }

    fn analytics_job(&self, cron_expr: &str) -> Result<Job> {
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        Ok(Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "refresh_analytics", "Starting scheduled analytics refresh");

                if let Err(e) = state.analytics_service.refresh().await {
                    error!(event = "job_failed", job_name = "refresh_analytics", error = %e, "Scheduled analytics refresh failed");
                    let _ = state.event_bus.send(NotificationEvent::Error {
                        message: format!("Analytics refresh failed: {e}"),
                    });
                    return;
                }

                info!(
                    event = "job_finished",
                    job_name = "refresh_analytics",
                    duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "Scheduled analytics refresh finished"
                );
            })
        })?)
    }

    fn news_job(&self, cron_expr: &str) -> Result<Job> {
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        Ok(Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                info!(event = "job_started", job_name = "generate_news", "Starting scheduled news generation");

                // Failures are already logged and broadcast by the service
                if let Ok(report) = state.news_service.generate().await {
                    info!(
                        event = "job_finished",
                        job_name = "generate_news",
                        articles = report.articles.len(),
                        duration_ms = report.duration_ms,
                        "Scheduled news generation finished"
                    );
                }
            })
        })?)
    }

    /// Runs until [`Scheduler::stop`] is called. Returns immediately when no
    /// job is enabled.
    pub async fn start(&self) -> Result<()> {
        let (analytics_cron, news_cron) = {
            let config = self.state.config.read().await;
            let analytics = config
                .analytics
                .refresh_enabled
                .then(|| config.analytics.refresh_cron.clone());
            let news = if config.news.enabled {
                config.news.cron_expression.clone()
            } else {
                None
            };
            (analytics, news)
        };

        if analytics_cron.is_none() && news_cron.is_none() {
            info!("Scheduler has no enabled jobs");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        let mut sched = JobScheduler::new().await?;

        if let Some(cron_expr) = &analytics_cron {
            sched.add(self.analytics_job(cron_expr)?).await?;
            info!("Analytics refresh scheduled: {}", cron_expr);
        }

        if let Some(cron_expr) = &news_cron {
            sched.add(self.news_job(cron_expr)?).await?;
            info!("News generation scheduled: {}", cron_expr);
        }

        sched.start().await?;

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }
}
