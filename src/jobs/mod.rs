//! Scheduled Jobs
//!
//! Keeps the read model caught up with writes made by other processes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval, MissedTickBehavior};

use crate::event_store::EventStorage;
use crate::projection::{ProjectionError, Projector};

/// Configuration for the refresher
#[derive(Debug, Clone)]
pub struct ProjectionRefresherConfig {
    /// Interval between refreshes (default: 5 seconds)
    pub refresh_interval: Duration,
}

impl Default for ProjectionRefresherConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(5),
        }
    }
}

/// Periodically applies new events to a shared projector
pub struct ProjectionRefresher<S> {
    projector: Arc<Projector<S>>,
    config: ProjectionRefresherConfig,
}

impl<S: EventStorage + 'static> ProjectionRefresher<S> {
    pub fn new(projector: Arc<Projector<S>>) -> Self {
        Self {
            projector,
            config: ProjectionRefresherConfig::default(),
        }
    }

    pub fn with_config(projector: Arc<Projector<S>>, config: ProjectionRefresherConfig) -> Self {
        Self { projector, config }
    }

    /// Start refreshing in the background.
    /// Returns a handle that can be used to abort the refresher.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.refresh_interval.as_secs(),
            "Projection refresher started"
        );

        let mut ticker = interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Projection refresh failed");
            }
        }
    }

    /// Refresh once (for manual trigger or testing)
    pub async fn run_once(&self) -> Result<RefreshReport, ProjectionError> {
        let before = self.projector.applied().await;
        self.projector.refresh().await?;
        let after = self.projector.applied().await;

        if after != before {
            tracing::debug!(before, after, "Read model refreshed");
        }

        Ok(RefreshReport {
            applied_before: before,
            applied_after: after,
            completed_at: Utc::now(),
        })
    }
}

/// Report from one refresh
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub applied_before: usize,
    pub applied_after: usize,
    pub completed_at: DateTime<Utc>,
}

impl RefreshReport {
    /// True if the log shrank and the model was rebuilt
    pub fn rebuilt(&self) -> bool {
        self.applied_after < self.applied_before
    }
}
