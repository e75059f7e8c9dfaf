use std::sync::Arc;
use std::time::Instant;

use tokio::time::interval;

use crate::features::drafts::services::WizardService;

/// Background worker that discards abandoned drafts
pub struct DraftSweeper {
    wizard_service: Arc<WizardService>,
}

impl DraftSweeper {
    pub fn new(wizard_service: Arc<WizardService>) -> Self {
        Self { wizard_service }
    }

    /// Run the sweeper in a background loop
    pub async fn run(&self) {
        let config = self.wizard_service.config();
        tracing::info!(
            "Starting draft sweeper (interval {:?}, idle ttl {:?})",
            config.sweep_interval,
            config.draft_idle_ttl
        );

        let mut interval = interval(config.sweep_interval);

        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }

    /// One pass; returns how many drafts were discarded
    pub async fn sweep_once(&self) -> usize {
        self.wizard_service.sweep_idle_at(Instant::now()).await
    }
}
