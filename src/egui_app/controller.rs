//! Owns the view model and drives the load pipeline for the egui renderer.

use crate::backend::{DataService, HttpDataService, ServiceError};
use crate::config::ViewerConfig;
use crate::egui_app::state::{PipelineStatus, StatusBarState, StatusTone};
use crate::egui_app::view_model::ViewModel;
use std::sync::Arc;

mod background_jobs;
mod jobs;
mod loader;
mod navigation;
mod pipeline;

pub use pipeline::PipelineError;

use jobs::PipelineJobs;

/// Maintains pipeline and view state and bridges the service to the egui UI.
///
/// This is the only writer of the [`ViewModel`]; worker results are applied
/// from [`AnomalyController::poll_background_jobs`] on the UI thread.
pub struct AnomalyController {
    config: ViewerConfig,
    view: ViewModel,
    pipeline: PipelineStatus,
    status: StatusBarState,
    jobs: PipelineJobs,
}

impl AnomalyController {
    pub fn new(config: ViewerConfig, service: Arc<dyn DataService>) -> Self {
        Self {
            config,
            view: ViewModel::new(),
            pipeline: PipelineStatus::default(),
            status: StatusBarState::new("Idle", StatusTone::Idle),
            jobs: PipelineJobs::new(service),
        }
    }

    /// Build a controller talking HTTP to `config.base_url`.
    pub fn from_config(config: ViewerConfig) -> Result<Self, ServiceError> {
        let service = HttpDataService::new(&config.base_url, config.request_timeout())?;
        tracing::info!("Using anomaly service at {}", service.base_url());
        Ok(Self::new(config, Arc::new(service)))
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewModel {
        &self.view
    }

    pub fn pipeline(&self) -> &PipelineStatus {
        &self.pipeline
    }

    pub fn status(&self) -> &StatusBarState {
        &self.status
    }
}

#[cfg(test)]
mod test_support;
