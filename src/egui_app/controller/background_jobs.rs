use super::AnomalyController;
use super::jobs::PipelineMessage;
use super::pipeline::PipelineError;
use std::sync::mpsc::TryRecvError;

impl AnomalyController {
    /// Apply every finished fetch. Call once per frame.
    pub fn poll_background_jobs(&mut self) {
        loop {
            let message = match self.jobs.try_recv_message() {
                Ok(message) => message,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            self.process_message(message);
        }
    }

    pub(super) fn process_message(&mut self, message: PipelineMessage) {
        match self.handle_message(message) {
            Ok(()) => {}
            Err(err @ PipelineError::StaleResponseDiscarded { .. }) => {
                tracing::debug!("{err}");
            }
            Err(err @ PipelineError::PredictionLoad(_)) => {
                tracing::warn!("{err}");
            }
            Err(err) => {
                tracing::error!("{err}");
            }
        }
    }
}
