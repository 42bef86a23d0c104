//! Schema → rows → predictions, one stage at a time.

use super::AnomalyController;
use super::jobs::{PipelineJob, PipelineMessage, StageOutcome, StageRequest};
use crate::backend::{PredictResponse, SchemaResponse, ServiceError};
use crate::dataset::{Dataset, Fields, Schema, label_colors};
use crate::egui_app::state::{PipelinePhase, RunId, StatusBarState, StatusTone};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

/// Status text while the prediction request is outstanding.
pub const PREDICTIONS_PENDING_TEXT: &str = "loading anomaly predictions ...";

/// Why a pipeline message did not advance the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to load columns: {0}")]
    SchemaLoad(ServiceError),
    #[error("Failed to load rows: {0}")]
    RowLoad(ServiceError),
    #[error("Failed to load predictions: {0}")]
    PredictionLoad(ServiceError),
    #[error("Discarded response of superseded run {run_id} (current {current})")]
    StaleResponseDiscarded { run_id: RunId, current: RunId },
    #[error("Ignored {stage} response while {phase:?}")]
    UnexpectedStage {
        stage: &'static str,
        phase: PipelinePhase,
    },
}

impl AnomalyController {
    /// Start a new run from schema loading, superseding any run in flight.
    pub fn start(&mut self) -> RunId {
        let run_id = self.pipeline.run_id.next();
        self.jobs.begin_run(run_id);
        self.pipeline.begin(run_id);
        self.view.reset();
        tracing::info!("Starting pipeline run {run_id}");
        self.dispatch(StageRequest::Schema);
        self.refresh_status();
        run_id
    }

    /// Manual retry; identical to [`AnomalyController::start`].
    pub fn reload(&mut self) -> RunId {
        self.start()
    }

    /// Drain results until the run settles or `timeout` elapses.
    ///
    /// Returns whether the current run is settled.
    pub fn wait_until_settled(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.pipeline.phase.is_settled() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.jobs.recv_message_timeout(remaining) {
                Ok(message) => self.process_message(message),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        self.pipeline.phase.is_settled()
    }

    /// Apply one worker message. Only messages of the current run mutate state.
    pub(super) fn handle_message(&mut self, message: PipelineMessage) -> Result<(), PipelineError> {
        let current = self.pipeline.run_id;
        if message.run_id != current {
            return Err(PipelineError::StaleResponseDiscarded {
                run_id: message.run_id,
                current,
            });
        }
        let result = match (self.pipeline.phase, message.outcome) {
            (PipelinePhase::SchemaLoading, StageOutcome::Schema(result)) => {
                tracing::debug!("Schema fetched in {:?}", message.elapsed);
                self.apply_schema(result)
            }
            (PipelinePhase::RowsLoading, StageOutcome::Rows(result)) => {
                tracing::debug!("Rows fetched in {:?}", message.elapsed);
                self.apply_rows(result)
            }
            (PipelinePhase::PredictionsLoading, StageOutcome::Predictions(result)) => {
                tracing::debug!("Predictions fetched in {:?}", message.elapsed);
                self.apply_predictions(result)
            }
            (phase, outcome) => Err(PipelineError::UnexpectedStage {
                stage: outcome.name(),
                phase,
            }),
        };
        self.refresh_status();
        result
    }

    fn apply_schema(
        &mut self,
        result: Result<SchemaResponse, ServiceError>,
    ) -> Result<(), PipelineError> {
        let response = result.map_err(|err| self.fail(PipelineError::SchemaLoad(err)))?;
        let schema = Schema::from_response(&response);
        tracing::info!(
            "Loaded {} columns (label {:?})",
            schema.columns.len(),
            schema.label
        );
        self.view.publish_schema(schema);
        self.pipeline.phase = PipelinePhase::RowsLoading;
        self.dispatch(StageRequest::Rows {
            count: self.config.num_data_rows,
        });
        Ok(())
    }

    fn apply_rows(&mut self, result: Result<Vec<Fields>, ServiceError>) -> Result<(), PipelineError> {
        let rows = result.map_err(|err| self.fail(PipelineError::RowLoad(err)))?;
        let dataset = Dataset::from_rows(rows, self.config.num_data_rows);
        let label = self.view.label_column().unwrap_or_default().to_string();
        let colors = label_colors(&dataset, &label);
        tracing::info!("Loaded {} rows", dataset.len());
        self.view.publish_rows(dataset, colors);
        self.pipeline.phase = PipelinePhase::PredictionsLoading;

        let batch_len = self.config.prediction_batch_len(self.view.row_count());
        if batch_len == 0 {
            tracing::info!("No rows to score; skipping prediction request");
            self.view.mark_predictions_loaded();
            self.pipeline.predictions_loaded = true;
            self.pipeline.phase = PipelinePhase::Ready;
            return Ok(());
        }
        let records = self.view.visible_rows(batch_len).to_vec();
        self.dispatch(StageRequest::Predict { records });
        Ok(())
    }

    fn apply_predictions(
        &mut self,
        result: Result<PredictResponse, ServiceError>,
    ) -> Result<(), PipelineError> {
        self.pipeline.phase = PipelinePhase::Ready;
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                // Table stays usable; prediction cells keep their loading state.
                self.pipeline.prediction_error = Some(err.to_string());
                return Err(PipelineError::PredictionLoad(err));
            }
        };
        let report = self.view.merge_predictions(&response);
        if report.length_mismatch {
            tracing::warn!(
                "Prediction response has {} scores for {} ids",
                response.predictions.len(),
                response.ids.len()
            );
        }
        if report.unknown > 0 {
            tracing::warn!("{} predicted ids match no loaded row", report.unknown);
        }
        tracing::info!("Merged {} predictions", report.matched);
        self.pipeline.predictions_loaded = true;
        Ok(())
    }

    /// Record a fatal failure: the run ends and no partial table remains.
    fn fail(&mut self, error: PipelineError) -> PipelineError {
        self.view.reset();
        self.pipeline.phase = PipelinePhase::Failed;
        self.pipeline.failure = Some(error.to_string());
        error
    }

    fn dispatch(&mut self, request: StageRequest) {
        let job = PipelineJob {
            run_id: self.pipeline.run_id,
            request,
        };
        if let Err(err) = self.jobs.send(job) {
            let stage = err.0.request.name();
            let cause = ServiceError::Transport("pipeline worker stopped".to_string());
            let error = match err.0.request {
                StageRequest::Schema => PipelineError::SchemaLoad(cause),
                StageRequest::Rows { .. } => PipelineError::RowLoad(cause),
                StageRequest::Predict { .. } => {
                    self.pipeline.phase = PipelinePhase::Ready;
                    self.pipeline.prediction_error = Some(cause.to_string());
                    tracing::error!("Could not dispatch {stage} fetch");
                    return;
                }
            };
            tracing::error!("Could not dispatch {stage} fetch");
            self.fail(error);
        }
    }

    pub(super) fn refresh_status(&mut self) {
        self.status = status_for(self);
    }
}

fn status_for(controller: &AnomalyController) -> StatusBarState {
    let pipeline = &controller.pipeline;
    match pipeline.phase {
        PipelinePhase::Init => StatusBarState::new("Idle", StatusTone::Idle),
        PipelinePhase::SchemaLoading | PipelinePhase::RowsLoading => StatusBarState::new(
            format!("{} ...", pipeline.phase.label()),
            StatusTone::Busy,
        ),
        PipelinePhase::PredictionsLoading => {
            StatusBarState::new(PREDICTIONS_PENDING_TEXT, StatusTone::Busy)
        }
        PipelinePhase::Failed => StatusBarState::new(
            pipeline
                .failure
                .clone()
                .unwrap_or_else(|| "Loading failed".to_string()),
            StatusTone::Error,
        ),
        PipelinePhase::Ready => match &pipeline.prediction_error {
            Some(err) => StatusBarState::new(
                format!("Predictions unavailable: {err}"),
                StatusTone::Warning,
            ),
            None => StatusBarState::new(summary_text(controller), StatusTone::Info),
        },
    }
}

/// "Showing X of Y columns Z rows."
fn summary_text(controller: &AnomalyController) -> String {
    let total = controller.view.columns().len();
    let shown = controller.config.visible_columns.min(total);
    format!(
        "Showing {shown} of {total} columns {} rows.",
        controller.view.row_count()
    )
}
