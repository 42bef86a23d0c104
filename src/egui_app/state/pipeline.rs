//! Load phases of one pipeline run.

use std::fmt;

/// Monotonically increasing identifier of a pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl RunId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stages a run moves through; `Failed` is terminal for the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelinePhase {
    #[default]
    Init,
    SchemaLoading,
    RowsLoading,
    PredictionsLoading,
    Ready,
    Failed,
}

impl PipelinePhase {
    pub fn is_loading(self) -> bool {
        matches!(
            self,
            Self::SchemaLoading | Self::RowsLoading | Self::PredictionsLoading
        )
    }

    /// Rows are in the store once the prediction stage has started.
    pub fn dataset_loaded(self) -> bool {
        matches!(self, Self::PredictionsLoading | Self::Ready)
    }

    /// No further stage will run for the current run.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Init => "Idle",
            Self::SchemaLoading => "Loading columns",
            Self::RowsLoading => "Loading rows",
            Self::PredictionsLoading => "Predicting",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }
}

/// Progress of the current run as seen by the view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineStatus {
    pub run_id: RunId,
    pub phase: PipelinePhase,
    /// Set only once a prediction response has been merged.
    pub predictions_loaded: bool,
    /// Fatal error of the current run.
    pub failure: Option<String>,
    /// Non-fatal prediction failure; the table stays usable.
    pub prediction_error: Option<String>,
}

impl PipelineStatus {
    /// Reset for a new run with `run_id`, entering schema loading.
    pub fn begin(&mut self, run_id: RunId) {
        *self = Self {
            run_id,
            phase: PipelinePhase::SchemaLoading,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_is_loaded_only_after_rows() {
        assert!(!PipelinePhase::Init.dataset_loaded());
        assert!(!PipelinePhase::SchemaLoading.dataset_loaded());
        assert!(!PipelinePhase::RowsLoading.dataset_loaded());
        assert!(PipelinePhase::PredictionsLoading.dataset_loaded());
        assert!(PipelinePhase::Ready.dataset_loaded());
        assert!(!PipelinePhase::Failed.dataset_loaded());
    }

    #[test]
    fn begin_clears_previous_run() {
        let mut status = PipelineStatus {
            run_id: RunId(3),
            phase: PipelinePhase::Failed,
            predictions_loaded: true,
            failure: Some("x".into()),
            prediction_error: Some("y".into()),
        };
        status.begin(RunId(4));
        assert_eq!(status.run_id, RunId(4));
        assert_eq!(status.phase, PipelinePhase::SchemaLoading);
        assert!(!status.predictions_loaded);
        assert!(status.failure.is_none());
        assert!(status.prediction_error.is_none());
    }
}
