use super::jobs::{PipelineJob, PipelineMessage, StageOutcome, StageRequest};
use crate::backend::DataService;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::Sender,
    },
    thread,
    time::Instant,
};

/// Run service calls one at a time on a dedicated thread, reporting into
/// `result_tx`.
///
/// Jobs whose run is no longer current are dropped without touching the
/// network. The thread exits once the returned sender is dropped.
pub(super) fn spawn_pipeline_worker(
    service: Arc<dyn DataService>,
    current_run: Arc<AtomicU64>,
    result_tx: Sender<PipelineMessage>,
) -> Sender<PipelineJob> {
    let (tx, rx) = std::sync::mpsc::channel::<PipelineJob>();
    thread::spawn(move || {
        while let Ok(job) = rx.recv() {
            let current = current_run.load(Ordering::SeqCst);
            if job.run_id.0 != current {
                tracing::debug!(
                    "Skipping {} fetch for superseded run {} (current #{current})",
                    job.request.name(),
                    job.run_id
                );
                continue;
            }
            let start = Instant::now();
            let outcome = run_stage(service.as_ref(), job.request);
            if result_tx
                .send(PipelineMessage {
                    run_id: job.run_id,
                    elapsed: start.elapsed(),
                    outcome,
                })
                .is_err()
            {
                break;
            }
        }
    });
    tx
}

pub(super) fn run_stage(service: &dyn DataService, request: StageRequest) -> StageOutcome {
    match request {
        StageRequest::Schema => StageOutcome::Schema(service.fetch_schema()),
        StageRequest::Rows { count } => StageOutcome::Rows(service.fetch_rows(count)),
        StageRequest::Predict { records } => StageOutcome::Predictions(service.predict(&records)),
    }
}
