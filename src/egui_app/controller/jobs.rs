use super::loader::spawn_pipeline_worker;
use crate::backend::{DataService, PredictResponse, SchemaResponse, ServiceError};
use crate::dataset::{Fields, Record};
use crate::egui_app::state::RunId;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{Receiver, RecvTimeoutError, SendError, Sender, TryRecvError},
    },
    time::Duration,
};

/// One fetch handed to the worker, tagged with the run that asked for it.
#[derive(Debug)]
pub(crate) struct PipelineJob {
    pub(crate) run_id: RunId,
    pub(crate) request: StageRequest,
}

#[derive(Debug)]
pub(crate) enum StageRequest {
    Schema,
    Rows { count: usize },
    Predict { records: Vec<Record> },
}

impl StageRequest {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Rows { .. } => "rows",
            Self::Predict { .. } => "predictions",
        }
    }
}

#[derive(Debug)]
pub(crate) enum StageOutcome {
    Schema(Result<SchemaResponse, ServiceError>),
    Rows(Result<Vec<Fields>, ServiceError>),
    Predictions(Result<PredictResponse, ServiceError>),
}

impl StageOutcome {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Rows(_) => "rows",
            Self::Predictions(_) => "predictions",
        }
    }
}

#[derive(Debug)]
pub(crate) struct PipelineMessage {
    pub(crate) run_id: RunId,
    pub(crate) elapsed: Duration,
    pub(crate) outcome: StageOutcome,
}

/// Workers for the live run plus the shared result channel.
///
/// Each run gets its own worker, so a new run never queues behind a fetch
/// that an older run still has in flight.
pub(crate) struct PipelineJobs {
    service: Arc<dyn DataService>,
    job_tx: Option<Sender<PipelineJob>>,
    result_tx: Sender<PipelineMessage>,
    message_rx: Receiver<PipelineMessage>,
    current_run: Arc<AtomicU64>,
}

impl PipelineJobs {
    pub(crate) fn new(service: Arc<dyn DataService>) -> Self {
        let (result_tx, message_rx) = std::sync::mpsc::channel();
        Self {
            service,
            job_tx: None,
            result_tx,
            message_rx,
            current_run: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mark `run_id` as live and hand it a fresh worker.
    ///
    /// Dropping the previous sender lets the old worker exit once its
    /// in-flight call returns; queued jobs of older runs are skipped.
    pub(crate) fn begin_run(&mut self, run_id: RunId) {
        self.current_run.store(run_id.0, Ordering::SeqCst);
        self.job_tx = Some(spawn_pipeline_worker(
            Arc::clone(&self.service),
            Arc::clone(&self.current_run),
            self.result_tx.clone(),
        ));
    }

    pub(crate) fn send(&self, job: PipelineJob) -> Result<(), SendError<PipelineJob>> {
        match &self.job_tx {
            Some(job_tx) => job_tx.send(job),
            None => Err(SendError(job)),
        }
    }

    pub(crate) fn try_recv_message(&self) -> Result<PipelineMessage, TryRecvError> {
        self.message_rx.try_recv()
    }

    pub(crate) fn recv_message_timeout(
        &self,
        timeout: Duration,
    ) -> Result<PipelineMessage, RecvTimeoutError> {
        self.message_rx.recv_timeout(timeout)
    }
}
