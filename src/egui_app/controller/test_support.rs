use super::*;
use crate::backend::{ColumnDescriptions, PredictResponse, SchemaResponse};
use crate::dataset::{Fields, Record};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

pub(super) fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub(super) fn schema(colnames: &[&str], label: &str) -> SchemaResponse {
    SchemaResponse {
        colnames: colnames.iter().map(|name| name.to_string()).collect(),
        coldesc: ColumnDescriptions::List(colnames.iter().map(|name| name.to_uppercase()).collect()),
        label: label.to_string(),
    }
}

pub(super) fn predictions(pairs: &[(&str, f64)]) -> PredictResponse {
    PredictResponse {
        predictions: pairs.iter().map(|(_, score)| *score).collect(),
        ids: pairs.iter().map(|(id, _)| id.to_string()).collect(),
    }
}

/// Blocks the first `predict` call until the test releases it.
pub(super) struct PredictGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

pub(super) struct GateHandle {
    pub(super) entered: Receiver<()>,
    pub(super) release: Sender<()>,
}

/// In-memory service with scripted answers.
///
/// Queued prediction results are consumed in order; once the queue is empty
/// every submitted record is scored 0.5, ids returned in reverse order.
pub(super) struct FakeService {
    schema: Result<SchemaResponse, ServiceError>,
    rows: Result<Vec<Fields>, ServiceError>,
    predict_results: Mutex<VecDeque<Result<PredictResponse, ServiceError>>>,
    gate: Mutex<Option<PredictGate>>,
    calls: Mutex<Vec<&'static str>>,
    submitted: Mutex<Vec<Vec<String>>>,
}

impl FakeService {
    pub(super) fn new(schema: SchemaResponse, rows: Vec<Value>) -> Self {
        Self {
            schema: Ok(schema),
            rows: Ok(rows.into_iter().map(fields).collect()),
            predict_results: Mutex::new(VecDeque::new()),
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn with_schema_error(mut self, error: ServiceError) -> Self {
        self.schema = Err(error);
        self
    }

    pub(super) fn with_rows_error(mut self, error: ServiceError) -> Self {
        self.rows = Err(error);
        self
    }

    pub(super) fn with_prediction(self, result: Result<PredictResponse, ServiceError>) -> Self {
        self.predict_results.lock().unwrap().push_back(result);
        self
    }

    pub(super) fn with_predict_gate(self) -> (Self, GateHandle) {
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        *self.gate.lock().unwrap() = Some(PredictGate {
            entered: entered_tx,
            release: release_rx,
        });
        (
            self,
            GateHandle {
                entered: entered_rx,
                release: release_tx,
            },
        )
    }

    pub(super) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(super) fn submitted(&self) -> Vec<Vec<String>> {
        self.submitted.lock().unwrap().clone()
    }
}

impl DataService for FakeService {
    fn fetch_schema(&self) -> Result<SchemaResponse, ServiceError> {
        self.calls.lock().unwrap().push("schema");
        self.schema.clone()
    }

    /// Ignores `count` so tests can exercise client-side truncation.
    fn fetch_rows(&self, _count: usize) -> Result<Vec<Fields>, ServiceError> {
        self.calls.lock().unwrap().push("rows");
        self.rows.clone()
    }

    fn predict(&self, records: &[Record]) -> Result<PredictResponse, ServiceError> {
        self.calls.lock().unwrap().push("predict");
        self.submitted
            .lock()
            .unwrap()
            .push(records.iter().map(|r| r.id().to_string()).collect());
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.recv();
        }
        if let Some(result) = self.predict_results.lock().unwrap().pop_front() {
            return result;
        }
        Ok(PredictResponse {
            predictions: records.iter().map(|_| 0.5).collect(),
            ids: records.iter().rev().map(|r| r.id().to_string()).collect(),
        })
    }
}

pub(super) fn controller_with(
    service: FakeService,
    config: ViewerConfig,
) -> (AnomalyController, Arc<FakeService>) {
    let service = Arc::new(service);
    let controller = AnomalyController::new(config, service.clone());
    (controller, service)
}

/// Apply worker messages until `done` holds; panics after a few seconds.
pub(super) fn pump_until(
    controller: &mut AnomalyController,
    done: impl Fn(&AnomalyController) -> bool,
) {
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !done(controller) {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        assert!(!remaining.is_zero(), "timed out waiting for pipeline");
        if let Ok(message) = controller.jobs.recv_message_timeout(remaining) {
            controller.process_message(message);
        }
    }
}
