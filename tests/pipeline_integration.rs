mod support;

use support::{
    lens_env::LensEnvGuard,
    service::{LocalService, Routes},
};

use anomaly_lens::{
    backend::{ColumnDescriptions, DataService, PredictResponse, SchemaResponse, ServiceError},
    color::color_for,
    config::{self, ViewerConfig},
    dataset::{Fields, Record},
    egui_app::{
        controller::AnomalyController,
        state::{PipelinePhase, StatusTone, ViewMode},
        view_model::{CellShade, VisibleColumn, display_value},
    },
};
use serde_json::json;
use std::{collections::BTreeMap, sync::Arc, time::Duration};

const SETTLE: Duration = Duration::from_secs(10);

fn kdd_routes() -> Routes {
    Routes {
        colnames: Some(
            json!({
                "colnames": ["duration", "protocol_type", "src_bytes"],
                "coldesc": ["Duration", "Protocol", "Source bytes"],
                "label": "class"
            })
            .to_string(),
        ),
        data: Some(
            json!([
                {"id": "r1", "duration": 0, "protocol_type": "tcp", "src_bytes": 181, "class": 0},
                {"id": "r2", "duration": 2, "protocol_type": "icmp", "src_bytes": 1032, "class": 1}
            ])
            .to_string(),
        ),
        predict: Some(json!({"predictions": [0.95, 0.05], "ids": ["r2", "r1"]}).to_string()),
    }
}

fn http_controller(service: &LocalService, config: ViewerConfig) -> AnomalyController {
    AnomalyController::from_config(ViewerConfig {
        base_url: service.base_url.clone(),
        request_timeout_secs: 5,
        ..config
    })
    .expect("controller")
}

#[test]
fn http_pipeline_loads_rows_and_merges_predictions() {
    let service = LocalService::start(kdd_routes());
    let mut controller = http_controller(&service, ViewerConfig::default());
    controller.start();
    assert!(controller.wait_until_settled(SETTLE));

    assert_eq!(controller.pipeline().phase, PipelinePhase::Ready);
    assert!(controller.pipeline().predictions_loaded);

    let view = controller.view();
    let names: Vec<&str> = view
        .columns()
        .iter()
        .map(|column| column.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        ["prediction", "class", "id", "Duration", "Protocol", "Source bytes"]
    );
    let dataset = view.dataset().expect("rows loaded");
    assert_eq!(dataset.get(0).unwrap().get("prediction"), Some(&json!(0.05)));
    assert_eq!(dataset.get(1).unwrap().get("prediction"), Some(&json!(0.95)));
    assert_eq!(
        view.cell_shade("r2", "prediction"),
        CellShade::Color(color_for(0.95))
    );
    assert_eq!(view.cell_shade("r2", "class"), CellShade::Color(color_for(1.0)));
    assert_eq!(
        controller.status().text,
        "Showing 6 of 6 columns 2 rows."
    );

    let requests = service.requests();
    let targets: Vec<(&str, &str)> = requests
        .iter()
        .map(|request| (request.method.as_str(), request.target.as_str()))
        .collect();
    assert_eq!(
        targets,
        [("GET", "/colnames"), ("GET", "/data?n=300"), ("POST", "/predict")]
    );
    let submitted: serde_json::Value =
        serde_json::from_str(&requests[2].body).expect("predict body is JSON");
    assert_eq!(submitted["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(submitted["data"][0]["id"], json!("r1"));
}

#[test]
fn http_schema_failure_is_fatal() {
    let service = LocalService::start(Routes {
        colnames: None,
        ..kdd_routes()
    });
    let mut controller = http_controller(&service, ViewerConfig::default());
    controller.start();
    assert!(controller.wait_until_settled(SETTLE));

    assert_eq!(controller.pipeline().phase, PipelinePhase::Failed);
    assert!(controller.view().columns().is_empty());
    assert_eq!(controller.status().tone, StatusTone::Error);
    assert_eq!(service.requests().len(), 1);
}

#[test]
fn http_prediction_failure_leaves_table_usable() {
    let service = LocalService::start(Routes {
        predict: None,
        ..kdd_routes()
    });
    let config = ViewerConfig {
        visible_columns: 3,
        max_cell_length: 2,
        ..ViewerConfig::default()
    };
    let mut controller = http_controller(&service, config);
    controller.start();
    assert!(controller.wait_until_settled(SETTLE));

    assert_eq!(controller.pipeline().phase, PipelinePhase::Ready);
    assert!(!controller.pipeline().predictions_loaded);
    let view = controller.view();
    assert_eq!(view.cell_shade("r1", "prediction"), CellShade::Loading);
    assert_eq!(
        view.visible_columns(3).last(),
        Some(&VisibleColumn::More { hidden: 3 })
    );
    let first = &view.visible_rows(1)[0];
    assert_eq!(display_value(first, "protocol_type", 2), "tc…");
    assert_eq!(display_value(first, "prediction", 2), "_");

    controller.select_row(1).expect("rows are loaded");
    assert_eq!(controller.view().navigation().mode, ViewMode::Detail);
}

/// Service speaking numeric ids with keyed column descriptions.
struct NumericIdService;

impl DataService for NumericIdService {
    fn fetch_schema(&self) -> Result<SchemaResponse, ServiceError> {
        let coldesc = BTreeMap::from([("bytes".to_string(), "Bytes sent".to_string())]);
        Ok(SchemaResponse {
            colnames: vec!["id".into(), "bytes".into()],
            coldesc: ColumnDescriptions::Map(coldesc),
            label: "attack".into(),
        })
    }

    fn fetch_rows(&self, _count: usize) -> Result<Vec<Fields>, ServiceError> {
        serde_json::from_value(json!([
            {"id": 10, "bytes": 1, "attack": false},
            {"id": 11, "bytes": 2, "attack": true},
            {"id": 12, "bytes": 3, "attack": true}
        ]))
        .map_err(|err| ServiceError::Json(err.to_string()))
    }

    fn predict(&self, records: &[Record]) -> Result<PredictResponse, ServiceError> {
        Ok(PredictResponse {
            predictions: records.iter().map(|_| 0.6).collect(),
            ids: records.iter().map(|record| record.id().to_string()).collect(),
        })
    }
}

#[test]
fn numeric_ids_and_keyed_descriptions_flow_through() {
    let config = ViewerConfig {
        visible_rows: 2,
        ..ViewerConfig::default()
    };
    let mut controller = AnomalyController::new(config, Arc::new(NumericIdService));
    controller.start();
    assert!(controller.wait_until_settled(SETTLE));

    let view = controller.view();
    let keys: Vec<&str> = view.columns().iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["prediction", "attack", "id", "bytes"]);
    assert_eq!(view.columns()[3].display_name, "Bytes sent");
    assert_eq!(view.cell_shade("11", "attack"), CellShade::Color(color_for(1.0)));
    assert_eq!(view.cell_shade("11", "prediction"), CellShade::Color(color_for(0.6)));
    assert_eq!(view.cell_shade("12", "prediction"), CellShade::Plain);
    assert_eq!(view.dataset().unwrap().get(2).unwrap().get("prediction"), None);
}

#[test]
fn config_is_read_from_config_home() {
    let temp = tempfile::tempdir().expect("create tempdir");
    let _env = LensEnvGuard::set_config_home(temp.path().to_path_buf());
    let path = config::config_path().expect("config path");
    assert!(path.starts_with(temp.path()));
    std::fs::write(
        &path,
        "base_url = \"http://127.0.0.1:1\"\nvisible_columns = 3\nprediction_row_cap = 5\n",
    )
    .expect("write config");

    let loaded = config::load_or_default().expect("load config");
    assert_eq!(loaded.visible_columns, 3);
    assert_eq!(loaded.prediction_row_cap, Some(5));
    assert_eq!(loaded.num_data_rows, 300);
}
