//! Contract for the anomaly-detection service that supplies columns, rows and
//! predictions, plus the JSON wire types it speaks.

pub mod http;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::dataset::records::number_text;
use crate::dataset::{Fields, Record};

pub use http::HttpDataService;

/// Remote source of schema, rows and predictions.
///
/// Implementations block the calling thread; the pipeline runs them on a
/// background worker.
pub trait DataService: Send + Sync {
    /// `GET <base>/colnames`
    fn fetch_schema(&self) -> Result<SchemaResponse, ServiceError>;
    /// `GET <base>/data?n=<count>`
    fn fetch_rows(&self, count: usize) -> Result<Vec<Fields>, ServiceError>;
    /// `POST <base>/predict` with `{ data: [...] }`.
    fn predict(&self, records: &[Record]) -> Result<PredictResponse, ServiceError>;
}

/// Failures talking to the service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid service URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Response body too large: {0}")]
    TooLarge(String),
    #[error("JSON error: {0}")]
    Json(String),
}

/// Column descriptions arrive either aligned with `colnames` or keyed by name.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnDescriptions {
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl Default for ColumnDescriptions {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ColumnDescriptions {
    /// Description for the column at `index` named `key`, if a non-empty one exists.
    pub fn describe(&self, index: usize, key: &str) -> Option<&str> {
        let found = match self {
            Self::List(items) => items.get(index),
            Self::Map(items) => items.get(key),
        };
        found.map(String::as_str).filter(|text| !text.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SchemaResponse {
    pub colnames: Vec<String>,
    #[serde(default)]
    pub coldesc: ColumnDescriptions,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub data: Vec<&'a Fields>,
}

impl<'a> PredictRequest<'a> {
    pub fn from_records(records: &'a [Record]) -> Self {
        Self {
            data: records.iter().map(Record::fields).collect(),
        }
    }
}

/// `predictions[i]` and `ids[i]` describe the i-th submitted record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<f64>,
    #[serde(deserialize_with = "ids_as_strings")]
    pub ids: Vec<String>,
}

fn ids_as_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| match value {
            serde_json::Value::String(text) => Ok(text),
            serde_json::Value::Number(number) => Ok(number_text(&number)),
            other => Err(serde::de::Error::custom(format!(
                "prediction id must be a string or number, got {other}"
            ))),
        })
        .collect()
}

pub(crate) fn parse_schema(body: &str) -> Result<SchemaResponse, ServiceError> {
    let parsed: SchemaResponse =
        serde_json::from_str(body.trim()).map_err(|err| ServiceError::Json(err.to_string()))?;
    if parsed.label.trim().is_empty() {
        return Err(ServiceError::Json(
            "Schema response has an empty label".to_string(),
        ));
    }
    Ok(parsed)
}

pub(crate) fn parse_rows(body: &str) -> Result<Vec<Fields>, ServiceError> {
    serde_json::from_str(body.trim()).map_err(|err| ServiceError::Json(err.to_string()))
}

pub(crate) fn parse_predictions(body: &str) -> Result<PredictResponse, ServiceError> {
    serde_json::from_str(body.trim()).map_err(|err| ServiceError::Json(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_schema_with_list_descriptions() {
        let schema = parse_schema(
            r#"{"colnames": ["duration"], "coldesc": ["Duration"], "label": "class"}"#,
        )
        .unwrap();
        assert_eq!(schema.colnames, ["duration"]);
        assert_eq!(schema.coldesc.describe(0, "duration"), Some("Duration"));
        assert_eq!(schema.label, "class");
    }

    #[test]
    fn parses_schema_with_map_descriptions() {
        let schema = parse_schema(
            r#"{"colnames": ["a", "b"], "coldesc": {"b": "Bee"}, "label": "y"}"#,
        )
        .unwrap();
        assert_eq!(schema.coldesc.describe(0, "a"), None);
        assert_eq!(schema.coldesc.describe(1, "b"), Some("Bee"));
    }

    #[test]
    fn missing_descriptions_default_to_empty() {
        let schema = parse_schema(r#"{"colnames": ["a"], "label": "y"}"#).unwrap();
        assert_eq!(schema.coldesc, ColumnDescriptions::List(Vec::new()));
    }

    #[test]
    fn rejects_schema_without_label() {
        assert!(matches!(
            parse_schema(r#"{"colnames": ["a"], "coldesc": []}"#),
            Err(ServiceError::Json(_))
        ));
        assert!(matches!(
            parse_schema(r#"{"colnames": ["a"], "coldesc": [], "label": " "}"#),
            Err(ServiceError::Json(_))
        ));
    }

    #[test]
    fn rows_must_be_an_array_of_objects() {
        let rows = parse_rows(r#"[{"id": "1", "duration": 5}, {"duration": 7}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("duration"), Some(&json!(5)));
        assert!(parse_rows(r#"{"rows": []}"#).is_err());
    }

    #[test]
    fn prediction_ids_accept_numbers() {
        let response = parse_predictions(r#"{"predictions": [0.9, 0.1], "ids": ["1", 2]}"#)
            .unwrap();
        assert_eq!(response.ids, ["1", "2"]);
        assert_eq!(response.predictions, [0.9, 0.1]);
        assert!(parse_predictions(r#"{"predictions": [0.9], "ids": [null]}"#).is_err());
    }

    #[test]
    fn whole_float_prediction_ids_match_record_ids() {
        let response =
            parse_predictions(r#"{"predictions": [0.9, 0.1, 0.2], "ids": [1.0, 0, 2.5]}"#).unwrap();
        assert_eq!(response.ids, ["1", "0", "2.5"]);
    }

    #[test]
    fn predict_request_wraps_record_fields() {
        let fields = match json!({"id": 4, "duration": 5}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let records = vec![Record::from_fields(0, fields)];
        let body = serde_json::to_value(PredictRequest::from_records(&records)).unwrap();
        assert_eq!(body, json!({"data": [{"id": "4", "duration": 5}]}));
    }
}
