//! `ureq`-backed implementation of [`DataService`].

use std::time::Duration;

use url::Url;

use super::{
    DataService, PredictRequest, PredictResponse, SchemaResponse, ServiceError, parse_predictions,
    parse_rows, parse_schema,
};
use crate::dataset::{Fields, Record};
use crate::http_client;

const COLNAMES_ENDPOINT: &str = "colnames";
const DATA_ENDPOINT: &str = "data";
const PREDICT_ENDPOINT: &str = "predict";

const MAX_SCHEMA_RESPONSE_BYTES: usize = 1024 * 1024;
const MAX_ROWS_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
const MAX_PREDICT_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// Talks JSON over HTTP to the service rooted at `base`.
pub struct HttpDataService {
    base: Url,
    agent: ureq::Agent,
}

impl HttpDataService {
    /// Build a client for `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let base = normalize_base(base_url)?;
        Ok(Self {
            base,
            agent: http_client::agent_with_timeout(timeout),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|err| ServiceError::InvalidUrl(err.to_string()))
    }
}

impl DataService for HttpDataService {
    fn fetch_schema(&self) -> Result<SchemaResponse, ServiceError> {
        let url = self.endpoint(COLNAMES_ENDPOINT)?;
        tracing::debug!("GET {url}");
        let response = map_call(self.agent.get(url.as_str()).call())?;
        let body = read_body_limited(response, MAX_SCHEMA_RESPONSE_BYTES)?;
        parse_schema(&body)
    }

    fn fetch_rows(&self, count: usize) -> Result<Vec<Fields>, ServiceError> {
        let mut url = self.endpoint(DATA_ENDPOINT)?;
        url.query_pairs_mut().append_pair("n", &count.to_string());
        tracing::debug!("GET {url}");
        let response = map_call(self.agent.get(url.as_str()).call())?;
        let body = read_body_limited(response, MAX_ROWS_RESPONSE_BYTES)?;
        parse_rows(&body)
    }

    fn predict(&self, records: &[Record]) -> Result<PredictResponse, ServiceError> {
        let url = self.endpoint(PREDICT_ENDPOINT)?;
        tracing::debug!("POST {url} with {} records", records.len());
        let request = self
            .agent
            .post(url.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", "application/json");
        let response = map_call(request.send_json(PredictRequest::from_records(records)))?;
        let body = read_body_limited(response, MAX_PREDICT_RESPONSE_BYTES)?;
        parse_predictions(&body)
    }
}

/// Parse the base URL and make sure relative joins append to its path.
fn normalize_base(base_url: &str) -> Result<Url, ServiceError> {
    let mut base =
        Url::parse(base_url.trim()).map_err(|err| ServiceError::InvalidUrl(err.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(ServiceError::InvalidUrl(format!(
            "{base_url} cannot be used as a base URL"
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    Ok(base)
}

fn map_call(result: Result<ureq::Response, ureq::Error>) -> Result<ureq::Response, ServiceError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(code, response)) => {
            let body = read_body_limited(response, MAX_ERROR_BODY_BYTES)
                .unwrap_or_else(|err| err.to_string());
            Err(ServiceError::Status { code, body })
        }
        Err(ureq::Error::Transport(err)) => Err(ServiceError::Transport(err.to_string())),
    }
}

fn read_body_limited(response: ureq::Response, max_bytes: usize) -> Result<String, ServiceError> {
    let bytes = http_client::read_response_bytes(response, max_bytes).map_err(|err| {
        if err.kind() == std::io::ErrorKind::InvalidData {
            ServiceError::TooLarge(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    })?;
    String::from_utf8(bytes).map_err(|err| ServiceError::Json(err.to_string()))
}
