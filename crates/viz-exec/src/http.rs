use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use viz_core::config::CollaboratorConfig;
use viz_core::RawVisualization;

use crate::contracts::DatasetInfo;
use crate::contracts::ErrorBody;
use crate::contracts::HealthReport;
use crate::contracts::InterpretRequest;
use crate::error::InterpretError;
use crate::interpreter::Interpreter;

const QUERY_PATH: &str = "/api/query";
const HEALTH_PATH: &str = "/health";
const DATASET_INFO_PATH: &str = "/api/dataset-info";

/// Talks to the collaborator service over HTTP with a fixed request timeout.
#[derive(Debug, Clone)]
pub struct HttpInterpreter {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpInterpreter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, InterpretError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| InterpretError::Transport {
                url: base_url.clone(),
                message: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    pub fn from_config(config: &CollaboratorConfig) -> Result<Self, InterpretError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn send_error(&self, url: &str, err: reqwest::Error) -> InterpretError {
        if err.is_timeout() {
            InterpretError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            InterpretError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    fn read_json<T: DeserializeOwned>(&self, url: &str, response: Response) -> Result<T, InterpretError> {
        let status = response.status();
        let body = response.text().map_err(|err| self.send_error(url, err))?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), status.canonical_reason(), &body));
        }
        serde_json::from_str(&body).map_err(|err| InterpretError::Decode(err.to_string()))
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, InterpretError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, "collaborator GET");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| self.send_error(&url, err))?;
        self.read_json(&url, response)
    }
}

impl Interpreter for HttpInterpreter {
    fn name(&self) -> &'static str {
        "http"
    }

    fn interpret(&self, request: &InterpretRequest) -> Result<RawVisualization, InterpretError> {
        let url = self.endpoint(QUERY_PATH);
        tracing::debug!(url = %url, query = %request.query, "collaborator POST");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|err| self.send_error(&url, err))?;
        self.read_json(&url, response)
    }

    fn health(&self) -> Result<HealthReport, InterpretError> {
        self.get(HEALTH_PATH)
    }

    fn dataset_info(&self) -> Result<DatasetInfo, InterpretError> {
        self.get(DATASET_INFO_PATH)
    }
}

/// Prefers the `{ "error": ... }` message, then the raw body, then the reason phrase.
fn status_error(code: u16, reason: Option<&str>, body: &str) -> InterpretError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => parsed.error,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => reason.unwrap_or("request failed").to_string(),
    };
    InterpretError::Status { code, message }
}
