//! # Network Client
//!
//! Outbound calls to the content services.
//!
//! ## Overview
//!
//! Every request carries the no-cache headers and the device identity
//! headers, and is bounded by the configured timeout. Response bodies are
//! parsed strictly as JSON; anything else is treated as a failed response.
//!
//! Two entry points exist:
//! - [`NetworkClient::load_from_cloud`] fetches one model payload and folds
//!   every failure into `None` (optionally alerting the user)
//! - [`NetworkClient::call_web_service`] is the generic call used for
//!   everything else and always returns a [`CallResult`]

use crate::error::{DataError, Result};
use crate::models::Model;
use crate::reporter::CONNECTIVITY_MESSAGE;
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse, UserNotifier};
use core_runtime::identity::DeviceIdentity;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

pub const ALERT_TITLE: &str = "Error";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid server response";

const NO_CACHE_HEADERS: [(&str, &str); 2] = [("pragma", "no-cache"), ("cache-control", "no-cache")];
const JSON_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// Outcome of a generic web-service call. Never an error.
///
/// `status` is `None` when no response arrived at all; `body` is `None`
/// when the response had no body or the body was not JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallResult {
    pub status: Option<u16>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl CallResult {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self {
            status: Some(status),
            headers: HashMap::new(),
            body,
        }
    }

    /// Result for a call that never got a response.
    pub fn transport_failure() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(status) if (200..300).contains(&status))
    }
}

/// Identity-stamped HTTP access to the content services.
pub struct NetworkClient {
    http: Arc<dyn HttpClient>,
    identity: DeviceIdentity,
    notifier: Arc<dyn UserNotifier>,
    timeout: Duration,
}

impl NetworkClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        identity: DeviceIdentity,
        notifier: Arc<dyn UserNotifier>,
        timeout: Duration,
    ) -> Self {
        debug!(identity = ?identity, timeout_secs = timeout.as_secs(), "Network client ready");
        Self {
            http,
            identity,
            notifier,
            timeout,
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .headers(NO_CACHE_HEADERS)
            .headers(self.identity.headers())
            .timeout(self.timeout)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        match tokio::time::timeout(self.timeout, self.http.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(DataError::Connectivity(err.to_string())),
            Err(_) => Err(DataError::Connectivity(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    /// Fetch the payload for `model`/`id`.
    ///
    /// # Errors
    ///
    /// - `Validation` when the model has no remote backing
    /// - `Connectivity` when no response arrived
    /// - `Server` for a non-2xx status or a body carrying an `error` field
    /// - `Parse` for an empty, `null` or non-JSON body
    #[instrument(skip(self, model), fields(model = %model.key()))]
    pub async fn try_load_from_cloud(&self, model: &Model, id: Option<&str>) -> Result<Value> {
        let url = model.url(id).ok_or_else(|| {
            DataError::Validation(format!("model {} has no remote backing", model.key()))
        })?;

        debug!(url = %url, "Loading from cloud");
        let response = self.send(self.request(HttpMethod::Get, url)).await?;

        if !response.is_success() {
            return Err(DataError::Server(format!("HTTP status {}", response.status)));
        }

        let value = parse_body(&response)?
            .ok_or_else(|| DataError::Parse("empty response body".to_string()))?;

        if value.is_null() {
            return Err(DataError::Parse(INVALID_RESPONSE_MESSAGE.to_string()));
        }

        if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
            return Err(DataError::Server(field_text(error)));
        }

        Ok(value)
    }

    /// Fetch the payload for `model`/`id`, or `None` on any failure.
    ///
    /// Models without remote backing return `None` without a request.
    /// Failures are logged and, unless `silent`, shown to the user.
    pub async fn load_from_cloud(&self, model: &Model, id: Option<&str>, silent: bool) -> Option<Value> {
        if !model.has_remote() {
            return None;
        }

        match self.try_load_from_cloud(model, id).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(model = model.key(), id = ?id, error = %err, "Cloud load failed");
                if !silent {
                    self.notifier.alert(ALERT_TITLE, &alert_message(&err)).await;
                }
                None
            }
        }
    }

    /// Generic call to `base_url + api`.
    ///
    /// Caller `headers` are applied last and replace fixed headers of the
    /// same name. `body` is sent as JSON only when given.
    #[instrument(skip(self, headers, body))]
    pub async fn call_web_service(
        &self,
        base_url: &str,
        api: &str,
        method: HttpMethod,
        headers: &[(&str, &str)],
        body: Option<&Value>,
    ) -> CallResult {
        let url = format!("{}{}", base_url, api);
        let mut request = self.request(method, url.clone()).headers(JSON_HEADERS);

        if let Some(body) = body {
            request = match request.json(body) {
                Ok(request) => request,
                Err(err) => {
                    warn!(url = %url, error = %err, "Failed to encode request body");
                    return CallResult::transport_failure();
                }
            };
        }

        let request = request.headers(headers.iter().copied());

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(method = %method, url = %url, error = %err, "Web service call failed");
                return CallResult::transport_failure();
            }
        };

        let body = match parse_body(&response) {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %url, status = response.status, error = %err, "Discarding unparsable body");
                None
            }
        };

        debug!(method = %method, url = %url, status = response.status, "Web service call finished");

        CallResult {
            status: Some(response.status),
            headers: response.headers,
            body,
        }
    }
}

/// Strict JSON body parse. A blank body is `Ok(None)`.
fn parse_body(response: &HttpResponse) -> Result<Option<Value>> {
    if response.is_body_blank() {
        return Ok(None);
    }

    serde_json::from_slice(&response.body)
        .map(Some)
        .map_err(|e| DataError::Parse(e.to_string()))
}

/// Text of a server-supplied field, without quotes for plain strings.
pub(crate) fn field_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

fn alert_message(err: &DataError) -> String {
    match err {
        DataError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
        DataError::Parse(_) => INVALID_RESPONSE_MESSAGE.to_string(),
        DataError::Server(message) => message.clone(),
        other => other.to_string(),
    }
}
