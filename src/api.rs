//! JSON API dispatch
//!
//! Maps `/api/*` request paths onto the status report, the data sources and
//! the module prober. Path matching is exact: no trailing-slash or query
//! string normalization, so `/api/status/` and `/api/status?x=1` are 404s.

use crate::data::DataSource;
use crate::modules;
use crate::utils::iso_timestamp;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};
use std::path::Path;

/// Prefix that routes a request to the API instead of the static files
pub const API_PREFIX: &str = "/api/";

pub const STATUS_ROUTE: &str = "/api/status";
pub const MODULES_ROUTE: &str = "/api/modules";

/// Name reported by the status endpoint
pub const SERVER_NAME: &str = "The Chimera Protocol";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A JSON response built fresh for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// A `{"error": message}` body with the given status
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::error(StatusCode::NOT_FOUND, "API endpoint not found")
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        // Pretty output with two-space indent; non-ASCII text is written as-is.
        match serde_json::to_string_pretty(&self.body) {
            Ok(text) => (
                self.status,
                [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
                text,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize API response: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to serialize response",
                )
                    .into_response()
            }
        }
    }
}

/// The endpoint selected for a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Status,
    Data(&'static DataSource),
    Modules,
}

impl Endpoint {
    /// Resolve `path` (including any query string) to a known endpoint.
    #[must_use]
    pub fn resolve(path: &str) -> Option<Self> {
        match path {
            STATUS_ROUTE => Some(Endpoint::Status),
            MODULES_ROUTE => Some(Endpoint::Modules),
            _ => DataSource::for_route(path).map(Endpoint::Data),
        }
    }
}

/// Handle an API request for `path`, reading data files from `data_dir`.
#[must_use]
pub fn dispatch(path: &str, data_dir: &Path) -> ApiResponse {
    let Some(endpoint) = Endpoint::resolve(path) else {
        tracing::debug!("Unknown API endpoint: {path}");
        return ApiResponse::not_found();
    };

    match endpoint {
        Endpoint::Status => ApiResponse::ok(status_report()),
        Endpoint::Data(source) => match source.load(data_dir) {
            Ok(value) => ApiResponse::ok(value),
            Err(e) => {
                tracing::error!("Failed to load {}: {e}", source.filename);
                ApiResponse::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        },
        Endpoint::Modules => ApiResponse::ok(modules::to_json(&modules::probe(data_dir))),
    }
}

fn status_report() -> Value {
    json!({
        "status": "online",
        "timestamp": iso_timestamp(),
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_known_endpoints() {
        assert_eq!(Endpoint::resolve("/api/status"), Some(Endpoint::Status));
        assert_eq!(Endpoint::resolve("/api/modules"), Some(Endpoint::Modules));
        assert!(matches!(
            Endpoint::resolve("/api/domains"),
            Some(Endpoint::Data(source)) if source.field == "domainManagement"
        ));
        assert!(matches!(
            Endpoint::resolve("/api/websites"),
            Some(Endpoint::Data(source)) if source.field == "personalWebsites"
        ));
    }

    #[test]
    fn no_normalization_of_paths() {
        assert_eq!(Endpoint::resolve("/api/status/"), None);
        assert_eq!(Endpoint::resolve("/api/status?verbose=1"), None);
        assert_eq!(Endpoint::resolve("/API/status"), None);
        assert_eq!(Endpoint::resolve("/api/"), None);
    }

    #[test]
    fn status_report_is_online() {
        let dir = tempdir().unwrap();
        let response = dispatch("/api/status", dir.path());

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "online");
        assert_eq!(response.body["server"], SERVER_NAME);
        assert_eq!(response.body["version"], "1.0.0");
        assert!(response.body["timestamp"].is_string());
    }

    #[test]
    fn unknown_endpoint_is_404() {
        let dir = tempdir().unwrap();
        let response = dispatch("/api/unknown", dir.path());

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body, json!({"error": "API endpoint not found"}));
    }

    #[test]
    fn data_errors_become_500() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("websites-servers.json"), "not json").unwrap();

        let response = dispatch("/api/websites", dir.path());
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.body["error"]
            .as_str()
            .unwrap()
            .contains("websites-servers.json"));
    }

    #[test]
    fn modules_has_six_entries() {
        let dir = tempdir().unwrap();
        let response = dispatch("/api/modules", dir.path());

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_object().unwrap().len(), 6);
    }
}
