use axum::http::{Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use super::error::ClientError;
use crate::web::Error;

/// Writes a single structured line describing how a request ended.
/// Server errors are logged at error level together with the internal error.
pub fn log_request(
    uuid: Uuid,
    req_method: Method,
    uri: Uri,
    status_code: StatusCode,
    web_error: Option<&Error>,
    client_status_and_error: Option<(StatusCode, ClientError)>,
) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let client_error_type = client_status_and_error
        .as_ref()
        .map(|(_, ce)| ce.as_ref().to_string());
    let status_code = client_status_and_error
        .map(|(sc, _)| sc)
        .unwrap_or(status_code);
    let web_error_type = web_error.map(|we| we.as_ref().to_string());
    let web_error_data = web_error.map(|we| we.to_string());

    let logline = LogLine {
        timestamp,
        uuid: uuid.to_string(),
        req_method: req_method.to_string(),
        uri: uri.to_string(),
        status_code: status_code.as_u16(),
        client_error_type,
        web_error_type,
        web_error_data,
    };

    if status_code.is_server_error() {
        error!("LOGLINE: {}", json!(logline));
    } else {
        info!("LOGLINE: {}", json!(logline));
    }
}

#[derive(Serialize)]
struct LogLine {
    timestamp: String,
    uuid: String,

    req_method: String,
    uri: String,
    status_code: u16,

    #[serde(skip_serializing_if = "Option::is_none")]
    client_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_error_data: Option<String>,
}
