use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    web::{log, Error, REQUEST_ID_HEADER},
    AppState,
};

/// Turns a handler `Error` stashed in the response extensions into the JSON error body
/// and writes one log line per request.
///
/// `details` carries the internal error and is only filled for server errors outside of production.
pub async fn response_mapper(
    State(app_state): State<AppState>,
    req_method: Method,
    uri: Uri,
    headers: HeaderMap,
    resp: Response,
) -> Response {
    let req_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|id| id.to_str().ok())
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(Uuid::new_v4);

    let web_error = resp.extensions().get::<Arc<Error>>().map(Arc::as_ref);
    let client_status_and_error = web_error.map(Error::status_code_and_client_error);

    let err_resp = client_status_and_error.as_ref().map(|(status, cl_err)| {
        let details = web_error
            .filter(|_| status.is_server_error() && app_state.expose_error_details)
            .map(|er| er.to_string());

        let mut client_error_body = json!({ "error": cl_err.to_string() });
        if let Some(details) = details {
            client_error_body["details"] = json!(details);
        }

        (*status, Json(client_error_body)).into_response()
    });

    log::log_request(
        req_id,
        req_method,
        uri,
        resp.status(),
        web_error,
        client_status_and_error,
    );

    err_resp.unwrap_or(resp)
}
