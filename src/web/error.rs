use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use crate::{captcha_client, database, email_client};

use super::types::DataParsingError;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("{0}")]
    Validation(#[from] DataParsingError),
    #[error("anti-automation check failed: {0}")]
    VerificationFailed(captcha_client::Error),
    #[error("missing configuration: {0}")]
    Configuration(&'static str),
    #[error("failed to store the signup: {0}")]
    Persistence(#[from] database::Error),
    #[error("failed to notify the operator: {0}")]
    Notification(#[from] email_client::Error),

    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

/// A rejected or unreadable verdict is the submitter's problem, an unreachable provider is ours.
impl From<captcha_client::Error> for Error {
    fn from(er: captcha_client::Error) -> Self {
        if er.is_rejection() {
            Error::VerificationFailed(er)
        } else {
            Error::Unexpected(er.into())
        }
    }
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, MethodNotAllowed),
            Error::InvalidBody(_) => (
                StatusCode::BAD_REQUEST,
                InvalidInput("Invalid request body".to_string()),
            ),
            Error::Validation(data_er) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }
            Error::VerificationFailed(_) => (StatusCode::BAD_REQUEST, VerificationFailed),
            Error::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, ServerConfiguration),
            Error::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, PersistenceFailed),
            Error::Notification(_) => (StatusCode::INTERNAL_SERVER_ERROR, NotificationFailed),
            Error::Tera(_) | Error::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ServiceError)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the submitter gets to see. The `Display` output is the `error` field of the response body.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Method not allowed")]
    MethodNotAllowed,
    #[display("{_0}")]
    InvalidInput(String),
    #[display("reCAPTCHA verification failed. Please try again.")]
    VerificationFailed,
    #[display("Server configuration error")]
    ServerConfiguration,
    #[display("Failed to save signup")]
    PersistenceFailed,
    #[display("Failed to send email")]
    NotificationFailed,
    #[display("Failed to process request")]
    ServiceError,
}
