use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::web::types::CaptchaToken;

/// Talks to the reCAPTCHA `siteverify` endpoint.
#[derive(Debug)]
pub struct CaptchaClient {
    pub http_client: Client,
    pub verify_url: reqwest::Url,
    secret: SecretString,
}

impl CaptchaClient {
    pub fn new<S: AsRef<str>>(
        verify_url: S,
        secret: SecretString,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        let verify_url = reqwest::Url::parse(verify_url.as_ref())
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(CaptchaClient {
            http_client,
            verify_url,
            secret,
        })
    }

    /// Asks the provider whether `token` is a solved challenge.
    /// `Ok(())` only for an explicit `success: true`, anything else is a rejection.
    pub async fn verify(&self, token: &CaptchaToken) -> Result<()> {
        let form = VerifyForm {
            secret: self.secret.expose_secret(),
            response: token.as_ref(),
        };

        let body = self
            .http_client
            .post(self.verify_url.clone())
            .form(&form)
            .send()
            .await?
            .bytes()
            .await?;

        let verdict: VerifyResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        if verdict.success {
            Ok(())
        } else {
            warn!(error_codes = ?verdict.error_codes, "reCAPTCHA verification failed");
            Err(Error::Rejected(verdict.error_codes))
        }
    }
}

#[derive(Serialize)]
struct VerifyForm<'a> {
    secret: &'a str,
    response: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("the provider rejected the token: {0:?}")]
    Rejected(Vec<String>),
    #[error("the provider answered with an unexpected body: {0}")]
    MalformedResponse(String),

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Whether the provider answered and said no, as opposed to not being reachable at all.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::Rejected(_) | Error::MalformedResponse(_))
    }
}
