use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// A client for the transactional email provider's `/emails` endpoint.
#[derive(Debug)]
pub struct EmailClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    pub sender: String,
    api_key: SecretString,
}

impl EmailClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        sender: String,
        api_key: SecretString,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        // A trailing slash keeps any path of the base URL when `emails` is joined onto it.
        let base = format!("{}/", url.as_ref().trim_end_matches('/'));
        let url = reqwest::Url::parse(&base).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(EmailClient {
            http_client,
            url,
            sender,
            api_key,
        })
    }

    /// Sends a single html email and returns the id the provider assigned to it.
    pub async fn send_email<S>(&self, recipient: &str, subject: S, html_content: S) -> Result<String>
    where
        S: AsRef<str>,
    {
        let url = self
            .url
            .join("emails")
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let email_content = EmailContent {
            from: &self.sender,
            to: [recipient],
            subject: subject.as_ref(),
            html: html_content.as_ref(),
        };

        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&email_content)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected { status, body });
        }

        let sent: SentEmail = resp.json().await?;
        Ok(sent.id)
    }
}

#[derive(Serialize)]
pub struct EmailContent<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(Deserialize)]
struct SentEmail {
    id: String,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("the email provider answered with {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
