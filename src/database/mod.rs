//! The hosted datastore. Rows are written through its PostgREST interface, so the manager is
//! an HTTP client holding the project URL and the anon key.

mod signup;

pub use signup::{NewSignup, Signup};

use reqwest::{header::HeaderMap, Client};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::config::StoreConfig;

#[derive(Debug)]
pub struct DbManager {
    http_client: Client,
    rest_url: reqwest::Url,
    table: String,
    anon_key: SecretString,
}

impl DbManager {
    /// Returns `Ok(None)` when the datastore credentials are missing from the config.
    pub fn init(config: &StoreConfig) -> Result<Option<Self>> {
        let Some((url, anon_key)) = config.credentials() else {
            return Ok(None);
        };
        info!("{:<20} - Initializing the datastore client", "init_db");

        let db = DbManager::new(url, anon_key.clone(), &config.table, config.timeout())?;
        Ok(Some(db))
    }

    pub fn new<S: AsRef<str>>(
        url: S,
        anon_key: SecretString,
        table: &str,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        // Without the trailing slash `join` would replace the last path segment.
        let mut base = url.as_ref().trim_end_matches('/').to_string();
        base.push_str("/rest/v1/");
        let rest_url = reqwest::Url::parse(&base).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(DbManager {
            http_client,
            rest_url,
            table: table.to_string(),
            anon_key,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let key = self.anon_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert("apikey", key.parse().map_err(|_| Error::InvalidKey)?);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {key}")
                .parse()
                .map_err(|_| Error::InvalidKey)?,
        );
        Ok(headers)
    }

    pub fn table_url(&self) -> Result<reqwest::Url> {
        self.rest_url
            .join(&self.table)
            .map_err(|e| Error::UrlParsing(e.to_string()))
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("the anon key is not a valid header value")]
    InvalidKey,
    #[error("the datastore rejected the insert ({status}): {body}")]
    InsertRejected {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("the datastore did not return the created row")]
    NoRowReturned,

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
