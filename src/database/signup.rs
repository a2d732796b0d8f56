use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DbManager, Error, Result};
use crate::web::types::ValidSignup;

/// A row to be inserted into the `signups` table.
/// `id` and `created_at` are left to the datastore.
#[derive(Debug, Serialize)]
pub struct NewSignup<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub is_subscribed: bool,
    pub project_id: i64,
}

impl<'a> NewSignup<'a> {
    pub fn new(signup: &'a ValidSignup, project_id: i64) -> Self {
        NewSignup {
            name: signup.name.as_ref(),
            email: signup.email.as_ref(),
            is_subscribed: true,
            project_id,
        }
    }
}

/// The created row. Only the key is read back, other columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
    pub id: i64,
}

impl DbManager {
    /// Inserts a single signup and returns the row the datastore created.
    /// There is no dedup key, the same submission twice makes two rows.
    pub async fn insert_signup(&self, new_signup: &NewSignup<'_>) -> Result<Signup> {
        let resp = self
            .http_client
            .post(self.table_url()?)
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(new_signup)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::InsertRejected { status, body });
        }

        let rows: Vec<Signup> = resp.json().await?;
        debug!("{:<20} - {rows:?}", "insert_signup");

        rows.into_iter().next().ok_or(Error::NoRowReturned)
    }
}
