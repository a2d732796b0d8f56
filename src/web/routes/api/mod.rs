pub mod subscribe;

pub use subscribe::subscribe;

use crate::web::{Error, WebResult};

/// Answers every method a route doesn't handle, so the 405 gets the usual JSON error body.
pub async fn method_not_allowed() -> WebResult<()> {
    Err(Error::MethodNotAllowed)
}
