//! The BibleFit waitlist backend.
//!
//! A single `POST /api/subscribe` route takes a signup through a reCAPTCHA check,
//! stores it in the hosted datastore and emails the operator about it.

pub mod app;
pub mod captcha_client;
pub mod config;
pub mod database;
pub mod email_client;
mod error;
pub mod templ_manager;
pub mod web;

pub use app::{serve, App, AppState};
pub use captcha_client::CaptchaClient;
pub use email_client::EmailClient;
pub use error::{Error, Result};

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Human readable, compact output for development and tests.
/// Respects `RUST_LOG`, defaults to `debug`.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// JSON lines for production log collectors.
/// Respects `RUST_LOG`, defaults to `info`.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
