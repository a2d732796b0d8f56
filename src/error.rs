use crate::{app, captcha_client, config, database, email_client};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("captcha client error: {0}")]
    CaptchaClient(#[from] captcha_client::Error),
    #[error("database error: {0}")]
    Database(#[from] database::Error),
    #[error("email client error: {0}")]
    EmailClient(#[from] email_client::Error),
    #[error("serving error: {0}")]
    Serve(#[from] app::serve::ServeError),

    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
