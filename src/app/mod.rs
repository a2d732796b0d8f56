pub mod serve;

// re-export
pub use serve::serve;

use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::AppConfig, database::DbManager, templ_manager::TemplateManager, CaptchaClient,
    EmailClient, Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let app_state = AppState::from_config(&config)?;

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    /// `None` when the reCAPTCHA secret is missing.
    pub captcha_client: Option<CaptchaClient>,
    /// `None` when the datastore URL or anon key is missing.
    pub database_mgr: Option<DbManager>,
    /// `None` when the email provider key is missing.
    pub email_client: Option<EmailClient>,
    pub templ_mgr: TemplateManager,
    pub operator_addr: String,
    pub project_id: i64,
    pub expose_error_details: bool,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(internal: InternalState) -> Self {
        AppState(Arc::new(internal))
    }

    /// Builds every client whose credentials are present.
    /// A missing credential isn't fatal here, the signup route answers with a configuration error instead.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let captcha_client = match config.captcha_config.secret() {
            Some(secret) => Some(CaptchaClient::new(
                &config.captcha_config.verify_url,
                secret.clone(),
                config.captcha_config.timeout(),
            )?),
            None => {
                warn!("{:<20} - RECAPTCHA_SECRET_KEY not set", "app_state");
                None
            }
        };

        let database_mgr = DbManager::init(&config.store_config)?;
        if database_mgr.is_none() {
            warn!(
                "{:<20} - SUPABASE_URL or SUPABASE_ANON_KEY not set",
                "app_state"
            );
        }

        let email_client = match config.email_config.api_key() {
            Some(api_key) => Some(EmailClient::new(
                &config.email_config.url,
                config.email_config.sender.clone(),
                api_key.clone(),
                config.email_config.timeout(),
            )?),
            None => {
                warn!("{:<20} - RESEND_API not set", "app_state");
                None
            }
        };

        let templ_mgr = TemplateManager::init()?;

        Ok(AppState::new(InternalState {
            captcha_client,
            database_mgr,
            email_client,
            templ_mgr,
            operator_addr: config.email_config.operator_addr.clone(),
            project_id: config.store_config.project_id,
            expose_error_details: !config.is_production(),
        }))
    }
}
