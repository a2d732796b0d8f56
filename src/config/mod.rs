//! Tries to create an `AppConfig` from the config files in `./config` and the process environment.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod data;
mod error;

use std::sync::OnceLock;
use tracing::info;

// Re-export config structs
pub use data::{AppConfig, CaptchaConfig, EmailConfig, Environment, NetConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult};

/// Reads `APP_ENVIRONMENT`, falling back to `local` when it isn't set.
pub fn environment_from_env() -> ConfigResult<Environment> {
    std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
}

/// Builds the configuration from `{current_dir}/config` for the environment named in `APP_ENVIRONMENT`.
pub fn init_config() -> ConfigResult<AppConfig> {
    let base_path = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
    let config_dir = base_path.join("config");
    let environment = environment_from_env()?;

    AppConfig::load(&config_dir, environment)
}

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong, missing secrets are not an error at this point.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<20} - Initializing the configuration",
            "get_or_init_config"
        );
        init_config().unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}
