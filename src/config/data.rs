//! The configuration structs used to build the AppConfig, and their impls.
use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    Local,
    #[default]
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    /// Set from `APP_ENVIRONMENT` by the loader, never from the files.
    #[serde(skip)]
    pub environment: Environment,
    pub net_config: NetConfig,
    pub captcha_config: CaptchaConfig,
    pub store_config: StoreConfig,
    pub email_config: EmailConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CaptchaConfig {
    pub verify_url: String,
    #[serde(default, deserialize_with = "opaque::secret")]
    pub secret: Option<SecretString>,
    pub timeout_millis: Option<u64>,
}

/// The hosted datastore, reached through its REST interface.
#[derive(Deserialize, Clone, Debug)]
pub struct StoreConfig {
    #[serde(default, deserialize_with = "opaque::string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "opaque::secret")]
    pub anon_key: Option<SecretString>,
    pub table: String,
    pub project_id: i64,
    pub timeout_millis: Option<u64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailConfig {
    pub url: String,
    pub sender: String,
    pub operator_addr: String,
    #[serde(default, deserialize_with = "opaque::secret")]
    pub api_key: Option<SecretString>,
    pub timeout_millis: Option<u64>,
}

// ###################################
// ->   IMPLs
// ###################################
impl AppConfig {
    /// Layers `base.toml`, the environment file and the process environment on top of each other.
    ///
    /// Later sources win:
    /// 1. `{config_dir}/base.toml`
    /// 2. `{config_dir}/{environment}.toml`
    /// 3. `APP_<SECTION>__<KEY>` variables
    /// 4. the conventional secret variables of the deployment (`RECAPTCHA_SECRET_KEY`, ...)
    pub fn load(config_dir: &Path, environment: Environment) -> ConfigResult<Self> {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let mut config: AppConfig = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(renamed_env("VITE_SUPABASE_URL", "store_config.url"))
            .merge(renamed_env("SUPABASE_URL", "store_config.url"))
            .merge(renamed_env("VITE_SUPABASE_ANON_KEY", "store_config.anon_key"))
            .merge(renamed_env("SUPABASE_ANON_KEY", "store_config.anon_key"))
            .merge(renamed_env("RECAPTCHA_SECRET_KEY", "captcha_config.secret"))
            .merge(renamed_env("RESEND_API", "email_config.api_key"))
            .extract()?;

        config.environment = environment;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

/// Maps a single raw environment variable onto a (dotted) config key.
fn renamed_env(var: &'static str, key: &'static str) -> Env {
    Env::raw().only(&[var]).map(move |_| key.into())
}

impl CaptchaConfig {
    pub fn secret(&self) -> Option<&SecretString> {
        non_empty(self.secret.as_ref())
    }
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_millis.map(std::time::Duration::from_millis)
    }
}

impl StoreConfig {
    /// Both the URL and the anon key are needed to reach the datastore.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        let url = self.url.as_deref().filter(|url| !url.trim().is_empty())?;
        let key = non_empty(self.anon_key.as_ref())?;
        Some((url, key))
    }
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_millis.map(std::time::Duration::from_millis)
    }
}

impl EmailConfig {
    pub fn api_key(&self) -> Option<&SecretString> {
        non_empty(self.api_key.as_ref())
    }
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_millis.map(std::time::Duration::from_millis)
    }
}

/// An empty secret counts as a missing one.
fn non_empty(secret: Option<&SecretString>) -> Option<&SecretString> {
    secret.filter(|s| !s.expose_secret().trim().is_empty())
}

/// Environment variables are typed by their text, so `123456` arrives as a number.
/// Credentials are opaque, whatever they look like they are read back as strings.
mod opaque {
    use std::fmt;

    use secrecy::SecretString;
    use serde::de::{self, Deserializer, Visitor};

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_option(OpaqueVisitor)
    }

    pub fn secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(string(deserializer)?.map(SecretString::from))
    }

    struct OpaqueVisitor;

    impl<'de> Visitor<'de> for OpaqueVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }
        fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail(value)),
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
