//! Client configuration
//!
//! Settings are layered: built-in defaults first, then environment variables
//! prefixed with `SNAPFEED_` (for example `SNAPFEED_API_BASE_URL`).

use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Prefix of the environment variables read by [`ClientConfig::from_env`]
pub const ENV_PREFIX: &str = "SNAPFEED";

/// Client configuration struct
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_base_url: String,
    /// Directory holding the persisted slots
    pub storage_dir: PathBuf,
    /// Slot holding the credential string
    pub credential_key: String,
    /// Slot holding the serialized user summary
    pub user_key: String,
    /// Where unauthenticated users are sent
    pub login_path: String,
    /// Where authenticated users are sent from public-only routes
    pub home_path: String,
    /// Timeout applied to every API request
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Create a new ClientConfig from defaults and environment variables
    ///
    /// # Environment Variables
    /// - `SNAPFEED_API_BASE_URL` (default: "http://localhost:5000/api")
    /// - `SNAPFEED_STORAGE_DIR` (default: ".snapfeed")
    /// - `SNAPFEED_CREDENTIAL_KEY` (default: "token")
    /// - `SNAPFEED_USER_KEY` (default: "user")
    /// - `SNAPFEED_LOGIN_PATH` (default: "/login")
    /// - `SNAPFEED_HOME_PATH` (default: "/")
    /// - `SNAPFEED_REQUEST_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> ConfigResult<Self> {
        let settings = Config::builder()
            .set_default("api_base_url", "http://localhost:5000/api")?
            .set_default("storage_dir", ".snapfeed")?
            .set_default("credential_key", "token")?
            .set_default("user_key", "user")?
            .set_default("login_path", "/login")?
            .set_default("home_path", "/")?
            .set_default("request_timeout_secs", 30_i64)?
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let mut config: ClientConfig = settings.try_deserialize()?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "api_base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.credential_key == self.user_key {
            return Err(ConfigError::Invalid {
                key: "user_key".to_string(),
                message: "must differ from credential_key".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
