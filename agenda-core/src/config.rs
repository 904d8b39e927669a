//! Configuration at ~/.config/agenda/config.toml, overridable from the
//! environment (`AGENDA_STORE_URL`, `AGENDA_RETRY__MAX_ATTEMPTS`, ...).

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};
use crate::remote::RestStore;
use crate::retry::RetryPolicy;

const ENV_PREFIX: &str = "AGENDA";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Root URL of the hosted event store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Bearer token of the signed-in user. Falls back to `api_key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// The signed-in user. Sessions are managed outside agenda.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl AgendaConfig {
    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template on first use.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    pub fn save_to(&self, path: &Path) -> AgendaResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AgendaError::Serialization(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let defaults = RetryPolicy::default();
        let contents = format!(
            "\
# agenda configuration

# Hosted event store:
# store_url = \"https://your-project.example.co\"
# api_key = \"...\"

# Signed-in user:
# user_id = \"...\"
# access_token = \"...\"

# Remote call retries:
# [retry]
# max_attempts = {}
# base_delay_ms = {}
",
            defaults.max_attempts, defaults.base_delay_ms
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))
    }

    pub fn require_user_id(&self) -> AgendaResult<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AgendaError::Config("No user_id configured".into()))
    }

    /// Build the hosted store client from `store_url`, `api_key` and `access_token`.
    pub fn rest_store(&self) -> AgendaResult<RestStore> {
        let url = self
            .store_url
            .as_deref()
            .ok_or_else(|| AgendaError::Config("No store_url configured".into()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgendaError::Config("No api_key configured".into()))?;

        let store = RestStore::new(url, api_key)?;
        Ok(match &self.access_token {
            Some(token) => store.with_access_token(token),
            None => store,
        })
    }
}
