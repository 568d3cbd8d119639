//! Client configuration, read from `crm.toml`.
//!
//! ```toml
//! [owner]
//! name = "Priya Sharma"
//! avatar = "https://picsum.photos/seed/user/40/40"
//!
//! [backend]
//! type = "rest"
//! url = "https://project.supabase.co"
//! anon_key = "..."
//! ```
//!
//! A `file` backend (`type = "file"`, `path = "."`) keeps the tables as JSON
//! files instead. `CRM_SUPABASE_URL` and `CRM_SUPABASE_ANON_KEY` override the
//! file and switch to the REST backend.

use crate::{
    domain::Owner,
    error::{CrmError, Result},
    remote::{RemoteStore, RestStore},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub const CONFIG_FILE: &str = "crm.toml";
pub const URL_VAR: &str = "CRM_SUPABASE_URL";
pub const KEY_VAR: &str = "CRM_SUPABASE_ANON_KEY";

/// Where records are stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Rest {
        url: String,
        #[serde(default)]
        anon_key: Option<String>,
    },
    File {
        #[serde(default = "default_path")]
        path: PathBuf,
    },
}

fn default_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::File {
            path: default_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmConfig {
    /// Owner stamped on newly created leads and deals
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl CrmConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads the file if it exists (defaults otherwise) and applies the
    /// environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            debug!("Reading configuration from {}", path.display());
            Self::from_toml_str(&std::fs::read_to_string(path)?)?
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies overrides from a variable lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let url = lookup(URL_VAR).filter(|v| !v.is_empty());
        let key = lookup(KEY_VAR).filter(|v| !v.is_empty());

        if let Some(new_url) = url {
            if let BackendConfig::Rest { url, .. } = &mut self.backend {
                *url = new_url;
            } else {
                self.backend = BackendConfig::Rest {
                    url: new_url,
                    anon_key: None,
                };
            }
        }
        if let (Some(key), BackendConfig::Rest { anon_key, .. }) = (key, &mut self.backend) {
            *anon_key = Some(key);
        }
    }

    /// Builds the configured remote store
    pub async fn connect(&self) -> Result<Arc<dyn RemoteStore>> {
        match &self.backend {
            BackendConfig::Rest { url, anon_key } => {
                let key = anon_key.as_deref().ok_or_else(|| {
                    CrmError::ConfigError(format!("no anon key configured (set {})", KEY_VAR))
                })?;
                if url.is_empty() {
                    return Err(CrmError::ConfigError("backend url is empty".to_string()));
                }
                Ok(Arc::new(RestStore::new(url.as_str(), key)))
            }
            #[cfg(feature = "file-storage")]
            BackendConfig::File { path } => {
                let store = crate::remote::FileStore::new(path);
                if !store.is_initialized().await {
                    store.initialize().await?;
                }
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "file-storage"))]
            BackendConfig::File { .. } => Err(CrmError::ConfigError(
                "file backend requires the file-storage feature".to_string(),
            )),
        }
    }
}
