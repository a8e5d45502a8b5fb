//! Generation settings persisted as a single JSON blob on disk.
//!
//! Every field is optional in the stored file; anything missing falls back
//! to its documented default, and a malformed file is logged and replaced
//! by the defaults rather than surfaced to the caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

pub mod dialog;

/// Seed value meaning "unset, let the backend pick a random seed".
pub const SEED_UNSET: i64 = -1;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_seed")]
    pub seed: i64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_model_path", rename = "modelPath")]
    pub model_path: String,
    #[serde(default = "default_max_tokens", rename = "maxTokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p", rename = "topP")]
    pub top_p: f64,
    #[serde(default = "default_top_k", rename = "topK")]
    pub top_k: u32,
}

fn default_role() -> String {
    "user".to_string()
}

fn default_seed() -> i64 {
    SEED_UNSET
}

fn default_temperature() -> f64 {
    0.7
}

fn default_model_path() -> String {
    "./qwen2.5b.gguf".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_top_p() -> f64 {
    1.0
}

fn default_top_k() -> u32 {
    50
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            role: default_role(),
            seed: default_seed(),
            temperature: default_temperature(),
            model_path: default_model_path(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
            top_k: default_top_k(),
        }
    }
}

/// Single-key settings storage. Last write wins; there is exactly one
/// reader/writer per running client.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform config directory.
    pub fn default_location() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("no config directory for this platform")?
            .join("textgen-chat");
        Ok(Self::new(dir.join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored settings. A missing or malformed file yields the
    /// defaults; corruption is logged, never propagated.
    pub fn load(&self) -> Settings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Settings::default(),
            Err(e) => {
                error!("failed to read {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                error!("malformed settings in {}: {}", self.path.display(), e);
                Settings::default()
            }
        }
    }

    /// Serializes and overwrites the stored settings.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        info!("settings saved to {}", self.path.display());
        Ok(())
    }
}

/// Loads a JSON config file, writing (and returning) the given default when
/// the file does not exist yet.
pub fn load_json_data<T>(default: T, path: impl AsRef<Path>) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            serde_json::from_str(&raw).with_context(|| format!("malformed {}", path.display()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_string_pretty(&default)?)?;
            Ok(default)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}
