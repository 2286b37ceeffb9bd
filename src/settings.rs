use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";

fn default_user_id() -> String {
    "local".into()
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Owner of the stored classes and documents. A single-teacher install
    /// never needs to change this.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Video search endpoint. Unset leaves search disabled.
    #[serde(default)]
    pub search_endpoint: Option<String>,
    /// Bearer token sent with search requests, when the endpoint wants one.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Where the JSON collections live. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Last known window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            search_endpoint: None,
            auth_token: None,
            data_dir: None,
            debug_logging: false,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            window_size: None,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Directory for the JSON collections.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return PathBuf::from(dir);
        }
        dirs_next::data_dir()
            .map(|dir| dir.join("eduscreen"))
            .unwrap_or_else(|| PathBuf::from("eduscreen-data"))
    }
}
