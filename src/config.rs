//! Configuration for an instance check.
//!
//! The host transport hands over a loose key/value map; it is converted
//! once into [`CheckConfig`] and nothing downstream looks at raw keys.
//! Keys follow the transport's camelCase names:
//!
//! | key              | default                      |
//! |------------------|------------------------------|
//! | `packageId`      | `""` (default lock identity) |
//! | `appName`        | `""` (default lock identity) |
//! | `mutexSuffix`    | none                         |
//! | `scope`          | `"global"`                   |
//! | `type`           | `"en"` (`ko`, `en`, other = custom) |
//! | `customTitle`    | none                         |
//! | `messageTemplate`| none                         |
//! | `showMessageBox` | `true`                       |
//! | `lockFilePath`   | none (derived from the name) |
//! | `windowTitle`    | none (first titled window)   |
//!
//! # Example
//!
//! ```rust
//! use alone::config::CheckConfig;
//!
//! let config = CheckConfig::from_value(serde_json::json!({
//!     "packageId": "com.example.app",
//!     "appName": "MyApp",
//! }))
//! .unwrap();
//! assert_eq!(config.identity().name(), "Global\\com.example.app_MyApp");
//! ```

use crate::error::{AloneError, Result};
use crate::name::{generate_scoped, LockIdentity, LockScope};
use anyhow::anyhow;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the busy notification should say. Consumed only by the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MessageConfig {
    Ko,
    En,
    Custom {
        title: Option<String>,
        template: Option<String>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckConfig {
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub app_name: String,
    #[serde(default, rename = "mutexSuffix")]
    pub suffix: Option<String>,
    #[serde(default)]
    pub scope: LockScope,
    /// Raw message type tag; see [`CheckConfig::message`]
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub custom_title: Option<String>,
    #[serde(default)]
    pub message_template: Option<String>,
    #[serde(default = "default_show_message_box")]
    pub show_message_box: bool,
    /// Explicit lock file where the lock is file based
    #[serde(default)]
    pub lock_file_path: Option<PathBuf>,
    /// Title of the main window to prefer when activating a running instance
    #[serde(default)]
    pub window_title: Option<String>,
}

fn default_show_message_box() -> bool {
    true
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            package_id: String::new(),
            app_name: String::new(),
            suffix: None,
            scope: LockScope::default(),
            message_type: None,
            custom_title: None,
            message_template: None,
            show_message_box: true,
            lock_file_path: None,
            window_title: None,
        }
    }
}

impl CheckConfig {
    pub fn new(package_id: &str, app_name: &str) -> Self {
        CheckConfig {
            package_id: package_id.to_string(),
            app_name: app_name.to_string(),
            ..CheckConfig::default()
        }
    }

    /// Convert a transport argument map
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn identity(&self) -> LockIdentity {
        let identity = generate_scoped(
            self.scope,
            &self.package_id,
            &self.app_name,
            self.suffix.as_deref(),
        );
        match self.lock_file_path {
            Some(ref path) => identity.with_lock_file(path),
            None => identity,
        }
    }

    /// `ko` and `en` select built-in texts, any other tag is custom
    pub fn message(&self) -> MessageConfig {
        match self.message_type.as_deref() {
            Some("ko") => MessageConfig::Ko,
            Some("en") | None => MessageConfig::En,
            Some(_) => MessageConfig::Custom {
                title: self.custom_title.clone(),
                template: self.message_template.clone(),
            },
        }
    }
}

/// Get the default location of the config file
/// Returns %APPDATA%/Alone/config.json on Windows
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "Alone")
        .ok_or_else(|| anyhow!("Failed to determine user data directory"))?;

    Ok(project_dirs.data_dir().join("config.json"))
}

/// Load a check configuration from a JSON file
pub fn load_config_file(path: &Path) -> Result<CheckConfig> {
    let contents = fs::read_to_string(path).map_err(|e| AloneError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&contents).map_err(|e| AloneError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
