use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CommandError, Result};

/// Strings reported by the device query commands.
///
/// Every field is optional in the JSON form; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdentity {
    /// Firmware version, reported by `version`.
    pub version: String,
    /// Platform name, reported by `platform`.
    pub platform: String,
    /// Board name, reported by `board`.
    pub board: String,
    /// Device alias, reported by `alias`.
    pub alias: String,
    /// Hardware identifier, reported by `serial`. `None` means the device has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            version: "0.0.0".to_string(),
            platform: "unknown".to_string(),
            board: "none".to_string(),
            alias: "MyPico".to_string(),
            serial: None,
        }
    }
}

impl DeviceIdentity {
    /// Parse an identity from JSON text.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Load an identity from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CommandError::ReadIdentity {
            path: path.to_path_buf(),
            source,
        })?;
        let identity =
            Self::from_json_str(&text).map_err(|source| CommandError::ParseIdentity {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "loaded device identity");
        Ok(identity)
    }

    /// Fill in `serial` from the host when none is configured.
    pub fn with_detected_serial(mut self) -> Self {
        if self.serial.is_none() {
            self.serial = detect_serial();
        }
        self
    }
}

/// Best-effort hardware identifier for the current host.
///
/// On Linux this is the machine id, upper-cased. Other platforms report `None`.
#[cfg(target_os = "linux")]
pub fn detect_serial() -> Option<String> {
    let raw = std::fs::read_to_string("/etc/machine-id").ok()?;
    normalize_serial(&raw)
}

/// Best-effort hardware identifier for the current host.
///
/// Returns `None` on platforms without a stable machine identifier.
#[cfg(not(target_os = "linux"))]
pub fn detect_serial() -> Option<String> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn normalize_serial(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(trimmed.to_ascii_uppercase())
}
