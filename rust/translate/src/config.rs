// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Directory name under the platform data directory
pub const APP_DIR_NAME: &str = "IFCTranslateTool";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where `presets.json` and `config.json` live.
    pub data_dir: PathBuf,
    /// How often the interactive side drains worker messages.
    pub poll_interval: Duration,
    /// File extension matched during batch discovery (no leading dot).
    pub extension: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var_os("IFC_TRANSLATE_DATA_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            poll_interval: Duration::from_millis(
                std::env::var("IFC_TRANSLATE_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "100".into())
                    .parse()
                    .unwrap_or(100),
            ),
            extension: std::env::var("IFC_TRANSLATE_EXTENSION")
                .ok()
                .map(|ext| ext.trim().trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .unwrap_or_else(|| "ifc".into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn default_data_dir() -> PathBuf {
    // Platform data dir, or a dot directory in the working directory when
    // the platform has none (e.g. a bare container without HOME)
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".ifc-translate"))
}
