//! Display mode preference stored in the demo's storage directory.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use webln_lib::preferences::{DisplayMode, DisplayPreference, PreferenceStore};
use webln_lib::WeblnError;

use crate::cli::ThemeAction;
use crate::ui;

/// Environment variable standing in for the system dark-mode signal.
pub const SYSTEM_DARK_ENV: &str = "WEBLN_DEMO_DARK";

/// [`PreferenceStore`] backed by a JSON object in `preferences.json`.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(storage_dir: &Path) -> Self {
        Self {
            path: storage_dir.join("preferences.json"),
        }
    }

    fn load(&self) -> webln_lib::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| WeblnError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> webln_lib::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> webln_lib::Result<()> {
        // A corrupt file is replaced rather than blocking the write.
        let mut values = self.load().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| WeblnError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, json).map_err(|e| WeblnError::Storage(e.to_string()))
    }
}

/// Read the system signal from `WEBLN_DEMO_DARK`.
pub fn system_prefers_dark() -> Option<bool> {
    parse_system_flag(&std::env::var(SYSTEM_DARK_ENV).ok()?)
}

/// `1`/`true`/`yes`/`on` mean dark, `0`/`false`/`no`/`off` mean light.
pub fn parse_system_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn run(storage_dir: &Path, action: Option<ThemeAction>) -> Result<DisplayMode> {
    let store = FilePreferenceStore::new(storage_dir);
    let preference = DisplayPreference::load(&store, system_prefers_dark());

    let mode = match action.unwrap_or(ThemeAction::Show) {
        ThemeAction::Show => preference.mode(),
        ThemeAction::Toggle => preference.toggle()?,
        ThemeAction::Dark => {
            preference.set(DisplayMode::Dark)?;
            DisplayMode::Dark
        }
        ThemeAction::Light => {
            preference.set(DisplayMode::Light)?;
            DisplayMode::Light
        }
    };

    ui::key_value("Display mode", &mode.to_string());
    Ok(mode)
}
