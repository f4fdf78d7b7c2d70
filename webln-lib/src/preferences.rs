//! Persisted display-mode preference.
//!
//! One boolean stored under a fixed key. At startup the mode is resolved in
//! this order: stored value, else the system's dark-mode signal, else light.
//! Changes are written through immediately. The preference is passed around
//! explicitly; nothing here is global.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;

/// Storage key for the dark-mode flag.
pub const DARK_MODE_KEY: &str = "webln-demo.dark-mode";

/// Light or dark presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Light,
    Dark,
}

impl DisplayMode {
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn from_dark(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// String key-value store for preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The resolved display mode, bound to the store it persists to.
pub struct DisplayPreference<'a> {
    store: &'a dyn PreferenceStore,
    mode: Cell<DisplayMode>,
}

impl<'a> DisplayPreference<'a> {
    /// Resolve the startup mode.
    ///
    /// A store read failure or an unparseable stored value falls through to
    /// the system signal rather than failing startup.
    pub fn load(store: &'a dyn PreferenceStore, system_prefers_dark: Option<bool>) -> Self {
        let stored = match store.get(DARK_MODE_KEY) {
            Ok(value) => value.and_then(|raw| parse_flag(&raw)),
            Err(err) => {
                tracing::warn!(error = %err, "could not read display preference");
                None
            }
        };
        let mode = stored
            .or(system_prefers_dark)
            .map(DisplayMode::from_dark)
            .unwrap_or_default();
        Self {
            store,
            mode: Cell::new(mode),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode.get()
    }

    /// Set and persist the mode.
    pub fn set(&self, mode: DisplayMode) -> Result<()> {
        self.store
            .set(DARK_MODE_KEY, if mode.is_dark() { "true" } else { "false" })?;
        self.mode.set(mode);
        Ok(())
    }

    /// Flip and persist the mode, returning the new one.
    pub fn toggle(&self) -> Result<DisplayMode> {
        let next = self.mode().toggled();
        self.set(next)?;
        Ok(next)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_value_wins() {
        let store = MemoryPreferenceStore::new();
        store.set(DARK_MODE_KEY, "false").unwrap();
        let pref = DisplayPreference::load(&store, Some(true));
        assert_eq!(pref.mode(), DisplayMode::Light);
    }

    #[test]
    fn test_system_signal_fallback() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(
            DisplayPreference::load(&store, Some(true)).mode(),
            DisplayMode::Dark
        );
        assert_eq!(
            DisplayPreference::load(&store, None).mode(),
            DisplayMode::Light
        );
    }

    #[test]
    fn test_garbage_is_ignored() {
        let store = MemoryPreferenceStore::new();
        store.set(DARK_MODE_KEY, "maybe").unwrap();
        assert_eq!(
            DisplayPreference::load(&store, Some(true)).mode(),
            DisplayMode::Dark
        );
    }

    #[test]
    fn test_toggle_writes_through() {
        let store = MemoryPreferenceStore::new();
        let pref = DisplayPreference::load(&store, None);
        assert_eq!(pref.toggle().unwrap(), DisplayMode::Dark);
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));

        let reloaded = DisplayPreference::load(&store, Some(false));
        assert_eq!(reloaded.mode(), DisplayMode::Dark);
    }
}
