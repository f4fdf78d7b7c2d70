//! Display preference persisted in `localStorage`.

use wasm_bindgen::prelude::*;
use web_sys::{Storage, Window};
use webln_lib::preferences::{DisplayMode, DisplayPreference, PreferenceStore};
use webln_lib::WeblnError;

use crate::utils;

/// Get browser's localStorage
fn get_local_storage() -> webln_lib::Result<Storage> {
    let window: Window =
        web_sys::window().ok_or_else(|| WeblnError::Storage("No window object".into()))?;
    window
        .local_storage()
        .map_err(|_| WeblnError::Storage("Could not access localStorage".into()))?
        .ok_or_else(|| WeblnError::Storage("localStorage is not available".into()))
}

/// Whether the system asks for a dark color scheme, if it says at all.
pub fn system_prefers_dark() -> Option<bool> {
    web_sys::window()?
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|query| query.matches())
}

/// [`PreferenceStore`] over `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStoragePreferenceStore;

impl PreferenceStore for LocalStoragePreferenceStore {
    fn get(&self, key: &str) -> webln_lib::Result<Option<String>> {
        get_local_storage()?
            .get_item(key)
            .map_err(|_| WeblnError::Storage("Failed to read from storage".into()))
    }

    fn set(&self, key: &str, value: &str) -> webln_lib::Result<()> {
        get_local_storage()?
            .set_item(key, value)
            .map_err(|_| WeblnError::Storage("Failed to write to storage".into()))
    }
}

/// Light/dark toggle exposed to the page.
#[wasm_bindgen]
pub struct ThemePreference {
    store: LocalStoragePreferenceStore,
}

impl Default for ThemePreference {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ThemePreference {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ThemePreference {
        ThemePreference {
            store: LocalStoragePreferenceStore,
        }
    }

    fn resolve(&self) -> DisplayPreference<'_> {
        DisplayPreference::load(&self.store, system_prefers_dark())
    }

    /// Whether dark mode is active.
    #[wasm_bindgen(js_name = isDark)]
    pub fn is_dark(&self) -> bool {
        self.resolve().mode().is_dark()
    }

    /// Flip the mode, persist it and apply it to the document.
    pub fn toggle(&self) -> Result<bool, JsValue> {
        let mode = self.resolve().toggle().map_err(|e| utils::to_js_error(&e))?;
        apply(mode);
        Ok(mode.is_dark())
    }

    /// Set dark or light explicitly.
    #[wasm_bindgen(js_name = setDark)]
    pub fn set_dark(&self, dark: bool) -> Result<(), JsValue> {
        let mode = if dark {
            DisplayMode::Dark
        } else {
            DisplayMode::Light
        };
        self.resolve()
            .set(mode)
            .map_err(|e| utils::to_js_error(&e))?;
        apply(mode);
        Ok(())
    }

    /// Apply the resolved mode to the document without changing it.
    pub fn apply(&self) {
        apply(self.resolve().mode());
    }
}

// Exposed to stylesheets as `<html data-theme="dark|light">`.
fn apply(mode: DisplayMode) {
    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element());
    if let Some(root) = root {
        if root.set_attribute("data-theme", &mode.to_string()).is_err() {
            utils::warn("could not apply display mode");
        }
    }
}
