#![cfg(target_arch = "wasm32")]
//! WebLN demo - WebAssembly bindings
//!
//! Adapts the browser's injected `window.webln` wallet to the controller in
//! `webln-lib` and exposes it to page JavaScript as `WeblnController`.

use wasm_bindgen::prelude::*;

mod controller;
mod provider;
mod scheduler;
mod storage;
mod utils;

pub use controller::WeblnController;
pub use provider::{BrowserDiscovery, BrowserWalletProvider};
pub use scheduler::BrowserScheduler;
pub use storage::{system_prefers_dark, LocalStoragePreferenceStore, ThemePreference};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    utils::log("WebLN WASM module initialized");
}

/// Get the version of the WebLN WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Render a payment request as an SVG QR code.
#[wasm_bindgen(js_name = paymentRequestQrSvg)]
pub fn payment_request_qr_svg(payment_request: &str, size: u32) -> Result<String, JsValue> {
    webln_lib::render::render_payment_request_svg(payment_request, size)
        .map_err(|e| utils::to_js_error(&e))
}
