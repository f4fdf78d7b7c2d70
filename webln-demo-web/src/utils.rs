//! Console logging and JS error plumbing.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use webln_lib::WeblnError;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    pub fn warn(s: &str);

    #[wasm_bindgen(js_namespace = console)]
    pub fn error(s: &str);
}

/// Build a JS `Error` with `msg`.
pub fn js_error(msg: &str) -> JsValue {
    js_sys::Error::new(msg).into()
}

/// Convert a controller error into a JS `Error` carrying `kind` and `code`.
pub fn to_js_error(err: &WeblnError) -> JsValue {
    let js_err = js_sys::Error::new(&err.message());
    let kind = err.kind();
    let _ = js_sys::Reflect::set(&js_err, &"kind".into(), &kind.as_str().into());
    let _ = js_sys::Reflect::set(&js_err, &"code".into(), &(kind as i32).into());
    js_err.into()
}

/// Best-effort human-readable message from a thrown JS value.
///
/// Wallets reject with `Error` objects, plain strings or arbitrary objects
/// with a `message` field.
pub fn error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Serialize to a plain JS object (maps become objects, not `Map`s).
pub fn to_js_value<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(&format!("Serialization failed: {}", e)))
}
