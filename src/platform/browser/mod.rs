//! `web-sys` implementations of the push platform traits.

use wasm_bindgen::{JsCast, JsValue};

pub mod push;

/// Renders a rejected promise or thrown value for error messages.
pub fn format_js_error(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{err:?}")
}
