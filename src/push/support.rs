//! Environment capability checks for push notifications.
//!
//! The browser must expose the Notification API, service worker registration
//! and the Push API. Detection happens once and the resulting [`Capabilities`]
//! value is passed to every component instead of re-probing globals.

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
use js_sys::Reflect;
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
use wasm_bindgen::JsValue;

/// Browser features available to the push subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub notifications: bool,
    pub service_worker: bool,
    pub push_manager: bool,
}

impl Capabilities {
    /// Capabilities of a browser exposing every required API.
    pub const fn full() -> Self {
        Self {
            notifications: true,
            service_worker: true,
            push_manager: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            notifications: false,
            service_worker: false,
            push_manager: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.notifications && self.service_worker && self.push_manager
    }

    /// Probes the current window for `Notification`, `navigator.serviceWorker`
    /// and `PushManager`.
    #[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
    pub fn detect() -> Self {
        let window = match web_sys::window() {
            Some(window) => window,
            None => return Self::none(),
        };
        let window_js = JsValue::from(window.clone());
        let navigator_js = JsValue::from(window.navigator());

        let service_worker = Reflect::get(&navigator_js, &JsValue::from_str("serviceWorker"))
            .ok()
            .map(|value| !value.is_undefined() && !value.is_null())
            .unwrap_or(false);

        Self {
            notifications: property_in(&window_js, "Notification"),
            service_worker,
            push_manager: property_in(&window_js, "PushManager"),
        }
    }

    /// Outside a web environment none of the browser APIs exist.
    #[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
    pub fn detect() -> Self {
        Self::none()
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn property_in(target: &JsValue, property: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(property)).unwrap_or(false)
}

/// Returns `true` when the current environment can register for push and
/// show notifications.
///
/// # Examples
///
/// ```
/// if boomcard_push::push::is_supported() {
///     // Safe to build a `PushClient` from the browser environment.
/// }
/// ```
pub fn is_supported() -> bool {
    Capabilities::detect().is_supported()
}
