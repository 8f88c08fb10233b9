use std::sync::Arc;

use async_trait::async_trait;
use js_sys::{Array, Object, Reflect, Uint8Array, JSON};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Notification, NotificationOptions, NotificationPermission, PushSubscriptionOptionsInit,
    ServiceWorkerRegistration,
};

use super::format_js_error;
use crate::push::backend::{
    NotificationBackend, PushEnvironment, SubscriptionHandle, WorkerContainer, WorkerRegistration,
};
use crate::push::error::{
    capability_unsupported, internal_error, subscribe_failed, unsubscribe_failed,
    worker_not_ready, PushResult,
};
use crate::push::permission::PermissionState;
use crate::push::support::Capabilities;
use crate::push::types::{DisplayNotification, SubscribeOptions, SubscriptionJson};

/// Environment backed by the current window.
pub fn browser_environment() -> PushEnvironment {
    PushEnvironment::new(
        Capabilities::detect(),
        Arc::new(BrowserNotifications),
        Arc::new(BrowserWorkerContainer),
    )
}

/// The global `Notification` constructor.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserNotifications;

#[async_trait(?Send)]
impl NotificationBackend for BrowserNotifications {
    fn permission(&self) -> PermissionState {
        match Notification::permission() {
            NotificationPermission::Granted => PermissionState::Granted,
            NotificationPermission::Denied => PermissionState::Denied,
            _ => PermissionState::Default,
        }
    }

    async fn request_permission(&self) -> PushResult<PermissionState> {
        let promise = Notification::request_permission().map_err(|err| {
            internal_error(format!("requestPermission failed: {}", format_js_error(&err)))
        })?;
        let result = JsFuture::from(promise).await.map_err(|err| {
            internal_error(format!("requestPermission failed: {}", format_js_error(&err)))
        })?;
        Ok(result
            .as_string()
            .map(|value| PermissionState::from_str_lossy(&value))
            .unwrap_or_else(|| self.permission()))
    }

    fn show_direct(&self, notification: &DisplayNotification) -> PushResult<()> {
        // Actions are only accepted on worker-backed notifications.
        let options = notification_options(notification, false)?;
        Notification::new_with_options(&notification.title, &options)
            .map(|_| ())
            .map_err(|err| {
                internal_error(format!("Notification constructor failed: {}", format_js_error(&err)))
            })
    }
}

/// `navigator.serviceWorker`, looked up on each call.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserWorkerContainer;

#[async_trait(?Send)]
impl WorkerContainer for BrowserWorkerContainer {
    async fn ready(&self) -> PushResult<Arc<dyn WorkerRegistration>> {
        let window = web_sys::window()
            .ok_or_else(|| worker_not_ready("Service workers require a Window context"))?;
        let promise = window.navigator().service_worker().ready().map_err(|err| {
            worker_not_ready(format!("serviceWorker.ready failed: {}", format_js_error(&err)))
        })?;
        let value = JsFuture::from(promise).await.map_err(|err| {
            worker_not_ready(format!("serviceWorker.ready failed: {}", format_js_error(&err)))
        })?;
        let registration: ServiceWorkerRegistration = value
            .dyn_into()
            .map_err(|_| worker_not_ready("serviceWorker.ready resolved with an unexpected value"))?;
        Ok(Arc::new(BrowserWorkerRegistration { inner: registration }))
    }
}

pub struct BrowserWorkerRegistration {
    inner: ServiceWorkerRegistration,
}

// wasm32 runs single-threaded; the JS handle never leaves the thread that created it.
unsafe impl Send for BrowserWorkerRegistration {}
unsafe impl Sync for BrowserWorkerRegistration {}

impl BrowserWorkerRegistration {
    pub fn as_web_sys(&self) -> &ServiceWorkerRegistration {
        &self.inner
    }

    fn push_manager(&self) -> PushResult<web_sys::PushManager> {
        self.inner.push_manager().map_err(|err| {
            capability_unsupported(format!("pushManager unavailable: {}", format_js_error(&err)))
        })
    }
}

#[async_trait(?Send)]
impl WorkerRegistration for BrowserWorkerRegistration {
    fn scope(&self) -> String {
        self.inner.scope()
    }

    async fn get_subscription(&self) -> PushResult<Option<Arc<dyn SubscriptionHandle>>> {
        let promise = self.push_manager()?.get_subscription().map_err(|err| {
            internal_error(format!("getSubscription failed: {}", format_js_error(&err)))
        })?;
        let value = JsFuture::from(promise).await.map_err(|err| {
            internal_error(format!("getSubscription failed: {}", format_js_error(&err)))
        })?;
        if value.is_undefined() || value.is_null() {
            return Ok(None);
        }
        let subscription: web_sys::PushSubscription = value
            .dyn_into()
            .map_err(|_| internal_error("getSubscription returned an unexpected value"))?;
        Ok(Some(Arc::new(BrowserSubscription { inner: subscription })))
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> PushResult<Arc<dyn SubscriptionHandle>> {
        let init = Object::new();
        set_property(&init, "userVisibleOnly", &JsValue::from_bool(options.user_visible_only))?;
        let key = Uint8Array::from(options.application_server_key.as_slice());
        set_property(&init, "applicationServerKey", &key)?;
        let init: PushSubscriptionOptionsInit = init.unchecked_into();

        let promise = self
            .push_manager()?
            .subscribe_with_options(&init)
            .map_err(|err| subscribe_failed(format!("subscribe failed: {}", format_js_error(&err))))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|err| subscribe_failed(format!("subscribe failed: {}", format_js_error(&err))))?;
        let subscription: web_sys::PushSubscription = value
            .dyn_into()
            .map_err(|_| subscribe_failed("PushManager.subscribe returned an unexpected value"))?;
        Ok(Arc::new(BrowserSubscription { inner: subscription }))
    }

    async fn show_notification(&self, notification: &DisplayNotification) -> PushResult<()> {
        let options = notification_options(notification, true)?;
        let promise = self
            .inner
            .show_notification_with_options(&notification.title, &options)
            .map_err(|err| {
                internal_error(format!("showNotification failed: {}", format_js_error(&err)))
            })?;
        JsFuture::from(promise).await.map(|_| ()).map_err(|err| {
            internal_error(format!("showNotification failed: {}", format_js_error(&err)))
        })
    }
}

pub struct BrowserSubscription {
    inner: web_sys::PushSubscription,
}

unsafe impl Send for BrowserSubscription {}
unsafe impl Sync for BrowserSubscription {}

impl BrowserSubscription {
    pub fn as_web_sys(&self) -> &web_sys::PushSubscription {
        &self.inner
    }
}

#[async_trait(?Send)]
impl SubscriptionHandle for BrowserSubscription {
    fn to_json(&self) -> PushResult<SubscriptionJson> {
        // JSON.stringify goes through PushSubscription.toJSON(), which encodes the keys.
        let text = JSON::stringify(&self.inner)
            .map_err(|err| internal_error(format!("toJSON failed: {}", format_js_error(&err))))?
            .as_string()
            .ok_or_else(|| internal_error("toJSON produced a non-string value"))?;
        serde_json::from_str(&text)
            .map_err(|err| internal_error(format!("Unexpected push subscription JSON: {err}")))
    }

    async fn unsubscribe(&self) -> PushResult<bool> {
        let promise = self.inner.unsubscribe().map_err(|err| {
            unsubscribe_failed(format!("unsubscribe failed: {}", format_js_error(&err)))
        })?;
        let result = JsFuture::from(promise).await.map_err(|err| {
            unsubscribe_failed(format!("unsubscribe failed: {}", format_js_error(&err)))
        })?;
        Ok(result.as_bool().unwrap_or(true))
    }
}

fn notification_options(
    notification: &DisplayNotification,
    include_actions: bool,
) -> PushResult<NotificationOptions> {
    let options = Object::new();
    set_property(&options, "body", &JsValue::from_str(&notification.body))?;
    set_property(&options, "icon", &JsValue::from_str(&notification.icon))?;
    set_property(&options, "badge", &JsValue::from_str(&notification.badge))?;
    if let Some(image) = &notification.image {
        set_property(&options, "image", &JsValue::from_str(image))?;
    }
    if let Some(tag) = &notification.tag {
        set_property(&options, "tag", &JsValue::from_str(tag))?;
    }
    set_property(
        &options,
        "requireInteraction",
        &JsValue::from_bool(notification.require_interaction),
    )?;
    set_property(&options, "silent", &JsValue::from_bool(notification.silent))?;

    let vibrate: Array = notification
        .vibrate
        .iter()
        .map(|millis| JsValue::from_f64(f64::from(*millis)))
        .collect();
    set_property(&options, "vibrate", &vibrate)?;

    let data = serde_json::to_string(&notification.data)
        .map_err(|err| internal_error(format!("Failed to encode notification data: {err}")))?;
    let data = JSON::parse(&data)
        .map_err(|err| internal_error(format!("Failed to encode notification data: {}", format_js_error(&err))))?;
    set_property(&options, "data", &data)?;

    if include_actions && !notification.actions.is_empty() {
        let actions = Array::new();
        for action in &notification.actions {
            let entry = Object::new();
            set_property(&entry, "action", &JsValue::from_str(&action.action))?;
            set_property(&entry, "title", &JsValue::from_str(&action.title))?;
            if let Some(icon) = &action.icon {
                set_property(&entry, "icon", &JsValue::from_str(icon))?;
            }
            actions.push(&entry);
        }
        set_property(&options, "actions", &actions)?;
    }

    Ok(options.unchecked_into())
}

fn set_property(target: &Object, key: &str, value: &JsValue) -> PushResult<()> {
    Reflect::set(target, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|err| internal_error(format!("Failed to set '{key}': {}", format_js_error(&err))))
}
