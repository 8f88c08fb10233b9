//! Seams over the browser APIs the push subsystem drives.
//!
//! The wasm build implements these traits with `web-sys` in
//! `platform::browser::push`; tests and embedders provide their own.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::push::error::PushResult;
use crate::push::permission::PermissionState;
use crate::push::support::Capabilities;
use crate::push::types::{DisplayNotification, SubscribeOptions, SubscriptionJson};

/// The `Notification` global: permission state and direct (page-bound) notifications.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait NotificationBackend: Send + Sync {
    /// Live permission as currently reported by the browser.
    fn permission(&self) -> PermissionState;

    /// Shows the native permission prompt and resolves with the user's answer.
    async fn request_permission(&self) -> PushResult<PermissionState>;

    /// Constructs a notification without going through a worker.
    fn show_direct(&self, notification: &DisplayNotification) -> PushResult<()>;
}

/// `navigator.serviceWorker`.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WorkerContainer: Send + Sync {
    /// Resolves once a worker is active. May never resolve when no worker is installed.
    async fn ready(&self) -> PushResult<Arc<dyn WorkerRegistration>>;
}

/// An active `ServiceWorkerRegistration` together with its `PushManager`.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WorkerRegistration: Send + Sync {
    fn scope(&self) -> String;

    async fn get_subscription(&self) -> PushResult<Option<Arc<dyn SubscriptionHandle>>>;

    async fn subscribe(&self, options: &SubscribeOptions) -> PushResult<Arc<dyn SubscriptionHandle>>;

    async fn show_notification(&self, notification: &DisplayNotification) -> PushResult<()>;
}

/// A browser-owned `PushSubscription`.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SubscriptionHandle: Send + Sync {
    fn to_json(&self) -> PushResult<SubscriptionJson>;

    async fn unsubscribe(&self) -> PushResult<bool>;
}

/// Reference to a push subscription held by the subsystem.
///
/// The subscription itself belongs to the browser; this only keeps the handle
/// and the JSON snapshot taken when it was looked up.
#[derive(Clone)]
pub struct PushSubscription {
    handle: Arc<dyn SubscriptionHandle>,
    json: SubscriptionJson,
}

impl PushSubscription {
    pub fn from_handle(handle: Arc<dyn SubscriptionHandle>) -> PushResult<Self> {
        let json = handle.to_json()?;
        Ok(Self { handle, json })
    }

    pub fn endpoint(&self) -> &str {
        &self.json.endpoint
    }

    pub fn to_json(&self) -> &SubscriptionJson {
        &self.json
    }

    pub fn handle(&self) -> &Arc<dyn SubscriptionHandle> {
        &self.handle
    }

    /// Returns `true` when both values reference the same browser subscription.
    pub fn same_as(&self, other: &PushSubscription) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle) || self.json.endpoint == other.json.endpoint
    }
}

impl fmt::Debug for PushSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushSubscription")
            .field("endpoint", &self.json.endpoint)
            .finish()
    }
}

/// Everything the subsystem needs from the host, detected once at start-up.
#[derive(Clone)]
pub struct PushEnvironment {
    pub capabilities: Capabilities,
    pub notifications: Arc<dyn NotificationBackend>,
    pub workers: Arc<dyn WorkerContainer>,
}

impl PushEnvironment {
    pub fn new(
        capabilities: Capabilities,
        notifications: Arc<dyn NotificationBackend>,
        workers: Arc<dyn WorkerContainer>,
    ) -> Self {
        Self {
            capabilities,
            notifications,
            workers,
        }
    }

    /// Builds the environment from the current browser window.
    #[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
    pub fn browser() -> Self {
        crate::platform::browser::push::browser_environment()
    }
}

impl fmt::Debug for PushEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushEnvironment")
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
