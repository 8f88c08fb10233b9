//! Push subscription lifecycle.
//!
//! Subscriptions live in the browser's `PushManager`; this manager creates and
//! destroys them and mirrors the outcome to the remote registry through
//! [`RemoteSyncClient`]. Queries always go back to the push manager because
//! other code (or the browser itself) may change the subscription out-of-band.

use async_lock::Mutex;

use crate::push::backend::{PushSubscription, WorkerRegistration};
use crate::push::config::PushConfig;
use crate::push::error::PushResult;
use crate::push::permission::PermissionNegotiator;
use crate::push::support::Capabilities;
use crate::push::sw_manager::WorkerBinding;
use crate::push::sync::RemoteSyncClient;
use crate::push::types::SubscribeOptions;

#[derive(Default)]
struct SyncState {
    /// Endpoint the registry acknowledged during this session.
    registered_endpoint: Option<String>,
}

pub struct SubscriptionManager {
    capabilities: Capabilities,
    permissions: PermissionNegotiator,
    binding: WorkerBinding,
    sync: RemoteSyncClient,
    options: SubscribeOptions,
    // Serialises subscribe/unsubscribe so overlapping UI calls cannot interleave.
    state: Mutex<SyncState>,
}

impl SubscriptionManager {
    pub fn new(
        capabilities: Capabilities,
        permissions: PermissionNegotiator,
        binding: WorkerBinding,
        sync: RemoteSyncClient,
        config: &PushConfig,
    ) -> Self {
        Self {
            capabilities,
            permissions,
            binding,
            sync,
            options: SubscribeOptions {
                user_visible_only: true,
                application_server_key: config.application_server_key().to_vec(),
            },
            state: Mutex::new(SyncState::default()),
        }
    }

    /// Subscribes the browser to push messages.
    ///
    /// Prompts for permission when it has not been granted yet. Returns `None`
    /// when push is unsupported, the worker is not ready, the user did not
    /// grant permission, or the push manager failed. An existing subscription
    /// is returned as is.
    ///
    /// The registry is asked to store any subscription it has not acknowledged
    /// during this session; a failed registration is retried by the next call.
    pub async fn subscribe(&self) -> Option<PushSubscription> {
        if !self.capabilities.is_supported() {
            log::warn!("push notifications are not supported in this browser");
            return None;
        }

        let registration = match self.binding.registration() {
            Ok(registration) => registration,
            Err(err) => {
                log::warn!("cannot subscribe to push notifications: {err}");
                return None;
            }
        };

        if !self.permissions.get_permission().is_granted()
            && !self.permissions.request_permission().await.is_granted()
        {
            log::info!("push subscription skipped: notification permission not granted");
            return None;
        }

        let mut state = self.state.lock().await;

        let subscription = match self.get_or_subscribe(registration.as_ref()).await {
            Ok(subscription) => subscription,
            Err(err) => {
                log::warn!("failed to subscribe to push notifications: {err}");
                return None;
            }
        };

        if state.registered_endpoint.as_deref() != Some(subscription.endpoint())
            && self.sync.register(subscription.to_json()).await
        {
            state.registered_endpoint = Some(subscription.endpoint().to_string());
        }

        Some(subscription)
    }

    async fn get_or_subscribe(
        &self,
        registration: &dyn WorkerRegistration,
    ) -> PushResult<PushSubscription> {
        let handle = match registration.get_subscription().await? {
            Some(existing) => existing,
            None => registration.subscribe(&self.options).await?,
        };
        PushSubscription::from_handle(handle)
    }

    /// Removes the current subscription.
    ///
    /// Having no subscription counts as success. Platform failures are logged
    /// and reported as `false`. The registry delete is best effort; the
    /// platform's answer is the return value.
    pub async fn unsubscribe(&self) -> bool {
        if !self.capabilities.is_supported() {
            return false;
        }

        let registration = match self.binding.registration() {
            Ok(registration) => registration,
            Err(err) => {
                log::warn!("cannot unsubscribe from push notifications: {err}");
                return false;
            }
        };

        let mut state = self.state.lock().await;

        let subscription = match registration.get_subscription().await {
            Ok(Some(handle)) => match PushSubscription::from_handle(handle) {
                Ok(subscription) => subscription,
                Err(err) => {
                    log::warn!("failed to read the push subscription: {err}");
                    return false;
                }
            },
            Ok(None) => {
                state.registered_endpoint = None;
                return true;
            }
            Err(err) => {
                log::warn!("failed to look up the push subscription: {err}");
                return false;
            }
        };

        match subscription.handle().unsubscribe().await {
            Ok(true) => {
                state.registered_endpoint = None;
                self.sync.unregister(subscription.endpoint()).await;
                true
            }
            Ok(false) => false,
            Err(err) => {
                log::warn!("failed to unsubscribe from push notifications: {err}");
                false
            }
        }
    }

    /// Current subscription as reported by the push manager.
    pub async fn current_subscription(&self) -> Option<PushSubscription> {
        if !self.capabilities.is_supported() {
            return None;
        }
        let registration = self.binding.registration().ok()?;
        match registration.get_subscription().await {
            Ok(Some(handle)) => match PushSubscription::from_handle(handle) {
                Ok(subscription) => Some(subscription),
                Err(err) => {
                    log::debug!("failed to read push subscription: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::debug!("getSubscription failed: {err}");
                None
            }
        }
    }

    pub async fn is_subscribed(&self) -> bool {
        self.current_subscription().await.is_some()
    }
}
