//! Mirrors local subscriptions to the remote subscription registry.
//!
//! Subscription state is only eventually consistent with the server: local
//! state is authoritative for the UI and registry failures never reach callers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::push::error::PushResult;
use crate::push::types::SubscriptionJson;

/// Remote store of push subscriptions.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SubscriptionRegistry: Send + Sync {
    async fn register(&self, subscription: &SubscriptionJson) -> PushResult<()>;

    async fn unregister(&self, endpoint: &str) -> PushResult<()>;
}

/// Fire-and-forget wrapper around a [`SubscriptionRegistry`].
#[derive(Clone)]
pub struct RemoteSyncClient {
    registry: Arc<dyn SubscriptionRegistry>,
}

impl RemoteSyncClient {
    pub fn new(registry: Arc<dyn SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns whether the registry acknowledged the subscription.
    pub async fn register(&self, subscription: &SubscriptionJson) -> bool {
        match self.registry.register(subscription).await {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to send subscription to server: {err}");
                false
            }
        }
    }

    /// Returns whether the registry acknowledged the removal.
    pub async fn unregister(&self, endpoint: &str) -> bool {
        match self.registry.unregister(endpoint).await {
            Ok(()) => true,
            Err(err) => {
                log::warn!("failed to remove subscription from server: {err}");
                false
            }
        }
    }
}
