use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::push::backend::{PushEnvironment, PushSubscription};
use crate::push::composer::{DispatchOutcome, NotificationComposer, ScheduledNotification};
use crate::push::config::PushConfig;
use crate::push::error::{storage_error, PushResult};
use crate::push::permission::{PermissionNegotiator, PermissionState};
use crate::push::preferences::{
    load_or_default, toggle, NotificationPreferences, PreferenceKey, PreferencesStore,
};
use crate::push::registry_rest::HttpSubscriptionRegistry;
use crate::push::subscription::SubscriptionManager;
use crate::push::support::Capabilities;
use crate::push::sw_manager::WorkerBinding;
use crate::push::sync::{RemoteSyncClient, SubscriptionRegistry};
use crate::push::types::NotificationRequest;

/// Entry point of the push subsystem.
///
/// One client is created per page and shared by cloning; clones refer to the
/// same components.
#[derive(Clone)]
pub struct PushClient {
    inner: Arc<PushClientInner>,
}

struct PushClientInner {
    capabilities: Capabilities,
    permissions: PermissionNegotiator,
    binding: WorkerBinding,
    subscriptions: SubscriptionManager,
    composer: NotificationComposer,
    preferences: Option<Arc<dyn PreferencesStore>>,
}

/// Collects the collaborators of a [`PushClient`].
pub struct PushClientBuilder {
    environment: PushEnvironment,
    config: PushConfig,
    registry: Option<Arc<dyn SubscriptionRegistry>>,
    preferences: Option<Arc<dyn PreferencesStore>>,
}

impl PushClientBuilder {
    /// Overrides the HTTP registry derived from the configuration.
    pub fn with_registry(mut self, registry: Arc<dyn SubscriptionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attaches a preferences store; templated notifications then honour it.
    pub fn with_preferences(mut self, store: Arc<dyn PreferencesStore>) -> Self {
        self.preferences = Some(store);
        self
    }

    /// Waits for the service worker (bounded by the configured timeout) and
    /// wires every component.
    pub async fn initialize(self) -> PushResult<PushClient> {
        let PushClientBuilder {
            environment,
            config,
            registry,
            preferences,
        } = self;

        let registry: Arc<dyn SubscriptionRegistry> = match registry {
            Some(registry) => registry,
            None => Arc::new(HttpSubscriptionRegistry::from_config(&config)?),
        };

        let capabilities = environment.capabilities;
        if !capabilities.is_supported() {
            log::warn!("push notifications are not supported in this browser");
        }

        let permissions =
            PermissionNegotiator::new(capabilities, environment.notifications.clone());
        let binding = WorkerBinding::bind(
            &capabilities,
            environment.workers.as_ref(),
            config.ready_timeout(),
        )
        .await;

        let subscriptions = SubscriptionManager::new(
            capabilities,
            permissions.clone(),
            binding.clone(),
            RemoteSyncClient::new(registry),
            &config,
        );
        let mut composer = NotificationComposer::new(
            capabilities,
            permissions.clone(),
            binding.clone(),
            environment.notifications.clone(),
            config.defaults().clone(),
        );
        if let Some(store) = &preferences {
            composer = composer.with_preferences(store.clone());
        }

        Ok(PushClient {
            inner: Arc::new(PushClientInner {
                capabilities,
                permissions,
                binding,
                subscriptions,
                composer,
                preferences,
            }),
        })
    }
}

impl PushClient {
    pub fn builder(environment: PushEnvironment, config: PushConfig) -> PushClientBuilder {
        PushClientBuilder {
            environment,
            config,
            registry: None,
            preferences: None,
        }
    }

    /// Builds a client for the current page, persisting preferences in `localStorage`.
    #[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
    pub async fn initialize_browser(config: PushConfig) -> PushResult<Self> {
        Self::builder(PushEnvironment::browser(), config)
            .with_preferences(Arc::new(crate::push::preferences::WebPreferencesStore::new()))
            .initialize()
            .await
    }

    pub fn is_supported(&self) -> bool {
        self.inner.capabilities.is_supported()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    pub fn is_worker_ready(&self) -> bool {
        self.inner.binding.is_ready()
    }

    pub fn get_permission(&self) -> PermissionState {
        self.inner.permissions.get_permission()
    }

    pub async fn request_permission(&self) -> PermissionState {
        self.inner.permissions.request_permission().await
    }

    pub async fn subscribe(&self) -> Option<PushSubscription> {
        self.inner.subscriptions.subscribe().await
    }

    pub async fn unsubscribe(&self) -> bool {
        self.inner.subscriptions.unsubscribe().await
    }

    pub async fn is_subscribed(&self) -> bool {
        self.inner.subscriptions.is_subscribed().await
    }

    pub async fn current_subscription(&self) -> Option<PushSubscription> {
        self.inner.subscriptions.current_subscription().await
    }

    pub fn get_template(&self, kind: &str, payload: &JsonValue) -> NotificationRequest {
        self.inner.composer.get_template(kind, payload)
    }

    pub async fn show_notification(&self, request: &NotificationRequest) -> PushResult<()> {
        self.inner.composer.show_notification(request).await
    }

    pub async fn show_template_notification(
        &self,
        kind: &str,
        payload: &JsonValue,
    ) -> PushResult<DispatchOutcome> {
        self.inner
            .composer
            .show_template_notification(kind, payload)
            .await
    }

    pub fn schedule_notification(
        &self,
        request: NotificationRequest,
        delay: Duration,
    ) -> ScheduledNotification {
        self.inner.composer.schedule_notification(request, delay)
    }

    pub fn cancel_scheduled_notification(&self, scheduled: ScheduledNotification) -> bool {
        self.inner.composer.cancel_scheduled_notification(scheduled)
    }

    pub async fn test_notification(&self) -> PushResult<()> {
        self.inner.composer.test_notification().await
    }

    /// Stored preferences, or the defaults when none are stored or attached.
    pub fn preferences(&self) -> NotificationPreferences {
        match &self.inner.preferences {
            Some(store) => load_or_default(store.as_ref()),
            None => NotificationPreferences::default(),
        }
    }

    pub fn toggle_preference(&self, key: PreferenceKey) -> PushResult<NotificationPreferences> {
        let store = self
            .inner
            .preferences
            .as_ref()
            .ok_or_else(|| storage_error("No preferences store is attached"))?;
        toggle(store.as_ref(), key)
    }
}

impl fmt::Debug for PushClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushClient")
            .field("capabilities", &self.inner.capabilities)
            .field("worker_ready", &self.inner.binding.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::preferences::InMemoryPreferencesStore;
    use crate::test_support::browser::{DispatchPath, FakeBrowser, RecordingRegistry, RegistryCall};
    use crate::test_support::TEST_VAPID_KEY;
    use serde_json::json;

    async fn client(browser: &Arc<FakeBrowser>, registry: &Arc<RecordingRegistry>) -> PushClient {
        let config = PushConfig::new(TEST_VAPID_KEY)
            .unwrap()
            .with_ready_timeout(Duration::from_millis(50));
        PushClient::builder(browser.environment(), config)
            .with_registry(registry.clone())
            .with_preferences(Arc::new(InMemoryPreferencesStore::new()))
            .initialize()
            .await
            .unwrap()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn first_visit_subscribes_and_notifies() {
        let browser = FakeBrowser::new();
        browser.answer_prompt_with(PermissionState::Granted);
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;

        assert!(push.is_supported());
        assert!(push.is_worker_ready());
        assert_eq!(push.get_permission(), PermissionState::Default);

        let subscription = push.subscribe().await.expect("subscription");
        assert!(push.is_subscribed().await);
        assert_eq!(
            registry.calls(),
            vec![RegistryCall::Register(subscription.endpoint().to_string())]
        );

        // Options forwarded to the push manager carry the decoded VAPID key.
        let options = browser.last_subscribe_options().unwrap();
        assert!(options.user_visible_only);
        assert_eq!(options.application_server_key.len(), 65);

        let outcome = push
            .show_template_notification(
                "new_offer",
                &json!({"venueName": "Sofia Grill", "discount": "20", "offerId": "o-1"}),
            )
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Shown);
        let shown = browser.dispatched();
        assert_eq!(shown[0].path, DispatchPath::Worker);
        assert_eq!(shown[0].notification.tag.as_deref(), Some("new_offer"));
        assert_eq!(shown[0].notification.data["offerId"], "o-1");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn denied_user_gets_no_subscription() {
        let browser = FakeBrowser::new();
        browser.set_permission(PermissionState::Denied);
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;

        assert!(push.subscribe().await.is_none());
        assert!(!push.is_subscribed().await);
        assert!(registry.calls().is_empty());
        assert_eq!(browser.prompt_count(), 0);

        let err = push.test_notification().await.unwrap_err();
        assert_eq!(err.code_str(), "push/permission-denied");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unsubscribe_clears_local_and_remote_state() {
        let browser = FakeBrowser::granted();
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;

        let subscription = push.subscribe().await.unwrap();
        assert!(push.unsubscribe().await);
        assert!(!push.is_subscribed().await);
        assert!(push.current_subscription().await.is_none());
        assert_eq!(
            registry.calls().last(),
            Some(&RegistryCall::Unregister(subscription.endpoint().to_string()))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn missing_worker_degrades_to_direct_notifications() {
        let browser = FakeBrowser::granted();
        browser.never_ready();
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;

        assert!(!push.is_worker_ready());
        assert!(push.subscribe().await.is_none());
        assert!(!push.unsubscribe().await);

        push.test_notification().await.unwrap();
        assert_eq!(browser.dispatched()[0].path, DispatchPath::Direct);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn preferences_toggle_controls_templates() {
        let browser = FakeBrowser::granted();
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;

        assert!(push.preferences().messages);
        let updated = push.toggle_preference(PreferenceKey::Messages).unwrap();
        assert!(!updated.messages);
        assert_eq!(push.preferences(), updated);

        let outcome = push
            .show_template_notification("partner_message", &json!({"message": "hi"}))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Suppressed(PreferenceKey::Messages));
        assert!(browser.dispatched().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn clones_share_state() {
        let browser = FakeBrowser::granted();
        let registry = RecordingRegistry::new();
        let push = client(&browser, &registry).await;
        let other = push.clone();

        let first = push.subscribe().await.unwrap();
        let second = other.subscribe().await.unwrap();
        assert!(first.same_as(&second));
        assert_eq!(registry.register_count(), 1);
        assert_eq!(browser.subscribe_calls(), 1);
    }
}
