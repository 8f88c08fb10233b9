use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::{abortable, AbortHandle};
use serde_json::Value as JsonValue;

use crate::platform::runtime;
use crate::push::backend::NotificationBackend;
use crate::push::error::{capability_unsupported, permission_denied, PushResult};
use crate::push::permission::PermissionNegotiator;
use crate::push::preferences::{load_or_default, PreferenceKey, PreferencesStore};
use crate::push::support::Capabilities;
use crate::push::sw_manager::WorkerBinding;
use crate::push::templates::get_template;
use crate::push::types::{NotificationAction, NotificationDefaults, NotificationRequest};

/// Result of a templated dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Shown,
    /// The user switched the template's category off.
    Suppressed(PreferenceKey),
}

/// Handle returned by [`NotificationComposer::schedule_notification`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScheduledNotification {
    id: u64,
}

impl ScheduledNotification {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Default)]
struct Schedules {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, AbortHandle>>,
}

impl Schedules {
    fn insert(&self, handle: AbortHandle) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().insert(id, handle);
        id
    }

    fn take(&self, id: u64) -> Option<AbortHandle> {
        self.lock().remove(&id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, AbortHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds and displays local notifications.
#[derive(Clone)]
pub struct NotificationComposer {
    capabilities: Capabilities,
    permissions: PermissionNegotiator,
    binding: WorkerBinding,
    backend: Arc<dyn NotificationBackend>,
    defaults: NotificationDefaults,
    preferences: Option<Arc<dyn PreferencesStore>>,
    schedules: Arc<Schedules>,
}

impl NotificationComposer {
    pub fn new(
        capabilities: Capabilities,
        permissions: PermissionNegotiator,
        binding: WorkerBinding,
        backend: Arc<dyn NotificationBackend>,
        defaults: NotificationDefaults,
    ) -> Self {
        Self {
            capabilities,
            permissions,
            binding,
            backend,
            defaults,
            preferences: None,
            schedules: Arc::new(Schedules::default()),
        }
    }

    /// Enables category filtering for templated notifications.
    pub fn with_preferences(mut self, store: Arc<dyn PreferencesStore>) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn preferences(&self) -> Option<&Arc<dyn PreferencesStore>> {
        self.preferences.as_ref()
    }

    pub fn get_template(&self, kind: &str, payload: &JsonValue) -> NotificationRequest {
        get_template(kind, payload)
    }

    /// Displays `request`, asking for permission first if needed.
    ///
    /// The worker registration is used when bound; otherwise the notification
    /// is constructed directly. Both paths receive the same resolved fields.
    pub async fn show_notification(&self, request: &NotificationRequest) -> PushResult<()> {
        if !self.capabilities.is_supported() {
            return Err(capability_unsupported(
                "Notifications are not supported in this browser",
            ));
        }

        let permission = self.permissions.request_permission().await;
        if !permission.is_granted() {
            return Err(permission_denied(format!(
                "Notification permission is {}",
                permission.as_str()
            )));
        }

        let display = request.resolve(&self.defaults);
        if let Ok(registration) = self.binding.registration() {
            match registration.show_notification(&display).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    log::warn!("service worker showNotification failed, showing directly: {err}");
                }
            }
        }
        self.backend.show_direct(&display)
    }

    pub async fn show_template_notification(
        &self,
        kind: &str,
        payload: &JsonValue,
    ) -> PushResult<DispatchOutcome> {
        if let Some(store) = &self.preferences {
            if let Some(key) = load_or_default(store.as_ref()).suppressing_key(kind) {
                log::debug!("{kind} notification suppressed by {} preference", key.as_str());
                return Ok(DispatchOutcome::Suppressed(key));
            }
        }

        let request = get_template(kind, payload);
        self.show_notification(&request).await?;
        Ok(DispatchOutcome::Shown)
    }

    /// Shows `request` after `delay`. The timer lives in memory only.
    pub fn schedule_notification(
        &self,
        request: NotificationRequest,
        delay: Duration,
    ) -> ScheduledNotification {
        let composer = self.clone();
        let (task, handle) = abortable(async move {
            runtime::sleep(delay).await;
            if let Err(err) = composer.show_notification(&request).await {
                log::warn!("scheduled notification '{}' failed: {err}", request.title);
            }
        });
        let id = self.schedules.insert(handle);

        let schedules = self.schedules.clone();
        runtime::spawn_detached(async move {
            if task.await.is_ok() {
                schedules.take(id);
            }
        });
        ScheduledNotification { id }
    }

    /// Returns `false` when the notification already fired or was cancelled.
    pub fn cancel_scheduled_notification(&self, scheduled: ScheduledNotification) -> bool {
        match self.schedules.take(scheduled.id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Sends a fixed notification so users can check their setup.
    pub async fn test_notification(&self) -> PushResult<()> {
        self.show_notification(&test_notification_request()).await
    }
}

pub(crate) fn test_notification_request() -> NotificationRequest {
    NotificationRequest::new(
        "🧪 Test Notification",
        "This is a test notification from BoomCard",
    )
    .with_icon("/logo.png")
    .with_action(NotificationAction::new("ok", "OK"))
    .with_action(NotificationAction::new("cancel", "Cancel"))
}
