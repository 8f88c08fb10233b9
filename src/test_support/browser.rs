//! In-memory stand-ins for the browser push APIs and the remote registry.
//!
//! `FakeBrowser` mimics the platform rules the subsystem relies on: a denied
//! permission is never re-prompted, the push manager refuses to subscribe
//! without permission, and notifications sharing a tag replace each other.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::push::backend::{
    NotificationBackend, PushEnvironment, SubscriptionHandle, WorkerContainer, WorkerRegistration,
};
use crate::push::error::{
    internal_error, remote_sync_failed, subscribe_failed, unsubscribe_failed, PushResult,
};
use crate::push::permission::PermissionState;
use crate::push::support::Capabilities;
use crate::push::sync::SubscriptionRegistry;
use crate::push::types::{DisplayNotification, SubscribeOptions, SubscriptionJson, SubscriptionKeys};

pub const TEST_VAPID_KEY: &str =
    "BDOU99-h67HcA6JeFXHbSNMu7e2yNNu3RzoMj8TM4W88jITfq7ZmPvIM1Iv-4_l2LxQcYwhqby2xGpWwzjfAnG4";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchPath {
    Worker,
    Direct,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShownNotification {
    pub path: DispatchPath,
    pub notification: DisplayNotification,
}

#[derive(Default)]
struct BrowserState {
    permission: Option<PermissionState>,
    prompt_answer: Option<PermissionState>,
    prompt_fails: bool,
    prompt_count: usize,
    never_ready: bool,
    subscription: Option<Arc<FakeSubscription>>,
    subscribe_calls: usize,
    subscribe_fails: bool,
    unsubscribe_result: Option<bool>,
    unsubscribe_fails: bool,
    last_subscribe_options: Option<SubscribeOptions>,
    next_endpoint: usize,
    visible: Vec<ShownNotification>,
    dispatched: Vec<ShownNotification>,
}

impl BrowserState {
    fn permission(&self) -> PermissionState {
        self.permission.unwrap_or(PermissionState::Default)
    }

    fn display(&mut self, path: DispatchPath, notification: &DisplayNotification) {
        let shown = ShownNotification {
            path,
            notification: notification.clone(),
        };
        if let Some(tag) = &notification.tag {
            self.visible
                .retain(|existing| existing.notification.tag.as_ref() != Some(tag));
        }
        self.visible.push(shown.clone());
        self.dispatched.push(shown);
    }
}

pub struct FakeBrowser {
    state: Arc<Mutex<BrowserState>>,
}

impl FakeBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Arc::new(Mutex::new(BrowserState::default())),
        })
    }

    /// A browser where the user has already granted notifications.
    pub fn granted() -> Arc<Self> {
        let browser = Self::new();
        browser.set_permission(PermissionState::Granted);
        browser
    }

    pub fn environment(self: &Arc<Self>) -> PushEnvironment {
        PushEnvironment::new(Capabilities::full(), self.clone(), self.clone())
    }

    pub fn set_permission(&self, permission: PermissionState) {
        self.state.lock().unwrap().permission = Some(permission);
    }

    /// Answer given by the simulated user the next time the prompt is shown.
    pub fn answer_prompt_with(&self, answer: PermissionState) {
        self.state.lock().unwrap().prompt_answer = Some(answer);
    }

    pub fn fail_prompt(&self) {
        self.state.lock().unwrap().prompt_fails = true;
    }

    pub fn prompt_count(&self) -> usize {
        self.state.lock().unwrap().prompt_count
    }

    pub fn never_ready(&self) {
        self.state.lock().unwrap().never_ready = true;
    }

    pub fn fail_subscribe(&self) {
        self.state.lock().unwrap().subscribe_fails = true;
    }

    pub fn fail_unsubscribe(&self) {
        self.state.lock().unwrap().unsubscribe_fails = true;
    }

    pub fn set_unsubscribe_result(&self, result: bool) {
        self.state.lock().unwrap().unsubscribe_result = Some(result);
    }

    pub fn subscribe_calls(&self) -> usize {
        self.state.lock().unwrap().subscribe_calls
    }

    pub fn last_subscribe_options(&self) -> Option<SubscribeOptions> {
        self.state.lock().unwrap().last_subscribe_options.clone()
    }

    pub fn has_subscription(&self) -> bool {
        self.state.lock().unwrap().subscription.is_some()
    }

    /// Simulates the browser dropping the subscription out-of-band.
    pub fn revoke_subscription(&self) {
        self.state.lock().unwrap().subscription = None;
    }

    pub fn visible(&self) -> Vec<ShownNotification> {
        self.state.lock().unwrap().visible.clone()
    }

    pub fn dispatched(&self) -> Vec<ShownNotification> {
        self.state.lock().unwrap().dispatched.clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl NotificationBackend for FakeBrowser {
    fn permission(&self) -> PermissionState {
        self.state.lock().unwrap().permission()
    }

    async fn request_permission(&self) -> PushResult<PermissionState> {
        let mut state = self.state.lock().unwrap();
        if state.permission() != PermissionState::Default {
            return Ok(state.permission());
        }
        if state.prompt_fails {
            return Err(internal_error("requestPermission failed: prompt dismissed"));
        }
        state.prompt_count += 1;
        let answer = state.prompt_answer.unwrap_or(PermissionState::Default);
        state.permission = Some(answer);
        Ok(answer)
    }

    fn show_direct(&self, notification: &DisplayNotification) -> PushResult<()> {
        self.state
            .lock()
            .unwrap()
            .display(DispatchPath::Direct, notification);
        Ok(())
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WorkerContainer for FakeBrowser {
    async fn ready(&self) -> PushResult<Arc<dyn WorkerRegistration>> {
        let never_ready = self.state.lock().unwrap().never_ready;
        if never_ready {
            futures::future::pending::<()>().await;
        }
        Ok(Arc::new(FakeRegistration {
            state: self.state.clone(),
        }))
    }
}

struct FakeRegistration {
    state: Arc<Mutex<BrowserState>>,
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WorkerRegistration for FakeRegistration {
    fn scope(&self) -> String {
        "/".to_string()
    }

    async fn get_subscription(&self) -> PushResult<Option<Arc<dyn SubscriptionHandle>>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .subscription
            .clone()
            .map(|subscription| subscription as Arc<dyn SubscriptionHandle>))
    }

    async fn subscribe(&self, options: &SubscribeOptions) -> PushResult<Arc<dyn SubscriptionHandle>> {
        let mut state = self.state.lock().unwrap();
        state.subscribe_calls += 1;
        state.last_subscribe_options = Some(options.clone());
        if state.permission() != PermissionState::Granted {
            return Err(subscribe_failed("NotAllowedError: permission not granted"));
        }
        if state.subscribe_fails {
            return Err(subscribe_failed("AbortError: push service unavailable"));
        }
        if let Some(existing) = &state.subscription {
            return Ok(existing.clone());
        }
        state.next_endpoint += 1;
        let subscription = Arc::new(FakeSubscription {
            json: sample_subscription_json(&format!("sub-{}", state.next_endpoint)),
            state: self.state.clone(),
        });
        state.subscription = Some(subscription.clone());
        Ok(subscription)
    }

    async fn show_notification(&self, notification: &DisplayNotification) -> PushResult<()> {
        self.state
            .lock()
            .unwrap()
            .display(DispatchPath::Worker, notification);
        Ok(())
    }
}

struct FakeSubscription {
    json: SubscriptionJson,
    state: Arc<Mutex<BrowserState>>,
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SubscriptionHandle for FakeSubscription {
    fn to_json(&self) -> PushResult<SubscriptionJson> {
        Ok(self.json.clone())
    }

    async fn unsubscribe(&self) -> PushResult<bool> {
        let mut state = self.state.lock().unwrap();
        if state.unsubscribe_fails {
            return Err(unsubscribe_failed("AbortError: push service unavailable"));
        }
        match state.unsubscribe_result {
            Some(false) => return Ok(false),
            Some(true) | None => {}
        }
        let is_current = state
            .subscription
            .as_ref()
            .is_some_and(|current| current.json.endpoint == self.json.endpoint);
        if !is_current {
            return Err(unsubscribe_failed("InvalidStateError: subscription already removed"));
        }
        state.subscription = None;
        Ok(true)
    }
}

pub fn sample_subscription_json(id: &str) -> SubscriptionJson {
    SubscriptionJson {
        endpoint: format!("https://push.example.com/{id}"),
        expiration_time: None,
        keys: SubscriptionKeys {
            p256dh: format!("p256dh-{id}"),
            auth: format!("auth-{id}"),
        },
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryCall {
    Register(String),
    Unregister(String),
}

/// Registry that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingRegistry {
    calls: Mutex<Vec<RegistryCall>>,
    failing: Mutex<bool>,
}

impl RecordingRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_requests(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> Vec<RegistryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn register_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RegistryCall::Register(_)))
            .count()
    }

    fn outcome(&self) -> PushResult<()> {
        if *self.failing.lock().unwrap() {
            Err(remote_sync_failed("registry responded with status 503"))
        } else {
            Ok(())
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SubscriptionRegistry for RecordingRegistry {
    async fn register(&self, subscription: &SubscriptionJson) -> PushResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Register(subscription.endpoint.clone()));
        self.outcome()
    }

    async fn unregister(&self, endpoint: &str) -> PushResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RegistryCall::Unregister(endpoint.to_string()));
        self.outcome()
    }
}
