#![doc = include_str!("README.md")]
pub(crate) mod api;
pub(crate) mod backend;
pub(crate) mod composer;
pub(crate) mod config;
pub mod constants;
pub mod error;
pub(crate) mod permission;
pub mod preferences;
pub(crate) mod registry_rest;
pub(crate) mod subscription;
pub(crate) mod support;
pub(crate) mod sw_manager;
pub(crate) mod sync;
pub mod templates;
pub(crate) mod types;

pub use api::{PushClient, PushClientBuilder};
pub use backend::{
    NotificationBackend, PushEnvironment, PushSubscription, SubscriptionHandle, WorkerContainer,
    WorkerRegistration,
};
pub use composer::{DispatchOutcome, NotificationComposer, ScheduledNotification};
pub use config::PushConfig;
pub use error::{PushError, PushErrorCode, PushResult};
pub use permission::{PermissionNegotiator, PermissionState};
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use preferences::WebPreferencesStore;
#[cfg(not(target_arch = "wasm32"))]
pub use preferences::FilePreferencesStore;
pub use preferences::{
    InMemoryPreferencesStore, NotificationPreferences, PreferenceKey, PreferencesStore,
};
pub use registry_rest::HttpSubscriptionRegistry;
pub use subscription::SubscriptionManager;
pub use support::{is_supported, Capabilities};
pub use sw_manager::WorkerBinding;
pub use sync::{RemoteSyncClient, SubscriptionRegistry};
pub use templates::{get_template, NotificationTemplate};
pub use types::{
    DisplayNotification, NotificationAction, NotificationDefaults, NotificationRequest,
    SubscribeOptions, SubscriptionJson, SubscriptionKeys,
};
