use std::time::Duration;

pub const REGISTRY_PATH: &str = "/api/push-subscriptions";

pub const PREFERENCES_STORAGE_KEY: &str = "notificationPreferences";

pub const DEFAULT_ICON: &str = "/logo.png";
pub const DEFAULT_BADGE: &str = "/badge.png";
pub const DEFAULT_VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const ENV_VAPID_PUBLIC_KEY: &str = "BOOMCARD_PUSH_VAPID_PUBLIC_KEY";
pub const ENV_REGISTRY_ORIGIN: &str = "BOOMCARD_PUSH_REGISTRY_ORIGIN";
pub const ENV_READY_TIMEOUT_MS: &str = "BOOMCARD_PUSH_READY_TIMEOUT_MS";

#[cfg(not(target_arch = "wasm32"))]
pub const NATIVE_USER_AGENT: &str = concat!("boomcard-push/", env!("CARGO_PKG_VERSION"));

#[cfg(not(target_arch = "wasm32"))]
pub const REGISTRY_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
