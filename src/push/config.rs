use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use url::Url;

use crate::push::constants::{
    DEFAULT_READY_TIMEOUT, ENV_READY_TIMEOUT_MS, ENV_REGISTRY_ORIGIN, ENV_VAPID_PUBLIC_KEY,
};
use crate::push::error::{invalid_argument, PushResult};
use crate::push::types::NotificationDefaults;

/// Static configuration of the push subsystem.
#[derive(Clone, Debug)]
pub struct PushConfig {
    vapid_public_key: String,
    application_server_key: Vec<u8>,
    registry_origin: Option<Url>,
    ready_timeout: Duration,
    defaults: NotificationDefaults,
}

impl PushConfig {
    /// Creates a configuration for the given VAPID public key.
    ///
    /// The key is the URL-safe base64 form servers usually publish; trailing
    /// `=` padding is accepted.
    pub fn new(vapid_public_key: impl Into<String>) -> PushResult<Self> {
        let vapid_public_key = vapid_public_key.into();
        let application_server_key = decode_vapid_key(&vapid_public_key)?;
        Ok(Self {
            vapid_public_key,
            application_server_key,
            registry_origin: None,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            defaults: NotificationDefaults::default(),
        })
    }

    /// Reads the configuration from `BOOMCARD_PUSH_*` environment variables.
    pub fn from_env() -> PushResult<Self> {
        let key = std::env::var(ENV_VAPID_PUBLIC_KEY).map_err(|_| {
            invalid_argument(format!("{ENV_VAPID_PUBLIC_KEY} must be set to the VAPID public key"))
        })?;
        let mut config = Self::new(key)?;

        if let Ok(origin) = std::env::var(ENV_REGISTRY_ORIGIN) {
            config = config.with_registry_origin(&origin)?;
        }
        if let Ok(raw) = std::env::var(ENV_READY_TIMEOUT_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|err| {
                invalid_argument(format!("Invalid {ENV_READY_TIMEOUT_MS} '{raw}': {err}"))
            })?;
            config = config.with_ready_timeout(Duration::from_millis(millis));
        }
        Ok(config)
    }

    /// Origin hosting the subscription registry endpoints.
    pub fn with_registry_origin(mut self, origin: &str) -> PushResult<Self> {
        let url = Url::parse(origin)
            .map_err(|err| invalid_argument(format!("Invalid registry origin '{origin}': {err}")))?;
        if url.cannot_be_a_base() {
            return Err(invalid_argument(format!(
                "Registry origin '{origin}' cannot be used as a base URL"
            )));
        }
        self.registry_origin = Some(url);
        Ok(self)
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_defaults(mut self, defaults: NotificationDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn vapid_public_key(&self) -> &str {
        &self.vapid_public_key
    }

    /// Decoded VAPID key, as handed to `PushManager.subscribe`.
    pub fn application_server_key(&self) -> &[u8] {
        &self.application_server_key
    }

    pub fn registry_origin(&self) -> Option<&Url> {
        self.registry_origin.as_ref()
    }

    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }

    pub fn defaults(&self) -> &NotificationDefaults {
        &self.defaults
    }
}

fn decode_vapid_key(vapid_key: &str) -> PushResult<Vec<u8>> {
    let trimmed = vapid_key.trim().trim_end_matches('=');
    if trimmed.is_empty() {
        return Err(invalid_argument("VAPID key must not be empty"));
    }
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .map_err(|err| invalid_argument(format!("Invalid VAPID key: {err}")))
}
