//! HTTP client for the `/api/push-subscriptions` registry.
//!
//! `POST` stores a subscription, `DELETE` removes it by endpoint. Both carry a
//! JSON body; any non-2xx response is reported as a remote sync failure.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use url::Url;

use crate::push::constants::REGISTRY_PATH;
use crate::push::error::{invalid_argument, remote_sync_failed, PushResult};
use crate::push::types::SubscriptionJson;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpSubscriptionRegistry;

#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
mod wasm;
#[cfg(all(target_arch = "wasm32", feature = "wasm-web"))]
pub use wasm::HttpSubscriptionRegistry;

#[cfg(all(target_arch = "wasm32", not(feature = "wasm-web")))]
compile_error!("Building boomcard-push for wasm32 requires enabling the `wasm-web` feature.");

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody<'a> {
    subscription: &'a SubscriptionJson,
    user_agent: &'a str,
    timestamp: String,
}

impl<'a> RegisterBody<'a> {
    fn new(subscription: &'a SubscriptionJson, user_agent: &'a str) -> Self {
        Self {
            subscription,
            user_agent,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Serialize)]
struct UnregisterBody<'a> {
    endpoint: &'a str,
}

fn registry_endpoint(origin: &Url) -> PushResult<Url> {
    if origin.cannot_be_a_base() {
        return Err(invalid_argument(format!(
            "Registry origin '{origin}' cannot be used as a base URL"
        )));
    }
    origin
        .join(REGISTRY_PATH)
        .map_err(|err| invalid_argument(format!("Invalid registry endpoint: {err}")))
}

fn check_status(operation: &str, status: u16) -> PushResult<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(remote_sync_failed(format!(
            "{operation} push subscription failed with status {status}"
        )))
    }
}
