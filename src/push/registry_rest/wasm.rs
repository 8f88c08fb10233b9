use async_trait::async_trait;
use url::Url;

use super::{check_status, registry_endpoint, RegisterBody, UnregisterBody};
use crate::platform::browser::format_js_error;
use crate::push::config::PushConfig;
use crate::push::error::{internal_error, invalid_argument, remote_sync_failed, PushResult};
use crate::push::sync::SubscriptionRegistry;
use crate::push::types::SubscriptionJson;

/// Registry client using the page's `fetch` through `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpSubscriptionRegistry {
    endpoint: Url,
}

impl HttpSubscriptionRegistry {
    pub fn new(origin: &Url) -> PushResult<Self> {
        Ok(Self {
            endpoint: registry_endpoint(origin)?,
        })
    }

    /// Falls back to the page origin when no registry origin is configured.
    pub fn from_config(config: &PushConfig) -> PushResult<Self> {
        match config.registry_origin() {
            Some(origin) => Self::new(origin),
            None => Self::new(&page_origin()?),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn page_origin() -> PushResult<Url> {
    let window = web_sys::window()
        .ok_or_else(|| internal_error("window object is not available in this environment"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|err| internal_error(format!("Failed to read page origin: {}", format_js_error(&err))))?;
    Url::parse(&origin).map_err(|err| invalid_argument(format!("Invalid page origin '{origin}': {err}")))
}

fn user_agent() -> String {
    web_sys::window()
        .and_then(|window| window.navigator().user_agent().ok())
        .unwrap_or_default()
}

#[async_trait(?Send)]
impl SubscriptionRegistry for HttpSubscriptionRegistry {
    async fn register(&self, subscription: &SubscriptionJson) -> PushResult<()> {
        let user_agent = user_agent();
        let body = RegisterBody::new(subscription, &user_agent);
        let response = reqwest::Client::new()
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| remote_sync_failed(err.to_string()))?;
        check_status("Registering", response.status().as_u16())
    }

    async fn unregister(&self, endpoint: &str) -> PushResult<()> {
        let response = reqwest::Client::new()
            .delete(self.endpoint.clone())
            .json(&UnregisterBody { endpoint })
            .send()
            .await
            .map_err(|err| remote_sync_failed(err.to_string()))?;
        check_status("Removing", response.status().as_u16())
    }
}
