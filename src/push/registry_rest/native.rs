use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{check_status, registry_endpoint, RegisterBody, UnregisterBody};
use crate::push::config::PushConfig;
use crate::push::constants::{NATIVE_USER_AGENT, REGISTRY_REQUEST_TIMEOUT};
use crate::push::error::{internal_error, invalid_argument, remote_sync_failed, PushResult};
use crate::push::sync::SubscriptionRegistry;
use crate::push::types::SubscriptionJson;

#[derive(Clone, Debug)]
pub struct HttpSubscriptionRegistry {
    http: Client,
    endpoint: Url,
}

impl HttpSubscriptionRegistry {
    pub fn new(origin: &Url) -> PushResult<Self> {
        let endpoint = registry_endpoint(origin)?;
        let http = Client::builder()
            .user_agent(NATIVE_USER_AGENT)
            .timeout(REGISTRY_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| internal_error(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { http, endpoint })
    }

    /// Uses the configured registry origin, which is mandatory off the browser.
    pub fn from_config(config: &PushConfig) -> PushResult<Self> {
        let origin = config.registry_origin().ok_or_else(|| {
            invalid_argument("A registry origin is required outside the browser")
        })?;
        Self::new(origin)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubscriptionRegistry for HttpSubscriptionRegistry {
    async fn register(&self, subscription: &SubscriptionJson) -> PushResult<()> {
        let body = RegisterBody::new(subscription, NATIVE_USER_AGENT);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| remote_sync_failed(err.to_string()))?;
        check_status("Registering", response.status().as_u16())
    }

    async fn unregister(&self, endpoint: &str) -> PushResult<()> {
        let response = self
            .http
            .delete(self.endpoint.clone())
            .json(&UnregisterBody { endpoint })
            .send()
            .await
            .map_err(|err| remote_sync_failed(err.to_string()))?;
        check_status("Removing", response.status().as_u16())
    }
}
