use std::sync::Arc;
use std::time::Duration;

use crate::platform::runtime;
use crate::push::backend::{WorkerContainer, WorkerRegistration};
use crate::push::error::{worker_not_ready, PushResult};
use crate::push::support::Capabilities;

/// Holds the worker registration obtained at start-up.
///
/// The binding is resolved once. When the worker never becomes ready within
/// the configured bound the binding stays empty and dependent operations see
/// a `WorkerNotReady` error instead of hanging.
#[derive(Clone, Default)]
pub struct WorkerBinding {
    registration: Option<Arc<dyn WorkerRegistration>>,
}

impl WorkerBinding {
    /// A binding with no worker, used when capabilities are missing.
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn from_registration(registration: Arc<dyn WorkerRegistration>) -> Self {
        Self {
            registration: Some(registration),
        }
    }

    /// Awaits the container's ready signal for at most `timeout`.
    pub async fn bind(
        capabilities: &Capabilities,
        container: &dyn WorkerContainer,
        timeout: Duration,
    ) -> Self {
        if !capabilities.service_worker {
            log::warn!("service workers are not available; push subscriptions and notifications are disabled");
            return Self::unbound();
        }

        match runtime::timeout(timeout, container.ready()).await {
            Some(Ok(registration)) => {
                log::debug!("service worker ready for scope {}", registration.scope());
                Self::from_registration(registration)
            }
            Some(Err(err)) => {
                log::warn!("service worker registration failed: {err}");
                Self::unbound()
            }
            None => {
                log::warn!(
                    "service worker not ready after {} ms",
                    timeout.as_millis()
                );
                Self::unbound()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.registration.is_some()
    }

    pub fn registration(&self) -> PushResult<Arc<dyn WorkerRegistration>> {
        self.registration
            .clone()
            .ok_or_else(|| worker_not_ready("Service worker registration is not available"))
    }
}
