use std::sync::Arc;

use crate::push::backend::NotificationBackend;
use crate::push::support::Capabilities;

/// Notification permission states as exposed by the Web Notifications API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionState {
    /// The user has not decided whether to allow notifications.
    Default,
    /// The user granted notification permissions.
    Granted,
    /// The user denied notification permissions. Only the user can revert this
    /// through the browser's site settings.
    Denied,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Default => "default",
            PermissionState::Granted => "granted",
            PermissionState::Denied => "denied",
        }
    }

    /// Unknown values are treated as undecided.
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "granted" => PermissionState::Granted,
            "denied" => PermissionState::Denied,
            _ => PermissionState::Default,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

/// Wraps the browser permission prompt.
///
/// State is never cached: the user may change site settings at any time, so
/// every read goes back to the browser.
#[derive(Clone)]
pub struct PermissionNegotiator {
    capabilities: Capabilities,
    backend: Arc<dyn NotificationBackend>,
}

impl PermissionNegotiator {
    pub fn new(capabilities: Capabilities, backend: Arc<dyn NotificationBackend>) -> Self {
        Self {
            capabilities,
            backend,
        }
    }

    pub fn get_permission(&self) -> PermissionState {
        if !self.capabilities.is_supported() {
            return PermissionState::Denied;
        }
        self.backend.permission()
    }

    /// Prompts the user when no decision was recorded yet.
    ///
    /// Terminal states are returned without prompting. Prompt failures are
    /// logged and resolved with the live state rather than returned.
    pub async fn request_permission(&self) -> PermissionState {
        if !self.capabilities.is_supported() {
            return PermissionState::Denied;
        }

        match self.backend.permission() {
            PermissionState::Default => {}
            decided => return decided,
        }

        match self.backend.request_permission().await {
            Ok(state) => {
                log::debug!("notification permission resolved to {}", state.as_str());
                state
            }
            Err(err) => {
                log::warn!("notification permission prompt failed: {err}");
                self.backend.permission()
            }
        }
    }
}
