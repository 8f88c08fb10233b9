use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::push::constants::{DEFAULT_BADGE, DEFAULT_ICON, DEFAULT_VIBRATE_PATTERN};

/// Button rendered alongside a notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
}

impl NotificationAction {
    pub fn new(action: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            title: title.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A notification as requested by callers or produced from a template.
///
/// Optional display fields are filled in from [`NotificationDefaults`] right
/// before dispatch, see [`NotificationRequest::resolve`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    #[serde(default)]
    pub data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub require_interaction: bool,
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vibrate: Option<Vec<u32>>,
    #[serde(default)]
    pub silent: bool,
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }

    pub fn require_interaction(mut self, value: bool) -> Self {
        self.require_interaction = value;
        self
    }

    /// Applies display defaults. Both dispatch paths consume the result so the
    /// fields shown never depend on which path was taken.
    pub fn resolve(&self, defaults: &NotificationDefaults) -> DisplayNotification {
        DisplayNotification {
            title: self.title.clone(),
            body: self.body.clone(),
            icon: self.icon.clone().unwrap_or_else(|| defaults.icon.clone()),
            badge: self.badge.clone().unwrap_or_else(|| defaults.badge.clone()),
            image: self.image.clone(),
            data: self.data.clone(),
            tag: self.tag.clone(),
            require_interaction: self.require_interaction,
            actions: self.actions.clone(),
            vibrate: self
                .vibrate
                .clone()
                .unwrap_or_else(|| defaults.vibrate.clone()),
            silent: self.silent,
        }
    }
}

/// Display fallbacks used when a request leaves them unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            badge: DEFAULT_BADGE.to_string(),
            vibrate: DEFAULT_VIBRATE_PATTERN.to_vec(),
        }
    }
}

/// Fully resolved notification handed to the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub data: JsonValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
    pub vibrate: Vec<u32>,
    pub silent: bool,
}

/// Encryption keys of a push subscription, base64url encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// JSON form of a `PushSubscription` (what `PushSubscription.toJSON()` yields).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionJson {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<f64>,
    pub keys: SubscriptionKeys,
}

/// Options passed to the push manager when creating a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscribeOptions {
    pub user_visible_only: bool,
    pub application_server_key: Vec<u8>,
}
