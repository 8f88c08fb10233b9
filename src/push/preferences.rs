//! Per-category notification preferences.
//!
//! Preferences are stored as a small JSON object under
//! [`PREFERENCES_STORAGE_KEY`](crate::push::constants::PREFERENCES_STORAGE_KEY).
//! The UI toggles categories; the composer checks them before dispatching a
//! templated notification.

#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
use crate::push::constants::PREFERENCES_STORAGE_KEY;
use crate::push::error::{storage_error, PushResult};
use crate::push::templates::NotificationTemplate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    NewOffers,
    ExpiringOffers,
    CardActivation,
    Reviews,
    Messages,
    Promotions,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 6] = [
        PreferenceKey::NewOffers,
        PreferenceKey::ExpiringOffers,
        PreferenceKey::CardActivation,
        PreferenceKey::Reviews,
        PreferenceKey::Messages,
        PreferenceKey::Promotions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::NewOffers => "newOffers",
            PreferenceKey::ExpiringOffers => "expiringOffers",
            PreferenceKey::CardActivation => "cardActivation",
            PreferenceKey::Reviews => "reviews",
            PreferenceKey::Messages => "messages",
            PreferenceKey::Promotions => "promotions",
        }
    }

    /// Category governing a template kind. Generic kinds are never filtered.
    pub fn for_template(kind: &str) -> Option<Self> {
        match kind {
            NotificationTemplate::NEW_OFFER => Some(PreferenceKey::NewOffers),
            NotificationTemplate::OFFER_EXPIRING => Some(PreferenceKey::ExpiringOffers),
            NotificationTemplate::CARD_ACTIVATED => Some(PreferenceKey::CardActivation),
            NotificationTemplate::REVIEW_RECEIVED => Some(PreferenceKey::Reviews),
            NotificationTemplate::PARTNER_MESSAGE => Some(PreferenceKey::Messages),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub new_offers: bool,
    pub expiring_offers: bool,
    pub card_activation: bool,
    pub reviews: bool,
    pub messages: bool,
    pub promotions: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            new_offers: true,
            expiring_offers: true,
            card_activation: true,
            reviews: true,
            messages: true,
            promotions: false,
        }
    }
}

impl NotificationPreferences {
    pub fn is_enabled(&self, key: PreferenceKey) -> bool {
        match key {
            PreferenceKey::NewOffers => self.new_offers,
            PreferenceKey::ExpiringOffers => self.expiring_offers,
            PreferenceKey::CardActivation => self.card_activation,
            PreferenceKey::Reviews => self.reviews,
            PreferenceKey::Messages => self.messages,
            PreferenceKey::Promotions => self.promotions,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, enabled: bool) {
        let slot = match key {
            PreferenceKey::NewOffers => &mut self.new_offers,
            PreferenceKey::ExpiringOffers => &mut self.expiring_offers,
            PreferenceKey::CardActivation => &mut self.card_activation,
            PreferenceKey::Reviews => &mut self.reviews,
            PreferenceKey::Messages => &mut self.messages,
            PreferenceKey::Promotions => &mut self.promotions,
        };
        *slot = enabled;
    }

    /// The switched-off category that blocks template `kind`, if any.
    pub fn suppressing_key(&self, kind: &str) -> Option<PreferenceKey> {
        PreferenceKey::for_template(kind).filter(|key| !self.is_enabled(*key))
    }
}

/// Persistence layer for [`NotificationPreferences`].
pub trait PreferencesStore: Send + Sync {
    /// Returns `None` when nothing was saved yet.
    fn load(&self) -> PushResult<Option<NotificationPreferences>>;

    fn save(&self, preferences: &NotificationPreferences) -> PushResult<()>;
}

/// Loads stored preferences, falling back to defaults when absent or unreadable.
pub fn load_or_default(store: &dyn PreferencesStore) -> NotificationPreferences {
    match store.load() {
        Ok(Some(preferences)) => preferences,
        Ok(None) => NotificationPreferences::default(),
        Err(err) => {
            log::warn!("ignoring stored notification preferences: {err}");
            NotificationPreferences::default()
        }
    }
}

/// Flips a single category and persists the result.
pub fn toggle(
    store: &dyn PreferencesStore,
    key: PreferenceKey,
) -> PushResult<NotificationPreferences> {
    let mut preferences = load_or_default(store);
    preferences.set(key, !preferences.is_enabled(key));
    store.save(&preferences)?;
    Ok(preferences)
}

#[derive(Default)]
pub struct InMemoryPreferencesStore {
    inner: Mutex<Option<NotificationPreferences>>,
}

impl InMemoryPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: NotificationPreferences) -> Self {
        Self {
            inner: Mutex::new(Some(preferences)),
        }
    }
}

impl PreferencesStore for InMemoryPreferencesStore {
    fn load(&self) -> PushResult<Option<NotificationPreferences>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| storage_error("preferences lock poisoned"))?;
        Ok(*guard)
    }

    fn save(&self, preferences: &NotificationPreferences) -> PushResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| storage_error("preferences lock poisoned"))?;
        *guard = Some(*preferences);
        Ok(())
    }
}

/// Stores preferences as a JSON file, for native embedders and tooling.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FilePreferencesStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FilePreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreferencesStore for FilePreferencesStore {
    fn load(&self) -> PushResult<Option<NotificationPreferences>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.path)
            .map_err(|err| storage_error(format!("failed to read preferences file: {err}")))?;
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|err| storage_error(format!("failed to parse preferences file as JSON: {err}")))
    }

    fn save(&self, preferences: &NotificationPreferences) -> PushResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| storage_error(format!("failed to create preferences directory: {err}")))?;
        }
        let serialized = serde_json::to_vec_pretty(preferences)
            .map_err(|err| storage_error(format!("failed to serialize preferences: {err}")))?;
        fs::write(&self.path, serialized)
            .map_err(|err| storage_error(format!("failed to write preferences file: {err}")))
    }
}

/// `window.localStorage` backed store.
#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct WebPreferencesStore {
    key: String,
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
impl Default for WebPreferencesStore {
    fn default() -> Self {
        Self::with_key(PREFERENCES_STORAGE_KEY)
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
impl WebPreferencesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> PushResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| storage_error("window object is not available in this environment"))?;
        window
            .local_storage()
            .map_err(|err| {
                storage_error(format!(
                    "localStorage is not accessible: {}",
                    crate::platform::browser::format_js_error(&err)
                ))
            })?
            .ok_or_else(|| storage_error("localStorage is unavailable"))
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
impl PreferencesStore for WebPreferencesStore {
    fn load(&self) -> PushResult<Option<NotificationPreferences>> {
        let storage = Self::storage()?;
        let raw = storage.get_item(&self.key).map_err(|err| {
            storage_error(format!(
                "failed to read preferences: {}",
                crate::platform::browser::format_js_error(&err)
            ))
        })?;
        match raw {
            Some(text) if !text.is_empty() => serde_json::from_str(&text)
                .map(Some)
                .map_err(|err| storage_error(format!("stored preferences are not valid JSON: {err}"))),
            _ => Ok(None),
        }
    }

    fn save(&self, preferences: &NotificationPreferences) -> PushResult<()> {
        let serialized = serde_json::to_string(preferences)
            .map_err(|err| storage_error(format!("failed to serialize preferences: {err}")))?;
        Self::storage()?
            .set_item(&self.key, &serialized)
            .map_err(|err| {
                storage_error(format!(
                    "failed to write preferences: {}",
                    crate::platform::browser::format_js_error(&err)
                ))
            })
    }
}
