#![cfg(all(target_arch = "wasm32", feature = "wasm-web"))]

use boomcard_push::push::{
    get_template, Capabilities, NotificationPreferences, PermissionNegotiator, PermissionState,
    PreferenceKey, PreferencesStore, PushEnvironment, WebPreferencesStore,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn detects_browser_capabilities() {
    let capabilities = Capabilities::detect();
    assert_eq!(capabilities.is_supported(), boomcard_push::push::is_supported());
}

#[wasm_bindgen_test]
fn permission_reads_live_state() {
    let environment = PushEnvironment::browser();
    let permissions =
        PermissionNegotiator::new(environment.capabilities, environment.notifications.clone());
    if !environment.capabilities.is_supported() {
        assert_eq!(permissions.get_permission(), PermissionState::Denied);
    }
}

#[wasm_bindgen_test]
fn preferences_round_trip_through_local_storage() {
    let store = WebPreferencesStore::with_key("boomcard-push-wasm-test");
    let mut preferences = NotificationPreferences::default();
    preferences.set(PreferenceKey::Promotions, true);
    store.save(&preferences).expect("save preferences");
    assert_eq!(store.load().expect("load preferences"), Some(preferences));
}

#[wasm_bindgen_test]
fn templates_render_in_the_browser() {
    let request = get_template("card_activated", &serde_json::json!({"cardType": "Premium"}));
    assert_eq!(request.tag.as_deref(), Some("card_activated"));
}
