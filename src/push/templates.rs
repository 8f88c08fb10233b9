//! Typed notification templates.
//!
//! Each template turns a payload into a [`NotificationRequest`]. The request's
//! `tag` is always the template kind so a second notification of the same
//! category replaces an unread one instead of stacking on top of it.
//!
//! Server-driven identifiers may be unknown to this build; they map to a
//! generic template. Missing payload fields are rendered with placeholders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};

use crate::push::constants::DEFAULT_ICON;
use crate::push::types::{NotificationAction, NotificationRequest};

const PLACEHOLDER: &str = "…";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOfferPayload {
    #[serde(deserialize_with = "lenient_text")]
    pub venue_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub discount: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub offer_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub venue_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferExpiringPayload {
    #[serde(deserialize_with = "lenient_text")]
    pub offer_title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub expires_in: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub offer_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardActivatedPayload {
    #[serde(deserialize_with = "lenient_text")]
    pub card_type: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub card_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewReceivedPayload {
    #[serde(deserialize_with = "lenient_text")]
    pub user_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub rating: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub review_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub offer_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartnerMessagePayload {
    #[serde(deserialize_with = "lenient_text")]
    pub partner_name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub message_id: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub partner_id: Option<String>,
}

/// Notification categories known to this build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationTemplate {
    NewOffer(NewOfferPayload),
    OfferExpiring(OfferExpiringPayload),
    CardActivated(CardActivatedPayload),
    ReviewReceived(ReviewReceivedPayload),
    PartnerMessage(PartnerMessagePayload),
    /// Unknown identifier; rendered with the generic template.
    Generic(String),
}

impl NotificationTemplate {
    pub const NEW_OFFER: &'static str = "new_offer";
    pub const OFFER_EXPIRING: &'static str = "offer_expiring";
    pub const CARD_ACTIVATED: &'static str = "card_activated";
    pub const REVIEW_RECEIVED: &'static str = "review_received";
    pub const PARTNER_MESSAGE: &'static str = "partner_message";

    /// Every template kind with a dedicated layout.
    pub const KINDS: [&'static str; 5] = [
        Self::NEW_OFFER,
        Self::OFFER_EXPIRING,
        Self::CARD_ACTIVATED,
        Self::REVIEW_RECEIVED,
        Self::PARTNER_MESSAGE,
    ];

    /// Selects the template for `kind` and reads its payload leniently.
    pub fn parse(kind: &str, payload: &JsonValue) -> Self {
        match kind {
            Self::NEW_OFFER => Self::NewOffer(payload_or_default(kind, payload)),
            Self::OFFER_EXPIRING => Self::OfferExpiring(payload_or_default(kind, payload)),
            Self::CARD_ACTIVATED => Self::CardActivated(payload_or_default(kind, payload)),
            Self::REVIEW_RECEIVED => Self::ReviewReceived(payload_or_default(kind, payload)),
            Self::PARTNER_MESSAGE => Self::PartnerMessage(payload_or_default(kind, payload)),
            other => Self::Generic(other.to_string()),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::NewOffer(_) => Self::NEW_OFFER,
            Self::OfferExpiring(_) => Self::OFFER_EXPIRING,
            Self::CardActivated(_) => Self::CARD_ACTIVATED,
            Self::ReviewReceived(_) => Self::REVIEW_RECEIVED,
            Self::PartnerMessage(_) => Self::PARTNER_MESSAGE,
            Self::Generic(kind) => kind,
        }
    }

    pub fn render(&self) -> NotificationRequest {
        let mut data = JsonMap::new();
        let request = match self {
            Self::NewOffer(p) => {
                insert_id(&mut data, "offerId", &p.offer_id);
                insert_id(&mut data, "venueId", &p.venue_id);
                let mut request = NotificationRequest::new(
                    "🎉 New Offer Available!",
                    format!(
                        "{} is offering {}% off!",
                        text(&p.venue_name),
                        text(&p.discount)
                    ),
                )
                .with_icon("/icons/offer.png")
                .with_action(NotificationAction::new("view", "View Offer").with_icon("/icons/view.png"))
                .with_action(
                    NotificationAction::new("dismiss", "Dismiss").with_icon("/icons/dismiss.png"),
                );
                request.image = p.image.clone();
                request
            }
            Self::OfferExpiring(p) => {
                insert_id(&mut data, "offerId", &p.offer_id);
                NotificationRequest::new(
                    "⏰ Offer Expiring Soon!",
                    format!(
                        "{} expires {}. Don't miss out!",
                        text(&p.offer_title),
                        text(&p.expires_in)
                    ),
                )
                .with_icon("/icons/clock.png")
                .with_action(NotificationAction::new("view", "Use Now").with_icon("/icons/use.png"))
                .with_action(
                    NotificationAction::new("dismiss", "Remind Later").with_icon("/icons/remind.png"),
                )
            }
            Self::CardActivated(p) => {
                insert_id(&mut data, "cardId", &p.card_id);
                NotificationRequest::new(
                    "✅ BoomCard Activated!",
                    format!(
                        "Your {} card is now active. Start saving!",
                        text(&p.card_type)
                    ),
                )
                .with_icon("/icons/card.png")
                .with_action(NotificationAction::new("view", "View Card").with_icon("/icons/view.png"))
            }
            Self::ReviewReceived(p) => {
                insert_id(&mut data, "reviewId", &p.review_id);
                insert_id(&mut data, "offerId", &p.offer_id);
                NotificationRequest::new(
                    "⭐ New Review!",
                    format!(
                        "{} left a {}-star review",
                        text(&p.user_name),
                        text(&p.rating)
                    ),
                )
                .with_icon("/icons/star.png")
                .with_action(NotificationAction::new("view", "View Review").with_icon("/icons/view.png"))
                .with_action(NotificationAction::new("reply", "Reply").with_icon("/icons/reply.png"))
            }
            Self::PartnerMessage(p) => {
                insert_id(&mut data, "messageId", &p.message_id);
                insert_id(&mut data, "partnerId", &p.partner_id);
                NotificationRequest::new(
                    "💬 Message from Partner",
                    format!("{}: {}", text(&p.partner_name), text(&p.message)),
                )
                .with_icon("/icons/message.png")
                .with_action(NotificationAction::new("reply", "Reply").with_icon("/icons/reply.png"))
                .with_action(
                    NotificationAction::new("dismiss", "Dismiss").with_icon("/icons/dismiss.png"),
                )
            }
            Self::Generic(_) => {
                NotificationRequest::new("BoomCard Notification", "You have a new notification")
                    .with_icon(DEFAULT_ICON)
            }
        };

        data.insert("type".to_string(), json!(self.kind()));
        request
            .with_data(JsonValue::Object(data))
            .with_tag(self.kind())
    }
}

/// Renders the template for `kind` with `payload`.
pub fn get_template(kind: &str, payload: &JsonValue) -> NotificationRequest {
    NotificationTemplate::parse(kind, payload).render()
}

fn payload_or_default<T>(kind: &str, payload: &JsonValue) -> T
where
    T: for<'de> Deserialize<'de> + Default,
{
    if payload.is_null() {
        return T::default();
    }
    serde_json::from_value(payload.clone()).unwrap_or_else(|err| {
        log::debug!("malformed payload for {kind} notification: {err}");
        T::default()
    })
}

fn text(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER,
    }
}

fn insert_id(data: &mut JsonMap<String, JsonValue>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        data.insert(key.to_string(), JsonValue::String(value.clone()));
    }
}

/// Accepts strings, numbers and booleans, treating anything else as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::String(text)) => Some(text),
        Some(JsonValue::Number(number)) => Some(number.to_string()),
        Some(JsonValue::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload(kind: &str) -> JsonValue {
        match kind {
            "new_offer" => json!({
                "venueName": "Sofia Grill",
                "discount": 20,
                "offerId": "off-1",
                "venueId": "ven-9",
                "image": "https://cdn.example.com/grill.jpg"
            }),
            "offer_expiring" => json!({"offerTitle": "Happy Hour", "expiresIn": "in 2 hours", "offerId": "off-2"}),
            "card_activated" => json!({"cardType": "Premium", "cardId": "card-7"}),
            "review_received" => json!({"userName": "Maria", "rating": 5, "reviewId": "rev-3", "offerId": "off-1"}),
            "partner_message" => json!({"partnerName": "Sky Bar", "message": "See you tonight", "messageId": "m-1", "partnerId": "p-4"}),
            _ => JsonValue::Null,
        }
    }

    #[test]
    fn every_kind_renders_title_body_and_tag() {
        for kind in NotificationTemplate::KINDS {
            let request = get_template(kind, &sample_payload(kind));
            assert!(!request.title.is_empty(), "{kind} title");
            assert!(!request.body.is_empty(), "{kind} body");
            assert_eq!(request.tag.as_deref(), Some(kind));
            assert_eq!(request.data["type"], json!(kind));
            assert!(!request.actions.is_empty(), "{kind} actions");
        }
    }

    #[test]
    fn new_offer_interpolates_payload() {
        let request = get_template("new_offer", &sample_payload("new_offer"));
        assert_eq!(request.body, "Sofia Grill is offering 20% off!");
        assert_eq!(request.icon.as_deref(), Some("/icons/offer.png"));
        assert_eq!(request.image.as_deref(), Some("https://cdn.example.com/grill.jpg"));
        assert_eq!(request.data["offerId"], json!("off-1"));
        assert_eq!(request.data["venueId"], json!("ven-9"));
        let actions: Vec<_> = request.actions.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(actions, ["view", "dismiss"]);
    }

    #[test]
    fn review_received_accepts_numeric_rating() {
        let request = get_template("review_received", &sample_payload("review_received"));
        assert_eq!(request.body, "Maria left a 5-star review");
        assert_eq!(request.actions[1].action, "reply");
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let request = get_template("partner_message", &json!({"partnerName": "Sky Bar"}));
        assert_eq!(request.body, "Sky Bar: …");
        assert!(request.data.get("messageId").is_none());

        let request = get_template("card_activated", &json!("not an object"));
        assert_eq!(request.body, "Your … card is now active. Start saving!");
    }

    #[test]
    fn mistyped_field_only_blanks_itself() {
        let request = get_template(
            "offer_expiring",
            &json!({"offerTitle": "Brunch", "expiresIn": 2, "offerId": "o-1"}),
        );
        assert_eq!(request.body, "Brunch expires 2. Don't miss out!");
        assert_eq!(request.data["offerId"], json!("o-1"));

        let request = get_template(
            "new_offer",
            &json!({"venueName": "Sky Bar", "discount": 15, "offerId": "o-2", "image": {"url": "x"}}),
        );
        assert_eq!(request.body, "Sky Bar is offering 15% off!");
        assert!(request.image.is_none());
        assert_eq!(request.data["offerId"], json!("o-2"));
    }

    #[test]
    fn unknown_kind_falls_back_to_generic() {
        let request = get_template("loyalty_points", &json!({"points": 10}));
        assert_eq!(request.title, "BoomCard Notification");
        assert_eq!(request.body, "You have a new notification");
        assert_eq!(request.icon.as_deref(), Some("/logo.png"));
        assert_eq!(request.tag.as_deref(), Some("loyalty_points"));
        assert!(request.actions.is_empty());
    }

    #[test]
    fn parse_and_kind_agree() {
        for kind in NotificationTemplate::KINDS {
            assert_eq!(NotificationTemplate::parse(kind, &JsonValue::Null).kind(), kind);
        }
        let typed = NotificationTemplate::CardActivated(CardActivatedPayload {
            card_type: Some("Gold".into()),
            card_id: Some("c-1".into()),
        });
        assert_eq!(typed.render().body, "Your Gold card is now active. Start saving!");
    }
}
