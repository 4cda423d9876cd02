//! The per-turn view of a host-platform invocation.
//!
//! The host dialogue platform sends one JSON event per conversation turn
//! and only persists string-to-string session attributes between turns.
//! This module decodes that envelope into native types and re-encodes the
//! session on the way out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BotError;

pub const INVOCATION_DIALOG_CODE_HOOK: &str = "DialogCodeHook";

const SESSION_KEY_LOCATION: &str = "location";

/// The slots the dialogue collects. Keys are fixed by the bot definition
/// on the host platform; values may be absent on any given turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotName {
    City,
    Area,
    Date,
    Time,
}

impl SlotName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::City => "City",
            SlotName::Area => "Area",
            SlotName::Date => "Date",
            SlotName::Time => "Time",
        }
    }
}

impl std::fmt::Display for SlotName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    About,
    Weather,
}

/// Which half of the dialogue this invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The platform is still collecting slot values (`DialogCodeHook`).
    Gathering,
    /// All required slots are present; produce the answer.
    Fulfilling,
}

/// Slot values as sent and returned on the wire. All four keys are always
/// serialized, absent values as `null`, which is what the platform expects
/// back in `ElicitSlot`/`Delegate` actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Area", default)]
    pub area: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
}

impl Slots {
    pub fn clear(&mut self, slot: SlotName) {
        match slot {
            SlotName::City => self.city = None,
            SlotName::Area => self.area = None,
            SlotName::Date => self.date = None,
            SlotName::Time => self.time = None,
        }
    }
}

/// A geographic point produced by geocoding and consumed by the weather
/// and webcam lookups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Native session state, round-tripped through the platform's
/// string-to-string attribute map. Each attribute value is individually
/// JSON-encoded because the platform stores opaque strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub location: Option<Location>,
}

impl Session {
    pub fn decode(attributes: &HashMap<String, String>) -> Self {
        let location = attributes.get(SESSION_KEY_LOCATION).and_then(|raw| {
            match serde_json::from_str::<Location>(raw) {
                Ok(location) => Some(location),
                Err(err) => {
                    warn!("discarding undecodable session location {raw:?}: {err}");
                    None
                }
            }
        });

        Self { location }
    }

    pub fn encode(&self) -> HashMap<String, String> {
        let mut attributes = HashMap::new();

        if let Some(location) = &self.location {
            // Location contains no strings, so serialization cannot fail.
            if let Ok(encoded) = serde_json::to_string(location) {
                attributes.insert(SESSION_KEY_LOCATION.to_string(), encoded);
            }
        }

        attributes
    }
}

/// Inbound turn envelope from the host platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEvent {
    pub invocation_source: String,
    pub current_intent: CurrentIntent,
    #[serde(default)]
    pub session_attributes: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentIntent {
    pub name: String,
    pub slots: Slots,
}

/// Everything one turn needs, decoded once at turn start.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub intent: Intent,
    pub intent_name: String,
    pub phase: Phase,
    pub slots: Slots,
    pub session: Session,
}

impl TurnContext {
    /// Fails with [`BotError::UnsupportedIntent`] for intents the bot was
    /// never configured to handle; that is a deployment mismatch, not a
    /// user error.
    pub fn from_event(event: TurnEvent) -> Result<Self, BotError> {
        let intent = match event.current_intent.name.as_str() {
            "About" => Intent::About,
            "Weather" => Intent::Weather,
            other => return Err(BotError::UnsupportedIntent(other.to_string())),
        };

        let phase = if event.invocation_source == INVOCATION_DIALOG_CODE_HOOK {
            Phase::Gathering
        } else {
            Phase::Fulfilling
        };

        let session = event
            .session_attributes
            .as_ref()
            .map(Session::decode)
            .unwrap_or_default();

        Ok(Self {
            intent,
            intent_name: event.current_intent.name,
            phase,
            slots: event.current_intent.slots,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_json() -> serde_json::Value {
        serde_json::json!({
            "messageVersion": "1.0",
            "invocationSource": "FulfillmentCodeHook",
            "sessionAttributes": {},
            "currentIntent": {
                "name": "Weather",
                "slots": {
                    "Area": null,
                    "Time": "EV",
                    "City": "Berlin",
                    "Date": "2017-06-11"
                },
                "confirmationStatus": "None"
            },
            "inputTranscript": "weather tomorrow evening in Berlin"
        })
    }

    #[test]
    fn decodes_a_full_platform_event() {
        let event: TurnEvent = serde_json::from_value(event_json()).expect("event must decode");
        let context = TurnContext::from_event(event).expect("intent is known");

        assert_eq!(context.intent, Intent::Weather);
        assert_eq!(context.phase, Phase::Fulfilling);
        assert_eq!(context.slots.city.as_deref(), Some("Berlin"));
        assert_eq!(context.slots.date.as_deref(), Some("2017-06-11"));
        assert_eq!(context.slots.time.as_deref(), Some("EV"));
        assert_eq!(context.slots.area, None);
        assert_eq!(context.session.location, None);
    }

    #[test]
    fn dialog_code_hook_means_gathering() {
        let mut json = event_json();
        json["invocationSource"] = "DialogCodeHook".into();
        let event: TurnEvent = serde_json::from_value(json).expect("event must decode");
        let context = TurnContext::from_event(event).expect("intent is known");

        assert_eq!(context.phase, Phase::Gathering);
    }

    #[test]
    fn unknown_intent_is_fatal() {
        let mut json = event_json();
        json["currentIntent"]["name"] = "Greeting".into();
        let event: TurnEvent = serde_json::from_value(json).expect("event must decode");

        let err = TurnContext::from_event(event).unwrap_err();
        assert!(matches!(err, BotError::UnsupportedIntent(name) if name == "Greeting"));
    }

    #[test]
    fn session_round_trips_location_exactly() {
        let session = Session {
            location: Some(Location { lat: 52.520008, lng: 13.404954 }),
        };

        let decoded = Session::decode(&session.encode());
        assert_eq!(decoded.location, session.location);
    }

    #[test]
    fn session_attribute_values_are_json_strings() {
        let session = Session {
            location: Some(Location { lat: 1.2, lng: 3.4 }),
        };

        let attributes = session.encode();
        let raw = attributes.get("location").expect("location attribute present");
        let value: serde_json::Value = serde_json::from_str(raw).expect("value is JSON text");
        assert_eq!(value["lat"], 1.2);
        assert_eq!(value["lng"], 3.4);
    }

    #[test]
    fn undecodable_session_location_is_dropped() {
        let mut attributes = HashMap::new();
        attributes.insert("location".to_string(), "not json".to_string());

        assert_eq!(Session::decode(&attributes).location, None);
    }

    #[test]
    fn absent_slots_serialize_as_null() {
        let slots = Slots { city: Some("Berlin".to_string()), ..Slots::default() };
        let value = serde_json::to_value(&slots).expect("slots serialize");

        assert_eq!(value["City"], "Berlin");
        assert_eq!(value["Area"], serde_json::Value::Null);
        assert_eq!(value["Date"], serde_json::Value::Null);
        assert_eq!(value["Time"], serde_json::Value::Null);
    }
}
