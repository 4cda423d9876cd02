//! Outbound reply envelope for the host dialogue platform.

use std::collections::HashMap;

use serde::Serialize;

use crate::context::{Slots, TurnContext};
use crate::error::ValidationError;

pub const CONTENT_TYPE_PLAIN_TEXT: &str = "PlainText";
pub const CONTENT_TYPE_GENERIC_CARD: &str = "application/vnd.amazonaws.card.generic";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content_type: &'static str,
    pub content: String,
}

impl Message {
    pub fn plain_text(content: impl Into<String>) -> Self {
        Self { content_type: CONTENT_TYPE_PLAIN_TEXT, content: content.into() }
    }
}

/// A rich-media attachment shown alongside the plain-text reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCard {
    pub content_type: &'static str,
    pub generic_attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub title: String,
    pub sub_title: String,
    pub image_url: String,
    pub attachment_link_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DialogAction {
    #[serde(rename_all = "camelCase")]
    ElicitSlot {
        intent_name: String,
        slots: Slots,
        slot_to_elicit: &'static str,
        message: Message,
    },

    Delegate { slots: Slots },

    #[serde(rename_all = "camelCase")]
    Close {
        fulfillment_state: &'static str,
        message: Message,
        #[serde(skip_serializing_if = "Option::is_none")]
        response_card: Option<ResponseCard>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub session_attributes: HashMap<String, String>,
    pub dialog_action: DialogAction,
}

impl TurnResponse {
    /// Ask the user for the offending slot again. The elicited slot's value
    /// is cleared in the returned slot map so the platform re-collects it.
    pub fn elicit_slot(context: &TurnContext, error: &ValidationError) -> Self {
        let mut slots = context.slots.clone();
        slots.clear(error.slot);

        Self {
            session_attributes: HashMap::new(),
            dialog_action: DialogAction::ElicitSlot {
                intent_name: context.intent_name.clone(),
                slots,
                slot_to_elicit: error.slot.as_str(),
                message: Message::plain_text(error.message.clone()),
            },
        }
    }

    /// Hand control back to the platform to continue slot collection.
    pub fn delegate(context: &TurnContext) -> Self {
        Self {
            session_attributes: context.session.encode(),
            dialog_action: DialogAction::Delegate { slots: context.slots.clone() },
        }
    }

    /// End the dialogue with a fulfilled answer.
    pub fn close(context: &TurnContext, message: Message, response_card: Option<ResponseCard>) -> Self {
        Self {
            session_attributes: context.session.encode(),
            dialog_action: DialogAction::Close {
                fulfillment_state: "Fulfilled",
                message,
                response_card,
            },
        }
    }
}
