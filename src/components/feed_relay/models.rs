use serde::{Deserialize, Serialize};

use crate::error::RelayResult;

/// Content type of the calendar invitation attachment
pub const INVITE_CONTENT_TYPE: &str = "text/calendar; method=REQUEST; charset=UTF-8";

/// An email address with a display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Identity {
    pub email: String,
    pub name: String,
}

impl Identity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// Fixed texts used for every outbound invitation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplate {
    pub subject: String,
    /// Body text; `{name}` is replaced by the recipient's name
    pub text_template: String,
    pub filename: String,
    pub content_id: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            subject: "Your feed dates & times".to_string(),
            text_template: "Dear {name}, the feed you've subscribed to features a new event."
                .to_string(),
            filename: "invite.ics".to_string(),
            content_id: "id1".to_string(),
        }
    }
}

impl MessageTemplate {
    /// Parse a TOML overlay; absent keys keep their defaults
    pub fn from_toml(content: &str) -> RelayResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn text_for(&self, recipient: &Identity) -> String {
        self.text_template.replace("{name}", &recipient.name)
    }
}

/// An attachment embedded in the message by content id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InlineAttachment {
    pub content_type: String,
    pub filename: String,
    #[serde(rename = "ContentID")]
    pub content_id: String,
    pub base64_content: String,
}

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationPayload {
    pub from: Identity,
    pub to: Vec<Identity>,
    pub subject: String,
    pub text_part: String,
    pub inlined_attachments: Vec<InlineAttachment>,
}

/// Body of a send request: `{"Messages": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SendRequest {
    pub messages: Vec<NotificationPayload>,
}

impl SendRequest {
    pub fn single(payload: NotificationPayload) -> Self {
        Self {
            messages: vec![payload],
        }
    }
}

/// What the delivery gateway answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
}

/// Outcome of one pass over a feed snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// VEVENT components found in the feed
    pub events_found: usize,
    /// Events that made it to a send request
    pub prepared: usize,
    /// Send requests the gateway accepted
    pub delivered: usize,
    /// Events that failed preparation or delivery
    pub failed: usize,
}
