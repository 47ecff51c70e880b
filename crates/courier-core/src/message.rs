//! Inbound message model.
//!
//! [`InMessage`] is what the platform pushes to the webhook endpoint, already
//! decrypted and decoded. The router only reads it; nothing in a dispatch
//! cycle mutates a message.

use serde::{Deserialize, Serialize};

/// Well-known values of the `MsgType` field.
pub mod msg_type {
    pub const TEXT: &str = "text";
    pub const IMAGE: &str = "image";
    pub const VOICE: &str = "voice";
    pub const VIDEO: &str = "video";
    pub const LOCATION: &str = "location";
    pub const LINK: &str = "link";
    pub const EVENT: &str = "event";
}

/// Well-known values of the `Event` field.
pub mod event {
    pub const SUBSCRIBE: &str = "subscribe";
    pub const UNSUBSCRIBE: &str = "unsubscribe";
    pub const SCAN: &str = "scan";
    pub const LOCATION: &str = "location";
    pub const CLICK: &str = "click";
    pub const VIEW: &str = "view";
}

/// A message or event pushed by the platform.
///
/// Every field is optional because the platform omits whatever does not
/// apply: events carry no `MsgId`, plain messages carry no `Event`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMessage {
    #[serde(rename = "ToUserName", default)]
    pub to_user: Option<String>,

    #[serde(rename = "FromUserName", default)]
    pub from_user: Option<String>,

    /// Seconds since the Unix epoch.
    #[serde(rename = "CreateTime", default)]
    pub create_time: Option<i64>,

    #[serde(rename = "MsgType", default)]
    pub msg_type: Option<String>,

    #[serde(rename = "Event", default)]
    pub event: Option<String>,

    #[serde(rename = "EventKey", default)]
    pub event_key: Option<String>,

    #[serde(rename = "Content", default)]
    pub content: Option<String>,

    #[serde(rename = "MsgId", default)]
    pub msg_id: Option<i64>,

    /// The payload exactly as received, when the message was decoded from one.
    #[serde(skip)]
    raw: Option<String>,
}

impl InMessage {
    /// Creates an empty message; fill it with the `with_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a JSON payload and keeps the original text as the raw form.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let mut message: Self = serde_json::from_str(raw)?;
        message.raw = Some(raw.to_owned());
        Ok(message)
    }

    pub fn with_to_user(mut self, to_user: impl Into<String>) -> Self {
        self.to_user = Some(to_user.into());
        self
    }

    pub fn with_from_user(mut self, from_user: impl Into<String>) -> Self {
        self.from_user = Some(from_user.into());
        self
    }

    pub fn with_create_time(mut self, create_time: i64) -> Self {
        self.create_time = Some(create_time);
        self
    }

    pub fn with_msg_type(mut self, msg_type: impl Into<String>) -> Self {
        self.msg_type = Some(msg_type.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_event_key(mut self, event_key: impl Into<String>) -> Self {
        self.event_key = Some(event_key.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_msg_id(mut self, msg_id: i64) -> Self {
        self.msg_id = Some(msg_id);
        self
    }

    /// Returns the payload this message was decoded from, if any.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Content with surrounding ASCII control characters and spaces removed.
    ///
    /// Unicode whitespace such as the ideographic space (U+3000) is kept.
    pub fn trimmed_content(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(|content| content.trim_matches(|c: char| c <= ' '))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_platform_field_names() {
        let raw = r#"{
            "ToUserName": "gh_123",
            "FromUserName": "o_user",
            "CreateTime": 1700000000,
            "MsgType": "event",
            "Event": "SUBSCRIBE",
            "EventKey": "qrscene_42"
        }"#;

        let message = InMessage::from_json(raw).unwrap();

        assert_eq!(message.from_user.as_deref(), Some("o_user"));
        assert_eq!(message.event.as_deref(), Some("SUBSCRIBE"));
        assert_eq!(message.event_key.as_deref(), Some("qrscene_42"));
        assert_eq!(message.create_time, Some(1_700_000_000));
        assert_eq!(message.msg_id, None);
        assert_eq!(message.raw(), Some(raw));
    }

    #[test]
    fn trimmed_content_strips_whitespace() {
        let message = InMessage::new().with_content("  hi \n");
        assert_eq!(message.trimmed_content(), Some("hi"));
        assert_eq!(InMessage::new().trimmed_content(), None);
    }

    #[test]
    fn ideographic_space_is_not_trimmed() {
        let message = InMessage::new().with_content("\u{3000}hi\u{3000}");
        assert_eq!(message.trimmed_content(), Some("\u{3000}hi\u{3000}"));
        let message = InMessage::new().with_content("\t\r\nhi\0");
        assert_eq!(message.trimmed_content(), Some("hi"));
    }
}
