use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub messages: Option<Vec<MessageId>>,
}

#[derive(Debug, Deserialize)]
pub struct MessageId {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Message {
    pub id: Option<String>,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessagePart {
    pub headers: Option<Vec<Header>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl Header {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            value: Some(value.to_string()),
        }
    }
}

/// Find a header value by name. Gmail returns canonical casing but the
/// comparison is case-insensitive like RFC 5322 header names.
pub fn header_value<'a>(headers: &'a [Header], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| {
            h.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|h| h.value.as_deref())
}

pub const NO_SUBJECT: &str = "No Subject";
pub const UNKNOWN_DATE: &str = "Unknown Date";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRef {
    pub id: String,
    pub subject: String,
    pub date: String,
}

impl MessageRef {
    pub fn new(id: String, subject: Option<&str>, date: Option<&str>) -> Self {
        Self {
            id,
            subject: subject.unwrap_or(NO_SUBJECT).to_string(),
            date: date.unwrap_or(UNKNOWN_DATE).to_string(),
        }
    }
}

/// A listed message together with the raw `From` header it was sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderRecord {
    pub sender: String,
    pub message: MessageRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderGroup {
    #[serde(rename = "sender")]
    pub display_label: String,
    pub email: String,
    pub count: usize,
    #[serde(rename = "messageIds")]
    pub messages: Vec<MessageRef>,
}
