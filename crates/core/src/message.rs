//! Message and image-attachment domain types.
//!
//! These are the value objects that flow through the whole conversation:
//! user turn → command router or response pipeline → assistant turn.
//! Content is a tagged union so every consumer has to handle both the plain
//! text shape and the multi-part (text + image) shape.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, vehicle and environment context)
    System,
    /// The driver
    User,
    /// The assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Opaque reference to an image, usually a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One element of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    Image(ImageRef),
}

/// Message content: either a single string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl Content {
    /// All text of this content. Text parts are joined with a single space.
    pub fn text_parts(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text(text) => Some(text.as_str()),
                    ContentPart::Image(_) => None,
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Every image reference carried by this content.
    pub fn image_refs(&self) -> Vec<&ImageRef> {
        match self {
            Content::Text(_) => Vec::new(),
            Content::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Image(image) => Some(image),
                    ContentPart::Text(_) => None,
                })
                .collect(),
        }
    }

    pub fn is_parts(&self) -> bool {
        matches!(self, Content::Parts(_))
    }

    /// The string content, if this is the plain text shape.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Parts(_) => None,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// Text or multi-part content
    pub content: Content,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with arbitrary role and content.
    pub fn new(role: Role, content: impl Into<Content>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, Content::Text(content.into()))
    }

    /// Create a new plain-text user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, Content::Text(content.into()))
    }

    /// Create a multi-part user message.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(Role::User, Content::Parts(parts))
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::Text(content.into()))
    }
}

/// The single image currently attached to a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    mime_type: String,
    encoded: String,
}

impl ImageAttachment {
    /// Encode raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            encoded: STANDARD.encode(bytes),
        }
    }

    /// Wrap an already base64-encoded payload.
    pub fn from_encoded(encoded: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            encoded: encoded.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The `data:` URL placed into user turns.
    pub fn reference(&self) -> ImageRef {
        ImageRef(format!("data:{};base64,{}", self.mime_type, self.encoded))
    }

    /// Whether `image` points at this attachment.
    ///
    /// A reference matches when it ends with this attachment's payload, so
    /// both the full data URL and the bare payload are recognised.
    pub fn matches(&self, image: &ImageRef) -> bool {
        !self.encoded.is_empty() && image.0.ends_with(&self.encoded)
    }
}

// Payloads are large; keep them out of logs.
impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}
