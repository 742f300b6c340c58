//! Ordered chat history plus the image attachment lifecycle.
//!
//! Invariants kept by every method:
//! - at most one system message, and if present it is at index 0
//! - relative order of non-system messages never changes
//! - after [`ConversationState::clear_image`] no message carries an image

use tracing::debug;
use veloce_core::message::{Content, ContentPart, ImageAttachment, Message, Role};

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    current_image: Option<ImageAttachment>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with `system` at index 0.
    pub fn with_system_prompt(system: Message) -> Self {
        let mut state = Self::new();
        state.refresh_system_prompt(system);
        state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_image(&self) -> Option<&ImageAttachment> {
        self.current_image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.current_image.is_some()
    }

    pub fn system_prompt(&self) -> Option<&Message> {
        self.messages.first().filter(|m| m.role == Role::System)
    }

    /// Messages the user sees (everything but the system prompt).
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a user turn. Carries the current image when one is attached.
    pub fn append_user(&mut self, text: impl Into<String>) -> &Message {
        let mut parts = vec![ContentPart::Text(text.into())];
        if let Some(image) = &self.current_image {
            parts.push(ContentPart::Image(image.reference()));
        }
        self.push(Message::user_parts(parts))
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) -> &Message {
        self.push(Message::assistant(text))
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    /// Replace the system prompt, or insert one if there is none.
    pub fn refresh_system_prompt(&mut self, system: Message) {
        debug_assert_eq!(system.role, Role::System);
        self.messages.retain(|m| m.role != Role::System);
        self.messages.insert(0, system);
    }

    /// Attach an image for following turns, replacing any previous one.
    pub fn attach_image(&mut self, image: ImageAttachment) {
        debug!(?image, "Image attached");
        self.current_image = Some(image);
    }

    /// Drop the current image and strip every image from history.
    ///
    /// Multi-part messages collapse to their space-joined text. Messages
    /// left without text (image-only turns) are removed.
    pub fn clear_image(&mut self) {
        if self.current_image.take().is_some() {
            debug!("Image cleared");
        }

        let before = self.messages.len();
        self.messages = std::mem::take(&mut self.messages)
            .into_iter()
            .filter_map(|mut message| {
                if let Content::Parts(_) = message.content {
                    let text = message.content.text_parts();
                    if text.is_empty() {
                        return None;
                    }
                    message.content = Content::Text(text);
                }
                Some(message)
            })
            .collect();

        let dropped = before - self.messages.len();
        if dropped > 0 {
            debug!(dropped, "Removed image-only messages");
        }
    }

    /// Number of image references anywhere in history.
    pub fn image_ref_count(&self) -> usize {
        self.messages
            .iter()
            .map(|m| m.content.image_refs().len())
            .sum()
    }
}
