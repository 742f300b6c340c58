//! Music search and playback.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Something a music provider knows how to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableRef {
    /// Title shown to the user, when the provider knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Provider-specific location (e.g. a watch URL)
    pub url: String,
}

impl PlayableRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            title: None,
            url: url.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[async_trait]
pub trait MusicProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Find the best match for a free-text query.
    async fn search(&self, query: &str) -> Result<Option<PlayableRef>, ProviderError>;

    /// Start playback. `Ok(false)` means the player could not be launched.
    async fn play(&self, item: &PlayableRef) -> Result<bool, ProviderError>;
}
