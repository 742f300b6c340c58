//! YouTube music search; playback opens the watch URL in a local player.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};
use veloce_core::error::ProviderError;
use veloce_core::music::{MusicProvider, PlayableRef};
use veloce_providers::http;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

pub struct YouTubeMusic {
    search_url: String,
    api_key: String,
    player_command: String,
    client: reqwest::Client,
}

impl YouTubeMusic {
    pub fn new(
        search_url: impl Into<String>,
        api_key: impl Into<String>,
        player_command: impl Into<String>,
    ) -> Self {
        Self {
            search_url: search_url.into(),
            api_key: api_key.into(),
            player_command: player_command.into(),
            client: http::client(10),
        }
    }
}

#[async_trait]
impl MusicProvider for YouTubeMusic {
    fn name(&self) -> &str {
        "youtube"
    }

    async fn search(&self, query: &str) -> Result<Option<PlayableRef>, ProviderError> {
        debug!(query, "Searching music");

        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", "1"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(self.name(), response).await?;
        let body: SearchResponse = http::json_body(response).await?;

        Ok(body.items.into_iter().find_map(|item| {
            let video_id = item.id.video_id?;
            let playable = PlayableRef::new(format!("{WATCH_URL}{video_id}"));
            Some(match item.snippet {
                Some(snippet) => playable.with_title(snippet.title),
                None => playable,
            })
        }))
    }

    async fn play(&self, item: &PlayableRef) -> Result<bool, ProviderError> {
        match Command::new(&self.player_command).arg(&item.url).spawn() {
            Ok(_) => {
                info!(url = %item.url, "Playback started");
                Ok(true)
            }
            Err(e) => {
                warn!(command = %self.player_command, error = %e, "Could not launch player");
                Ok(false)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}
