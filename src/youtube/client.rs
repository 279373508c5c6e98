//! HTTP client for the caption provider.

use super::player;
use crate::config::ProxySettings;
use crate::error::{Result, UndertekstError};
use crate::transcript::{CaptionTrack, TrackList, TranscriptSegment};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Upstream imposes no deadline of its own, so the client carries one.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Trait for caption track providers.
///
/// Each method performs exactly one network attempt; retries, if any, are the
/// caller's responsibility.
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Discover which caption tracks exist for a video.
    async fn list_tracks(&self, video_id: &str) -> Result<TrackList>;

    /// Download and normalize the cues of a selected track, optionally
    /// translated on the fly by the provider.
    async fn fetch_cues(
        &self,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>>;
}

/// Caption source backed by YouTube's watch page and timedtext endpoint.
pub struct YoutubeCaptionSource {
    http: reqwest::Client,
}

impl YoutubeCaptionSource {
    /// Create a source, routing every provider request through the configured
    /// proxy when one is present.
    pub fn new(proxy: &ProxySettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT);

        if let Some(proxy) = super::build_proxy(proxy)? {
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| UndertekstError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| UndertekstError::TranscriptFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(UndertekstError::TranscriptFetch(format!(
                "provider returned HTTP {} for {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| UndertekstError::TranscriptFetch(e.to_string()))
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptionSource {
    #[instrument(skip(self))]
    async fn list_tracks(&self, video_id: &str) -> Result<TrackList> {
        let body = self.get_text(&super::watch_url(video_id)).await?;
        let list = player::parse_track_list(video_id, &body)?;
        debug!("Found {} caption tracks", list.tracks.len());
        Ok(list)
    }

    #[instrument(skip(self, track), fields(language = %track.language_code))]
    async fn fetch_cues(
        &self,
        track: &CaptionTrack,
        translate_to: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>> {
        let url = cue_url(&track.base_url, translate_to)?;
        let body = self.get_text(&url).await?;
        let segments = player::decode_cues(&body)?;
        debug!("Fetched {} cues", segments.len());
        Ok(segments)
    }
}

/// Build the cue download URL: the track's base URL with the json3 format
/// marker and, when translating, the target language.
fn cue_url(base_url: &str, translate_to: Option<&str>) -> Result<String> {
    let mut url = url::Url::parse(base_url)
        .map_err(|e| UndertekstError::TranscriptFetch(format!("bad caption track URL: {}", e)))?;

    url.query_pairs_mut().append_pair("fmt", "json3");
    if let Some(lang) = translate_to {
        url.query_pairs_mut().append_pair("tlang", lang);
    }

    Ok(url.into())
}
