//! Legacy audio-download-and-transcribe fallback.
//!
//! Superseded by caption resolution but kept for videos with no caption
//! track: downloads the audio with yt-dlp and transcribes it with an OpenAI
//! model, caching the response payload through the same cache layer the
//! resolver uses.

mod downloader;

pub use downloader::download_audio;

use crate::cache::{CacheKey, TranscriptCache};
use crate::config::Settings;
use crate::error::{Result, UndertekstError};
use async_openai::types::CreateTranscriptionRequestArgs;
use async_openai::{config::OpenAIConfig, Client};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// Timeout for transcription API requests (5 minutes).
const API_TIMEOUT_SECS: u64 = 300;

/// Response payload of the legacy `/transcribe` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackResponse {
    pub success: bool,
    pub transcript: String,
    pub source: String,
    pub url: String,
    pub model: String,
    pub cached: bool,
    pub timestamp: String,
}

/// Audio transcription fallback service.
pub struct AudioFallback {
    client: Client<OpenAIConfig>,
    model: String,
    temp_dir: PathBuf,
}

impl AudioFallback {
    pub fn new(settings: &Settings) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client: Client::with_config(OpenAIConfig::default()).with_http_client(http_client),
            model: settings.fallback.model.clone(),
            temp_dir: settings.temp_dir(),
        }
    }

    /// Transcribe a video's audio, serving from cache when a fresh entry for
    /// the same video exists.
    #[instrument(skip(self, cache))]
    pub async fn transcribe_url(
        &self,
        cache: &TranscriptCache,
        youtube_url: &str,
    ) -> Result<FallbackResponse> {
        let video_id = crate::youtube::extract_video_id(youtube_url)
            .ok_or_else(|| UndertekstError::InvalidVideoId(youtube_url.to_string()))?;

        let key = CacheKey::audio(&video_id);
        if let Some(mut response) = cache.get::<FallbackResponse>(&key) {
            response.cached = true;
            return Ok(response);
        }

        let scratch = tempfile::tempdir_in(&self.temp_dir)?;
        let audio_path = download_audio(youtube_url, &video_id, scratch.path()).await?;

        info!("Transcribing audio with {}", self.model);
        let text = self.transcribe_file(&audio_path).await?;

        let response = FallbackResponse {
            success: true,
            transcript: text,
            source: "youtube".to_string(),
            url: youtube_url.to_string(),
            model: self.model.clone(),
            cached: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        cache.put(&key, &response);
        Ok(response)
    }

    async fn transcribe_file(&self, audio_path: &std::path::Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .build()
            .map_err(|e| UndertekstError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| UndertekstError::OpenAI(format!("Transcription API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }
}
