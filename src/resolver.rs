//! The transcript resolver service object.
//!
//! Constructed once from settings, then shared by request handlers. It owns
//! the only cross-request state the service has: the cache handle and the
//! rate limiter. No process-wide singletons.

use crate::cache::{CacheKey, TranscriptCache};
use crate::config::Settings;
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::transcript::{select_track, TrackList, Transcript};
use crate::youtube::{CaptionSource, YoutubeCaptionSource};
use std::sync::Arc;
use tracing::{info, instrument};

/// Resolves caption transcripts for videos: track discovery, selection, cue
/// download, normalization, and caching.
pub struct Resolver {
    source: Arc<dyn CaptionSource>,
    cache: TranscriptCache,
    limiter: RateLimiter,
    default_languages: Vec<String>,
}

impl Resolver {
    /// Create a resolver backed by the real caption provider.
    pub fn new(settings: &Settings) -> Result<Self> {
        let source = Arc::new(YoutubeCaptionSource::new(&settings.proxy)?);
        Self::with_source(source, settings)
    }

    /// Create a resolver with a custom caption source (used by tests).
    pub fn with_source(source: Arc<dyn CaptionSource>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            source,
            cache: TranscriptCache::open(
                settings.cache_dir(),
                settings.resolver.cache_max_age_seconds,
            )?,
            limiter: RateLimiter::new(settings.resolver.requests_per_minute),
            default_languages: settings.resolver.default_languages.clone(),
        })
    }

    /// Resolve a transcript for a video, preferring the given language codes
    /// in order. Served from cache when fresh; otherwise fetched, normalized,
    /// and cached. Fails whole: no partial segment sequences are returned.
    #[instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str, languages: &[String]) -> Result<Transcript> {
        let languages = if languages.is_empty() {
            &self.default_languages
        } else {
            languages
        };

        // The cache is keyed by the first requested language; the selection
        // outcome is not known before fetching.
        let cache_language = languages.first().map(String::as_str).unwrap_or("en");
        let key = CacheKey::transcript(video_id, cache_language);

        if let Some(transcript) = self.cache.get::<Transcript>(&key) {
            return Ok(transcript);
        }

        self.limiter.acquire().await;
        let track_list = self.source.list_tracks(video_id).await?;

        let selection = select_track(&track_list, languages)?;
        info!(
            "Selected {} track '{}'{}",
            if selection.track.is_auto_generated {
                "auto-generated"
            } else {
                "manual"
            },
            selection.track.language_code,
            selection
                .translate_to
                .as_deref()
                .map(|t| format!(" (translating to '{}')", t))
                .unwrap_or_default(),
        );

        self.limiter.acquire().await;
        let segments = self
            .source
            .fetch_cues(selection.track, selection.translate_to.as_deref())
            .await?;

        let transcript = Transcript::new(
            video_id.to_string(),
            selection
                .translate_to
                .clone()
                .unwrap_or_else(|| selection.track.language_code.clone()),
            selection.track.is_auto_generated,
            segments,
        );

        self.cache.put(&key, &transcript);
        Ok(transcript)
    }

    /// List the caption tracks the provider exposes for a video.
    #[instrument(skip(self))]
    pub async fn available_tracks(&self, video_id: &str) -> Result<TrackList> {
        self.limiter.acquire().await;
        self.source.list_tracks(video_id).await
    }

    /// The shared cache handle (also used by the legacy audio fallback).
    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UndertekstError;
    use crate::transcript::{CaptionTrack, TranscriptSegment};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        list: std::result::Result<TrackList, &'static str>,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn with_tracks(tracks: Vec<CaptionTrack>) -> Self {
            Self {
                list: Ok(TrackList {
                    tracks,
                    translation_languages: vec![],
                }),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CaptionSource for FakeSource {
        async fn list_tracks(&self, video_id: &str) -> Result<TrackList> {
            match &self.list {
                Ok(list) => Ok(list.clone()),
                Err(_) => Err(UndertekstError::VideoUnavailable(video_id.to_string())),
            }
        }

        async fn fetch_cues(
            &self,
            track: &CaptionTrack,
            _translate_to: Option<&str>,
        ) -> Result<Vec<TranscriptSegment>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![TranscriptSegment::new(
                format!("cues for {}", track.language_code),
                0.0,
                1.0,
            )])
        }
    }

    fn track(lang: &str, auto: bool) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("http://example/api/{}", lang),
            language_code: lang.to_string(),
            language: None,
            is_auto_generated: auto,
            is_translatable: false,
        }
    }

    fn test_settings(dir: &std::path::Path, max_age: u64) -> Settings {
        let mut settings = Settings::default();
        settings.resolver.cache_dir = dir.to_string_lossy().into_owned();
        settings.resolver.cache_max_age_seconds = max_age;
        settings
    }

    fn prefs(langs: &[&str]) -> Vec<String> {
        langs.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_manual_track_preferred_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_tracks(vec![
            track("en", false),
            track("en", true),
            track("es", false),
        ]));
        let resolver =
            Resolver::with_source(source, &test_settings(dir.path(), 600)).unwrap();

        let transcript = resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();
        assert_eq!(transcript.language_code, "en");
        assert!(!transcript.is_auto_generated);
    }

    #[tokio::test]
    async fn test_provider_default_fallback_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_tracks(vec![track("es", false)]));
        let resolver =
            Resolver::with_source(source, &test_settings(dir.path(), 600)).unwrap();

        // No English track and no translation capability: falls back to the
        // Spanish track rather than failing.
        let transcript = resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();
        assert_eq!(transcript.language_code, "es");
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_provider() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_tracks(vec![track("en", false)]));
        let resolver =
            Resolver::with_source(source.clone(), &test_settings(dir.path(), 600)).unwrap();

        let first = resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();
        let second = resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.plain_text(), second.plain_text());
    }

    #[tokio::test]
    async fn test_max_age_zero_always_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_tracks(vec![track("en", false)]));
        let resolver =
            Resolver::with_source(source.clone(), &test_settings(dir.path(), 0)).unwrap();

        resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();
        resolver.resolve("vid12345678", &prefs(&["en"])).await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_availability_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource {
            list: Err("gone"),
            fetches: AtomicUsize::new(0),
        });
        let resolver =
            Resolver::with_source(source, &test_settings(dir.path(), 600)).unwrap();

        let err = resolver
            .resolve("vid12345678", &prefs(&["en"]))
            .await
            .unwrap_err();
        assert!(matches!(err, UndertekstError::VideoUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_preferences_use_configured_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::with_tracks(vec![
            track("de", false),
            track("en", false),
        ]));
        let resolver =
            Resolver::with_source(source, &test_settings(dir.path(), 600)).unwrap();

        // Default preference list starts with "en".
        let transcript = resolver.resolve("vid12345678", &[]).await.unwrap();
        assert_eq!(transcript.language_code, "en");
    }
}
