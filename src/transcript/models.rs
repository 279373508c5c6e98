//! Data models for caption tracks and transcripts.

use serde::{Deserialize, Serialize};

// ============================================================================
// Caption Track Types
// ============================================================================

/// One available caption stream for a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Provider URL the cues are downloaded from.
    pub base_url: String,
    /// BCP-47 language code (e.g. "en", "en-US").
    pub language_code: String,
    /// Human-readable language name, if the provider supplied one.
    pub language: Option<String>,
    /// True for machine-generated (ASR) tracks.
    pub is_auto_generated: bool,
    /// True if the provider can translate this track on the fly.
    pub is_translatable: bool,
}

/// The set of caption tracks a video exposes, in provider-default order,
/// plus the provider's shared list of translation target languages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackList {
    pub tracks: Vec<CaptionTrack>,
    pub translation_languages: Vec<String>,
}

impl TrackList {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Whether any track can be translated into the given language.
    pub fn can_translate_to(&self, language_code: &str) -> bool {
        self.translation_languages.iter().any(|l| l == language_code)
            && self.tracks.iter().any(|t| t.is_translatable)
    }
}

// ============================================================================
// Core Transcript Types
// ============================================================================

/// A single timed cue of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Cue text, joined into a single line.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// Duration in seconds.
    pub duration_seconds: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: String, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text,
            start_seconds,
            duration_seconds,
        }
    }

    /// End time in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// A resolved transcript: the ordered segment sequence plus the metadata of
/// the selected caption track. Immutable once produced; segments keep the
/// provider's delivered order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Language code of the selected track (or the translation target).
    pub language_code: String,
    /// Whether the selected track was machine-generated.
    pub is_auto_generated: bool,
    /// Ordered transcript segments.
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(
        video_id: String,
        language_code: String,
        is_auto_generated: bool,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            video_id,
            language_code,
            is_auto_generated,
            segments,
        }
    }

    /// Segment texts joined with a single space, no timing information.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Total duration in seconds (end of the last segment).
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end_seconds()).unwrap_or(0.0)
    }
}
