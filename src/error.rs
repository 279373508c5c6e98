//! Error types for Undertekst.

use thiserror::Error;

/// Library-level error type for Undertekst operations.
///
/// The transcript resolution variants (`InvalidVideoId`, `VideoUnavailable`,
/// `TranscriptsDisabled`, `NoTranscriptAvailable`, `TranscriptFetch`) are
/// deliberately distinct so callers can branch on them. Transport failures
/// are mapped into `TranscriptFetch` at the call site rather than converted
/// with `#[from]`, keeping them separate from availability errors.
#[derive(Error, Debug)]
pub enum UndertekstError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid video ID or URL: {0}")]
    InvalidVideoId(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Captions are disabled for video: {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript available for video: {0}")]
    NoTranscriptAvailable(String),

    #[error("Transcript fetch failed: {0}")]
    TranscriptFetch(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl UndertekstError {
    /// Whether this error means the video exists but no usable transcript
    /// could be resolved for it (as opposed to a transport failure).
    pub fn is_availability_error(&self) -> bool {
        matches!(
            self,
            UndertekstError::VideoUnavailable(_)
                | UndertekstError::TranscriptsDisabled(_)
                | UndertekstError::NoTranscriptAvailable(_)
        )
    }
}

/// Result type alias for Undertekst operations.
pub type Result<T> = std::result::Result<T, UndertekstError>;
