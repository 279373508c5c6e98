//! Filesystem cache for resolved transcripts.
//!
//! One JSON file per cache key, replaced wholesale when stale. The cache is a
//! pure optimization: every entry is re-derivable from a fresh fetch of the
//! same inputs, so concurrent fetchers may overwrite each other freely and
//! read/write failures are non-fatal (a failed read is a miss, a failed write
//! is logged and ignored). There is no eviction beyond max-age replacement.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key for one cache entry: a video ID plus a discriminator (the requested
/// language code, or `audio` for the legacy fallback).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    video_id: String,
    discriminator: String,
}

impl CacheKey {
    /// Key for a (video, requested language) transcript.
    pub fn transcript(video_id: &str, language_code: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            discriminator: language_code.to_string(),
        }
    }

    /// Key for the legacy audio-transcription fallback.
    pub fn audio(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            discriminator: "audio".to_string(),
        }
    }

    fn file_name(&self) -> String {
        format!(
            "{}.{}.json",
            sanitize(&self.video_id),
            sanitize(&self.discriminator)
        )
    }
}

/// Keep cache file names portable; video IDs and language codes are already
/// in this alphabet, anything else is defanged.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Serialize, Deserialize)]
struct Entry<T> {
    fetched_at: i64,
    value: T,
}

/// On-disk, time-bounded cache keyed by [`CacheKey`].
pub struct TranscriptCache {
    dir: PathBuf,
    max_age_seconds: u64,
}

impl TranscriptCache {
    /// Open (and create if needed) a cache directory.
    pub fn open(dir: PathBuf, max_age_seconds: u64) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_age_seconds,
        })
    }

    /// Look up a fresh entry. Entries at or past max-age are misses, so a
    /// max-age of zero disables the cache entirely.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let path = self.dir.join(key.file_name());
        let content = std::fs::read_to_string(&path).ok()?;

        let entry: Entry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding unreadable cache entry {:?}: {}", path, e);
                return None;
            }
        };

        let age = chrono::Utc::now().timestamp().saturating_sub(entry.fetched_at);
        if age < 0 || age as u64 >= self.max_age_seconds {
            debug!("Cache entry {:?} is stale (age {}s)", path, age);
            return None;
        }

        debug!("Cache hit for {:?}", path);
        Some(entry.value)
    }

    /// Store an entry, replacing any previous one. Written atomically via a
    /// temp file so a concurrent reader never sees a partial entry.
    pub fn put<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let entry = Entry {
            fetched_at: chrono::Utc::now().timestamp(),
            value,
        };

        if let Err(e) = self.write_entry(&key.file_name(), &entry) {
            warn!("Cache write failed for {:?}: {}", key, e);
        }
    }

    fn write_entry<T: Serialize>(&self, file_name: &str, entry: &Entry<&T>) -> Result<()> {
        let path = self.dir.join(file_name);
        let tmp_path = self.dir.join(format!("{}.tmp", file_name));

        let content = serde_json::to_string(entry)?;
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
