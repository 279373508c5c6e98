//! Caption track selection.
//!
//! Encodes a quality preference: human-authored tracks beat machine-generated
//! ones, which beat on-the-fly translations. The first matching step wins and
//! later steps are never evaluated.

use super::models::{CaptionTrack, TrackList};
use crate::error::{Result, UndertekstError};

/// The outcome of track selection: which track to download, and whether the
/// provider should translate it on the fly.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub track: &'a CaptionTrack,
    /// Target language code when the match came from the translation step.
    pub translate_to: Option<String>,
}

/// Select the best-matching caption track for an ordered list of preferred
/// language codes.
///
/// Priority order, first match wins:
/// 1. Exact language-code match among manually-created tracks, in preference order.
/// 2. Exact language-code match among auto-generated tracks, in preference order.
/// 3. A translatable track when the provider can translate into the first
///    preferred language.
/// 4. The first available track in provider-default order.
pub fn select_track<'a>(list: &'a TrackList, preferred: &[String]) -> Result<Selection<'a>> {
    if list.is_empty() {
        return Err(UndertekstError::NoTranscriptAvailable(
            "video has no caption tracks".to_string(),
        ));
    }

    // 1. Manual tracks, caller's preference order.
    for lang in preferred {
        if let Some(track) = find_exact(&list.tracks, lang, false) {
            return Ok(Selection {
                track,
                translate_to: None,
            });
        }
    }

    // 2. Auto-generated tracks, caller's preference order.
    for lang in preferred {
        if let Some(track) = find_exact(&list.tracks, lang, true) {
            return Ok(Selection {
                track,
                translate_to: None,
            });
        }
    }

    // 3. Translate any translatable track into the first preference.
    if let Some(target) = preferred.first() {
        if list.can_translate_to(target) {
            if let Some(track) = list.tracks.iter().find(|t| t.is_translatable) {
                return Ok(Selection {
                    track,
                    translate_to: Some(target.clone()),
                });
            }
        }
    }

    // 4. Provider-default fallback: first available track. Callers expecting
    // a specific language should inspect the returned language code.
    let track = &list.tracks[0];
    Ok(Selection {
        track,
        translate_to: None,
    })
}

fn find_exact<'a>(
    tracks: &'a [CaptionTrack],
    language_code: &str,
    auto_generated: bool,
) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.is_auto_generated == auto_generated && t.language_code == language_code)
}
