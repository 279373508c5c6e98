//! Typed decoding of the watch page's embedded player response.
//!
//! The watch page carries a `ytInitialPlayerResponse` JSON blob with the
//! playability status and the caption tracklist. Both the player response and
//! the json3 cue payload are decoded into explicit serde structs rather than
//! sniffed at runtime.

use crate::error::{Result, UndertekstError};
use crate::transcript::{CaptionTrack, TrackList, TranscriptSegment};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)")
        .expect("Invalid regex")
});

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayerResponse {
    playability_status: Option<RawPlayabilityStatus>,
    captions: Option<RawCaptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptions {
    player_captions_tracklist_renderer: Option<RawTracklistRenderer>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawTracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawCaptionTrack>,
    #[serde(default)]
    translation_languages: Vec<RawTranslationLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,
    language_code: String,
    /// "asr" marks auto-generated tracks.
    kind: Option<String>,
    #[serde(default)]
    is_translatable: bool,
    name: Option<RawTrackName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrackName {
    simple_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTranslationLanguage {
    language_code: String,
}

/// Extract and decode the caption track list from a watch page body.
///
/// Playability mapping: `ERROR`, `LOGIN_REQUIRED`, and `UNPLAYABLE` all mean
/// the video cannot be resolved (deleted, private, or region-blocked); a
/// missing captions renderer means the owner disabled captions; an empty
/// track list means captions are enabled but no track exists.
pub fn parse_track_list(video_id: &str, page_body: &str) -> Result<TrackList> {
    let caps = PLAYER_RESPONSE_RE.captures(page_body).ok_or_else(|| {
        UndertekstError::InvalidVideoId(format!(
            "no player response found for video {}",
            video_id
        ))
    })?;

    let raw: RawPlayerResponse = serde_json::from_str(&caps[1]).map_err(|e| {
        UndertekstError::TranscriptFetch(format!("malformed player response: {}", e))
    })?;

    if let Some(status) = &raw.playability_status {
        match status.status.as_deref() {
            Some("OK") | None => {}
            Some(_) => {
                let reason = status
                    .reason
                    .clone()
                    .unwrap_or_else(|| "video is not playable".to_string());
                return Err(UndertekstError::VideoUnavailable(format!(
                    "{}: {}",
                    video_id, reason
                )));
            }
        }
    }

    let renderer = raw
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .ok_or_else(|| UndertekstError::TranscriptsDisabled(video_id.to_string()))?;

    if renderer.caption_tracks.is_empty() {
        return Err(UndertekstError::NoTranscriptAvailable(
            video_id.to_string(),
        ));
    }

    Ok(TrackList {
        tracks: renderer
            .caption_tracks
            .into_iter()
            .map(|t| CaptionTrack {
                base_url: t.base_url,
                language_code: t.language_code,
                language: t.name.and_then(|n| n.simple_text),
                is_auto_generated: t.kind.as_deref() == Some("asr"),
                is_translatable: t.is_translatable,
            })
            .collect(),
        translation_languages: renderer
            .translation_languages
            .into_iter()
            .map(|l| l.language_code)
            .collect(),
    })
}

// json3 cue payload: {"events": [{"tStartMs", "dDurationMs", "segs": [{"utf8"}]}]}

#[derive(Debug, Deserialize)]
struct RawCueList {
    #[serde(default)]
    events: Vec<RawCueEvent>,
}

#[derive(Debug, Deserialize)]
struct RawCueEvent {
    #[serde(rename = "tStartMs")]
    start_ms: Option<i64>,
    #[serde(rename = "dDurationMs")]
    duration_ms: Option<i64>,
    segs: Option<Vec<RawCueSeg>>,
}

#[derive(Debug, Deserialize)]
struct RawCueSeg {
    utf8: Option<String>,
}

/// Decode a json3 cue payload into the canonical segment sequence.
///
/// Multi-line cue text is joined into a single line; events without text
/// (window styling, timing-only markers) are skipped. Segments keep the
/// provider's delivered order and are never re-sorted, even if the provider
/// were to deliver them out of timestamp order.
pub fn decode_cues(body: &str) -> Result<Vec<TranscriptSegment>> {
    let raw: RawCueList = serde_json::from_str(body)
        .map_err(|e| UndertekstError::TranscriptFetch(format!("malformed cue payload: {}", e)))?;

    let segments = raw
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text = segs
                .into_iter()
                .filter_map(|s| s.utf8)
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();

            if text.is_empty() {
                return None;
            }

            Some(TranscriptSegment::new(
                text,
                event.start_ms.unwrap_or(0) as f64 / 1000.0,
                event.duration_ms.unwrap_or(0) as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with(player_response: &str) -> String {
        format!(
            "<html><script>var ytInitialPlayerResponse = {};</script></html>",
            player_response
        )
    }

    #[test]
    fn test_parse_track_list() {
        let body = page_with(
            r#"{
                "playabilityStatus": {"status": "OK"},
                "captions": {
                    "playerCaptionsTracklistRenderer": {
                        "captionTracks": [
                            {
                                "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=en",
                                "languageCode": "en",
                                "name": {"simpleText": "English"},
                                "isTranslatable": true
                            },
                            {
                                "baseUrl": "https://www.youtube.com/api/timedtext?v=abc&lang=en&kind=asr",
                                "languageCode": "en",
                                "kind": "asr",
                                "isTranslatable": true
                            }
                        ],
                        "translationLanguages": [
                            {"languageCode": "de", "languageName": {"simpleText": "German"}}
                        ]
                    }
                }
            }"#,
        );

        let list = parse_track_list("abc12345678", &body).unwrap();
        assert_eq!(list.tracks.len(), 2);
        assert!(!list.tracks[0].is_auto_generated);
        assert!(list.tracks[1].is_auto_generated);
        assert_eq!(list.tracks[0].language.as_deref(), Some("English"));
        assert_eq!(list.translation_languages, vec!["de".to_string()]);
    }

    #[test]
    fn test_unplayable_video() {
        let body = page_with(
            r#"{"playabilityStatus": {"status": "ERROR", "reason": "Video unavailable"}}"#,
        );

        let err = parse_track_list("abc12345678", &body).unwrap_err();
        assert!(matches!(err, UndertekstError::VideoUnavailable(_)));
    }

    #[test]
    fn test_captions_disabled() {
        let body = page_with(r#"{"playabilityStatus": {"status": "OK"}}"#);

        let err = parse_track_list("abc12345678", &body).unwrap_err();
        assert!(matches!(err, UndertekstError::TranscriptsDisabled(_)));
    }

    #[test]
    fn test_empty_track_list() {
        let body = page_with(
            r#"{
                "playabilityStatus": {"status": "OK"},
                "captions": {
                    "playerCaptionsTracklistRenderer": {"captionTracks": []}
                }
            }"#,
        );

        let err = parse_track_list("abc12345678", &body).unwrap_err();
        assert!(matches!(err, UndertekstError::NoTranscriptAvailable(_)));
    }

    #[test]
    fn test_missing_player_response() {
        let err = parse_track_list("abc12345678", "<html>no data</html>").unwrap_err();
        assert!(matches!(err, UndertekstError::InvalidVideoId(_)));
    }

    #[test]
    fn test_decode_cues() {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 1200, "segs": [{"utf8": "hello"}]},
                {"tStartMs": 1200, "dDurationMs": 800, "segs": [{"utf8": "wo"}, {"utf8": "rld"}]}
            ]
        }"#;

        let segments = decode_cues(body).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "hello");
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].duration_seconds, 1.2);
        assert_eq!(segments[1].text, "world");
    }

    #[test]
    fn test_decode_cues_joins_multiline_and_skips_empty_events() {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 500},
                {"tStartMs": 0, "dDurationMs": 1000, "segs": [{"utf8": "first line\nsecond line"}]},
                {"tStartMs": 1000, "dDurationMs": 500, "segs": [{"utf8": "\n"}]}
            ]
        }"#;

        let segments = decode_cues(body).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "first line second line");
    }

    #[test]
    fn test_decode_cues_preserves_provider_order() {
        // Out-of-order timestamps are passed through untouched.
        let body = r#"{
            "events": [
                {"tStartMs": 5000, "dDurationMs": 1000, "segs": [{"utf8": "later"}]},
                {"tStartMs": 1000, "dDurationMs": 1000, "segs": [{"utf8": "earlier"}]}
            ]
        }"#;

        let segments = decode_cues(body).unwrap();
        assert_eq!(segments[0].text, "later");
        assert_eq!(segments[1].text, "earlier");
    }

    #[test]
    fn test_decode_cues_malformed_payload() {
        let err = decode_cues("<transcript/>").unwrap_err();
        assert!(matches!(err, UndertekstError::TranscriptFetch(_)));
    }
}
