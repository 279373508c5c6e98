//! Transcript output encoding (plain text, JSON, SRT, VTT).
//!
//! All four encoders are pure functions of the segment sequence: the same
//! input always produces byte-identical output, and no encoder drops or
//! reorders segments.

use super::models::Transcript;
use serde::{Deserialize, Serialize};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Txt,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Txt),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use txt, json, srt, or vtt.", s)),
        }
    }
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
        }
    }

    /// MIME type for HTTP responses.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "text/plain; charset=utf-8",
            OutputFormat::Json => "application/json",
            OutputFormat::Srt => "text/plain; charset=utf-8",
            OutputFormat::Vtt => "text/vtt; charset=utf-8",
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptExport {
    pub video_id: String,
    pub language_code: String,
    pub segments: Vec<SegmentExport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentExport {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

impl From<&Transcript> for TranscriptExport {
    fn from(transcript: &Transcript) -> Self {
        Self {
            video_id: transcript.video_id.clone(),
            language_code: transcript.language_code.clone(),
            segments: transcript
                .segments
                .iter()
                .map(|s| SegmentExport {
                    text: s.text.clone(),
                    start: s.start_seconds,
                    duration: s.duration_seconds,
                })
                .collect(),
        }
    }
}

/// Encode a transcript in the requested format.
pub fn format_transcript(transcript: &Transcript, format: OutputFormat) -> String {
    match format {
        OutputFormat::Txt => format_txt(transcript),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_srt(transcript),
        OutputFormat::Vtt => format_vtt(transcript),
    }
}

/// Plain text: segment texts joined with a single space.
fn format_txt(transcript: &Transcript) -> String {
    transcript.plain_text()
}

/// Structured JSON with the selected track's language code.
fn format_json(transcript: &Transcript) -> String {
    let export = TranscriptExport::from(transcript);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// SRT (SubRip): numbered cue blocks with comma millisecond separators.
fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        // Sequence number (1-indexed, no gaps)
        output.push_str(&format!("{}\n", i + 1));

        // Timestamps: 00:00:00,000 --> 00:00:00,000
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(segment.end_seconds())
        ));

        // Text
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// WebVTT: same block structure as SRT with a header line and period
/// millisecond separators.
fn format_vtt(transcript: &Transcript) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in transcript.segments.iter().enumerate() {
        // Optional cue identifier
        output.push_str(&format!("{}\n", i + 1));

        // Timestamps: 00:00:00.000 --> 00:00:00.000
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_timestamp(segment.start_seconds),
            format_vtt_timestamp(segment.end_seconds())
        ));

        // Text
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Convert seconds to whole milliseconds.
///
/// Rounds at microsecond precision to absorb f64 representation error
/// (1.2 * 1000.0 is 1199.999...), then truncates sub-millisecond digits.
fn to_millis(seconds: f64) -> u64 {
    let total_us = (seconds * 1_000_000.0).round() as u64;
    total_us / 1000
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let total_ms = to_millis(seconds);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(seconds: f64) -> String {
    let total_ms = to_millis(seconds);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn sample_transcript() -> Transcript {
        Transcript::new(
            "test123".to_string(),
            "en".to_string(),
            false,
            vec![
                TranscriptSegment::new("Hello world.".to_string(), 0.0, 2.5),
                TranscriptSegment::new("This is a test.".to_string(), 2.5, 2.5),
            ],
        )
    }

    #[test]
    fn test_format_txt() {
        let txt = format_transcript(&sample_transcript(), OutputFormat::Txt);
        assert_eq!(txt, "Hello world. This is a test.");
    }

    #[test]
    fn test_format_json_round_trip() {
        let transcript = sample_transcript();
        let json = format_transcript(&transcript, OutputFormat::Json);

        let decoded: TranscriptExport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.video_id, "test123");
        assert_eq!(decoded.language_code, "en");
        assert_eq!(decoded.segments.len(), 2);
        for (original, round_tripped) in transcript.segments.iter().zip(&decoded.segments) {
            assert_eq!(original.text, round_tripped.text);
            assert_eq!(original.start_seconds, round_tripped.start);
            assert_eq!(original.duration_seconds, round_tripped.duration);
        }
    }

    #[test]
    fn test_format_srt() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));
        assert!(srt.contains("Hello world."));
    }

    #[test]
    fn test_format_vtt() {
        let vtt = format_transcript(&sample_transcript(), OutputFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:02.500"));
    }

    #[test]
    fn test_vtt_two_segment_body() {
        let transcript = Transcript::new(
            "X".to_string(),
            "en".to_string(),
            false,
            vec![
                TranscriptSegment::new("hello".to_string(), 0.0, 1.2),
                TranscriptSegment::new("world".to_string(), 1.2, 0.8),
            ],
        );

        let vtt = format_transcript(&transcript, OutputFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT\n"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:01.200\nhello"));
        assert!(vtt.contains("00:00:01.200 --> 00:00:02.000\nworld"));
    }

    #[test]
    fn test_srt_cue_numbers_are_sequential() {
        let segments = (0..5)
            .map(|i| TranscriptSegment::new(format!("cue {}", i), i as f64, 1.0))
            .collect();
        let transcript = Transcript::new("X".to_string(), "en".to_string(), true, segments);

        let srt = format_transcript(&transcript, OutputFormat::Srt);
        let numbers: Vec<u32> = srt
            .split("\n\n")
            .filter(|b| !b.is_empty())
            .map(|b| b.lines().next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let segments = vec![
            TranscriptSegment::new("a".to_string(), 0.0, 1.5),
            TranscriptSegment::new("b".to_string(), 1.5, 1.5),
            TranscriptSegment::new("c".to_string(), 3.0, 2.0),
        ];
        let transcript = Transcript::new("X".to_string(), "en".to_string(), false, segments);

        for format in [OutputFormat::Srt, OutputFormat::Vtt] {
            let body = format_transcript(&transcript, format);
            let stamps: Vec<&str> = body
                .lines()
                .filter(|l| l.contains("-->"))
                .collect();
            assert_eq!(stamps.len(), 3);
            let mut sorted = stamps.clone();
            sorted.sort();
            // Fixed-width zero-padded timestamps sort lexicographically.
            assert_eq!(stamps, sorted);
        }
    }

    #[test]
    fn test_timestamp_truncates_sub_millisecond() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(61.5), "00:01:01,500");
        assert_eq!(format_srt_timestamp(3661.123), "01:01:01,123");
        // Sub-millisecond digits are truncated, not rounded.
        assert_eq!(format_srt_timestamp(1.2345678), "00:00:01,234");
        // f64 representation error must not push 1.2s down to 1.199s.
        assert_eq!(format_vtt_timestamp(1.2), "00:00:01.200");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("txt".parse::<OutputFormat>().unwrap(), OutputFormat::Txt);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("srt".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert_eq!("vtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert_eq!("WEBVTT".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert!("mp4".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_encoders_are_deterministic() {
        let transcript = sample_transcript();
        for format in [
            OutputFormat::Txt,
            OutputFormat::Json,
            OutputFormat::Srt,
            OutputFormat::Vtt,
        ] {
            let first = format_transcript(&transcript, format);
            let second = format_transcript(&transcript, format);
            assert_eq!(first, second);
        }
    }
}
