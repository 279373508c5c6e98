//! Transcript model, track selection, and output encoders.
//!
//! A resolved transcript is an ordered sequence of timed segments plus the
//! metadata of the caption track it came from. The encoders in `format` are
//! pure projections of that sequence; `selection` picks the best track for a
//! caller's language preferences.

mod format;
mod models;
mod selection;

pub use format::{format_transcript, OutputFormat, SegmentExport, TranscriptExport};
pub use models::{CaptionTrack, TrackList, Transcript, TranscriptSegment};
pub use selection::{select_track, Selection};
