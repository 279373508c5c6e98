//! Undertekst - YouTube Caption Transcript Resolver
//!
//! A small service that resolves caption transcripts for YouTube videos.
//!
//! The name "Undertekst" comes from the Norwegian/Scandinavian word for "subtitle."
//!
//! # Overview
//!
//! Undertekst allows you to:
//! - Discover which caption tracks a video exposes (manual, auto-generated, translatable)
//! - Select the best-matching track for an ordered list of preferred languages
//! - Normalize the cues into plain text, JSON, SRT, or WebVTT
//! - Serve transcripts over HTTP with an on-disk cache and client-side rate limiting
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `youtube` - Caption provider client (track discovery, cue download)
//! - `transcript` - Transcript model, track selection, and output encoders
//! - `cache` - Filesystem transcript cache with max-age freshness
//! - `limiter` - Outbound request rate limiting
//! - `resolver` - The resolver service object tying the pieces together
//! - `fallback` - Legacy audio-download-and-transcribe path
//!
//! # Example
//!
//! ```rust,no_run
//! use undertekst::config::Settings;
//! use undertekst::resolver::Resolver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let resolver = Resolver::new(&settings)?;
//!
//!     let transcript = resolver
//!         .resolve("dQw4w9WgXcQ", &["en".to_string()])
//!         .await?;
//!     println!("{}", transcript.plain_text());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod limiter;
pub mod resolver;
pub mod transcript;
pub mod youtube;

pub use error::{Result, UndertekstError};
