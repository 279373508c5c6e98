//! CLI module for Undertekst.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Undertekst - YouTube Caption Transcript Resolver
///
/// Resolves caption transcripts for YouTube videos and serves them over HTTP.
/// The name "Undertekst" comes from the Norwegian/Scandinavian word for "subtitle."
#[derive(Parser, Debug)]
#[command(name = "undertekst")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the transcript resolver HTTP server
    Serve {
        /// Host interface to bind
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to bind
        #[arg(short, long, env = "PORT", default_value = "8000")]
        port: u16,
    },

    /// Resolve a transcript for a single video and print it
    Fetch {
        /// YouTube URL or video ID
        input: String,

        /// Preferred language code, in priority order (repeatable)
        #[arg(short, long)]
        lang: Vec<String>,

        /// Output format (txt, json, srt, vtt)
        #[arg(long, default_value = "txt")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the caption tracks a video exposes
    Tracks {
        /// YouTube URL or video ID
        input: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
