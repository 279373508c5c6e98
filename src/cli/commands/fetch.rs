//! One-shot transcript resolution from the command line.

use crate::cli::Output;
use crate::config::Settings;
use crate::resolver::Resolver;
use crate::transcript::{format_transcript, OutputFormat};
use crate::youtube;
use anyhow::{anyhow, Context};

/// Resolve a transcript for a single video and print or save it.
pub async fn run_fetch(
    input: &str,
    languages: &[String],
    format: &str,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    let video_id = youtube::extract_video_id(input)
        .ok_or_else(|| anyhow!("Invalid YouTube URL or video ID: {}", input))?;
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow!(e))?;

    let resolver = Resolver::new(&settings)?;

    let spinner = Output::spinner(&format!("Resolving transcript for {}...", video_id));
    let result = resolver.resolve(&video_id, languages).await;
    spinner.finish_and_clear();

    let transcript = result?;
    let body = format_transcript(&transcript, format);

    match output {
        Some(path) => {
            std::fs::write(&path, &body).with_context(|| format!("Failed to write {}", path))?;
            Output::success(&format!(
                "Saved {} transcript ({} segments, {}) to {}",
                transcript.language_code,
                transcript.segments.len(),
                if transcript.is_auto_generated {
                    "auto-generated"
                } else {
                    "manual"
                },
                path
            ));
        }
        None => {
            println!("{}", body);
        }
    }

    Ok(())
}
