//! List the caption tracks a video exposes.

use crate::cli::Output;
use crate::config::Settings;
use crate::resolver::Resolver;
use crate::youtube;
use anyhow::anyhow;

pub async fn run_tracks(input: &str, settings: Settings) -> anyhow::Result<()> {
    let video_id = youtube::extract_video_id(input)
        .ok_or_else(|| anyhow!("Invalid YouTube URL or video ID: {}", input))?;

    let resolver = Resolver::new(&settings)?;

    let spinner = Output::spinner(&format!("Listing caption tracks for {}...", video_id));
    let result = resolver.available_tracks(&video_id).await;
    spinner.finish_and_clear();

    let list = result?;

    Output::header(&format!("Caption Tracks for {}", video_id));
    for track in &list.tracks {
        let name = track.language.as_deref().unwrap_or(&track.language_code);
        let mut flags = Vec::new();
        if track.is_auto_generated {
            flags.push("auto-generated");
        }
        if track.is_translatable {
            flags.push("translatable");
        }
        let suffix = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        Output::list_item(&format!("{} ({}){}", name, track.language_code, suffix));
    }

    if !list.translation_languages.is_empty() {
        println!();
        Output::info(&format!(
            "Translatable into {} languages",
            list.translation_languages.len()
        ));
    }

    Ok(())
}
