//! Audio download for the legacy fallback path.
//!
//! Uses yt-dlp to pull the worst-quality audio stream; the transcription
//! model does not benefit from higher bitrates and the download is the slow
//! part of the fallback.

use crate::error::{Result, UndertekstError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

/// Downloads a video's audio and saves it as MP3.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_audio(url: &str, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", video_id));

    info!("Downloading audio from {}", url);

    let result = Command::new("yt-dlp")
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--audio-quality").arg("9")
        .arg("--format").arg("worstaudio")
        .arg("--output").arg(target_path.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UndertekstError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(UndertekstError::AudioDownload(format!(
                "yt-dlp execution failed: {e}"
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(UndertekstError::AudioDownload(format!(
            "yt-dlp failed: {stderr}"
        )));
    }

    if !target_path.exists() {
        return Err(UndertekstError::AudioDownload(
            "Audio file not found after download".into(),
        ));
    }

    Ok(target_path)
}
