use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::{TranscodeEngine, TranscodeRequest};
use crate::Result;

/// Media-transcoding engine backed by the ffmpeg executable.
pub struct FfmpegEngine {
    ffmpeg_path: String,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        Self::with_executable("ffmpeg")
    }

    /// Use a specific ffmpeg executable instead of the one on PATH.
    pub fn with_executable(path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: path.into(),
        }
    }

    /// Check if ffmpeg is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(matches!(output, Ok(out) if out.status.success()))
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn transcode_audio(&self, request: &TranscodeRequest) -> Result<()> {
        if !self.check_availability().await? {
            anyhow::bail!("ffmpeg is not available. Please install it: https://ffmpeg.org/download.html");
        }

        tracing::debug!(
            "transcoding {} -> {}",
            request.input.display(),
            request.output.display()
        );

        let mut command = Command::new(&self.ffmpeg_path);
        command.arg(if request.overwrite { "-y" } else { "-n" });
        command.args(["-loglevel", "error"]);
        command.arg("-i").arg(&request.input);
        command.args(["-ac", &request.channels.to_string()]);
        command.args(["-ar", &request.sample_rate.to_string()]);
        command.args(["-f", &request.format]);
        command.arg(&request.output);

        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg failed: {}", error.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn missing_executable_fails_preflight() {
        let engine = FfmpegEngine::with_executable("ffmpeg-missing-from-path");
        let request = TranscodeRequest {
            input: PathBuf::from("downloads/clip.mp4"),
            output: PathBuf::from("audio/clip.wav"),
            channels: 1,
            sample_rate: 16_000,
            format: "wav".to_string(),
            overwrite: true,
        };
        let err = engine.transcode_audio(&request).await.unwrap_err();
        assert!(err.to_string().contains("ffmpeg is not available"));
    }
}
