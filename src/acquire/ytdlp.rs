use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::{FetchEngine, FetchRequest};
use crate::Result;

/// General extraction engine backed by the yt-dlp executable.
pub struct YtDlpEngine {
    yt_dlp_path: String,
}

impl YtDlpEngine {
    pub fn new() -> Self {
        Self::with_executable("yt-dlp")
    }

    /// Use a specific yt-dlp executable instead of the one on PATH.
    pub fn with_executable(path: impl Into<String>) -> Self {
        Self {
            yt_dlp_path: path.into(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(matches!(output, Ok(out) if out.status.success()))
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchEngine for YtDlpEngine {
    async fn fetch_remote_media(&self, request: &FetchRequest) -> Result<PathBuf> {
        if !self.check_availability().await? {
            anyhow::bail!("yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp");
        }

        tracing::debug!("invoking yt-dlp for: {}", request.url);

        let mut command = Command::new(&self.yt_dlp_path);
        command.args([
            "--output",
            &request.output_template,
            "--format",
            &request.format,
            // Print the final path of the produced file instead of simulating
            "--no-simulate",
            "--print",
            "after_move:filepath",
        ]);
        if request.no_playlist {
            command.arg("--no-playlist");
        }
        if let Some(cookie_file) = &request.cookie_file {
            command.arg("--cookies").arg(cookie_file);
        } else if let Some(browser) = request.cookies_from_browser {
            command.args(["--cookies-from-browser", browser.as_str()]);
        }
        command.arg(&request.url);

        let output = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .context("yt-dlp did not report an output path")?;

        Ok(PathBuf::from(path))
    }
}
