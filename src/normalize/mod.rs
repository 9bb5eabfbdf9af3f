use async_trait::async_trait;
use std::path::PathBuf;

pub mod ffmpeg;

use crate::acquire::LocalMediaAsset;
use crate::{NormalizationError, Result};

/// A decoded, single-channel, fixed-sample-rate WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAudioAsset {
    pub path: PathBuf,
    pub sample_rate: u32,
}

/// Parameters handed to the media-transcoding engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub channels: u32,
    pub sample_rate: u32,
    pub format: String,
    pub overwrite: bool,
}

/// Media-transcoding engine (ffmpeg in production, a fake in tests).
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    async fn transcode_audio(&self, request: &TranscodeRequest) -> Result<()>;
}

/// Converts an arbitrary local video/audio file into a canonical mono,
/// fixed-sample-rate WAV asset.
pub struct Normalizer {
    audio_dir: PathBuf,
    sample_rate: u32,
    engine: Box<dyn TranscodeEngine>,
}

impl Normalizer {
    pub fn new(
        audio_dir: impl Into<PathBuf>,
        sample_rate: u32,
        engine: Box<dyn TranscodeEngine>,
    ) -> Result<Self> {
        let audio_dir = audio_dir.into();
        fs_err::create_dir_all(&audio_dir)?;
        Ok(Self {
            audio_dir,
            sample_rate,
            engine,
        })
    }

    /// Transcode `asset` to mono WAV at the configured sample rate. The
    /// destination is the source basename with a `.wav` extension; transcode
    /// failures are non-transient and are not retried.
    pub async fn normalize(&self, asset: &LocalMediaAsset) -> std::result::Result<NormalizedAudioAsset, NormalizationError> {
        let stem = asset
            .path
            .file_stem()
            .ok_or_else(|| NormalizationError {
                cause: format!("input has no file name: {}", asset.path.display()),
            })?
            .to_string_lossy();
        let output = self.audio_dir.join(format!("{stem}.wav"));

        let request = TranscodeRequest {
            input: asset.path.clone(),
            output: output.clone(),
            channels: 1,
            sample_rate: self.sample_rate,
            format: "wav".to_string(),
            overwrite: true,
        };

        self.engine
            .transcode_audio(&request)
            .await
            .map_err(|err| NormalizationError {
                cause: format!("{err:#}"),
            })?;

        tracing::debug!("audio extracted to {}", output.display());
        Ok(NormalizedAudioAsset {
            path: output,
            sample_rate: self.sample_rate,
        })
    }
}
