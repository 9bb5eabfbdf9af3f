//! Accent Scout - classify the speaker's English accent in a public video
//!
//! This library turns a video URL (YouTube, Loom, direct MP4, ...) into a
//! ranked list of accent labels with confidence scores. The pipeline is
//! strictly linear: acquire the video, normalize its audio to mono 16 kHz
//! WAV, then classify with a pre-trained audio-classification model.

pub mod acquire;
pub mod classify;
pub mod cli;
pub mod config;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use acquire::{Acquirer, Browser, CredentialSource, LocalMediaAsset, SourceReference};
pub use classify::{ClassificationResult, ClassifierAdapter, LabelScore};
pub use config::Config;
pub use normalize::{NormalizedAudioAsset, Normalizer};
pub use pipeline::{AccentPipeline, AnalysisReport};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Remediation guidance attached to bot-verification failures.
pub const VERIFICATION_REMEDIATION: &str = "\
Source verification required. Try one of these approaches:
1. Use a different video URL
2. Use Chrome or Firefox browser cookies (Safari is not supported)
3. Provide a cookies.txt file (see README)";

/// Network or source-resolution failure while fetching the remote video.
#[derive(thiserror::Error, Debug)]
pub enum AcquisitionError {
    /// The source demanded sign-in or flagged automated access.
    #[error("{}\nError details: {cause}", VERIFICATION_REMEDIATION)]
    VerificationChallenge { cause: String },

    /// Any other acquisition failure, wrapping the underlying cause.
    #[error("could not download video: {cause}")]
    Failed { cause: String },
}

/// The decoded audio could not be produced from the downloaded media.
#[derive(thiserror::Error, Debug)]
#[error("failed to extract audio: {cause}")]
pub struct NormalizationError {
    pub cause: String,
}

/// Model construction or inference failure.
#[derive(thiserror::Error, Debug)]
pub enum ClassificationError {
    #[error("model init failed: {0}")]
    ModelInit(String),

    #[error("classification failed: {0}")]
    Inference(String),
}

/// Union of the per-stage errors, as surfaced by [`AccentPipeline::analyze`].
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
