use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub mod hf;

use crate::normalize::NormalizedAudioAsset;
use crate::{ClassificationError, Result};

/// One accent candidate with its probability as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub probability_percent: f64,
}

/// Stable, pipeline-facing classification contract.
///
/// `ranked_candidates` is non-empty, sorted descending by probability, and
/// its first element equals (`best_label`, `best_confidence_percent`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub best_label: String,
    pub best_confidence_percent: f64,
    pub ranked_candidates: Vec<LabelScore>,
    pub provenance: String,
}

/// Raw model prediction, score in [0, 1].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelPrediction {
    pub label: String,
    pub score: f64,
}

/// Compute device requested for inference. Injected at model construction;
/// interpretation is up to the backing runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Auto,
    Cpu,
    Cuda,
}

impl FromStr for Device {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Device::Auto),
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda),
            other => anyhow::bail!("unknown compute device: {other}"),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Auto => write!(f, "auto"),
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda => write!(f, "cuda"),
        }
    }
}

/// Pre-trained audio-classification capability. Returns up to `top_k`
/// predictions, in no guaranteed order.
#[async_trait]
pub trait AccentModel: Send + Sync {
    async fn predict(&self, audio: &Path, top_k: usize) -> Result<Vec<ModelPrediction>>;

    /// Identifier of the underlying model, used for provenance.
    fn model_id(&self) -> &str;
}

/// Wraps an [`AccentModel`] behind the [`ClassificationResult`] contract.
pub struct ClassifierAdapter {
    model: Box<dyn AccentModel>,
    top_k: usize,
    provenance: String,
}

impl ClassifierAdapter {
    pub fn new(model: Box<dyn AccentModel>, top_k: usize) -> Self {
        let provenance = format!("Model: {}", model.model_id());
        Self {
            model,
            top_k,
            provenance,
        }
    }

    /// Classify the normalized audio, returning the ranked candidate list.
    pub async fn classify(&self, asset: &NormalizedAudioAsset) -> std::result::Result<ClassificationResult, ClassificationError> {
        let predictions = self
            .model
            .predict(&asset.path, self.top_k)
            .await
            .map_err(|err| ClassificationError::Inference(format!("{err:#}")))?;

        let mut ranked: Vec<LabelScore> = predictions
            .into_iter()
            .map(|prediction| LabelScore {
                label: prediction.label,
                probability_percent: prediction.score * 100.0,
            })
            .collect();
        // Upstream ordering is not trusted.
        ranked.sort_by(|a, b| b.probability_percent.total_cmp(&a.probability_percent));
        ranked.truncate(self.top_k);

        let best = ranked.first().cloned().ok_or_else(|| {
            ClassificationError::Inference("model returned no predictions".to_string())
        })?;

        Ok(ClassificationResult {
            best_label: best.label,
            best_confidence_percent: best.probability_percent,
            ranked_candidates: ranked,
            provenance: self.provenance.clone(),
        })
    }
}
