use async_trait::async_trait;
use reqwest::Client;
use std::path::Path;

use super::{AccentModel, Device, ModelPrediction};
use crate::{ClassificationError, Result};

const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Accent model served by the Hugging Face inference API.
///
/// Construction probes the model endpoint once; a failed probe is fatal, so a
/// broken model id surfaces at pipeline construction rather than mid-request.
pub struct HfAccentModel {
    client: Client,
    endpoint: String,
    model_id: String,
    api_token: Option<String>,
}

impl HfAccentModel {
    pub async fn connect(
        model_id: &str,
        device: Device,
        api_token: Option<String>,
    ) -> std::result::Result<Self, ClassificationError> {
        let model = Self {
            client: Client::new(),
            endpoint: format!("{INFERENCE_BASE_URL}/{model_id}"),
            model_id: model_id.to_string(),
            api_token,
        };

        // Device placement is decided by the serving backend; the selector is
        // advisory for hosted inference.
        tracing::info!("loading model {model_id} (requested device: {device})");
        model
            .probe()
            .await
            .map_err(|err| ClassificationError::ModelInit(format!("{err:#}")))?;

        Ok(model)
    }

    /// Verify the model endpoint is reachable. HTTP 503 means the model is
    /// still being loaded server-side, which is fine.
    async fn probe(&self) -> Result<()> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 503 {
            anyhow::bail!("model {} unavailable: HTTP {status}", self.model_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AccentModel for HfAccentModel {
    async fn predict(&self, audio: &Path, top_k: usize) -> Result<Vec<ModelPrediction>> {
        let bytes = fs_err::read(audio)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "audio/wav")
            .body(bytes);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("inference request failed: HTTP {status}: {}", body.trim());
        }

        let predictions: Vec<ModelPrediction> = response.json().await?;
        Ok(top_predictions(predictions, top_k))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Keep the `top_k` highest-scoring predictions. The backend's response order
/// is not guaranteed, so sort before truncating.
fn top_predictions(mut predictions: Vec<ModelPrediction>, top_k: usize) -> Vec<ModelPrediction> {
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    predictions.truncate(top_k);
    predictions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(label: &str, score: f64) -> ModelPrediction {
        ModelPrediction {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn top_predictions_keeps_highest_scores_from_unordered_output() {
        let predictions = vec![
            prediction("welsh", 0.05),
            prediction("irish", 0.35),
            prediction("scottish", 0.60),
        ];

        let top = top_predictions(predictions, 2);
        let labels: Vec<&str> = top.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["scottish", "irish"]);
    }

    #[test]
    fn top_predictions_handles_short_output() {
        let top = top_predictions(vec![prediction("american", 0.9)], 3);
        assert_eq!(top.len(), 1);
        assert!(top_predictions(vec![], 3).is_empty());
    }
}
