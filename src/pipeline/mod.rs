use serde::Serialize;
use std::path::PathBuf;

use crate::acquire::{self, http::HttpFetcher, ytdlp::YtDlpEngine, Acquirer, Browser, SourceReference};
use crate::classify::{hf::HfAccentModel, ClassifierAdapter, Device, LabelScore};
use crate::config::Config;
use crate::normalize::{ffmpeg::FfmpegEngine, Normalizer};
use crate::utils::validate_url;
use crate::{AcquisitionError, ClassificationError, NormalizationError, PipelineError};

/// Caller-facing result of one end-to-end analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub normalized_audio_path: PathBuf,
    pub best_label: String,
    pub best_confidence_percent: f64,
    pub ranked_candidates: Vec<LabelScore>,
    pub provenance: String,
}

/// The linear acquisition → normalization → classification pipeline.
///
/// Constructed once per process; the classification model is loaded at
/// construction and reused read-only across requests.
pub struct AccentPipeline {
    acquirer: Acquirer,
    normalizer: Normalizer,
    classifier: ClassifierAdapter,
    cookies_file: PathBuf,
}

impl std::fmt::Debug for AccentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccentPipeline")
            .field("cookies_file", &self.cookies_file)
            .finish_non_exhaustive()
    }
}

impl AccentPipeline {
    /// Build the pipeline with the real engines. Construction failures carry
    /// the typed error of the stage they belong to; model construction
    /// failure is fatal here, with no lazy retry on a later call.
    pub async fn new(config: Config) -> std::result::Result<Self, PipelineError> {
        let acquirer = Acquirer::new(
            config.storage.downloads_dir.clone(),
            Box::new(HttpFetcher::new()),
            Box::new(YtDlpEngine::new()),
        )
        .map_err(|err| AcquisitionError::Failed {
            cause: format!("{err:#}"),
        })?;
        let normalizer = Normalizer::new(
            config.storage.audio_dir.clone(),
            config.audio.sample_rate,
            Box::new(FfmpegEngine::new()),
        )
        .map_err(|err| NormalizationError {
            cause: format!("{err:#}"),
        })?;

        let device: Device = config
            .model
            .device
            .parse()
            .map_err(|err: anyhow::Error| ClassificationError::ModelInit(format!("{err:#}")))?;
        let model = HfAccentModel::connect(
            &config.model.model_id,
            device,
            config.model.api_token.clone(),
        )
        .await?;
        let classifier = ClassifierAdapter::new(Box::new(model), config.model.top_k);

        Ok(Self {
            acquirer,
            normalizer,
            classifier,
            cookies_file: config.credentials.cookies_file,
        })
    }

    /// Assemble a pipeline from pre-built stages. Useful for swapping in
    /// alternative engines or models.
    pub fn from_parts(
        acquirer: Acquirer,
        normalizer: Normalizer,
        classifier: ClassifierAdapter,
        cookies_file: PathBuf,
    ) -> Self {
        Self {
            acquirer,
            normalizer,
            classifier,
            cookies_file,
        }
    }

    /// Run one end-to-end analysis: one URL in, one classification out.
    /// Stages run strictly sequentially; the first failure aborts with its
    /// stage's typed error.
    pub async fn analyze(
        &self,
        url: &str,
        browser: Option<Browser>,
    ) -> std::result::Result<AnalysisReport, PipelineError> {
        let url = validate_url(url).map_err(|err| AcquisitionError::Failed {
            cause: format!("{err:#}"),
        })?;

        let credential = acquire::resolve_credential(&self.cookies_file, browser);
        let reference = SourceReference { url, credential };

        tracing::info!("starting analysis for URL: {}", reference.url);
        let media = self.acquirer.acquire(&reference).await?;
        tracing::info!("downloaded media to {}", media.path.display());

        let audio = self.normalizer.normalize(&media).await?;
        tracing::info!("normalized audio at {}", audio.path.display());

        let classification = self.classifier.classify(&audio).await?;
        tracing::info!(
            "predicted accent: {} ({:.2}%)",
            classification.best_label,
            classification.best_confidence_percent
        );

        Ok(AnalysisReport {
            normalized_audio_path: audio.path,
            best_label: classification.best_label,
            best_confidence_percent: classification.best_confidence_percent,
            ranked_candidates: classification.ranked_candidates,
            provenance: classification.provenance,
        })
    }
}
