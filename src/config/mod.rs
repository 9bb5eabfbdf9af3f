use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output directories for downloaded media and extracted audio
    pub storage: StorageConfig,

    /// Audio normalization settings
    pub audio: AudioConfig,

    /// Classification model settings
    pub model: ModelConfig,

    /// Credential settings
    pub credentials: CredentialConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for raw downloaded/fetched media
    pub downloads_dir: PathBuf,

    /// Directory for normalized audio
    pub audio_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Target sample rate for normalized audio in Hz
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Hugging Face model identifier
    pub model_id: String,

    /// Compute device selector (auto, cpu, cuda)
    pub device: String,

    /// Number of candidate labels to return
    pub top_k: usize,

    /// Optional inference API token
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Well-known cookie file path, used when it exists
    pub cookies_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                downloads_dir: PathBuf::from("downloads"),
                audio_dir: PathBuf::from("audio"),
            },
            audio: AudioConfig {
                sample_rate: 16_000,
            },
            model: ModelConfig {
                model_id: "dima806/english_accents_classification".to_string(),
                device: "auto".to_string(),
                top_k: 3,
                api_token: None,
            },
            credentials: CredentialConfig {
                cookies_file: PathBuf::from("cookies.txt"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("accent-scout").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.model.model_id.is_empty() {
            anyhow::bail!("Model identifier must be configured");
        }

        if self.model.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }

        if self.audio.sample_rate == 0 {
            anyhow::bail!("Sample rate must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Downloads Dir: {}", self.storage.downloads_dir.display());
        println!("  Audio Dir: {}", self.storage.audio_dir.display());
        println!("  Sample Rate: {} Hz", self.audio.sample_rate);
        println!("  Model: {}", self.model.model_id);
        println!("  Device: {}", self.model.device);
        println!("  Top K: {}", self.model.top_k);
        println!("  Cookies File: {}", self.credentials.cookies_file.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.audio.sample_rate, 16_000);
        assert_eq!(config.model.top_k, 3);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = Config::default();
        config.model.top_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.model_id.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.audio.sample_rate = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.model.model_id, config.model.model_id);
        assert_eq!(parsed.storage.downloads_dir, config.storage.downloads_dir);
    }
}
