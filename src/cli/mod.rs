use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::acquire::Browser;

#[derive(Parser)]
#[command(
    name = "accent-scout",
    about = "Accent Scout - Classify the speaker's English accent in a public video",
    version,
    long_about = "A CLI tool that downloads a public video (YouTube, Loom, direct MP4), extracts its speech audio, and predicts the speaker's English accent with a pre-trained audio-classification model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, extract its audio, and classify the accent
    Analyze {
        /// Public video URL (YouTube, Loom, direct MP4)
        #[arg(value_name = "URL")]
        url: String,

        /// Browser to read cookies from if the source demands sign-in
        /// (Safari is not supported)
        #[arg(long, value_enum, value_name = "BROWSER")]
        cookies_from_browser: Option<CookieBrowser>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported video sources
    Platforms,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum CookieBrowser {
    Chrome,
    Firefox,
    Edge,
    Opera,
    Safari,
}

impl From<CookieBrowser> for Browser {
    fn from(browser: CookieBrowser) -> Self {
        match browser {
            CookieBrowser::Chrome => Browser::Chrome,
            CookieBrowser::Firefox => Browser::Firefox,
            CookieBrowser::Edge => Browser::Edge,
            CookieBrowser::Opera => Browser::Opera,
            CookieBrowser::Safari => Browser::Safari,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// JSON report
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}
