use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use accent_scout::cli::{Cli, Commands};
use accent_scout::config::Config;
use accent_scout::pipeline::AccentPipeline;
use accent_scout::{output, utils, AcquisitionError, PipelineError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_directive = if cli.verbose {
        "accent_scout=debug"
    } else {
        "accent_scout=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run(cli).await {
        present_failure(&err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Analyze {
            url,
            cookies_from_browser,
            format,
            output: output_path,
        } => {
            if url.trim().is_empty() {
                eprintln!(
                    "{} Please provide a non-empty video URL.",
                    style("✗").red().bold()
                );
                std::process::exit(2);
            }

            // Check for required external dependencies (non-fatal)
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in &missing_deps {
                    eprintln!("   • {dep}");
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let config = Config::load().await?;
            let pipeline = AccentPipeline::new(config).await?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            spinner.enable_steady_tick(std::time::Duration::from_millis(120));
            spinner.set_message("Analyzing accent...");

            let result = pipeline
                .analyze(&url, cookies_from_browser.map(Into::into))
                .await;
            spinner.finish_and_clear();
            let report = result?;

            match output_path {
                Some(path) => {
                    output::save_to_file(&report, &path, &format).await?;
                    println!("Report saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&report, &format)?;
                }
            }
        }
        Commands::Config { show } => {
            let config = Config::load().await?;
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings, then re-run with --show to review.");
                config.display();
            }
        }
        Commands::Platforms => {
            println!("Supported video sources:");
            println!("  • YouTube (youtube.com, youtu.be)");
            println!("  • Loom and other yt-dlp supported sharing sites");
            println!("  • Direct video URLs (.mp4, .mov, .m4v)");
        }
    }

    Ok(())
}

/// User-facing error presentation. Typed pipeline errors get their own
/// messages; anything unrecognized gets a generic line while the detail goes
/// to the log.
fn present_failure(err: &anyhow::Error) {
    let mark = style("✗").red().bold();

    if let Some(stage) = err.downcast_ref::<PipelineError>() {
        match stage {
            PipelineError::Acquisition(acquisition) => {
                eprintln!("{mark} {acquisition}");
                if matches!(acquisition, AcquisitionError::VerificationChallenge { .. }) {
                    eprintln!(
                        "{}",
                        style("Tip: re-run with --cookies-from-browser chrome or firefox, or place a cookies.txt file next to the binary.")
                            .yellow()
                    );
                }
            }
            PipelineError::Normalization(normalization) => {
                eprintln!("{mark} {normalization}");
            }
            PipelineError::Classification(classification) => {
                eprintln!("{mark} {classification}");
            }
        }
    } else {
        tracing::error!("unexpected failure: {err:#}");
        eprintln!("{mark} Something went wrong. Please try again.");
    }
}
