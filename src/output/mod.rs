use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

use crate::cli::ReportFormat;
use crate::pipeline::AnalysisReport;

/// Save an analysis report to a file
pub async fn save_to_file(report: &AnalysisReport, path: &Path, format: &ReportFormat) -> Result<()> {
    let content = match format {
        ReportFormat::Text => format_as_text(report),
        ReportFormat::Json => format_as_json(report)?,
    };

    fs_err::write(path, content)?;
    Ok(())
}

/// Print an analysis report to the console
pub fn print_to_console(report: &AnalysisReport, format: &ReportFormat) -> Result<()> {
    let content = match format {
        ReportFormat::Text => format_as_text(report),
        ReportFormat::Json => format_as_json(report)?,
    };

    println!("{content}");
    Ok(())
}

fn format_as_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Predicted Accent: {}", report.best_label);
    let _ = writeln!(out, "Confidence: {:.2}%", report.best_confidence_percent);
    let _ = writeln!(out, "Top Predictions:");
    for candidate in &report.ranked_candidates {
        let _ = writeln!(
            out,
            "  {:<12} {:>6.2}%",
            candidate.label, candidate.probability_percent
        );
    }
    let _ = writeln!(out, "Audio: {}", report.normalized_audio_path.display());
    let _ = write!(out, "{}", report.provenance);
    out
}

fn format_as_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
