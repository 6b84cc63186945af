use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::AppConfig;

use super::distribution::{plt_curve, rbc_curve, wbc_differential};
use super::model::{CbcReport, HistogramSection};
use super::params::extract_parameters;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an instrument record (`.txt`, `.astm`, `.hl7`, … any text dump).
///
/// Only I/O fails here. A broken histogram payload is kept on the report
/// so the rest of it can still be shown.
pub fn load_record(path: &Path, config: &AppConfig) -> Result<CbcReport> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading record {}", path.display()))?;

    // Undecodable bytes are dropped, not replaced, so they cannot split a
    // base64 run in two.
    let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");

    let mut report = analyze_record(&text, config);
    report.source = Some(path.to_path_buf());

    log::info!(
        "{}: {} parameter(s), histogram: {}",
        path.display(),
        report.parameters.len(),
        report.histogram.status()
    );
    if let Some(err) = report.histogram.error() {
        log::warn!("{}: {err}", path.display());
    }

    Ok(report)
}

/// Derive every report section from the raw record text.
pub fn analyze_record(text: &str, config: &AppConfig) -> CbcReport {
    let parameters = extract_parameters(text);
    let histogram = HistogramSection::analyze(
        text,
        &config.histogram.fragment_tag,
        &config.histogram.reconstruction,
    );

    CbcReport {
        source: None,
        generated: Local::now(),
        rbc_curve: rbc_curve(&parameters, &config.distribution),
        plt_curve: plt_curve(&parameters, &config.distribution),
        differential: wbc_differential(&parameters),
        parameters,
        histogram,
    }
}
