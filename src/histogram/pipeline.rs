use serde::Serialize;

use super::bins::{decode_bins, BinArray, SAMPLE_WIDTH};
use super::curve::{reconstruct, ReconstructedCurve, ReconstructionConfig};
use super::error::Result;
use super::fragment::{extract_fragments_with_tag, FRAGMENT_TAG};
use super::payload::{decompress, reassemble};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What a record's histogram payload produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconstruction {
    /// The record carries no tagged fragment. Not an error.
    NoPayload,
    Curve(ReconstructedCurve),
}

/// Decoded payload, before reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    NoPayload,
    Bins(BinArray),
}

/// Sizes observed at each stage, filled in as far as the pipeline got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineDiagnostics {
    pub fragments: usize,
    pub compressed_len: usize,
    pub decompressed_len: usize,
    pub bins: usize,
    pub dropped_bytes: usize,
    pub trailing_bytes: usize,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Stages 1–4: text → bins.
///
/// `diagnostics` is updated as each stage completes so callers can still
/// show how far a failed record got.
pub fn decode_payload(
    raw: &str,
    tag: &str,
    config: &ReconstructionConfig,
    diagnostics: &mut PipelineDiagnostics,
) -> Result<DecodedPayload> {
    let fragments = extract_fragments_with_tag(raw, tag);
    diagnostics.fragments = fragments.len();
    if fragments.is_empty() {
        log::debug!("no '{tag}' fragments in record");
        return Ok(DecodedPayload::NoPayload);
    }
    log::debug!("found {} fragment(s)", fragments.len());

    let buffer = reassemble(&fragments)?;
    diagnostics.compressed_len = buffer.len();
    log::debug!("combined binary length: {}", buffer.len());

    let inflated = decompress(&buffer)?;
    diagnostics.decompressed_len = inflated.bytes.len();
    diagnostics.trailing_bytes = inflated.trailing_bytes;
    log::debug!(
        "length after decompression: {} (mod {SAMPLE_WIDTH} = {})",
        inflated.bytes.len(),
        inflated.bytes.len() % SAMPLE_WIDTH
    );

    let bins = decode_bins(&inflated.bytes, config.truncation)?;
    diagnostics.bins = bins.len();
    diagnostics.dropped_bytes = bins.dropped_bytes;
    log::debug!("total bins: {}", bins.len());

    Ok(DecodedPayload::Bins(bins))
}

/// Full pipeline with the default fragment tag.
pub fn reconstruct_record(
    raw: &str,
    config: &ReconstructionConfig,
) -> (Result<Reconstruction>, PipelineDiagnostics) {
    reconstruct_record_with_tag(raw, FRAGMENT_TAG, config)
}

/// Full pipeline: text → normalised curve.
pub fn reconstruct_record_with_tag(
    raw: &str,
    tag: &str,
    config: &ReconstructionConfig,
) -> (Result<Reconstruction>, PipelineDiagnostics) {
    let mut diagnostics = PipelineDiagnostics::default();
    let outcome = decode_payload(raw, tag, config, &mut diagnostics).and_then(|decoded| {
        match decoded {
            DecodedPayload::NoPayload => Ok(Reconstruction::NoPayload),
            DecodedPayload::Bins(bins) => reconstruct(&bins, config).map(Reconstruction::Curve),
        }
    });
    (outcome, diagnostics)
}
