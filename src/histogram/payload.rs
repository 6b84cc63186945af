use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};
use flate2::{Decompress, FlushDecompress, Status};

use super::error::{HistogramError, Result};
use super::fragment::Fragment;

/// Output growth step while inflating.
const INFLATE_CHUNK: usize = 16 * 1024;

/// Standard alphabet, tolerant of the loose padding and trailing bits that
/// instrument firmware emits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ---------------------------------------------------------------------------
// PayloadBuffer – all fragments, decoded and concatenated
// ---------------------------------------------------------------------------

/// The complete compressed payload of one record.
///
/// Only [`reassemble`] can build one, and [`decompress`] only accepts one,
/// so a single fragment can never be decompressed on its own: deflate
/// back-references span fragment boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadBuffer {
    bytes: Vec<u8>,
    fragments: usize,
}

impl PayloadBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of fragments that contributed to this buffer.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }
}

/// Right-pad with `=` to a multiple of 4 and decode.
fn decode_fragment(fragment: &Fragment) -> Result<Vec<u8>> {
    let text = fragment.encoded_text();

    // A run of bare padding carries no data.
    if text.trim_end_matches('=').is_empty() {
        return Ok(Vec::new());
    }

    let mut padded = String::with_capacity(text.len() + 3);
    padded.push_str(text);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    LENIENT
        .decode(padded.as_bytes())
        .map_err(|e| HistogramError::MalformedFragment {
            index: fragment.sequence_index(),
            reason: e.to_string(),
        })
}

/// Decode every fragment and concatenate the bytes in fragment order.
///
/// Any undecodable fragment fails the whole payload.
pub fn reassemble(fragments: &[Fragment]) -> Result<PayloadBuffer> {
    let mut bytes = Vec::new();
    for fragment in fragments {
        let decoded = decode_fragment(fragment)?;
        log::trace!(
            "fragment #{}: {} chars -> {} bytes",
            fragment.sequence_index(),
            fragment.encoded_text().len(),
            decoded.len()
        );
        bytes.extend_from_slice(&decoded);
    }
    Ok(PayloadBuffer {
        bytes,
        fragments: fragments.len(),
    })
}

// ---------------------------------------------------------------------------
// Decompression
// ---------------------------------------------------------------------------

/// Output of the single raw-deflate pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub bytes: Vec<u8>,
    /// Input bytes left over after the end-of-stream marker.
    pub trailing_bytes: usize,
}

/// Inflate the whole buffer once as a headerless deflate stream.
///
/// The stream must reach its end-of-stream marker; running out of input
/// first means a fragment was lost or cut short.
pub fn decompress(buffer: &PayloadBuffer) -> Result<Decompressed> {
    let input = buffer.as_bytes();
    let failed = |reason: String| HistogramError::DecompressionFailed {
        reason,
        buffer_len: input.len(),
    };

    let mut inflater = Decompress::new(false);
    let mut bytes = Vec::new();
    loop {
        bytes.reserve(INFLATE_CHUNK);
        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let offset = usize::try_from(before_in).unwrap_or(input.len()).min(input.len());

        let status = inflater
            .decompress_vec(&input[offset..], &mut bytes, FlushDecompress::None)
            .map_err(|e| failed(e.to_string()))?;

        match status {
            Status::StreamEnd => break,
            Status::Ok | Status::BufError => {
                if inflater.total_in() == before_in && inflater.total_out() == before_out {
                    return Err(failed(format!(
                        "unexpected end of deflate stream after {} byte(s)",
                        before_in
                    )));
                }
            }
        }
    }

    let consumed = usize::try_from(inflater.total_in()).unwrap_or(input.len());
    let trailing_bytes = input.len().saturating_sub(consumed);
    if trailing_bytes > 0 {
        log::warn!("{trailing_bytes} trailing byte(s) after end of deflate stream ignored");
    }

    Ok(Decompressed {
        bytes,
        trailing_bytes,
    })
}
