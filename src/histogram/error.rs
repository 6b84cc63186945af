use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Stage – where in the pipeline an error surfaced
// ---------------------------------------------------------------------------

/// Pipeline stage, leaf-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Reassemble,
    Decompress,
    Decode,
    Reconstruct,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reassemble => "payload reassembly",
            Stage::Decompress => "decompression",
            Stage::Decode => "bin decoding",
            Stage::Reconstruct => "curve reconstruction",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// HistogramError
// ---------------------------------------------------------------------------

/// Terminal failure of one record's histogram reconstruction.
///
/// A record without any payload is *not* an error; see
/// [`Reconstruction::NoPayload`](super::Reconstruction::NoPayload).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistogramError {
    /// One fragment is not valid base64. `index` is the 1-based sequence index.
    #[error("fragment #{index} is not valid base64: {reason}")]
    MalformedFragment { index: usize, reason: String },

    /// The reassembled buffer is not a complete raw-deflate stream.
    #[error("raw-deflate decompression failed on {buffer_len} byte buffer: {reason}")]
    DecompressionFailed { reason: String, buffer_len: usize },

    /// Decompressed length is not a multiple of the 4-byte sample width.
    #[error("decompressed payload of {len} bytes has {remainder} byte(s) past the last sample")]
    TruncatedPayload { len: usize, remainder: usize },

    /// Nothing positive to normalise against.
    #[error("histogram is degenerate (peak {max}); cannot normalise")]
    DegenerateHistogram { max: f64 },

    /// Reconstruction parameters outside their domain.
    #[error("invalid reconstruction config: {0}")]
    InvalidConfig(String),
}

impl HistogramError {
    /// The stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            HistogramError::MalformedFragment { .. } => Stage::Reassemble,
            HistogramError::DecompressionFailed { .. } => Stage::Decompress,
            HistogramError::TruncatedPayload { .. } => Stage::Decode,
            HistogramError::DegenerateHistogram { .. } | HistogramError::InvalidConfig(_) => {
                Stage::Reconstruct
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, HistogramError>;
