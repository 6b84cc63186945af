/// Histogram layer: embedded binary payload → smooth volume curve.
///
/// Architecture:
/// ```text
///  instrument text (R|… base64^…|… base64^…)
///        │
///        ▼
///   ┌──────────┐
///   │ fragment │  strip control bytes, find tagged base64 runs
///   └──────────┘
///        │  Vec<Fragment>, document order
///        ▼
///   ┌──────────┐
///   │ payload  │  pad + decode each, concatenate, inflate ONCE (raw deflate)
///   └──────────┘
///        │  Vec<u8>
///        ▼
///   ┌──────────┐
///   │   bins   │  <f4 little-endian groups → BinArray
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  curve   │  geometric axis, PCHIP, Gaussian σ, clamp, peak = 1
///   └──────────┘
/// ```

pub mod bins;
pub mod curve;
pub mod error;
pub mod fragment;
pub mod interp;
pub mod payload;
pub mod pipeline;
pub mod smooth;

pub use bins::{decode_bins, BinArray, TruncationPolicy};
pub use curve::{reconstruct, ReconstructedCurve, ReconstructionConfig};
pub use error::{HistogramError, Stage};
pub use fragment::{extract_fragments, extract_fragments_with_tag, Fragment, FRAGMENT_TAG};
pub use payload::{decompress, reassemble, PayloadBuffer};
pub use pipeline::{
    decode_payload, reconstruct_record, reconstruct_record_with_tag, DecodedPayload,
    PipelineDiagnostics, Reconstruction,
};
