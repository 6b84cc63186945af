use serde::{Deserialize, Serialize};

use super::error::{HistogramError, Result};

/// Width of one little-endian IEEE-754 single-precision sample.
pub const SAMPLE_WIDTH: usize = 4;

/// What to do when the decompressed length is not a whole number of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TruncationPolicy {
    /// Fail with [`HistogramError::TruncatedPayload`].
    #[default]
    Abort,
    /// Drop the partial trailing group, log it, and keep the whole samples.
    DropPartial,
}

/// Raw histogram bin counts, in instrument order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinArray {
    pub values: Vec<f32>,
    /// Bytes discarded under [`TruncationPolicy::DropPartial`].
    pub dropped_bytes: usize,
}

impl BinArray {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reinterpret decompressed bytes as `<f4` samples.
///
/// Values are passed through untouched, NaN and negatives included.
pub fn decode_bins(bytes: &[u8], policy: TruncationPolicy) -> Result<BinArray> {
    let remainder = bytes.len() % SAMPLE_WIDTH;
    if remainder != 0 {
        match policy {
            TruncationPolicy::Abort => {
                return Err(HistogramError::TruncatedPayload {
                    len: bytes.len(),
                    remainder,
                });
            }
            TruncationPolicy::DropPartial => {
                log::warn!(
                    "payload of {} bytes: dropping {remainder} byte(s) past the last sample",
                    bytes.len()
                );
            }
        }
    }

    let values = bytes
        .chunks_exact(SAMPLE_WIDTH)
        .map(|group| f32::from_le_bytes([group[0], group[1], group[2], group[3]]))
        .collect();

    Ok(BinArray {
        values,
        dropped_bytes: remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_decodes_little_endian_in_order() {
        let bytes = le_bytes(&[0.0, 34.0, -1.5, 3.2875]);
        let bins = decode_bins(&bytes, TruncationPolicy::Abort).unwrap();
        assert_eq!(bins.values, vec![0.0, 34.0, -1.5, 3.2875]);
        assert_eq!(bins.len(), bytes.len() / SAMPLE_WIDTH);
        assert_eq!(bins.dropped_bytes, 0);

        // 1.0f32 is 00 00 80 3f on the wire.
        let one = decode_bins(&[0x00, 0x00, 0x80, 0x3f], TruncationPolicy::Abort).unwrap();
        assert_eq!(one.values, vec![1.0]);
    }

    #[test]
    fn test_partial_group_is_reported_not_dropped() {
        let mut bytes = le_bytes(&[1.0, 2.0]);
        bytes.push(0x7f);
        let err = decode_bins(&bytes, TruncationPolicy::Abort).unwrap_err();
        assert_eq!(
            err,
            HistogramError::TruncatedPayload {
                len: 9,
                remainder: 1
            }
        );
    }

    #[test]
    fn test_drop_partial_keeps_whole_samples_and_records_loss() {
        let mut bytes = le_bytes(&[1.0, 2.0]);
        bytes.extend_from_slice(&[0x01, 0x02, 0x03]);
        let bins = decode_bins(&bytes, TruncationPolicy::DropPartial).unwrap();
        assert_eq!(bins.values, vec![1.0, 2.0]);
        assert_eq!(bins.dropped_bytes, 3);
    }

    #[test]
    fn test_raw_artifacts_pass_through() {
        let bytes = le_bytes(&[f32::NAN, -4.0]);
        let bins = decode_bins(&bytes, TruncationPolicy::Abort).unwrap();
        assert!(bins.values[0].is_nan());
        assert_eq!(bins.values[1], -4.0);
    }

    #[test]
    fn test_empty_payload_is_empty_array() {
        let bins = decode_bins(&[], TruncationPolicy::Abort).unwrap();
        assert!(bins.is_empty());
    }
}
