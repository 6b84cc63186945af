use serde::{Deserialize, Serialize};

use super::bins::{BinArray, TruncationPolicy};
use super::error::{HistogramError, Result};
use super::interp::Pchip;
use super::smooth::{gaussian_smooth, TRUNCATE};

// ---------------------------------------------------------------------------
// ReconstructionConfig
// ---------------------------------------------------------------------------

/// Parameters of one reconstruction. Passed explicitly; nothing is global.
///
/// The defaults are the PLT channel reference values: 2–30 fL, 400 dense
/// samples, σ = 1.5 samples, chosen to match the instrument's own display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    #[serde(default = "ReconstructionConfig::default_min_volume")]
    pub min_volume: f64,
    #[serde(default = "ReconstructionConfig::default_max_volume")]
    pub max_volume: f64,
    #[serde(default = "ReconstructionConfig::default_resolution")]
    pub resolution: usize,
    #[serde(default = "ReconstructionConfig::default_smoothing_sigma")]
    pub smoothing_sigma: f64,
    #[serde(default)]
    pub truncation: TruncationPolicy,
}

impl ReconstructionConfig {
    fn default_min_volume() -> f64 {
        2.0
    }
    fn default_max_volume() -> f64 {
        30.0
    }
    fn default_resolution() -> usize {
        400
    }
    fn default_smoothing_sigma() -> f64 {
        1.5
    }

    /// Check that every parameter is inside its domain.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(HistogramError::InvalidConfig(msg));
        if !self.min_volume.is_finite() || !self.max_volume.is_finite() {
            return invalid(format!(
                "volume bounds must be finite (got {}..{})",
                self.min_volume, self.max_volume
            ));
        }
        if self.min_volume <= 0.0 {
            return invalid(format!("min_volume must be > 0 (got {})", self.min_volume));
        }
        if self.min_volume >= self.max_volume {
            return invalid(format!(
                "min_volume {} must be below max_volume {}",
                self.min_volume, self.max_volume
            ));
        }
        if self.resolution < 2 {
            return invalid(format!("resolution must be >= 2 (got {})", self.resolution));
        }
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma < 0.0 {
            return invalid(format!(
                "smoothing_sigma must be finite and >= 0 (got {})",
                self.smoothing_sigma
            ));
        }
        let radius = TRUNCATE * self.smoothing_sigma + 0.5;
        if radius > self.resolution as f64 {
            return invalid(format!(
                "smoothing_sigma {} needs a {:.0}-sample kernel, above resolution {}",
                self.smoothing_sigma,
                radius.floor(),
                self.resolution
            ));
        }
        Ok(())
    }
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            min_volume: Self::default_min_volume(),
            max_volume: Self::default_max_volume(),
            resolution: Self::default_resolution(),
            smoothing_sigma: Self::default_smoothing_sigma(),
            truncation: TruncationPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// `n` points with a constant ratio between neighbours, endpoints exact.
///
/// Instrument bin widths grow multiplicatively with volume, so bin `i`
/// sits at `min * (max / min)^(i / (n - 1))`.
pub fn geometric_axis(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let (ln_min, ln_max) = (min.ln(), max.ln());
            let step = (ln_max - ln_min) / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| (ln_min + step * i as f64).exp()).collect();
            axis[0] = min;
            axis[n - 1] = max;
            axis
        }
    }
}

/// `n` evenly spaced points over `[min, max]`, endpoints exact.
pub fn linear_axis(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;
            let mut axis: Vec<f64> = (0..n).map(|i| min + step * i as f64).collect();
            axis[n - 1] = max;
            axis
        }
    }
}

// ---------------------------------------------------------------------------
// ReconstructedCurve
// ---------------------------------------------------------------------------

/// Dense, non-negative curve with unit peak, in physical volume units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Physical coordinate of each raw bin.
    pub bin_axis: Vec<f64>,
}

impl ReconstructedCurve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Index and x position of the peak.
    pub fn peak(&self) -> Option<(usize, f64)> {
        self.y
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| (i, self.x[i]))
    }
}

/// Turn coarse bins into a smooth curve over `[min_volume, max_volume]`.
///
/// Steps: geometric bin axis, dense linear axis, PCHIP interpolation,
/// Gaussian smoothing, negative clamp, peak normalisation. Pure in its
/// inputs.
pub fn reconstruct(bins: &BinArray, config: &ReconstructionConfig) -> Result<ReconstructedCurve> {
    config.validate()?;

    if bins.is_empty() {
        return Err(HistogramError::DegenerateHistogram { max: 0.0 });
    }

    let non_finite = bins.values.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        log::warn!("{non_finite} non-finite bin(s) treated as empty");
    }
    let counts: Vec<f64> = bins
        .values
        .iter()
        .map(|&v| if v.is_finite() { f64::from(v) } else { 0.0 })
        .collect();

    let bin_axis = geometric_axis(config.min_volume, config.max_volume, counts.len());
    let x = linear_axis(config.min_volume, config.max_volume, config.resolution);

    let interpolant = Pchip::new(&bin_axis, &counts).ok_or_else(|| {
        HistogramError::InvalidConfig("bin axis is not strictly increasing".to_string())
    })?;
    let raw = interpolant.eval_many(&x);

    let mut y = gaussian_smooth(&raw, config.smoothing_sigma);
    for v in &mut y {
        if *v < 0.0 {
            *v = 0.0;
        }
    }

    let max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(max.is_finite() && max > 0.0) {
        return Err(HistogramError::DegenerateHistogram { max });
    }
    for v in &mut y {
        *v /= max;
    }

    log::debug!(
        "reconstructed {} bins onto {} points over {}..{} fL",
        counts.len(),
        x.len(),
        config.min_volume,
        config.max_volume
    );

    Ok(ReconstructedCurve { x, y, bin_axis })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn bins(values: &[f32]) -> BinArray {
        BinArray {
            values: values.to_vec(),
            dropped_bytes: 0,
        }
    }

    #[test]
    fn test_geometric_axis_has_constant_ratio() {
        let axis = geometric_axis(2.0, 30.0, 5);
        assert_eq!(axis[0], 2.0);
        assert_eq!(axis[4], 30.0);
        let ratio = axis[1] / axis[0];
        for w in axis.windows(2) {
            assert_relative_eq!(w[1] / w[0], ratio, epsilon = 1e-12);
        }
        // Middle bin is the geometric mean of the bounds.
        assert_relative_eq!(axis[2], (2.0f64 * 30.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_axis_endpoints() {
        let axis = linear_axis(2.0, 30.0, 400);
        assert_eq!(axis.len(), 400);
        assert_eq!(axis[0], 2.0);
        assert_eq!(axis[399], 30.0);
        assert_relative_eq!(axis[1] - axis[0], 28.0 / 399.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_spike_peaks_near_its_bin() {
        let curve = reconstruct(&bins(&[0.0, 0.0, 1.0, 0.0, 0.0]), &ReconstructionConfig::default())
            .unwrap();
        assert_eq!(curve.len(), 400);
        assert!(curve.y.iter().all(|&v| v >= 0.0));
        assert_eq!(curve.y.iter().copied().fold(f64::MIN, f64::max), 1.0);

        let (_, peak_x) = curve.peak().unwrap();
        let middle = curve.bin_axis[2];
        let spacing = curve.x[1] - curve.x[0];
        assert!(
            (peak_x - middle).abs() < 3.0 * spacing,
            "peak at {peak_x}, middle bin at {middle}"
        );
    }

    #[test]
    fn test_all_zero_bins_are_degenerate() {
        let err = reconstruct(&bins(&[0.0; 64]), &ReconstructionConfig::default()).unwrap_err();
        assert!(matches!(err, HistogramError::DegenerateHistogram { .. }));

        let err = reconstruct(&bins(&[-1.0, -3.0, -2.0]), &ReconstructionConfig::default())
            .unwrap_err();
        assert!(matches!(err, HistogramError::DegenerateHistogram { .. }));

        let err = reconstruct(&bins(&[]), &ReconstructionConfig::default()).unwrap_err();
        assert!(matches!(err, HistogramError::DegenerateHistogram { .. }));
    }

    #[test]
    fn test_negative_and_nan_artifacts_are_floored() {
        let curve = reconstruct(
            &bins(&[0.0, -5.0, 2.0, f32::NAN, 8.0, 3.0, -1.0, 0.0]),
            &ReconstructionConfig::default(),
        )
        .unwrap();
        assert!(curve.y.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert_eq!(curve.y.iter().copied().fold(f64::MIN, f64::max), 1.0);
    }

    #[test]
    fn test_single_bin_gives_flat_curve() {
        let curve = reconstruct(&bins(&[4.0]), &ReconstructionConfig::default()).unwrap();
        assert!(curve.y.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_resolution_and_sigma_are_honoured() {
        let config = ReconstructionConfig {
            resolution: 50,
            smoothing_sigma: 0.0,
            ..Default::default()
        };
        let curve = reconstruct(&bins(&[1.0, 2.0, 4.0, 2.0, 1.0]), &config).unwrap();
        assert_eq!(curve.x.len(), 50);
        assert_eq!(curve.y.len(), 50);
        // Unsmoothed, both ends sit exactly on the equal end bins, and the
        // interpolant never exceeds the tallest bin.
        assert_eq!(curve.y[0], curve.y[49]);
        assert!(curve.y[0] >= 0.25 && curve.y[0] < 0.3);
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let b = bins(&[0.0, 3.0, 9.0, 27.0, 14.0, 6.0, 1.0, 0.5]);
        let config = ReconstructionConfig::default();
        let first = reconstruct(&b, &config).unwrap();
        let second = reconstruct(&b, &config).unwrap();
        assert_eq!(first, second);
        let bits = |c: &ReconstructedCurve| c.y.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let b = bins(&[1.0, 2.0]);
        for config in [
            ReconstructionConfig {
                min_volume: 0.0,
                ..Default::default()
            },
            ReconstructionConfig {
                min_volume: 30.0,
                max_volume: 2.0,
                ..Default::default()
            },
            ReconstructionConfig {
                max_volume: f64::INFINITY,
                ..Default::default()
            },
            ReconstructionConfig {
                resolution: 1,
                ..Default::default()
            },
            ReconstructionConfig {
                smoothing_sigma: -1.0,
                ..Default::default()
            },
        ] {
            let err = reconstruct(&b, &config).unwrap_err();
            assert!(matches!(err, HistogramError::InvalidConfig(_)), "{config:?}");
        }
    }

    #[test]
    fn test_sigma_wider_than_the_curve_is_rejected() {
        let b = bins(&[1.0, 4.0, 2.0]);
        let huge = ReconstructionConfig {
            smoothing_sigma: 1e20,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(HistogramError::InvalidConfig(_))));
        assert!(matches!(
            reconstruct(&b, &huge),
            Err(HistogramError::InvalidConfig(_))
        ));

        // Radius floor(4 * 99.8 + 0.5) = 399 still fits 400 samples.
        let widest = ReconstructionConfig {
            smoothing_sigma: 99.8,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
        let too_wide = ReconstructionConfig {
            smoothing_sigma: 100.0,
            ..Default::default()
        };
        assert!(too_wide.validate().is_err());
    }
}
