use std::f64::consts::PI;

use crate::config::DistributionConfig;
use crate::histogram::curve::linear_axis;

use super::model::{DifferentialEntry, DistributionCurve, ParameterSet};

/// Differential categories, in display order.
pub const DIFFERENTIAL_KEYS: [&str; 5] = ["NEU%", "LYM%", "MON%", "EOS%", "BAS%"];

fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * PI).sqrt())
}

fn normal_curve(
    title: &str,
    x_label: &str,
    mean: f64,
    sd: f64,
    range: [f64; 2],
    samples: usize,
) -> Option<DistributionCurve> {
    if !mean.is_finite() || !sd.is_finite() || sd <= 0.0 {
        log::warn!("{title}: cannot build a normal curve from mean {mean}, sd {sd}");
        return None;
    }
    let x = linear_axis(range[0], range[1], samples);
    let y = x.iter().map(|&xi| normal_pdf(xi, mean, sd)).collect();
    Some(DistributionCurve {
        title: title.to_string(),
        x_label: x_label.to_string(),
        mean,
        sd,
        x,
        y,
    })
}

/// RBC volume curve from `MCV` and `RDW-CV` (SD = RDW-CV × MCV / 100).
pub fn rbc_curve(params: &ParameterSet, cfg: &DistributionConfig) -> Option<DistributionCurve> {
    let mcv = params.get("MCV")?;
    let rdw_cv = params.get("RDW-CV")?;
    let sd = rdw_cv * mcv / 100.0;
    normal_curve(
        "RBC Volume Distribution",
        "Cell Volume (fL)",
        mcv,
        sd,
        cfg.rbc_range,
        cfg.samples,
    )
}

/// PLT volume curve from `MPV` and `PDW`; PDW is reported in fL and used as the SD.
pub fn plt_curve(params: &ParameterSet, cfg: &DistributionConfig) -> Option<DistributionCurve> {
    let mpv = params.get("MPV")?;
    let pdw = params.get("PDW")?;
    normal_curve(
        "Platelet Volume Distribution",
        "Platelet Volume (fL)",
        mpv,
        pdw,
        cfg.plt_range,
        cfg.samples,
    )
}

/// White-cell differential from whichever of [`DIFFERENTIAL_KEYS`] are present.
pub fn wbc_differential(params: &ParameterSet) -> Option<Vec<DifferentialEntry>> {
    let present: Vec<(&str, f64)> = DIFFERENTIAL_KEYS
        .iter()
        .filter_map(|key| params.get(key).map(|v| (*key, v)))
        .collect();
    if present.is_empty() {
        return None;
    }

    let total: f64 = present.iter().map(|(_, v)| v).sum();
    Some(
        present
            .into_iter()
            .map(|(key, percent)| DifferentialEntry {
                label: key.replace('%', ""),
                percent,
                share: if total > 0.0 { percent / total } else { 0.0 },
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn params(pairs: &[(&str, f64)]) -> ParameterSet {
        pairs.iter().map(|(n, v)| (*n, *v)).collect()
    }

    #[test]
    fn test_rbc_curve_uses_rdw_as_relative_width() {
        let p = params(&[("MCV", 87.9), ("RDW-CV", 13.2)]);
        let curve = rbc_curve(&p, &DistributionConfig::default()).unwrap();
        assert_relative_eq!(curve.sd, 13.2 * 87.9 / 100.0);
        assert_eq!(curve.x.len(), 1000);
        assert_eq!(curve.x[0], 0.0);
        assert_eq!(curve.x[999], 200.0);

        // Density integrates to ~1 over a range covering ±6 SD.
        let dx = curve.x[1] - curve.x[0];
        let area: f64 = curve.y.iter().sum::<f64>() * dx;
        assert_relative_eq!(area, 1.0, epsilon = 1e-3);

        let peak = curve.y.iter().copied().fold(f64::MIN, f64::max);
        assert_relative_eq!(peak, 1.0 / (curve.sd * (2.0 * PI).sqrt()), max_relative = 1e-3);
    }

    #[test]
    fn test_plt_curve_takes_pdw_as_sd() {
        let p = params(&[("MPV", 7.8), ("PDW", 9.2)]);
        let curve = plt_curve(&p, &DistributionConfig::default()).unwrap();
        assert_eq!(curve.mean, 7.8);
        assert_eq!(curve.sd, 9.2);
        assert_eq!(curve.x[999], 30.0);
    }

    #[test]
    fn test_missing_or_invalid_parameters_give_none() {
        let cfg = DistributionConfig::default();
        assert!(rbc_curve(&params(&[("MCV", 87.9)]), &cfg).is_none());
        assert!(plt_curve(&params(&[("PDW", 9.2)]), &cfg).is_none());
        assert!(plt_curve(&params(&[("MPV", 7.8), ("PDW", 0.0)]), &cfg).is_none());
    }

    #[test]
    fn test_differential_keeps_category_order() {
        let p = params(&[
            ("LYM%", 26.7),
            ("BAS%", 0.5),
            ("NEU%", 64.1),
            ("EOS%", 1.8),
            ("MON%", 6.9),
        ]);
        let diff = wbc_differential(&p).unwrap();
        let labels: Vec<&str> = diff.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["NEU", "LYM", "MON", "EOS", "BAS"]);
        assert_relative_eq!(diff.iter().map(|e| e.share).sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(diff[0].share, 0.641, epsilon = 1e-12);
    }

    #[test]
    fn test_partial_and_empty_differential() {
        let diff = wbc_differential(&params(&[("EOS%", 2.0), ("MCV", 90.0)])).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].share, 1.0);
        assert!(wbc_differential(&params(&[("MCV", 90.0)])).is_none());
    }
}
