use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::histogram::{
    decode_payload, reconstruct, BinArray, DecodedPayload, HistogramError, PipelineDiagnostics,
    ReconstructedCurve, Reconstruction, ReconstructionConfig,
};

// ---------------------------------------------------------------------------
// ParameterSet – named numeric results of one report
// ---------------------------------------------------------------------------

/// Named numeric results in the order the instrument reported them.
///
/// A repeated name overwrites the earlier value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, f64)>,
}

impl ParameterSet {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut set = ParameterSet::default();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Closed-form curves and the differential
// ---------------------------------------------------------------------------

/// Normal density generated from a mean and standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionCurve {
    pub title: String,
    pub x_label: String,
    pub mean: f64,
    pub sd: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// One category of the white-cell differential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferentialEntry {
    pub label: String,
    /// Value as reported, in percent.
    pub percent: f64,
    /// Fraction of the summed reported percentages (what a pie slice shows).
    pub share: f64,
}

// ---------------------------------------------------------------------------
// HistogramSection – embedded PLT histogram of one report
// ---------------------------------------------------------------------------

/// Reconstruction result of a record's embedded histogram.
///
/// Bins are kept so the curve can be rebuilt with different parameters
/// without decoding the payload again.
#[derive(Debug, Clone)]
pub struct HistogramSection {
    pub diagnostics: PipelineDiagnostics,
    pub bins: Option<BinArray>,
    pub outcome: Result<Reconstruction, HistogramError>,
}

impl HistogramSection {
    pub fn analyze(raw: &str, tag: &str, config: &ReconstructionConfig) -> Self {
        let mut diagnostics = PipelineDiagnostics::default();
        match decode_payload(raw, tag, config, &mut diagnostics) {
            Ok(DecodedPayload::NoPayload) => Self {
                diagnostics,
                bins: None,
                outcome: Ok(Reconstruction::NoPayload),
            },
            Ok(DecodedPayload::Bins(bins)) => {
                let outcome = reconstruct(&bins, config).map(Reconstruction::Curve);
                Self {
                    diagnostics,
                    bins: Some(bins),
                    outcome,
                }
            }
            Err(err) => Self {
                diagnostics,
                bins: None,
                outcome: Err(err),
            },
        }
    }

    /// Rebuild the curve from the stored bins. No-op when decoding failed.
    pub fn rebuild(&mut self, config: &ReconstructionConfig) {
        if let Some(bins) = &self.bins {
            self.outcome = reconstruct(bins, config).map(Reconstruction::Curve);
        }
    }

    pub fn curve(&self) -> Option<&ReconstructedCurve> {
        match &self.outcome {
            Ok(Reconstruction::Curve(curve)) => Some(curve),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&HistogramError> {
        self.outcome.as_ref().err()
    }

    /// Short human-readable state for status lines and reports.
    pub fn status(&self) -> HistogramStatus<'_> {
        HistogramStatus(self)
    }
}

pub struct HistogramStatus<'a>(&'a HistogramSection);

impl fmt::Display for HistogramStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.outcome {
            Ok(Reconstruction::NoPayload) => write!(f, "no histogram payload"),
            Ok(Reconstruction::Curve(curve)) => write!(
                f,
                "{} bins reconstructed onto {} points",
                self.0.diagnostics.bins,
                curve.len()
            ),
            Err(err) => write!(f, "{} failed: {err}", err.stage()),
        }
    }
}

// ---------------------------------------------------------------------------
// CbcReport – everything derived from one instrument record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CbcReport {
    pub source: Option<PathBuf>,
    pub generated: DateTime<Local>,
    pub parameters: ParameterSet,
    pub histogram: HistogramSection,
    pub rbc_curve: Option<DistributionCurve>,
    pub plt_curve: Option<DistributionCurve>,
    pub differential: Option<Vec<DifferentialEntry>>,
}

impl CbcReport {
    /// Human-readable name of the record.
    pub fn title(&self) -> String {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<unsaved record>".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_set_keeps_first_position_on_overwrite() {
        let mut set = ParameterSet::default();
        set.insert("WBC", 6.1);
        set.insert("MCV", 87.9);
        set.insert("WBC", 6.4);
        let names: Vec<&str> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["WBC", "MCV"]);
        assert_eq!(set.get("WBC"), Some(6.4));
        assert_eq!(set.get("PLT"), None);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_section_without_payload() {
        let section = HistogramSection::analyze("R|1|^^^WBC|6.1", "base64^", &Default::default());
        assert!(matches!(section.outcome, Ok(Reconstruction::NoPayload)));
        assert!(section.curve().is_none());
        assert_eq!(section.diagnostics.fragments, 0);
        assert_eq!(section.status().to_string(), "no histogram payload");
    }

    #[test]
    fn test_section_reports_failing_stage() {
        let section = HistogramSection::analyze("x|base64^Q|", "base64^", &Default::default());
        let err = section.error().unwrap();
        assert!(matches!(err, HistogramError::MalformedFragment { index: 1, .. }));
        assert!(section.status().to_string().starts_with("payload reassembly failed"));
    }
}
