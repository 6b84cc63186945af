use std::path::Path;

use hemaview::config::AppConfig;
use hemaview::data::export::export_report;
use hemaview::data::loader::load_record;
use hemaview::data::model::CbcReport;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Active configuration; histogram controls edit its reconstruction part.
    pub config: AppConfig,

    /// Loaded report (None until the user opens a record).
    pub report: Option<CbcReport>,

    /// Colours of the differential categories of the current report.
    pub differential_colors: Option<ColorMap>,

    /// Overlay the raw bins on the reconstructed histogram.
    pub show_bins: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            report: None,
            differential_colors: None,
            show_bins: false,
            status_message: None,
        }
    }

    /// Ingest a newly loaded report and rebuild its colour map.
    pub fn set_report(&mut self, report: CbcReport) {
        self.differential_colors = report
            .differential
            .as_ref()
            .map(|entries| ColorMap::new(entries.iter().map(|e| e.label.as_str())));

        self.status_message = report
            .histogram
            .error()
            .map(|err| format!("Histogram: {err}"));
        self.report = Some(report);
    }

    /// Load a record from disk, reporting failure in the status line.
    pub fn open_record(&mut self, path: &Path) {
        match load_record(path, &self.config) {
            Ok(report) => self.set_report(report),
            Err(e) => {
                log::error!("Failed to load record: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Re-run reconstruction after the histogram controls changed.
    pub fn rebuild_histogram(&mut self) {
        let reconstruction = self.config.histogram.reconstruction;
        if let Some(report) = &mut self.report {
            report.histogram.rebuild(&reconstruction);
            self.status_message = report
                .histogram
                .error()
                .map(|err| format!("Histogram: {err}"));
        }
    }

    /// Export the current report, reporting the outcome in the status line.
    pub fn export(&mut self, path: &Path) {
        let Some(report) = &self.report else {
            self.status_message = Some("Nothing to export".to_string());
            return;
        };
        match export_report(report, path, &self.config.export) {
            Ok(()) => self.status_message = Some(format!("Exported {}", path.display())),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_open_reports_error_and_keeps_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(AppConfig::default());
        state.open_record(&dir.path().join("missing.txt"));
        assert!(state.report.is_none());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.starts_with("Error: reading record"), "{msg}");
    }

    #[test]
    fn test_open_then_rebuild_with_new_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.txt");
        std::fs::write(&path, "R|1|^^^NEU%|60|%|||N\rR|2|^^^LYM%|40|%|||N\r").unwrap();

        let mut state = AppState::new(AppConfig::default());
        state.open_record(&path);
        assert!(state.report.is_some());
        assert!(state.status_message.is_none());
        let colors = state.differential_colors.as_ref().unwrap();
        assert_ne!(colors.color_for("NEU"), colors.color_for("LYM"));

        // No payload: rebuilding leaves the outcome alone.
        state.config.histogram.reconstruction.resolution = 100;
        state.rebuild_histogram();
        assert!(state.status_message.is_none());
    }
}
