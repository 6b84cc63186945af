use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – results and histogram controls
// ---------------------------------------------------------------------------

/// Render the left panel: parameter table, pipeline diagnostics, controls.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Report");
    ui.separator();

    let Some(report) = &state.report else {
        ui.label("No record loaded.");
        return;
    };
    ui.strong(report.title());
    ui.label(format!("Generated {}", report.generated.format("%Y-%m-%d %H:%M")));
    ui.add_space(4.0);

    let rows: Vec<(String, f64)> = report
        .parameters
        .iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    let diagnostics = report.histogram.diagnostics;
    let status = report.histogram.status().to_string();
    let failed = report.histogram.error().is_some();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Parameters ----
            let header = RichText::new(format!("Parameters  ({})", rows.len())).strong();
            egui::CollapsingHeader::new(header)
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if rows.is_empty() {
                        ui.label("No result lines.");
                        return;
                    }
                    TableBuilder::new(ui)
                        .striped(true)
                        .column(Column::auto().at_least(80.0))
                        .column(Column::remainder())
                        .header(18.0, |mut header| {
                            header.col(|ui| {
                                ui.strong("Parameter");
                            });
                            header.col(|ui| {
                                ui.strong("Value");
                            });
                        })
                        .body(|mut body| {
                            for (name, value) in &rows {
                                body.row(16.0, |mut row| {
                                    row.col(|ui| {
                                        ui.label(name);
                                    });
                                    row.col(|ui| {
                                        ui.monospace(format!("{value}"));
                                    });
                                });
                            }
                        });
                });

            // ---- Pipeline diagnostics ----
            egui::CollapsingHeader::new(RichText::new("Histogram payload").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let text = RichText::new(&status);
                    ui.label(if failed { text.color(Color32::RED) } else { text });
                    let grid = egui::Grid::new("diagnostics").num_columns(2);
                    grid.show(ui, |ui: &mut Ui| {
                        for (label, value) in [
                            ("Fragments", diagnostics.fragments),
                            ("Compressed bytes", diagnostics.compressed_len),
                            ("Decompressed bytes", diagnostics.decompressed_len),
                            ("Bins", diagnostics.bins),
                            ("Dropped bytes", diagnostics.dropped_bytes),
                            ("Trailing bytes", diagnostics.trailing_bytes),
                        ] {
                            ui.label(label);
                            ui.monospace(value.to_string());
                            ui.end_row();
                        }
                    });
                });

            // ---- Reconstruction controls ----
            egui::CollapsingHeader::new(RichText::new("Reconstruction").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let cfg = &mut state.config.histogram.reconstruction;
                    let mut changed = false;
                    let sigma = egui::Slider::new(&mut cfg.smoothing_sigma, 0.0..=10.0)
                        .text("σ (samples)");
                    changed |= ui.add(sigma).changed();
                    let resolution =
                        egui::Slider::new(&mut cfg.resolution, 2..=2000).text("Resolution");
                    changed |= ui.add(resolution).changed();
                    if changed {
                        state.rebuild_histogram();
                    }
                    ui.checkbox(&mut state.show_bins, "Show raw bins");
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.report.is_some();
            if ui.add_enabled(can_export, egui::Button::new("Export…")).clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(report) = &state.report {
            ui.label(format!(
                "{} – {} parameter(s)",
                report.title(),
                report.parameters.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open instrument record")
        .add_filter("Instrument records", &["txt", "astm", "hl7", "log"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        state.open_record(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export report")
        .add_filter("HTML", &["html"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet"])
        .set_file_name("report.html")
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
