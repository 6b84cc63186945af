use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use hemaview::data::model::{DifferentialEntry, DistributionCurve};
use hemaview::histogram::ReconstructedCurve;

use crate::color::ColorMap;
use crate::state::AppState;

const PLOT_HEIGHT: f32 = 220.0;

/// Tick positions of the instrument's PLT display.
const PLT_TICKS: [f64; 4] = [2.0, 10.0, 20.0, 30.0];

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render every plot of the current report.
pub fn report_plots(ui: &mut Ui, state: &AppState) {
    let report = match &state.report {
        Some(r) => r,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open an instrument record to view it  (File → Open…)");
            });
            return;
        }
    };

    ui.heading("PLT Histogram");
    match report.histogram.curve() {
        Some(curve) => {
            let bins = report
                .histogram
                .bins
                .as_ref()
                .filter(|_| state.show_bins)
                .map(|b| b.values.as_slice());
            histogram_plot(ui, curve, bins);
        }
        None => {
            ui.label(report.histogram.status().to_string());
        }
    }
    ui.separator();

    for curve in [&report.rbc_curve, &report.plt_curve].into_iter().flatten() {
        ui.heading(&curve.title);
        distribution_plot(ui, curve);
        ui.separator();
    }

    if let (Some(entries), Some(colors)) = (&report.differential, &state.differential_colors) {
        ui.heading("WBC Differential");
        differential_chart(ui, entries, colors);
    }
}

// ---------------------------------------------------------------------------
// Individual plots
// ---------------------------------------------------------------------------

/// Reconstructed PLT histogram, styled like the instrument screen: no y
/// axis, no grid, ticks at 2/10/20/30 fL.
pub fn histogram_plot(ui: &mut Ui, curve: &ReconstructedCurve, bins: Option<&[f32]>) {
    let points: PlotPoints = curve
        .x
        .iter()
        .zip(curve.y.iter())
        .map(|(&xi, &yi)| [xi, yi])
        .collect();
    let line = Line::new(points)
        .name("PLT")
        .color(Color32::LIGHT_BLUE)
        .width(2.0);

    // Raw bins, scaled so the tallest sits at 1.0 like the curve.
    let bin_points = bins.map(|values| {
        let max = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0f32, f32::max);
        let scale = if max > 0.0 { 1.0 / f64::from(max) } else { 0.0 };
        let pts: PlotPoints = curve
            .bin_axis
            .iter()
            .zip(values)
            .map(|(&x, &v)| [x, f64::from(v) * scale])
            .collect();
        Points::new(pts)
            .name("bins")
            .radius(2.5)
            .color(Color32::from_rgb(240, 160, 60))
    });

    Plot::new("plt_histogram")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Platelet Volume (fL)")
        .show_axes([true, false])
        .show_grid(false)
        .include_y(0.0)
        .include_y(1.05)
        .x_grid_spacer(|_input| {
            PLT_TICKS
                .iter()
                .map(|&value| egui_plot::GridMark {
                    value,
                    step_size: 10.0,
                })
                .collect()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
            if let Some(points) = bin_points {
                plot_ui.points(points);
            }
        });
}

/// Closed-form volume density.
pub fn distribution_plot(ui: &mut Ui, curve: &DistributionCurve) {
    let points: PlotPoints = curve
        .x
        .iter()
        .zip(curve.y.iter())
        .map(|(&xi, &yi)| [xi, yi])
        .collect();
    let line = Line::new(points)
        .name(format!("mean {:.1}, SD {:.1}", curve.mean, curve.sd))
        .color(Color32::LIGHT_RED)
        .width(1.5);

    Plot::new(&curve.title)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(curve.x_label.clone())
        .y_axis_label("Relative Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

/// Differential percentages as coloured bars, one per category.
pub fn differential_chart(ui: &mut Ui, entries: &[DifferentialEntry], colors: &ColorMap) {
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new(i as f64, e.percent)
                .name(format!("{} {:.1}%", e.label, e.share * 100.0))
                .fill(colors.color_for(&e.label))
                .width(0.7)
        })
        .collect();
    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (label, color) in colors.legend_entries() {
            ui.colored_label(color, format!("■ {label}"));
        }
    });

    Plot::new("wbc_differential")
        .height(PLOT_HEIGHT)
        .y_axis_label("%")
        .include_y(0.0)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("WBC"));
        });
}
