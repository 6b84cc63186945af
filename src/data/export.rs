use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use crate::config::ExportConfig;
use crate::histogram::{PipelineDiagnostics, ReconstructedCurve};

use super::model::{CbcReport, DifferentialEntry, DistributionCurve};

/// Series names used in long-format exports.
pub const PLT_HISTOGRAM_SERIES: &str = "plt_histogram";
pub const RBC_DISTRIBUTION_SERIES: &str = "rbc_distribution";
pub const PLT_DISTRIBUTION_SERIES: &str = "plt_distribution";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a report to a file. Dispatch by extension.
///
/// Supported formats:
/// * `.html`    – standalone report with results and curve data tables
/// * `.json`    – full report, curves included
/// * `.csv`     – curves in long format: `series,x,y`
/// * `.parquet` – same long format as an Arrow table
pub fn export_report(report: &CbcReport, path: &Path, config: &ExportConfig) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let written = match ext.as_str() {
        "html" | "htm" => export_html(report, path, config),
        "json" => export_json(report, path),
        "csv" => export_csv(report, path),
        "parquet" | "pq" => export_parquet(report, path),
        other => Err(anyhow!("Unsupported export extension: .{other}")),
    };
    written.with_context(|| format!("exporting report to {}", path.display()))?;

    log::info!("exported {} to {}", report.title(), path.display());
    Ok(())
}

/// All x/y series of a report, histogram first.
pub fn curve_series(report: &CbcReport) -> Vec<(&'static str, &[f64], &[f64])> {
    let mut series: Vec<(&'static str, &[f64], &[f64])> = Vec::new();
    if let Some(curve) = report.histogram.curve() {
        series.push((PLT_HISTOGRAM_SERIES, curve.x.as_slice(), curve.y.as_slice()));
    }
    if let Some(curve) = &report.rbc_curve {
        series.push((RBC_DISTRIBUTION_SERIES, curve.x.as_slice(), curve.y.as_slice()));
    }
    if let Some(curve) = &report.plt_curve {
        series.push((PLT_DISTRIBUTION_SERIES, curve.x.as_slice(), curve.y.as_slice()));
    }
    series
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ParameterRow<'a> {
    name: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct HistogramJson<'a> {
    status: String,
    error_stage: Option<String>,
    error: Option<String>,
    diagnostics: PipelineDiagnostics,
    bins: Option<&'a [f32]>,
    curve: Option<&'a ReconstructedCurve>,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    source: Option<String>,
    generated: String,
    parameters: Vec<ParameterRow<'a>>,
    histogram: HistogramJson<'a>,
    rbc_curve: Option<&'a DistributionCurve>,
    plt_curve: Option<&'a DistributionCurve>,
    differential: Option<&'a [DifferentialEntry]>,
}

fn report_json(report: &CbcReport) -> ReportJson<'_> {
    let section = &report.histogram;
    ReportJson {
        source: report.source.as_ref().map(|p| p.display().to_string()),
        generated: report.generated.to_rfc3339(),
        parameters: report
            .parameters
            .iter()
            .map(|(name, value)| ParameterRow { name, value })
            .collect(),
        histogram: HistogramJson {
            status: section.status().to_string(),
            error_stage: section.error().map(|e| e.stage().to_string()),
            error: section.error().map(|e| e.to_string()),
            diagnostics: section.diagnostics,
            bins: section.bins.as_ref().map(|b| b.values.as_slice()),
            curve: section.curve(),
        },
        rbc_curve: report.rbc_curve.as_ref(),
        plt_curve: report.plt_curve.as_ref(),
        differential: report.differential.as_deref(),
    }
}

fn export_json(report: &CbcReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report_json(report))
        .context("writing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CurveRow<'a> {
    series: &'a str,
    x: f64,
    y: f64,
}

fn export_csv(report: &CbcReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("opening CSV")?;
    for (series, xs, ys) in curve_series(report) {
        for (&x, &y) in xs.iter().zip(ys) {
            writer
                .serialize(CurveRow { series, x, y })
                .with_context(|| format!("writing {series} row"))?;
        }
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn long_format_batch(report: &CbcReport) -> Result<RecordBatch> {
    let mut names: Vec<&str> = Vec::new();
    let mut all_x: Vec<f64> = Vec::new();
    let mut all_y: Vec<f64> = Vec::new();
    for (series, xs, ys) in curve_series(report) {
        names.extend(std::iter::repeat(series).take(xs.len()));
        all_x.extend_from_slice(xs);
        all_y.extend_from_slice(ys);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("series", DataType::Utf8, false),
        Field::new("x", DataType::Float64, false),
        Field::new("y", DataType::Float64, false),
    ]));

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(names)),
            Arc::new(Float64Array::from(all_x)),
            Arc::new(Float64Array::from(all_y)),
        ],
    )
    .context("building record batch")
}

fn export_parquet(report: &CbcReport, path: &Path) -> Result<()> {
    let batch = long_format_batch(report)?;
    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_curve_table(html: &mut String, xs: &[f64], ys: &[f64], x_label: &str, stride: usize) {
    let stride = stride.max(1);
    let _ = writeln!(
        html,
        "<table border=\"1\" cellpadding=\"3\"><tr><th>{}</th><th>y</th></tr>",
        escape_html(x_label)
    );
    let last = xs.len().saturating_sub(1);
    for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
        if i % stride == 0 || i == last {
            let _ = writeln!(html, "<tr><td>{x:.3}</td><td>{y:.6}</td></tr>");
        }
    }
    html.push_str("</table>\n");
}

/// Render the report as a standalone HTML page.
pub fn render_html(report: &CbcReport, config: &ExportConfig) -> String {
    let mut html = String::new();
    let title = escape_html(&report.title());

    let _ = writeln!(html, "<html>\n<head><title>CBC Report – {title}</title></head>\n<body>");
    html.push_str("<h1>CBC Automated Report</h1>\n");
    let _ = writeln!(
        html,
        "<p>Record: {title}<br>Generated: {}</p>",
        report.generated.format("%Y-%m-%d %H:%M:%S")
    );

    html.push_str("<h2>Numeric Results</h2>\n<table border=\"1\" cellpadding=\"5\">\n");
    for (name, value) in report.parameters.iter() {
        let _ = writeln!(html, "<tr><td>{}</td><td>{value}</td></tr>", escape_html(name));
    }
    html.push_str("</table>\n");

    html.push_str("<h2>PLT Histogram</h2>\n");
    let _ = writeln!(html, "<p>{}</p>", escape_html(&report.histogram.status().to_string()));
    if let Some(curve) = report.histogram.curve() {
        push_curve_table(
            &mut html,
            &curve.x,
            &curve.y,
            "Platelet Volume (fL)",
            config.html_table_stride,
        );
    }

    for curve in [&report.rbc_curve, &report.plt_curve].into_iter().flatten() {
        let _ = writeln!(
            html,
            "<h2>{}</h2>\n<p>mean {:.2} fL, SD {:.2} fL</p>",
            escape_html(&curve.title),
            curve.mean,
            curve.sd
        );
        push_curve_table(&mut html, &curve.x, &curve.y, &curve.x_label, config.html_table_stride);
    }

    if let Some(entries) = &report.differential {
        html.push_str("<h2>WBC Differential</h2>\n<table border=\"1\" cellpadding=\"5\">\n");
        html.push_str("<tr><th>Cell</th><th>%</th><th>Share</th></tr>\n");
        for e in entries {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{:.1}%</td></tr>",
                escape_html(&e.label),
                e.percent,
                e.share * 100.0
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body></html>\n");
    html
}

fn export_html(report: &CbcReport, path: &Path, config: &ExportConfig) -> Result<()> {
    std::fs::write(path, render_html(report, config)).context("writing HTML")
}
