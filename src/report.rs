//! Plain-text rendering of a stored analysis for the terminal.

use std::fmt::Write;

use crate::api::{Metrics, NailDetail};
use crate::store::StoredAnalysis;

/// Resolved URLs of the two rendered images.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImageUrls {
    pub output_image: String,
    pub analysis_image: String,
}

fn count(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => "n/a".to_string(),
    }
}

/// Ratio in [0, 1] as a percentage with `decimals` digits.
fn percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v * 100.0),
        None => "n/a".to_string(),
    }
}

fn render_metrics(out: &mut String, metrics: &Metrics) {
    let _ = writeln!(out, "  Nails detected:   {}", count(metrics.nail_count()));
    let _ = writeln!(out, "  Matches found:    {}", count(metrics.match_count()));
    let _ = writeln!(out, "  Detection score:  {}", percent(metrics.detection_score(), 1));
    let _ = writeln!(out, "  Match precision:  {}", percent(metrics.match_precision(), 1));
    let _ = writeln!(out, "  Match recall:     {}", percent(metrics.match_recall(), 1));
}

/// Table of individual nail measurements.
pub fn render_nail_details(details: &[NailDetail]) -> String {
    if details.is_empty() {
        return "No individual nail measurements available.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>22}  {:>12}  {:>11}  {:>10}",
        "#", "Box (x1,y1,x2,y2)", "Height (mm)", "Weight (g)", "Confidence"
    );
    for (index, nail) in details.iter().enumerate() {
        let bbox = format!(
            "{:.0},{:.0},{:.0},{:.0}",
            nail.x1, nail.y1, nail.x2, nail.y2
        );
        let _ = writeln!(
            out,
            "{:>4}  {:>22}  {:>12.2}  {:>11.2}  {:>10}",
            index + 1,
            bbox,
            nail.height_mm,
            nail.weight_g,
            percent(Some(nail.confidence), 0)
        );
    }
    out
}

/// Full results summary for one analysis.
pub fn render_summary(analysis: &StoredAnalysis, urls: &ImageUrls) -> String {
    let mut out = String::new();
    let _ = write!(out, "Analysis results for: {}", analysis.file_name);
    if analysis.use_kmeans {
        out.push_str(" [K-means enabled]");
    }
    out.push('\n');

    render_metrics(&mut out, &analysis.result.metrics);

    let _ = writeln!(out, "  Detection image:  {}", urls.output_image);
    let _ = writeln!(out, "  Analysis image:   {}", urls.analysis_image);
    let _ = writeln!(out, "  Results CSV:      {}", analysis.result.results_csv);

    if let Some(details) = &analysis.result.nail_details {
        out.push_str("\nIndividual nail measurements:\n");
        out.push_str(&render_nail_details(details));
    }
    out
}
