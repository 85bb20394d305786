use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::RunReport;

/// Number of history samples shown by the text rendering
const HISTORY_SAMPLES: usize = 10;

/// Render `report` as a short human-readable summary
pub fn render_text(report: &RunReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "function:   {}", report.function);
    let _ = writeln!(out, "dimension:  {}", report.dim);
    let _ = writeln!(out, "particles:  {}", report.swarm_size);
    let _ = writeln!(out, "workers:    {}", report.workers);
    let _ = writeln!(out, "seed:       {}", report.seed);
    let _ = writeln!(out, "iterations: {}", report.iterations);
    let _ = writeln!(out, "best index: {}", report.best_index);
    let _ = writeln!(out, "position:   {}", format_vector(&report.best_position));
    let _ = writeln!(out, "fitness:    {:.10}", report.best_fitness);

    if !report.history.is_empty() {
        let _ = writeln!(out, "history:");
        for (iteration, fitness) in sample_history(&report.history) {
            let _ = writeln!(out, "  {iteration:>8}  {fitness:.10}");
        }
    }
    out
}

/// Render `report` as pretty-printed JSON
pub fn render_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Write `report` as JSON to `path`
pub fn write_report(report: &RunReport, path: impl AsRef<Path>) -> io::Result<()> {
    let json = render_json(report).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Load a report previously written by [`write_report`]
pub fn load_report(path: impl AsRef<Path>) -> io::Result<RunReport> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn format_vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Evenly spaced `(iteration, fitness)` pairs, always ending at the last one
fn sample_history(history: &[f64]) -> Vec<(usize, f64)> {
    let len = history.len();
    if len <= HISTORY_SAMPLES {
        return history.iter().copied().enumerate().collect();
    }
    let stride = len.div_ceil(HISTORY_SAMPLES);
    let mut samples: Vec<(usize, f64)> = (0..len)
        .step_by(stride)
        .map(|i| (i, history[i]))
        .collect();
    if samples.last().map(|&(i, _)| i) != Some(len - 1) {
        samples.push((len - 1, history[len - 1]));
    }
    samples
}
