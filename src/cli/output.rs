//! CLI output formatting.

use std::fmt::Write as _;

use crate::pipeline::PipelineReport;

/// Human-readable run summary.
#[must_use]
pub fn format_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "═══ tspgen run ═══");
    if let Some(seed) = report.seed {
        let _ = writeln!(out, "  Seed:          {seed}");
    }
    for (label, path) in [
        ("Graph record:", &report.graph_written),
        ("Graph image:", &report.graph_image),
        ("Route image:", &report.route_image),
    ] {
        if let Some(path) = path {
            let _ = writeln!(out, "  {label:<14} {}", path.display());
        }
    }
    let _ = writeln!(out, "  Route source:  {}", report.route_source);
    if !report.route.is_empty() {
        let ids: Vec<String> = report.route.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  Route:         {}", ids.join(" "));
        let _ = writeln!(out, "  Total weight:  {:.2}", report.total_weight);
        let _ = writeln!(
            out,
            "  Closed tour:   {}",
            if report.closed_tour { "yes" } else { "no" }
        );
    }
    if let Some(distance) = report.solver_distance {
        let _ = writeln!(out, "  Solver dist.:  {distance:.2}");
    }
    if let Some(ms) = report.solver_elapsed_ms {
        let _ = writeln!(out, "  Solver time:   {ms}ms");
    }
    out
}

/// Print the run summary to stdout.
pub fn print_report(report: &PipelineReport) {
    print!("{}", format_report(report));
}
