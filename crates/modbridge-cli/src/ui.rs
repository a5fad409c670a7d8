//! Status messages on stderr.
//!
//! Results meant for other programs (`--json`) go to stdout; everything a
//! person reads goes through here.

use console::style;
use modbridge_bundler::PipelineReport;

/// Apply `--no-color` and the `NO_COLOR`/`FORCE_COLOR` conventions.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && crate::logger::should_use_colors();
    console::set_colors_enabled_stderr(enabled);
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Summary of a pipeline run.
pub fn print_summary(report: &PipelineReport) {
    info(&format!(
        "{} modules in, {} out ({} stubbed, {} pruned)",
        report.records_in, report.records_out, report.stubbed, report.pruned
    ));
    for stub in &report.stubs {
        eprintln!(
            "    {} {} -> {}",
            style(&stub.id).dim(),
            stub.from,
            style(&stub.import).cyan()
        );
    }
}
