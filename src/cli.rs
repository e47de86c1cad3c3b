//! Shared CLI output helpers.

use std::fmt;
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::pipeline::RunReport;

/// Total width of a section heading line.
const RULE_WIDTH: usize = 56;

/// Key column width in report rows.
const KEY_WIDTH: usize = 24;

pub fn banner(subtitle: &str) {
    eprintln!();
    eprintln!(
        "{} {} {}",
        "decorate_flatfile".bold().cyan(),
        concat!("v", env!("CARGO_PKG_VERSION")).dimmed(),
        subtitle.dimmed()
    );
    eprintln!();
}

/// Section heading followed by a rule filling the line.
pub fn section(title: &str) {
    let rule = "─".repeat(RULE_WIDTH.saturating_sub(title.chars().count() + 1));
    eprintln!("{} {}", title.bold().blue(), rule.dimmed());
}

pub fn kv(key: &str, value: impl fmt::Display) {
    eprintln!("  {:<width$} {value}", key.dimmed(), width = KEY_WIDTH);
}

pub fn success(msg: &str) {
    eprintln!("  {} {msg}", "done".green().bold());
}

pub fn warning(msg: &str) {
    eprintln!("  {} {}", "warn".yellow().bold(), msg.yellow());
}

/// Formats a duration as `HH:MM:SS.t`.
#[must_use]
pub fn format_elapsed(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let tenths = d.subsec_millis() / 100;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{tenths}")
}

/// Prints the per-run counters.
pub fn print_report(report: &RunReport) {
    let stats = &report.stats;
    kv("Annotated sequences", report.annotated_sequences);
    kv("RNA contigs", report.rna_contigs);
    kv(
        "RNA model coverage",
        format!(
            "{} complete, {} partial",
            report.coverage.complete, report.coverage.partial
        ),
    );
    kv("Records read", stats.blocks_read);
    kv("Records written", stats.blocks_written);
    kv(
        "Functionally annotated",
        format!(
            "{} records ({} lines)",
            stats.blocks_with_annotations, stats.annotation_lines
        ),
    );
    kv("RNA features", stats.rna_features);
    kv("Metadata stripped", stats.blocks_stripped);
    kv("Next locus tag", stats.final_locus_tag);

    if stats.blocks_skipped > 0 {
        warning(&format!(
            "{} records written unchanged after structural errors",
            stats.blocks_skipped
        ));
    }
    if stats.blocks_written == stats.blocks_read {
        success("all records written");
    }
}

pub fn print_summary(start: Instant) {
    eprintln!();
    eprintln!(
        "{}  {}",
        "Time".dimmed(),
        format_elapsed(start.elapsed()).bold()
    );
    eprintln!();
}
