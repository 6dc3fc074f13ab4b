use colored::*;

use crate::{SyncOutcome, TargetReport, TargetStatus};

/// Formatter for the end-of-run summary printed to stdout
pub struct SummaryFormatter {
    /// How many changed keys to list before eliding the rest
    max_keys: usize,
}

impl SummaryFormatter {
    /// Create a new SummaryFormatter listing at most 10 changed keys
    pub fn new() -> Self {
        Self { max_keys: 10 }
    }

    /// Create a SummaryFormatter with a custom key listing limit
    pub fn with_max_keys(max_keys: usize) -> Self {
        Self { max_keys }
    }

    /// Format a whole run as human readable text
    pub fn format(&self, outcome: &SyncOutcome) -> String {
        let mut output = String::new();
        self.format_changes(outcome, &mut output);

        for report in &outcome.reports {
            output.push_str(&self.format_report(report));
            output.push('\n');
        }

        let failed = outcome
            .reports
            .iter()
            .filter(|report| report.status == TargetStatus::Failed)
            .count();
        if failed > 0 {
            output.push_str(&format!("{} target(s) failed", failed).red().bold().to_string());
            output.push('\n');
        }
        output
    }

    /// Format a whole run as pretty-printed JSON
    pub fn format_json(&self, outcome: &SyncOutcome) -> serde_json::Result<String> {
        serde_json::to_string_pretty(outcome)
    }

    fn format_changes(&self, outcome: &SyncOutcome, output: &mut String) {
        match &outcome.changes {
            None => {
                output.push_str("Changes: not evaluated (missing keys only)\n");
            }
            Some(changes) if changes.is_empty() => {
                output.push_str("Changes: none\n");
            }
            Some(changes) => {
                output.push_str(&format!("Changes: {} key(s)\n", changes.len()));
                for key in changes.iter().take(self.max_keys) {
                    output.push_str(&format!("  {}\n", key.bold()));
                }
                if changes.len() > self.max_keys {
                    output.push_str(&format!(
                        "  ... and {} more\n",
                        changes.len() - self.max_keys
                    ));
                }
            }
        }
    }

    /// Format one target line, e.g. `✓ fr -> i18n/fr.ts: 2 translated, 5 preserved`
    fn format_report(&self, report: &TargetReport) -> String {
        let path = report.output.display();
        let stats = &report.stats;

        match report.status {
            TargetStatus::Skipped => format!(
                "{} {} -> {}: skipped (same as source)",
                "-".dimmed(),
                report.target_lang,
                path
            ),
            TargetStatus::Failed => format!(
                "{} {} -> {}: {}",
                "✗".red(),
                report.target_lang,
                path,
                report.error.as_deref().unwrap_or("failed")
            ),
            TargetStatus::Planned => format!(
                "{} {} -> {}: would translate {}, preserve {}, copy {}",
                "?".cyan(),
                report.target_lang,
                path,
                report.to_translate,
                stats.preserved,
                stats.copied
            ),
            TargetStatus::Written | TargetStatus::UpToDate => {
                let mut line = format!(
                    "{} {} -> {}: {} translated, {} preserved",
                    if report.status == TargetStatus::Written {
                        "✓".green()
                    } else {
                        "=".green()
                    },
                    report.target_lang,
                    path,
                    stats.translated,
                    stats.preserved
                );
                if stats.copied > 0 {
                    line.push_str(&format!(", {} copied", stats.copied));
                }
                if stats.skipped_empty > 0 {
                    line.push_str(&format!(", {} empty", stats.skipped_empty));
                }
                if stats.fallbacks > 0 {
                    let note = format!(", {} left in source language", stats.fallbacks);
                    line.push_str(&note.yellow().to_string());
                }
                if report.status == TargetStatus::UpToDate {
                    line.push_str(" (up to date)");
                }
                line
            }
        }
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new()
    }
}
