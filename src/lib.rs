pub mod config;
pub mod error;
pub mod history;
pub mod output;
pub mod parse;
pub mod reconcile;
pub mod translate;

use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// Re-export commonly used types
pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use history::{changed_keys, ChangeSet, GitRevisionReader, RevisionReader};
pub use output::{render, Renderer, SummaryFormatter};
pub use parse::{parse, Entry, EntryMap, LocaleParser, LocaleSyntax, ParsedDocument, QuoteStyle};
pub use reconcile::{plan, Decision, ReconcileOptions, ReconciliationPlan};
pub use translate::{
    with_retry, ApplyStats, Applied, GoogleTranslator, Orchestrator, RetryPolicy, Translator,
};

/// What happened to one target file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// Output file was created or rewritten
    Written,
    /// Rendered output equals the existing file, nothing written
    UpToDate,
    /// Dry run: plan computed, no backend calls, no writes
    Planned,
    /// Target language equals the source language
    Skipped,
    /// Reading or writing the target failed
    Failed,
}

/// Per-target summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target_lang: String,
    pub output: PathBuf,
    pub status: TargetStatus,
    /// Keys the plan sent (or, in a dry run, would send) to the backend
    pub to_translate: usize,
    pub stats: ApplyStats,
    pub error: Option<String>,
}

impl TargetReport {
    fn new(target_lang: &str, output: PathBuf, status: TargetStatus) -> Self {
        Self {
            target_lang: target_lang.to_string(),
            output,
            status,
            to_translate: 0,
            stats: ApplyStats::default(),
            error: None,
        }
    }

    fn failed(target_lang: &str, output: PathBuf, err: &SyncError) -> Self {
        let mut report = Self::new(target_lang, output, TargetStatus::Failed);
        report.error = Some(err.to_string());
        report
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    /// `None` when no historical comparison was available
    pub changes: Option<ChangeSet>,
    pub reports: Vec<TargetReport>,
}

impl SyncOutcome {
    pub fn has_failures(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.status == TargetStatus::Failed)
    }
}

/// Main entry point: bring every target locale file in line with the source.
///
/// This function:
/// 1. Parses the source document once
/// 2. Works out which keys changed since `previous_revision` (when asked to)
/// 3. For each target language, reconciles, translates and renders the output
///
/// Only a missing source file (or an invalid configuration) is fatal; problems
/// with one target are recorded in its report and the remaining targets still run.
#[must_use = "this function returns a Result that should be handled"]
pub fn run_sync(
    config: &SyncConfig,
    backend: &dyn Translator,
    history: Option<&dyn RevisionReader>,
) -> Result<SyncOutcome> {
    config.validate()?;

    if !config.input_file.is_file() {
        return Err(SyncError::input_missing(&config.input_file));
    }
    let source_text = fs::read_to_string(&config.input_file)?;

    let parser = LocaleParser::for_path(&config.input_file);
    let source_doc = parser.parse(&source_text);
    info!(
        "'{}': {} entries",
        config.input_file.display(),
        source_doc.entries.len()
    );

    let changes = if config.evaluate_changes {
        detect_changes(config, &source_text, &parser, history)
    } else {
        info!("change evaluation disabled; only missing keys are translated");
        None
    };

    let source = SourceContext {
        config,
        parser,
        text: &source_text,
        doc: &source_doc,
        changes: changes.as_ref(),
        options: config.reconcile_options(),
        renderer: Renderer::new(parser, &config.protect_marker),
        backend,
    };

    let mut reports = Vec::with_capacity(config.target_langs.len());
    for target_lang in &config.target_langs {
        let output = config.output_path_for(target_lang);

        if *target_lang == config.source_lang {
            warn!("skipping target '{}': same as the source language", target_lang);
            reports.push(TargetReport::new(target_lang, output, TargetStatus::Skipped));
            continue;
        }

        let report = match source.sync_target(target_lang, &output) {
            Ok(report) => report,
            Err(e) => {
                error!("{} ({}): {}", target_lang, output.display(), e);
                TargetReport::failed(target_lang, output, &e)
            }
        };
        reports.push(report);
    }

    Ok(SyncOutcome { changes, reports })
}

/// The parsed source plus everything shared across targets
struct SourceContext<'a> {
    config: &'a SyncConfig,
    parser: LocaleParser,
    text: &'a str,
    doc: &'a ParsedDocument,
    changes: Option<&'a ChangeSet>,
    options: ReconcileOptions,
    renderer: Renderer<'a>,
    backend: &'a dyn Translator,
}

impl SourceContext<'_> {
    fn sync_target(&self, target_lang: &str, output: &Path) -> Result<TargetReport> {
        let existing_text = match fs::read_to_string(output) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let target_map = existing_text
            .as_deref()
            .map(|text| self.parser.parse(text).entries);

        let plan = reconcile::plan(
            &self.doc.entries,
            target_map.as_ref(),
            self.changes,
            &self.options,
        );

        let mut report = TargetReport::new(target_lang, output.to_path_buf(), TargetStatus::Planned);
        report.to_translate = plan.count(Decision::Translate);

        if self.config.dry_run {
            report.stats.preserved = plan.count(Decision::Keep);
            report.stats.copied = plan.count(Decision::CopySource);
            info!(
                "{}: would translate {} of {} entries",
                target_lang,
                report.to_translate,
                plan.len()
            );
            return Ok(report);
        }

        let applied = Orchestrator::new(self.backend, &self.config.source_lang, target_lang)
            .with_retry(self.config.retry)
            .apply(&plan, &self.doc.entries, target_map.as_ref());
        let rendered = self
            .renderer
            .render_parsed(self.text, self.doc, &applied.entries);

        report.stats = applied.stats;
        report.status = if existing_text.as_deref() == Some(rendered.as_str()) {
            TargetStatus::UpToDate
        } else {
            fs::write(output, &rendered)?;
            TargetStatus::Written
        };

        info!(
            "{}: {} translated, {} preserved -> '{}'",
            target_lang,
            report.stats.translated,
            report.stats.preserved,
            output.display()
        );
        Ok(report)
    }
}

/// Abbreviate commit ids the way git does
fn short_rev(revision: &str) -> &str {
    if revision.len() > 7 && revision.chars().all(|c| c.is_ascii_hexdigit()) {
        &revision[..7]
    } else {
        revision
    }
}

/// Work out the change set, degrading to `None` whenever history is unusable
fn detect_changes(
    config: &SyncConfig,
    source_text: &str,
    parser: &LocaleParser,
    history: Option<&dyn RevisionReader>,
) -> Option<ChangeSet> {
    let Some(previous) = config.previous_revision.as_deref() else {
        warn!("no previous revision given; falling back to missing-key detection");
        return None;
    };
    let Some(reader) = history else {
        warn!("revision history unavailable; falling back to missing-key detection");
        return None;
    };

    let read = |revision: &str| match reader.read_file_at_revision(&config.input_file, revision) {
        Ok(Some(text)) => Some(text),
        Ok(None) => {
            warn!(
                "'{}' did not exist at {}; falling back to missing-key detection",
                config.input_file.display(),
                short_rev(revision)
            );
            None
        }
        Err(e) => {
            warn!("{}; falling back to missing-key detection", e);
            None
        }
    };

    let old_text = read(previous)?;
    let new_text = match config.current_revision.as_deref() {
        Some(current) => Cow::Owned(read(current)?),
        None => Cow::Borrowed(source_text),
    };

    info!(
        "checking for changes in '{}' since {}",
        config.input_file.display(),
        short_rev(previous)
    );
    let changes = changed_keys(Some(&old_text), &new_text, parser);
    if let Some(changed) = &changes {
        if changed.is_empty() {
            info!("no key changes detected");
        } else {
            let keys: Vec<&str> = changed.iter().map(String::as_str).collect();
            info!("{} changed key(s): {}", changed.len(), keys.join(", "));
        }
    }
    changes
}
