use serde::Serialize;
use tracing::{debug, warn};

use super::backend::Translator;
use super::retry::{with_retry, RetryPolicy};
use crate::parse::{Entry, EntryMap};
use crate::reconcile::{Decision, ReconciliationPlan};

/// Counters for one target language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    /// Entries that came back from the backend
    pub translated: usize,
    /// Existing target entries copied verbatim
    pub preserved: usize,
    /// Source entries copied untranslated on purpose
    pub copied: usize,
    /// Blank values that were never sent to the backend
    pub skipped_empty: usize,
    /// Entries that kept the source text after every attempt failed
    pub fallbacks: usize,
}

/// Final entries for one target, ready to render
#[derive(Debug, Clone)]
pub struct Applied {
    pub entries: EntryMap,
    pub stats: ApplyStats,
}

/// Fills in the TRANSLATE decisions of a plan through a backend
pub struct Orchestrator<'a> {
    backend: &'a dyn Translator,
    retry: RetryPolicy,
    source_lang: &'a str,
    target_lang: &'a str,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn Translator, source_lang: &'a str, target_lang: &'a str) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            source_lang,
            target_lang,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the final entry map. One entry failing never affects the others.
    pub fn apply(
        &self,
        plan: &ReconciliationPlan,
        source: &EntryMap,
        target: Option<&EntryMap>,
    ) -> Applied {
        let mut stats = ApplyStats::default();
        let mut entries = EntryMap::new();

        for (key, decision) in plan.iter() {
            let Some(source_entry) = source.get(key) else {
                continue;
            };

            let entry = match decision {
                // Planned only for keys the target already has
                Decision::Keep => {
                    stats.preserved += 1;
                    target
                        .and_then(|t| t.get(key))
                        .unwrap_or(source_entry)
                        .clone()
                }
                Decision::CopySource => {
                    stats.copied += 1;
                    source_entry.clone()
                }
                Decision::Translate if source_entry.value.trim().is_empty() => {
                    stats.skipped_empty += 1;
                    source_entry.clone()
                }
                Decision::Translate => self.translate_entry(source_entry, &mut stats),
            };

            entries.insert(entry);
        }

        Applied { entries, stats }
    }

    fn translate_entry(&self, source_entry: &Entry, stats: &mut ApplyStats) -> Entry {
        let result = with_retry(&self.retry, source_entry.value.clone(), |attempt| {
            debug!(
                "translating '{}' {}->{} (attempt {})",
                source_entry.key_path, self.source_lang, self.target_lang, attempt
            );
            self.backend
                .translate(&source_entry.value, self.source_lang, self.target_lang)
        });

        if result.fell_back {
            stats.fallbacks += 1;
            warn!(
                "could not translate '{}' to {}; keeping the source text",
                source_entry.key_path, self.target_lang
            );
            source_entry.clone()
        } else {
            stats.translated += 1;
            source_entry.with_value(result.value)
        }
    }
}
