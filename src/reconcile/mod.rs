//! Per-key KEEP / TRANSLATE decisions for one target language.
//!
//! Precedence, highest first:
//! 1. a protect marker on the target entry keeps the target value;
//! 2. a protect marker on the source entry copies the source value untranslated;
//! 3. with a change set, unchanged keys that already have a translation are kept;
//! 4. without one, existing translations are kept unless full retranslation is on;
//! 5. everything else is translated.

use serde::Serialize;
use tracing::debug;

use crate::history::ChangeSet;
use crate::parse::{EntryMap, DEFAULT_PROTECT_MARKER};

/// What happens to one key in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Copy the existing target entry verbatim
    Keep,
    /// Run the backend on the source value
    Translate,
    /// Emit the source entry untranslated
    CopySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub full_retranslate: bool,
    pub protect_marker: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            full_retranslate: false,
            protect_marker: DEFAULT_PROTECT_MARKER.to_string(),
        }
    }
}

impl ReconcileOptions {
    pub fn with_full_retranslate(mut self, full_retranslate: bool) -> Self {
        self.full_retranslate = full_retranslate;
        self
    }

    pub fn with_protect_marker(mut self, marker: impl Into<String>) -> Self {
        self.protect_marker = marker.into();
        self
    }
}

/// Decisions for every source key, in source document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationPlan {
    decisions: Vec<(String, Decision)>,
}

impl ReconciliationPlan {
    pub fn decision(&self, key_path: &str) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|(key, _)| key == key_path)
            .map(|(_, decision)| *decision)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decision)> {
        self.decisions.iter().map(|(key, d)| (key.as_str(), *d))
    }

    pub fn count(&self, decision: Decision) -> usize {
        self.decisions.iter().filter(|(_, d)| *d == decision).count()
    }

    /// Keys the backend will be asked about, in order
    pub fn keys_to_translate(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, d)| *d == Decision::Translate)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// Decide, for every key of `source`, whether to keep or (re)translate it.
///
/// Keys that only exist in `target` are not part of the plan and therefore
/// disappear from the output.
pub fn plan(
    source: &EntryMap,
    target: Option<&EntryMap>,
    changed: Option<&ChangeSet>,
    options: &ReconcileOptions,
) -> ReconciliationPlan {
    let marker = options.protect_marker.as_str();

    let decisions = source
        .iter()
        .map(|entry| {
            let key = entry.key_path.as_str();
            let existing = target.and_then(|t| t.get(key));

            let decision = match (existing, changed) {
                (Some(current), _) if current.is_protected(marker) => Decision::Keep,
                _ if entry.is_protected(marker) => Decision::CopySource,
                (Some(_), Some(changed)) if !changed.contains(key) => Decision::Keep,
                (Some(_), None) if !options.full_retranslate => Decision::Keep,
                _ => Decision::Translate,
            };
            debug!("{} -> {:?}", key, decision);

            (entry.key_path.clone(), decision)
        })
        .collect();

    ReconciliationPlan { decisions }
}
