pub mod languages;

pub use languages::{output_path_for, parse_target_list, validate_lang_code};

use std::path::PathBuf;

use crate::error::{Result, SyncError};
use crate::parse::DEFAULT_PROTECT_MARKER;
use crate::reconcile::ReconcileOptions;
use crate::translate::RetryPolicy;

/// Everything one run needs, built once at startup and passed down explicitly
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source_lang: String,
    pub target_langs: Vec<String>,
    pub input_file: PathBuf,
    pub previous_revision: Option<String>,
    pub current_revision: Option<String>,
    /// Diff against `previous_revision` instead of only filling missing keys
    pub evaluate_changes: bool,
    /// Without history, retranslate every unprotected key
    pub full_retranslate: bool,
    pub protect_marker: String,
    pub retry: RetryPolicy,
    /// Plan only; no backend calls, no writes
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn new(
        source_lang: impl Into<String>,
        target_langs: Vec<String>,
        input_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_langs,
            input_file: input_file.into(),
            previous_revision: None,
            current_revision: None,
            evaluate_changes: true,
            full_retranslate: false,
            protect_marker: DEFAULT_PROTECT_MARKER.to_string(),
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_revisions(mut self, previous: Option<String>, current: Option<String>) -> Self {
        self.previous_revision = previous.filter(|r| !r.trim().is_empty());
        self.current_revision = current.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_evaluate_changes(mut self, evaluate_changes: bool) -> Self {
        self.evaluate_changes = evaluate_changes;
        self
    }

    pub fn with_full_retranslate(mut self, full_retranslate: bool) -> Self {
        self.full_retranslate = full_retranslate;
        self
    }

    pub fn with_protect_marker(mut self, marker: impl Into<String>) -> Self {
        self.protect_marker = marker.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions::default()
            .with_full_retranslate(self.full_retranslate)
            .with_protect_marker(self.protect_marker.clone())
    }

    pub fn output_path_for(&self, target_lang: &str) -> PathBuf {
        output_path_for(&self.input_file, target_lang)
    }

    /// Reject configurations that cannot produce any sensible output
    pub fn validate(&self) -> Result<()> {
        validate_lang_code(&self.source_lang).map_err(SyncError::InvalidConfig)?;
        for target in &self.target_langs {
            validate_lang_code(target).map_err(SyncError::InvalidConfig)?;
        }
        if self.protect_marker.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "protect marker cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::new("en", vec!["fr".into()], "locales/en.ts");
        assert!(config.evaluate_changes);
        assert!(!config.full_retranslate);
        assert!(!config.dry_run);
        assert_eq!(config.protect_marker, "[ignorei18n]");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.output_path_for("fr"), PathBuf::from("locales/fr.ts"));
    }

    #[test]
    fn test_blank_revisions_are_ignored() {
        let config = SyncConfig::new("en", vec![], "en.ts")
            .with_revisions(Some("".into()), Some("abc1234".into()));
        assert_eq!(config.previous_revision, None);
        assert_eq!(config.current_revision.as_deref(), Some("abc1234"));
    }

    #[test]
    fn test_validate() {
        assert!(SyncConfig::new("en", vec!["fr".into()], "en.ts").validate().is_ok());
        assert!(SyncConfig::new("english", vec![], "en.ts").validate().is_err());
        assert!(SyncConfig::new("en", vec!["f r".into()], "en.ts").validate().is_err());
        assert!(SyncConfig::new("en", vec![], "en.ts")
            .with_protect_marker(" ")
            .validate()
            .is_err());
    }

    #[test]
    fn test_reconcile_options_follow_config() {
        let options = SyncConfig::new("en", vec![], "en.ts")
            .with_full_retranslate(true)
            .with_protect_marker("@keep")
            .reconcile_options();
        assert!(options.full_retranslate);
        assert_eq!(options.protect_marker, "@keep");
    }
}
