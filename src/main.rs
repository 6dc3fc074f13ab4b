use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use i18n_sync::config::{parse_target_list, validate_lang_code};
use i18n_sync::{
    GitRevisionReader, GoogleTranslator, RetryPolicy, RevisionReader, SummaryFormatter,
    SyncConfig,
};

/// i18n sync - Keep translated locale files in step with a source locale file
#[derive(Parser, Debug)]
#[command(name = "i18n-sync")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Source language code (e.g. "en")
    #[arg(long, env = "INPUT_SOURCE", value_parser = validate_lang_code)]
    source: String,

    /// Comma separated target language codes (e.g. "fr,de,pt-BR")
    #[arg(long, env = "INPUT_TARGETS")]
    targets: String,

    /// Source locale file; targets are written next to it as <lang>.<ext>
    #[arg(long, env = "INPUT_INPUT_FILE", value_name = "FILE")]
    input_file: PathBuf,

    /// Revision the source file is compared against
    #[arg(long, env = "INPUT_PREVIOUS_HEAD", value_name = "REV")]
    previous_head: Option<String>,

    /// Revision holding the new source file (default: the file on disk)
    #[arg(long, env = "INPUT_CURRENT_HEAD", value_name = "REV")]
    current_head: Option<String>,

    /// Retranslate keys whose source text changed since --previous-head
    #[arg(
        long,
        env = "INPUT_EVALUATE_CHANGES",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    evaluate_changes: bool,

    /// Without a usable history, retranslate every unprotected key
    #[arg(long, env = "INPUT_FULL_RETRANSLATE")]
    full_retranslate: bool,

    /// Trailing comment text that protects an entry from translation
    #[arg(long, env = "INPUT_PROTECT_MARKER", default_value = i18n_sync::parse::DEFAULT_PROTECT_MARKER)]
    protect_marker: String,

    /// Attempts per entry before keeping the source text (1-10)
    #[arg(
        long,
        env = "INPUT_MAX_ATTEMPTS",
        default_value = "3",
        value_parser = clap::value_parser!(u32).range(1..=10)
    )]
    max_attempts: u32,

    /// Delay before the first retry, doubled on each further attempt
    #[arg(long, default_value = "500", value_name = "MS")]
    retry_delay_ms: u64,

    /// Translation endpoint (default: the public Google Translate endpoint)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Show what would be translated without calling the backend or writing files
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Log to stderr so stdout carries only the summary; RUST_LOG overrides -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether every target succeeded
fn run(cli: Cli) -> Result<bool> {
    let targets = parse_target_list(&cli.targets).map_err(anyhow::Error::msg)?;
    if targets.is_empty() {
        anyhow::bail!("no target languages given");
    }

    let config = SyncConfig::new(cli.source, targets, cli.input_file)
        .with_revisions(cli.previous_head, cli.current_head)
        .with_evaluate_changes(cli.evaluate_changes)
        .with_full_retranslate(cli.full_retranslate)
        .with_protect_marker(cli.protect_marker)
        .with_retry(RetryPolicy::new(
            cli.max_attempts,
            Duration::from_millis(cli.retry_delay_ms),
        ))
        .with_dry_run(cli.dry_run);

    let mut backend = GoogleTranslator::new().context("failed to set up translation backend")?;
    if let Some(endpoint) = cli.endpoint {
        backend = backend.with_endpoint(endpoint);
    }

    let history = open_history(&config);
    let outcome = i18n_sync::run_sync(
        &config,
        &backend,
        history.as_ref().map(|reader| reader as &dyn RevisionReader),
    )?;

    let formatter = SummaryFormatter::new();
    if cli.json {
        println!("{}", formatter.format_json(&outcome)?);
    } else {
        print!("{}", formatter.format(&outcome));
    }

    Ok(!outcome.has_failures())
}

/// Only touch git when a comparison was actually requested
fn open_history(config: &SyncConfig) -> Option<GitRevisionReader> {
    if !config.evaluate_changes || config.previous_revision.is_none() {
        return None;
    }
    match GitRevisionReader::discover(&config.input_file) {
        Ok(reader) => Some(reader),
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}
