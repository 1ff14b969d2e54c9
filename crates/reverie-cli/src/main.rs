//! Reverie CLI - journal from the terminal and let past entries resurface
//!
//! Capture entries, browse the merged view across both backends, and ask for
//! a memory.

use std::collections::{HashMap, HashSet};
use std::env;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::Generator;
use clap_complete::{generate, shells};
use reverie_core::coordinator::{FanOutCoordinator, ResurfaceRequest, ResurfaceWindow};
use reverie_core::models::DateRange;
use reverie_core::scoring::ResurfaceHistory;
use reverie_core::services::StaticEntitlement;
use reverie_core::store::{CaptureTarget, LocalStore, RemoteConfig, RemoteStore, StoreRouter};
use reverie_core::util;
use reverie_core::{Entry, EntryCategory, EntryId};
use serde::Serialize;
use thiserror::Error;

type Coordinator = FanOutCoordinator<LocalStore, RemoteStore>;

#[derive(Parser)]
#[command(name = "reverie")]
#[command(about = "Journal from the command line and let past entries resurface")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a new entry
    #[command(alias = "new")]
    Add {
        /// Prompt the entry answers
        #[arg(long, value_name = "TEXT")]
        prompt: String,
        /// Entry category (daily, gratitude, milestone, reflection, freeform)
        #[arg(long, default_value = "freeform")]
        category: String,
        /// Transcript text, when already transcribed
        #[arg(long, value_name = "TEXT")]
        transcript: Option<String>,
        /// Opaque media handle for the captured recording
        #[arg(long, value_name = "REF")]
        media: Option<String>,
        /// Mark as part of the daily check-in flow
        #[arg(long)]
        daily: bool,
        /// Mark as a follow-up to a previous entry
        #[arg(long)]
        follow_up: bool,
        /// Mark as a logged success
        #[arg(long)]
        success: bool,
        /// Mark as captured without a guiding prompt
        #[arg(long)]
        unguided: bool,
    },
    /// List merged entries from both backends
    List {
        /// Show a single day (YYYY-MM-DD)
        #[arg(long, value_name = "DAY")]
        day: Option<NaiveDate>,
        /// Days of history to show when no day is given
        #[arg(long, default_value = "7")]
        days: u32,
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resurface a past entry as a memory
    Memory {
        /// Nearest candidate age in days
        #[arg(long, default_value = "30")]
        min_days_ago: u32,
        /// Farthest candidate age in days (0 = unbounded)
        #[arg(long, default_value = "365")]
        max_days_ago: u32,
        /// Prompt text eligible for resurfacing (repeatable)
        #[arg(long = "prompt", value_name = "TEXT")]
        prompts: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show activity streaks
    Streak {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show monthly activity
    Stats {
        /// Month to summarize (YYYY-MM, defaults to the current month)
        #[arg(long, value_name = "MONTH")]
        month: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an entry's transcript
    Edit {
        /// Entry ID
        id: String,
        /// New transcript text (stdin when omitted)
        text: Vec<String>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] reverie_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),
    #[error("Invalid entry ID: {0}")]
    InvalidEntryId(String),
    #[error("Transcript text cannot be empty")]
    EmptyTranscript,
    #[error("Prompt text cannot be empty")]
    EmptyPrompt,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reverie=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Add {
            prompt,
            category,
            transcript,
            media,
            daily,
            follow_up,
            success,
            unguided,
        } => {
            run_add(
                &db_path,
                &prompt,
                &category,
                transcript,
                media,
                EntryFlags {
                    daily,
                    follow_up,
                    success,
                    unguided,
                },
            )
            .await?;
        }
        Commands::List {
            day,
            days,
            limit,
            json,
        } => run_list(&db_path, day, days, limit, json).await?,
        Commands::Memory {
            min_days_ago,
            max_days_ago,
            prompts,
            json,
        } => run_memory(&db_path, min_days_ago, max_days_ago, prompts, json).await?,
        Commands::Streak { json } => run_streak(&db_path, json).await?,
        Commands::Stats { month, json } => run_stats(&db_path, month.as_deref(), json).await?,
        Commands::Edit { id, text } => run_edit(&db_path, &id, &text).await?,
        Commands::Delete { id } => run_delete(&db_path, &id).await?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}

struct EntryFlags {
    daily: bool,
    follow_up: bool,
    success: bool,
    unguided: bool,
}

async fn run_add(
    db_path: &Path,
    prompt: &str,
    category: &str,
    transcript: Option<String>,
    media: Option<String>,
    flags: EntryFlags,
) -> Result<(), CliError> {
    let category: EntryCategory = category
        .parse()
        .map_err(|_| CliError::InvalidCategory(category.to_string()))?;
    let prompt = util::normalize_text_option(Some(prompt.to_string()))
        .ok_or(CliError::EmptyPrompt)?;

    let mut entry = Entry::new(prompt, category);
    entry.transcript = util::normalize_text_option(transcript);
    entry.media_reference = util::normalize_text_option(media);
    entry.is_daily_entry = flags.daily;
    entry.is_follow_up = flags.follow_up;
    entry.is_success_entry = flags.success;
    entry.is_unguided = flags.unguided;

    let coordinator = open_coordinator(db_path).await?;
    let stored = coordinator.capture_entry(entry).await?;
    println!("{}", stored.id);
    Ok(())
}

#[derive(Debug, Serialize)]
struct EntryListItem {
    id: String,
    day: NaiveDate,
    category: String,
    prompt: String,
    preview: String,
    transcript: Option<String>,
    created_at: i64,
    last_retrieved: Option<i64>,
}

async fn run_list(
    db_path: &Path,
    day: Option<NaiveDate>,
    days: u32,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let coordinator = open_coordinator(db_path).await?;

    let mut entries = match day {
        Some(day) => coordinator.fetch_merged_for_day(day).await?,
        None => {
            let range = DateRange::days_ago(util::unix_ms_now(), 0, Some(days))?;
            coordinator.fetch_merged_in_range(&range).await?
        }
    };
    entries.truncate(limit);

    if as_json {
        let items: Vec<EntryListItem> = entries.iter().map(entry_to_list_item).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if entries.is_empty() {
        println!("No entries.");
    } else {
        for line in format_entry_lines(&entries) {
            println!("{line}");
        }
    }

    Ok(())
}

async fn run_memory(
    db_path: &Path,
    min_days_ago: u32,
    max_days_ago: u32,
    prompts: Vec<String>,
    as_json: bool,
) -> Result<(), CliError> {
    let coordinator = open_coordinator(db_path).await?;
    let now_ms = util::unix_ms_now();

    // Scoring inputs derive from recent usage when not given explicitly
    let recent = coordinator
        .fetch_merged_in_range(&DateRange::days_ago(now_ms, 0, Some(30))?)
        .await?;
    let eligible_prompts = if prompts.is_empty() {
        derive_eligible_prompts(&recent)
    } else {
        prompts.into_iter().collect()
    };
    let category_weights = derive_category_weights(&recent);

    let request = ResurfaceRequest {
        now_ms,
        window: ResurfaceWindow {
            min_days_ago,
            max_days_ago: if max_days_ago == 0 {
                None
            } else {
                Some(max_days_ago)
            },
        },
        eligible_prompts,
        category_weights,
    };

    match coordinator.resurface_memory(&request).await {
        Ok(Some(entry)) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&entry_to_list_item(&entry))?);
            } else {
                println!("A memory from {} — {}", entry.day(), entry.prompt_text);
                let preview = entry.preview(120);
                if !preview.is_empty() && preview != entry.prompt_text {
                    println!("  {preview}");
                }
            }
        }
        Ok(None) => println!("No memory available for now."),
        Err(reverie_core::Error::EntitlementRequired) => {
            println!("Memory resurfacing requires Reverie Premium.");
        }
        Err(error) => {
            tracing::error!("Memory resurfacing failed: {error}");
            println!("Something went wrong. Try again later.");
        }
    }

    Ok(())
}

async fn run_streak(db_path: &Path, as_json: bool) -> Result<(), CliError> {
    let coordinator = open_coordinator(db_path).await?;
    let streak = coordinator.compute_streak(util::unix_ms_now()).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&streak)?);
    } else {
        println!("Current streak:  {} days", streak.current);
        println!("Longest streak:  {} days", streak.longest);
        println!("Days journaled:  {}", streak.distinct_days);
    }

    Ok(())
}

async fn run_stats(db_path: &Path, month: Option<&str>, as_json: bool) -> Result<(), CliError> {
    let (year, month_number) = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            let today = util::timestamp_day(util::unix_ms_now());
            (today.year(), today.month())
        }
    };

    let coordinator = open_coordinator(db_path).await?;
    let summary = coordinator.month_summary(year, month_number).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{year}-{month_number:02}");
        println!("Active days:    {}", summary.active_days);
        println!("Total entries:  {}", summary.total_entries);
    }

    Ok(())
}

async fn run_edit(db_path: &Path, id: &str, text: &[String]) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;
    let text = resolve_transcript_text(text)?;

    let coordinator = open_coordinator(db_path).await?;
    coordinator.edit_transcript(&id, &text).await?;
    println!("{id}");
    Ok(())
}

async fn run_delete(db_path: &Path, id: &str) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;

    let coordinator = open_coordinator(db_path).await?;
    coordinator.delete_entry(&id).await?;
    println!("{id}");
    Ok(())
}

fn run_completions(shell: CompletionShell, output_path: Option<&Path>) -> Result<(), CliError> {
    let mut command = Cli::command();
    let mut buffer = Vec::new();

    match shell {
        CompletionShell::Bash => generate_for_shell(shells::Bash, &mut command, &mut buffer),
        CompletionShell::Zsh => generate_for_shell(shells::Zsh, &mut command, &mut buffer),
        CompletionShell::Fish => generate_for_shell(shells::Fish, &mut command, &mut buffer),
    }

    if let Some(path) = output_path {
        std::fs::write(path, &buffer)?;
        println!("{}", path.display());
    } else {
        io::stdout().write_all(&buffer)?;
    }

    Ok(())
}

fn generate_for_shell<G: Generator>(
    generator: G,
    command: &mut clap::Command,
    buffer: &mut Vec<u8>,
) {
    generate(generator, command, "reverie", buffer);
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

async fn open_coordinator(db_path: &Path) -> Result<Coordinator, CliError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let local = LocalStore::open(db_path).await?;
    let remote = remote_store_from_env()?;
    if remote.is_some() {
        tracing::info!("Remote sync enabled");
    }
    let capture_target = parse_capture_target(env::var("REVERIE_CAPTURE_TARGET").ok());
    let router = StoreRouter::new(local, remote, capture_target);

    let history = ResurfaceHistory::load(history_path(db_path));
    let entitlements = Arc::new(StaticEntitlement::new(parse_premium(
        env::var("REVERIE_PREMIUM").ok(),
    )));

    Ok(FanOutCoordinator::new(router, entitlements, history))
}

fn remote_store_from_env() -> Result<Option<RemoteStore>, CliError> {
    let url = util::normalize_text_option(env::var("REVERIE_REMOTE_URL").ok());
    let token = util::normalize_text_option(env::var("REVERIE_REMOTE_TOKEN").ok());

    match (url, token) {
        (Some(url), Some(token)) => Ok(Some(RemoteStore::new(RemoteConfig::new(url, token)?)?)),
        _ => Ok(None),
    }
}

fn parse_capture_target(value: Option<String>) -> CaptureTarget {
    value
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

fn parse_premium(value: Option<String>) -> bool {
    match value {
        Some(raw) => !matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => true,
    }
}

fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("REVERIE_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reverie")
        .join("reverie.db")
}

fn history_path(db_path: &Path) -> PathBuf {
    db_path.with_file_name("resurface-history.json")
}

// ---------------------------------------------------------------------------
// Formatting and input helpers
// ---------------------------------------------------------------------------

fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    EntryListItem {
        id: entry.id.to_string(),
        day: entry.day(),
        category: entry.category.to_string(),
        prompt: entry.prompt_text.clone(),
        preview: entry.preview(80),
        transcript: entry.transcript.clone(),
        created_at: entry.created_at,
        last_retrieved: entry.last_retrieved,
    }
}

fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let id = entry.id.to_string();
            let short_id = id.chars().take(13).collect::<String>();
            let preview = entry.preview(40);
            format!(
                "{short_id:<13}  {}  {:<10}  {preview}",
                entry.day(),
                entry.category.to_string()
            )
        })
        .collect()
}

fn derive_eligible_prompts(recent: &[Entry]) -> HashSet<String> {
    recent
        .iter()
        .filter(|entry| !entry.is_unguided)
        .map(|entry| entry.prompt_text.clone())
        .collect()
}

fn derive_category_weights(recent: &[Entry]) -> HashMap<EntryCategory, f64> {
    let mut counts: HashMap<EntryCategory, usize> = HashMap::new();
    for entry in recent {
        *counts.entry(entry.category).or_insert(0) += 1;
    }

    let total = recent.len();
    if total == 0 {
        return HashMap::new();
    }

    counts
        .into_iter()
        .map(|(category, count)| (category, count as f64 / total as f64))
        .collect()
}

fn parse_entry_id(raw: &str) -> Result<EntryId, CliError> {
    raw.trim()
        .parse()
        .map_err(|_| CliError::InvalidEntryId(raw.to_string()))
}

fn parse_month(raw: &str) -> Result<(i32, u32), CliError> {
    let (year, month) = raw
        .trim()
        .split_once('-')
        .ok_or_else(|| CliError::InvalidMonth(raw.to_string()))?;
    let year: i32 = year
        .parse()
        .map_err(|_| CliError::InvalidMonth(raw.to_string()))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CliError::InvalidMonth(raw.to_string()))?;

    if !(1..=12).contains(&month) {
        return Err(CliError::InvalidMonth(raw.to_string()));
    }
    Ok((year, month))
}

fn resolve_transcript_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = util::normalize_text_option(Some(text_parts.join(" "))) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    Err(CliError::EmptyTranscript)
}

fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(util::normalize_text_option(Some(buffer)))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_month_accepts_valid_values() {
        assert_eq!(parse_month("2026-08").unwrap(), (2026, 8));
        assert_eq!(parse_month(" 2024-01 ").unwrap(), (2024, 1));
    }

    #[test]
    fn parse_month_rejects_garbage() {
        assert!(parse_month("2026").is_err());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("aug-2026").is_err());
    }

    #[test]
    fn parse_premium_defaults_on_and_honors_off_values() {
        assert!(parse_premium(None));
        assert!(parse_premium(Some("1".to_string())));
        assert!(parse_premium(Some("yes".to_string())));
        assert!(!parse_premium(Some("0".to_string())));
        assert!(!parse_premium(Some(" FALSE ".to_string())));
    }

    #[test]
    fn parse_capture_target_falls_back_to_local() {
        assert_eq!(parse_capture_target(None), CaptureTarget::Local);
        assert_eq!(
            parse_capture_target(Some("remote".to_string())),
            CaptureTarget::Remote
        );
        assert_eq!(
            parse_capture_target(Some("sideways".to_string())),
            CaptureTarget::Local
        );
    }

    #[test]
    fn parse_entry_id_rejects_non_uuids() {
        assert!(parse_entry_id("not-a-uuid").is_err());
        let id = EntryId::new();
        assert_eq!(parse_entry_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn derive_category_weights_are_frequencies() {
        let mut daily = Entry::new("p", EntryCategory::Daily);
        daily.created_at = 1_000;
        let mut gratitude = Entry::new("p", EntryCategory::Gratitude);
        gratitude.created_at = 2_000;

        let weights =
            derive_category_weights(&[daily.clone(), daily.clone(), gratitude, daily]);
        assert!((weights[&EntryCategory::Daily] - 0.75).abs() < f64::EPSILON);
        assert!((weights[&EntryCategory::Gratitude] - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn derive_category_weights_empty_input() {
        assert!(derive_category_weights(&[]).is_empty());
    }

    #[test]
    fn derive_eligible_prompts_skips_unguided_entries() {
        let guided = Entry::new("What went well?", EntryCategory::Daily);
        let mut unguided = Entry::new("(free recording)", EntryCategory::FreeForm);
        unguided.is_unguided = true;

        let prompts = derive_eligible_prompts(&[guided, unguided]);
        assert!(prompts.contains("What went well?"));
        assert!(!prompts.contains("(free recording)"));
    }

    #[test]
    fn format_entry_lines_shows_short_id_and_preview() {
        let mut entry = Entry::new("A prompt", EntryCategory::Reflection);
        entry.transcript = Some("Some words worth keeping".to_string());

        let lines = format_entry_lines(std::slice::from_ref(&entry));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("reflection"));
        assert!(lines[0].contains("Some words worth keeping"));
        assert!(lines[0].starts_with(&entry.id.to_string().chars().take(13).collect::<String>()));
    }

    #[test]
    fn history_path_sits_next_to_the_database() {
        let path = history_path(Path::new("/data/reverie/reverie.db"));
        assert_eq!(
            path,
            Path::new("/data/reverie/resurface-history.json")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_then_list_roundtrip() {
        let db_path = unique_test_db_path();

        run_add(
            &db_path,
            "What made today good?",
            "daily",
            Some("Coffee on the porch".to_string()),
            None,
            EntryFlags {
                daily: true,
                follow_up: false,
                success: false,
                unguided: false,
            },
        )
        .await
        .unwrap();

        let coordinator = open_coordinator(&db_path).await.unwrap();
        let today = util::timestamp_day(util::unix_ms_now());
        let entries = coordinator.fetch_merged_for_day(today).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].prompt_text, "What made today good?");
        assert!(entries[0].is_daily_entry);

        cleanup_db_files(&db_path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn add_rejects_unknown_category() {
        let db_path = unique_test_db_path();

        let error = run_add(
            &db_path,
            "Prompt",
            "mystery",
            None,
            None,
            EntryFlags {
                daily: false,
                follow_up: false,
                success: false,
                unguided: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(error, CliError::InvalidCategory(_)));

        cleanup_db_files(&db_path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn edit_and_delete_report_not_found() {
        let db_path = unique_test_db_path();
        let id = EntryId::new().to_string();

        let error = run_edit(&db_path, &id, &["text".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            CliError::Core(reverie_core::Error::NotFound(_))
        ));

        let error = run_delete(&db_path, &id).await.unwrap_err();
        assert!(matches!(
            error,
            CliError::Core(reverie_core::Error::NotFound(_))
        ));

        cleanup_db_files(&db_path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn memory_on_empty_journal_reports_none() {
        let db_path = unique_test_db_path();

        // Prints the "no memory" outcome and succeeds
        run_memory(&db_path, 30, 365, Vec::new(), false)
            .await
            .unwrap();

        cleanup_db_files(&db_path);
    }

    #[test]
    fn run_completions_writes_bash_script_file() {
        let output_path = std::env::temp_dir().join(format!(
            "reverie-completions-test-{}.bash",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |duration| duration.as_nanos())
        ));

        run_completions(CompletionShell::Bash, Some(&output_path)).unwrap();

        let script = std::fs::read_to_string(&output_path).unwrap();
        assert!(script.contains("_reverie()"));
        assert!(script.contains("complete -F _reverie"));

        let _ = std::fs::remove_file(output_path);
    }

    fn unique_test_db_path() -> PathBuf {
        static NEXT_TEST_DB_ID: AtomicU64 = AtomicU64::new(0);

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos());
        let sequence = NEXT_TEST_DB_ID.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("reverie-cli-test-{timestamp}-{sequence}.db"))
    }

    fn cleanup_db_files(path: &PathBuf) {
        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(history_path(path));
    }
}
