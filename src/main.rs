//! docwatch - watchlist change tracking
//!
//! Command-line entry point.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docwatch::error::WatchlistError;
use docwatch::observability::{init_tracing, TracingConfig};
use docwatch::pattern::absolute_path;
use docwatch::watchlist::DiffSummary;
use docwatch::{Config, DiffKind, Error, FileState, Result, WatchlistManager};

/// Track files matched by glob patterns and report what changed.
#[derive(Parser, Debug)]
#[command(name = "docwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding profile data
    #[arg(long, global = true, env = "DOCWATCH_SETTINGS_DIR")]
    settings_dir: Option<PathBuf>,

    /// Profile name
    #[arg(short, long, global = true, env = "DOCWATCH_PROFILE", default_value = "default")]
    profile: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DOCWATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, global = true, env = "DOCWATCH_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add included pattern(s)
    Include {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Add excluded pattern(s)
    Exclude {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Remove included or excluded pattern(s)
    Remove {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Show included and excluded patterns
    Patterns,
    /// Resolve patterns and record added, removed and changed files
    Track,
    /// Show all tracked files
    List,
    /// Show files with pending changes
    Diff {
        /// Only show entries in this state (None, added, removed, changed)
        #[arg(long)]
        kind: Option<DiffKind>,
    },
    /// Mark pending changes of the given file(s) as resolved
    Resolve {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config {
        profile: cli.profile,
        log_level: cli.log_level,
        log_json: cli.log_json,
        ..Config::default()
    };
    if let Some(dir) = cli.settings_dir {
        config.settings_dir = dir;
    }

    config.validate()?;
    init_tracing(&TracingConfig::from(&config));
    tracing::debug!(?config, "Configuration loaded");

    let mut watchlist = WatchlistManager::from_config(&config)?;

    match cli.command {
        Command::Include { patterns } => {
            for pattern in patterns {
                watchlist.include(&pattern)?;
            }
        }
        Command::Exclude { patterns } => {
            for pattern in patterns {
                watchlist.exclude(&pattern)?;
            }
        }
        Command::Remove { patterns } => {
            for pattern in patterns {
                match watchlist.remove(&pattern) {
                    Ok(()) | Err(Error::Watchlist(WatchlistError::NoMatchingRule(_))) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Command::Patterns => {
            let rules = watchlist.patterns();
            print_section("included pattern(s)", rules.included.iter());
            print_section("excluded pattern(s)", rules.excluded.iter());
        }
        Command::Track => {
            let report = watchlist.track()?;
            println!(
                "Tracking ({}) file(s): ({}) added, ({}) removed, ({}) changed, ({}) unchanged",
                report.tracked, report.added, report.removed, report.changed, report.unchanged
            );
            for warning in &report.warnings {
                println!(" ! {warning}");
            }
        }
        Command::List => {
            let tracked = watchlist.list();
            println!("({}) tracked file(s)", tracked.len());
            for (path, state) in tracked {
                println!(" - {path}  {}", describe(state));
            }
        }
        Command::Diff { kind: None } => print_diff(&watchlist.diff_summary()),
        Command::Diff { kind: Some(kind) } => {
            let files = watchlist.diff_filter(kind);
            print_section(&format!("{kind} file(s)"), files.keys());
        }
        Command::Resolve { paths } => {
            let cwd = std::env::current_dir()?;
            for path in paths {
                let path = absolute_path(&path, &cwd);
                let key = path
                    .to_str()
                    .ok_or_else(|| Error::internal(format!("non UTF-8 path: {path:?}")))?;
                let diff = watchlist.diff_mark_resolved(key)?;
                println!("Resolved ({diff}) {key}");
            }
        }
    }

    Ok(())
}

fn print_section<'a>(title: &str, items: impl ExactSizeIterator<Item = &'a String>) {
    println!("({}) {title}", items.len());
    for item in items {
        println!(" - {item}");
    }
}

fn print_diff(summary: &DiffSummary) {
    print_section("added file(s)", summary.added.iter());
    print_section("changed file(s)", summary.changed.iter());
    print_section("removed file(s)", summary.removed.iter());
}

/// `[diff] size bytes, modified timestamp` for list output.
fn describe(state: &FileState) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let modified = chrono::DateTime::from_timestamp(state.mtime.floor() as i64, 0)
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
    format!("[{}] {} bytes, modified {modified}", state.diff, state.size)
}
