//! `cmd_finder search`
//!
//! Loads the catalog once, then answers queries.
//!
//! Usage (single query):
//!   cargo run --bin search -- "compress a directory"
//!
//! Usage (interactive REPL):
//!   cargo run --bin search
//!
//! Flags:
//!   --catalog <path>    primary catalog (default assets/commands.yml)
//!   --personal <path>   personal catalog merged over the primary one
//!   --config <path>     TOML engine configuration
//!   --history <path>    append every search to a JSON-lines file
//!   --limit <n>         number of results
//!   --platform <name>   only this platform (repeatable)
//!   --all-platforms     ignore platform tags
//!   --strict-platform   drop cross-platform entries when filtering
//!   --fuzzy             allow typo matching in the fallback pass
//!   --pipelines         pipelines only

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use cmd_finder::collab::{DirectoryContext, JsonlHistory};
use cmd_finder::constants::DEFAULT_CATALOG_PATH;
use cmd_finder::search::search_and_print;
use cmd_finder::{EngineConfig, SearchEngine, SearchOptions};

struct Args {
    catalog: PathBuf,
    personal: Option<PathBuf>,
    config: Option<PathBuf>,
    history: Option<PathBuf>,
    options: SearchOptions,
    query: Vec<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        catalog: PathBuf::from(DEFAULT_CATALOG_PATH),
        personal: None,
        config: None,
        history: None,
        options: SearchOptions::default(),
        query: Vec::new(),
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => {
                if let Some(p) = it.next() {
                    args.catalog = p.into();
                }
            }
            "--personal" => args.personal = it.next().map(PathBuf::from),
            "--config" => args.config = it.next().map(PathBuf::from),
            "--history" => args.history = it.next().map(PathBuf::from),
            "--limit" => {
                args.options.limit = it.next().and_then(|n| n.parse().ok()).unwrap_or(0);
            }
            "--platform" => args.options.platforms.extend(it.next()),
            "--all-platforms" => args.options.all_platforms = true,
            "--strict-platform" => args.options.exclude_cross_platform = true,
            "--fuzzy" => args.options.use_fuzzy = true,
            "--pipelines" => args.options.pipeline_only = true,
            _ => args.query.push(arg),
        }
    }
    args
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,cmd_finder=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(2);
        }),
        None => EngineConfig::default(),
    };

    // ── Load catalog ───────────────────────────────────────────────────────
    let mut engine = SearchEngine::open(&args.catalog, args.personal.as_deref(), config)
        .unwrap_or_else(|e| {
            eprintln!("{e}");
            for hint in e.suggestions() {
                eprintln!("  - {hint}");
            }
            std::process::exit(1);
        });
    eprintln!("Loaded {} commands", engine.catalog().len());
    for warning in engine.catalog().warnings() {
        eprintln!("warning: {warning}");
    }

    if let Ok(cwd) = std::env::current_dir() {
        engine = engine.with_context_analyzer(Box::new(DirectoryContext::analyze(&cwd)));
    }
    if let Some(path) = &args.history {
        engine = engine.with_history(Box::new(JsonlHistory::new(path)));
    }

    // ── Single query from CLI args ──────────────────────────────────────────
    if !args.query.is_empty() {
        search_and_print(&engine, &args.query.join(" "), &args.options);
        return Ok(());
    }

    // ── Interactive REPL ────────────────────────────────────────────────────
    println!("Describe what you want to do and press Enter. Ctrl-D / empty line to exit.");
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        search_and_print(&engine, line.trim(), &args.options);
    }

    Ok(())
}
