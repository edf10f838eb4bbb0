mod config;
mod repl;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use abacus_core::{format_number, Calculator, HistoryStore};
use abacus_store::SqliteHistoryStore;

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "abacus",
    version,
    about = "Keypad calculator with a persistent result history"
)]
struct Cli {
    /// Path to the SQLite history database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive keypad session
    Repl,

    /// Press a key sequence on a fresh calculator and print the screen
    Eval {
        /// Keys, e.g. "12+30=" (~ toggles sign, < is backspace, c clears)
        keys: String,

        /// Print the screen as JSON
        #[arg(long)]
        json: bool,
    },

    /// List past results
    History {
        /// Delete every past result instead
        #[arg(long)]
        clear: bool,
    },

    /// Run the JSON-RPC server on stdio
    Serve,

    /// Show the active configuration
    Config,
}

fn default_db_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "abacus", "abacus")
        .map(|dirs| dirs.data_dir().join("history.db"))
        .unwrap_or_else(|| PathBuf::from("history.db"))
}

fn resolve_db_path(db: Option<PathBuf>, cfg: &Config) -> PathBuf {
    db.or_else(|| cfg.store.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn open_store(path: &Path) -> Result<SqliteHistoryStore> {
    SqliteHistoryStore::new(path).context("failed to open history database")
}

/// Build the engine. Persistence problems are warnings: the calculator keeps
/// working with its in-memory history.
fn open_calculator(db: Option<PathBuf>, cfg: &Config) -> Result<Calculator> {
    if !cfg.history.persist {
        return Ok(Calculator::new());
    }

    let path = resolve_db_path(db, cfg);
    let store = match open_store(&path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("warning: {e:#}; results will not be saved");
            return Ok(Calculator::new());
        }
    };

    Calculator::with_store(
        Box::new(store),
        Box::new(|e| eprintln!("warning: {e}")),
    )
    .context("failed to start history persistence")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Commands::Repl => cmd_repl(cli.db, &cfg),
        Commands::Eval { keys, json } => cmd_eval(cli.db, &cfg, &keys, json),
        Commands::History { clear } => cmd_history(cli.db, &cfg, clear),
        Commands::Serve => cmd_serve(cli.db, &cfg),
        Commands::Config => cmd_config(&cfg),
    }
}

fn cmd_repl(db: Option<PathBuf>, cfg: &Config) -> Result<()> {
    let mut calc = open_calculator(db, cfg)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    repl::run_repl(
        &mut calc,
        stdin.lock(),
        &mut stdout,
        cfg.display.show_answer_marker,
    )
}

fn cmd_eval(db: Option<PathBuf>, cfg: &Config, keys: &str, json: bool) -> Result<()> {
    let mut calc = open_calculator(db, cfg)?;
    calc.press_keys(keys)?;

    let screen = calc.screen();
    if json {
        println!("{}", serde_json::to_string_pretty(&screen)?);
    } else {
        println!(
            "{}",
            repl::render_screen(&screen, cfg.display.show_answer_marker)
        );
    }
    Ok(())
}

fn cmd_history(db: Option<PathBuf>, cfg: &Config, clear: bool) -> Result<()> {
    let path = resolve_db_path(db, cfg);
    let mut store = open_store(&path)?;

    if clear {
        store.clear()?;
        println!("History cleared");
        return Ok(());
    }

    let values = store.load()?;
    if values.is_empty() {
        println!("No results yet.");
        return Ok(());
    }
    for (i, value) in values.iter().enumerate() {
        println!("{i:>3}  {}", format_number(*value));
    }

    let stats = store.stats()?;
    if let Some(saved) = stats.last_saved {
        println!();
        println!("Last saved: {}", saved.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

fn cmd_serve(db: Option<PathBuf>, cfg: &Config) -> Result<()> {
    let mut calc = open_calculator(db, cfg)?;
    abacus_rpc::run_server(&mut calc)
}

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[store]");
    println!(
        "  path = {}",
        cfg.store
            .path
            .as_deref()
            .unwrap_or("(default platform path)")
    );
    println!();
    println!("[history]");
    println!("  persist = {}", cfg.history.persist);
    println!();
    println!("[display]");
    println!("  show_answer_marker = {}", cfg.display.show_answer_marker);
    Ok(())
}
