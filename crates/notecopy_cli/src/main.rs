//! Command-line entry point for copying notes in a collection file.
//!
//! # Responsibility
//! - Map flags onto `CopyConfig` and run one copy batch.
//! - Print host callbacks (tooltips, warnings) to the terminal.

use clap::Parser;
use log::info;
use notecopy_core::db::open_db;
use notecopy_core::{
    copy_many, default_log_level, init_logging, load_config, CopyConfig, CopyContext, CopyHost,
    SqliteCollection, SystemClock,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "notecopy",
    version,
    about = "Copy notes together with their cards and review history",
    after_help = "EXAMPLES:\n    # Full copy with options from a file\n    notecopy collection.anki2 1650000000000 --config notecopy.json\n\n\
                  # Plain copy: fresh scheduling, no review history\n    notecopy collection.anki2 1650000000000 1650000000001 --plain"
)]
struct Cli {
    /// Collection database file.
    db: PathBuf,

    /// Ids of the notes to copy, in order.
    #[arg(required = true)]
    note_ids: Vec<i64>,

    /// JSON options file. Missing file means defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,

    /// Reset scheduling and skip review history on the copies.
    #[arg(long, conflicts_with = "full")]
    plain: bool,

    /// Carry scheduling and review history onto the copies.
    #[arg(long)]
    full: bool,
}

/// Host that writes notifications to stdout/stderr.
struct TerminalHost;

impl CopyHost for TerminalHost {
    fn checkpoint(&mut self, name: &str) {
        info!("event=checkpoint module=cli status=ok name={name}");
    }

    fn progress_start(&mut self) {}

    fn progress_finish(&mut self) {}

    fn reset(&mut self) {}

    fn tooltip(&mut self, message: &str) {
        println!("{message}");
    }

    fn warning(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every selected note was copied.
fn run(cli: &Cli) -> Result<bool, String> {
    if let Some(log_dir) = &cli.log_dir {
        init_logging(default_log_level(), log_dir).map_err(|err| err.to_string())?;
    }

    let config = resolve_config(cli)?;
    if !cli.db.is_file() {
        return Err(format!("collection `{}` does not exist", cli.db.display()));
    }
    let conn = open_db(&cli.db).map_err(|err| format!("collection open failed: {err}"))?;
    let store =
        SqliteCollection::try_new(&conn).map_err(|err| format!("collection init failed: {err}"))?;

    let clock = SystemClock;
    let mut ctx = CopyContext::new(&store, &config, &clock);
    let mut host = TerminalHost;
    let report = copy_many(&mut ctx, &mut host, &cli.note_ids).map_err(|err| err.to_string())?;
    for outcome in &report.copied {
        println!("{} -> {}", outcome.original_id, outcome.new_note_id);
    }
    Ok(report.is_complete())
}

fn resolve_config(cli: &Cli) -> Result<CopyConfig, String> {
    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|err| err.to_string())?,
        None => CopyConfig::default(),
    };
    Ok(if cli.plain {
        config.plain()
    } else if cli.full {
        config.full()
    } else {
        config
    })
}
