//! Main entry point for the `field-history` driver.
//!
//! Loads the configuration, restores the saved history, then executes one
//! command per stdin line (see [`field_history::command`]) until EOF or
//! `quit`. The history is written back on `save` and on exit when a history
//! file is configured.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use field_history::command::{Command, Step};
use field_history::history::persistence;
use field_history::{HistoryConfig, HistoryStore, utils};
use tracing::error;

fn main() -> Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = utils::logger::init_logging(&utils::logger::default_log_dir());

    let config = HistoryConfig::from_env()?;
    let mut store = config.build_store()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(stdout, "error: {:#}", e)?;
                continue;
            }
        };

        match command.run(&mut store) {
            Step::Print(text) => writeln!(stdout, "{}", text)?,
            Step::Save => match save(&config, &store) {
                Ok(()) => writeln!(stdout, "saved")?,
                Err(e) => {
                    error!("save failed: {:#}", e);
                    writeln!(stdout, "error: {:#}", e)?;
                }
            },
            Step::Quit => break,
        }
        stdout.flush()?;
    }

    if config.history_file.is_some() {
        save(&config, &store)?;
    }
    Ok(())
}

fn save(config: &HistoryConfig, store: &HistoryStore) -> Result<()> {
    persistence::save(&config.history_path(), &store.snapshot())
}
