//! Line commands understood by the `field-history` driver.
//!
//! Each stdin line is one command; the first word selects it:
//!
//! ```text
//! add <id> [value...]   remember a value (no value = nothing to add)
//! count <id>            number of values for an id
//! get <id> <index>      value at index, 0 = oldest
//! list [id]             values of one id, or every entry
//! clear                 forget everything
//! save                  write the history file
//! help                  this text
//! quit | exit           leave (saves when a history file is set)
//! ```

use anyhow::{Context, Result};

use crate::history::{AddOutcome, HistoryId, HistoryStore};

pub const HELP: &str = "\
add <id> [value...]   remember a value (no value = nothing to add)
count <id>            number of values for an id
get <id> <index>      value at index, 0 = oldest
list [id]             values of one id, or every entry
clear                 forget everything
save                  write the history file
help                  this text
quit | exit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { id: HistoryId, value: Option<String> },
    Count { id: HistoryId },
    Get { id: HistoryId, index: usize },
    List { id: Option<HistoryId> },
    Clear,
    Save,
    Help,
    Quit,
}

/// What the driver should do after a command ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Print(String),
    Save,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let (word, rest) = split_word(line.trim());
        let command = match word {
            "" => return Ok(None),
            "add" => {
                let (id, value) = split_word(rest);
                Command::Add {
                    id: parse_id(id)?,
                    value: (!value.is_empty()).then(|| value.to_string()),
                }
            }
            "count" => Command::Count { id: parse_id(rest)? },
            "get" => {
                let (id, index) = split_word(rest);
                Command::Get {
                    id: parse_id(id)?,
                    index: index
                        .parse()
                        .with_context(|| format!("index must be a number, got {:?}", index))?,
                }
            }
            "list" if rest.is_empty() => Command::List { id: None },
            "list" => Command::List {
                id: Some(parse_id(rest)?),
            },
            "clear" => Command::Clear,
            "save" => Command::Save,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => anyhow::bail!("unknown command {:?} (try `help`)", other),
        };
        Ok(Some(command))
    }

    pub fn run(&self, store: &mut HistoryStore) -> Step {
        match self {
            Command::Add { id, value } => Step::Print(describe(store.add(*id, value.as_deref()))),
            Command::Count { id } => Step::Print(store.count(*id).to_string()),
            Command::Get { id, index } => Step::Print(
                store
                    .value_at(*id, *index)
                    .map_or_else(|| "not found".to_string(), str::to_string),
            ),
            Command::List { id: Some(id) } => {
                let lines: Vec<String> = store
                    .values(*id)
                    .enumerate()
                    .map(|(i, value)| format!("{}: {}", i, value))
                    .collect();
                Step::Print(or_empty(lines))
            }
            Command::List { id: None } => {
                let lines: Vec<String> = store
                    .entries()
                    .map(|entry| format!("[{}] {}", entry.owner_id, entry.value))
                    .collect();
                Step::Print(or_empty(lines))
            }
            Command::Clear => {
                store.clear();
                Step::Print("cleared".to_string())
            }
            Command::Save => Step::Save,
            Command::Help => Step::Print(HELP.to_string()),
            Command::Quit => Step::Quit,
        }
    }
}

/// First word and the remainder with its leading whitespace removed.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn parse_id(s: &str) -> Result<HistoryId> {
    if s.is_empty() {
        anyhow::bail!("missing history id");
    }
    s.parse()
        .with_context(|| format!("history id must be 0-255, got {:?}", s))
}

fn describe(outcome: AddOutcome) -> String {
    let (what, evicted) = match outcome {
        AddOutcome::Ignored => return "ignored: no value".to_string(),
        AddOutcome::Rejected => return "rejected: value larger than capacity".to_string(),
        AddOutcome::Inserted { evicted } => ("added", evicted),
        AddOutcome::Moved { evicted } => ("moved to newest", evicted),
    };
    match evicted {
        0 => what.to_string(),
        n => format!("{} (evicted {})", what, n),
    }
}

fn or_empty(lines: Vec<String>) -> String {
    if lines.is_empty() {
        "(empty)".to_string()
    } else {
        lines.join("\n")
    }
}
