// ABOUTME: Parser for the line commands read from stdin
// ABOUTME: One command per line, first word selects the command

use anyhow::{Context, Result, bail};
use tuweb_types::KeyStroke;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a file, optionally from a named reference
    Open { path: String, source_ref: Option<String> },
    /// Replace the active document's content
    Edit(String),
    /// Append to the active document's content
    Append(String),
    /// Feed a key stroke through the shortcut listener
    Key(KeyStroke),
    Save,
    SaveAll,
    Close,
    Tabs,
    /// List the shortcut bindings
    Keys,
    Reload,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_start();
        if line.trim().is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        // The single separator after the command word is consumed; the rest is kept verbatim
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let argument = rest.trim();

        let command = match word {
            "open" => {
                let mut parts = argument.split_whitespace();
                let Some(path) = parts.next() else {
                    bail!("usage: open PATH [REF]");
                };
                Command::Open {
                    path: path.to_string(),
                    source_ref: parts.next().map(str::to_string),
                }
            }
            "edit" => Command::Edit(unescape(rest)),
            "append" => Command::Append(unescape(rest)),
            "key" => {
                if argument.is_empty() {
                    bail!("usage: key STROKE (e.g. ctrl+s)");
                }
                let stroke: KeyStroke = argument
                    .parse()
                    .with_context(|| format!("invalid key stroke '{argument}'"))?;
                Command::Key(stroke)
            }
            "save" => Command::Save,
            "save-all" => Command::SaveAll,
            "close" => Command::Close,
            "tabs" | "ls" => Command::Tabs,
            "keys" => Command::Keys,
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{other}', try 'help'"),
        };
        Ok(Some(command))
    }
}

/// Decode `\n`, `\t` and `\\` so multi-line content fits on one input line
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub const HELP: &str = "\
commands:
  open PATH [REF]   open a file from the remote source
  edit TEXT         replace the active document (\\n for newlines)
  append TEXT       append to the active document
  key STROKE        press a shortcut, e.g. ctrl+s, ctrl+tab, ctrl+=
  save | save-all   save the active document or every modified one
  reload            discard local edits and fetch the active document again
  close             close the active document
  tabs              list open documents
  keys              list shortcut bindings
  quit";
