/*!
 * Timing session scripts.
 *
 * A session script replays editor interaction line by line against the
 * headless playback surface, one command per line:
 *
 * ```text
 * # comments and blank lines are skipped
 * select 1        # select row 1
 * at 12.5         # move the playhead to 12.5 s
 * show            # Show
 * at 14.02
 * next            # Show Next
 * hide | reset | goto | press | new | list | save
 * text fr Bonjour # edit the French text of the selected row
 * ```
 */

use anyhow::{anyhow, Context, Result};
use std::str::FromStr;

use crate::language_utils::Language;
use crate::timeline::RowId;

/// One line of a session script
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Move the playhead (seconds)
    At(f64),
    /// Select a row by id
    Select(RowId),
    Show,
    ShowNext,
    Hide,
    Reset,
    /// Jump to the selected row's start
    Goto,
    /// Press the primary Show / Show Next button
    Press,
    /// Edit a text cell of the selected row
    Text(Language, String),
    /// Append an empty row and select it
    New,
    /// Print the row table
    List,
    /// Persist the current rows
    Save,
}

impl SessionCommand {
    /// Parse a script line; `Ok(None)` for blank and comment lines
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = match line.split_once('#') {
            Some((code, _)) => code.trim(),
            None => line.trim(),
        };
        if line.is_empty() {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let (verb, rest) = match line.trim().split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line.trim(), ""),
        };

        let command = match verb.to_lowercase().as_str() {
            "at" | "seek" => {
                let seconds: f64 = rest
                    .parse()
                    .with_context(|| format!("Invalid playback position: '{}'", rest))?;
                SessionCommand::At(seconds)
            }
            "select" => {
                let id: u64 = rest
                    .parse()
                    .with_context(|| format!("Invalid row id: '{}'", rest))?;
                SessionCommand::Select(RowId(id))
            }
            "show" => SessionCommand::Show,
            "next" | "show-next" => SessionCommand::ShowNext,
            "hide" => SessionCommand::Hide,
            "reset" => SessionCommand::Reset,
            "goto" | "jump" => SessionCommand::Goto,
            "press" => SessionCommand::Press,
            "text" => {
                let (lang, text) = rest
                    .split_once(char::is_whitespace)
                    .map(|(lang, text)| (lang, text.trim()))
                    .unwrap_or((rest, ""));
                let language: Language = lang.parse()?;
                SessionCommand::Text(language, text.to_string())
            }
            "new" => SessionCommand::New,
            "list" => SessionCommand::List,
            "save" => SessionCommand::Save,
            other => return Err(anyhow!("Unknown session command: '{}'", other)),
        };

        let takes_argument = matches!(
            command,
            SessionCommand::At(_) | SessionCommand::Select(_) | SessionCommand::Text(..)
        );
        if !takes_argument && !rest.is_empty() {
            return Err(anyhow!("Command '{}' takes no argument", verb));
        }

        Ok(command)
    }
}
