/*!
 * Error types for the tricue application.
 *
 * This module contains custom error types for the parts of the application
 * that touch the outside world (spreadsheets, export files, persisted state),
 * using the thiserror crate for ergonomic error definitions.
 *
 * The timing engine itself never produces errors: rejected transitions are
 * reported as status values (see `controller::Transition`).
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing rows from a spreadsheet
#[derive(Error, Debug)]
pub enum ImportError {
    /// The workbook could not be opened or decoded
    #[error("Failed to read the spreadsheet: {0}")]
    Workbook(String),

    /// The workbook contains no worksheet at all
    #[error("Spreadsheet contains no worksheets")]
    NoSheets,

    /// No header cell matched any of the supported languages
    #[error("No language columns (EN, FR, AR) found in sheet '{sheet}'")]
    NoLanguageColumns {
        /// Name of the offending sheet
        sheet: String,
    },
}

/// Errors that can occur while writing export documents
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing one of the language documents failed
    #[error("Failed to write {path}: {message}")]
    Write {
        /// Target file
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },

    /// The chosen target is not a directory
    #[error("Export target is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Errors that can occur when loading or saving the persisted application state
#[derive(Error, Debug)]
pub enum StateError {
    /// Reading or writing the state file failed
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file is not valid JSON for the expected layout
    #[error("State file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// No location could be determined for the state file
    #[error("Could not determine a data directory for the application state")]
    NoDataDir,

    /// The existing state file could not be read nor moved aside
    #[error("Refusing to overwrite unreadable state file {0}")]
    Locked(PathBuf),
}

