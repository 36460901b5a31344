/*!
 * Tests for error types
 */

use std::path::PathBuf;

use tricue::errors::{ExportError, ImportError, StateError};

#[test]
fn test_import_error_display_shouldNameSheet() {
    let error = ImportError::NoLanguageColumns { sheet: "Feuil1".into() };
    assert_eq!(error.to_string(), "No language columns (EN, FR, AR) found in sheet 'Feuil1'");
}

#[test]
fn test_export_error_display_shouldIncludePath() {
    let error = ExportError::Write { path: PathBuf::from("out/subtitles_english.vtt"), message: "denied".into() };
    assert_eq!(error.to_string(), "Failed to write out/subtitles_english.vtt: denied");
}

#[test]
fn test_module_errors_inAnyhow_shouldKeepMessage() {
    let error: anyhow::Error = ImportError::NoSheets.into();
    assert_eq!(error.to_string(), "Spreadsheet contains no worksheets");
    assert!(matches!(error.downcast_ref::<ImportError>(), Some(ImportError::NoSheets)));

    let error = anyhow::Error::from(ExportError::NotADirectory(PathBuf::from("x")))
        .context("Export failed");
    assert_eq!(format!("{:#}", error), "Export failed: Export target is not a directory: x");
}

#[test]
fn test_state_error_fromIo_shouldWrap() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
    assert!(matches!(StateError::from(io), StateError::Io(_)));
    assert_eq!(
        StateError::Locked(PathBuf::from("appState.json")).to_string(),
        "Refusing to overwrite unreadable state file appState.json"
    );
}

#[test]
fn test_state_error_fromJson_shouldBeMalformed() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(StateError::from(json_error), StateError::Malformed(_)));
}
