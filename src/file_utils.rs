use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

// @module: File and directory utilities

// @const: Containers accepted as reference video
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mkv", "mov", "webm"];

// @const: Workbook formats accepted by the importer
pub const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Read a whole file into memory
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Classify a file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> FileType {
        let ext = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Video
        } else if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Spreadsheet
        } else {
            FileType::Unknown
        }
    }

    /// Convert a local path into a playable `file://` URI
    pub fn to_file_uri<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to resolve the current directory")?
                .join(path)
        };
        Url::from_file_path(&absolute)
            .map(|url| url.to_string())
            .map_err(|_| anyhow!("Cannot build a file URI for {:?}", absolute))
    }

    /// Headless counterpart of the video file dialog: accepts an existing video
    /// file and returns its URI, `None` for anything the dialog would not offer
    pub fn select_video_file(candidate: Option<PathBuf>) -> Option<String> {
        let path = candidate?;
        if !Self::file_exists(&path) || Self::detect_file_type(&path) != FileType::Video {
            return None;
        }
        Self::to_file_uri(&path).ok()
    }
}

/// Enum representing the file types the editor deals with
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Reference video container
    Video,
    /// Workbook with subtitle texts
    Spreadsheet,
    /// Anything else
    Unknown,
}
