/*!
 * Export encoder.
 *
 * Turns the row collection into one cue list per language and writes each
 * list as a subtitle document named `subtitles_<language>.<ext>` into a
 * directory chosen by the user. Only rows with both a start and an end are
 * exported, in row order.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::ExportError;
use crate::language_utils::Language;
use crate::timeline::Row;

// @const: WebVTT file signature
const WEBVTT_HEADER: &str = "WEBVTT";

// @struct: Exported cue in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportCue {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Cue list for one language: timed rows only, row order preserved
pub fn language_cues(rows: &[Row], language: Language) -> Vec<ExportCue> {
    rows.iter()
        .filter_map(|row| {
            let (start, end) = (row.start()?, row.end()?);
            Some(ExportCue {
                start_ms: start.as_millis(),
                end_ms: end.as_millis(),
                text: row.text(language).to_string(),
            })
        })
        .collect()
}

/// Subtitle interchange formats
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    #[default]
    Vtt,
    Srt,
}

impl SubtitleFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }

    /// Serialize a cue list into a complete document
    pub fn encode(&self, cues: &[ExportCue]) -> String {
        let mut output = String::new();
        if *self == Self::Vtt {
            output.push_str(WEBVTT_HEADER);
            output.push_str("\n\n");
        }

        for (index, cue) in cues.iter().enumerate() {
            let (start, end) = match self {
                Self::Vtt => (format_vtt_timestamp(cue.start_ms), format_vtt_timestamp(cue.end_ms)),
                Self::Srt => (format_srt_timestamp(cue.start_ms), format_srt_timestamp(cue.end_ms)),
            };
            output.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                index + 1,
                start,
                end,
                cue_payload(&cue.text)
            ));
        }

        output
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "vtt" | "webvtt" => Ok(Self::Vtt),
            "srt" | "subrip" => Ok(Self::Srt),
            _ => Err(anyhow::anyhow!("Invalid subtitle format: {}", s)),
        }
    }
}

/// Format milliseconds as HH:MM:SS.mmm
pub fn format_vtt_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(ms);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Format milliseconds as HH:MM:SS,mmm
pub fn format_srt_timestamp(ms: u64) -> String {
    let (hours, minutes, seconds, millis) = split_millis(ms);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

fn split_millis(ms: u64) -> (u64, u64, u64, u64) {
    (ms / 3_600_000, (ms % 3_600_000) / 60_000, (ms % 60_000) / 1_000, ms % 1_000)
}

/// Blank lines terminate a cue block in both formats, so they are dropped
fn cue_payload(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixed filename for a language document
pub fn export_filename(language: Language, format: SubtitleFormat) -> String {
    format!("subtitles_{}.{}", language.key(), format.extension())
}

/// Result reported back to the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<PathBuf>,
}

impl ExportOutcome {
    pub fn written(folder_path: PathBuf) -> Self {
        Self { success: true, folder_path: Some(folder_path) }
    }

    pub fn failed() -> Self {
        Self { success: false, folder_path: None }
    }
}

/// Directory chooser collaborator (native dialog in a desktop shell)
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    /// The chosen directory, or `None` if the user cancelled
    async fn pick_directory(&self) -> Option<PathBuf>;
}

/// Picker answering with a directory fixed up front (CLI flag, tests)
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory(pub Option<PathBuf>);

#[async_trait]
impl DirectoryPicker for FixedDirectory {
    async fn pick_directory(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

/// Writes the three language documents
#[derive(Debug, Clone, Default)]
pub struct SubtitleExporter {
    format: SubtitleFormat,
}

impl SubtitleExporter {
    pub fn new(format: SubtitleFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> SubtitleFormat {
        self.format
    }

    /// Ask for a directory and write all documents into it.
    ///
    /// Cancelling the picker writes nothing. A write failure stops the export;
    /// documents already written are kept.
    pub async fn export_subtitles(&self, rows: &[Row], picker: &dyn DirectoryPicker) -> ExportOutcome {
        let Some(folder) = picker.pick_directory().await else {
            info!("Export cancelled, no directory chosen");
            return ExportOutcome::failed();
        };

        match self.write_documents(rows, &folder).await {
            Ok(paths) => {
                info!("Exported {} subtitle files to {}", paths.len(), folder.display());
                ExportOutcome::written(folder)
            }
            Err(e) => {
                error!("Subtitle export failed: {}", e);
                ExportOutcome::failed()
            }
        }
    }

    /// Write one document per language into `folder`, returning the paths written
    pub async fn write_documents(&self, rows: &[Row], folder: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let metadata = tokio::fs::metadata(folder).await.map_err(|e| ExportError::Write {
            path: folder.to_path_buf(),
            message: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(ExportError::NotADirectory(folder.to_path_buf()));
        }

        let mut written = Vec::with_capacity(Language::ALL.len());
        for language in Language::ALL {
            let cues = language_cues(rows, language);
            let path = folder.join(export_filename(language, self.format));
            tokio::fs::write(&path, self.format.encode(&cues))
                .await
                .map_err(|e| ExportError::Write {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            debug!("Wrote {} {} cues to {}", cues.len(), language, path.display());
            written.push(path);
        }

        Ok(written)
    }
}
