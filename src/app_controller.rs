use anyhow::{Result, Context};
use log::{error, info, warn, debug};
use std::io::{BufRead, Write};
use std::path::Path;

use crate::app_config::Config;
use crate::controller::{ActionLabel, TimingController, Transition};
use crate::export::{DirectoryPicker, ExportOutcome, SubtitleExporter};
use crate::file_utils::FileManager;
use crate::import;
use crate::session::SessionCommand;
use crate::state::{AppState, StateStore};
use crate::timeline::{Row, RowCollection, RowId, RowStore, Timestamp};
use crate::tracks::{PlaybackSurface, PreviewSurface};

// @module: Application controller for the subtitle editor

/// Counters reported at the end of a session script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Commands executed
    pub commands: usize,
    /// Timing operations that changed something
    pub applied: usize,
    /// Timing operations that were ignored
    pub ignored: usize,
}

/// Main application controller: owns the rows, the preview surface and the
/// timing state machine, and persists the editor state after every change
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Where the editor state is saved
    store: StateStore,

    rows: RowCollection,

    video_path: Option<String>,

    timing: TimingController,

    surface: PreviewSurface,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let store = config.state_store()?;
        Ok(Self::with_store(config, store))
    }

    /// Create a controller backed by an explicit state store, restoring saved state
    pub fn with_store(config: Config, mut store: StateStore) -> Self {
        let saved = store.load().unwrap_or_default();
        debug!("Restored {} rows from {}", saved.subtitles.len(), store.path().display());

        let mut surface = PreviewSurface::new();
        if saved.video_path.is_some() {
            surface.set_position(0.0);
        }

        Self {
            timing: TimingController::with_preview_window(config.preview_window()),
            config,
            store,
            rows: RowCollection::from_rows(saved.subtitles),
            video_path: saved.video_path,
            surface,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn rows(&self) -> &RowCollection {
        &self.rows
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn timing(&self) -> &TimingController {
        &self.timing
    }

    pub fn surface(&self) -> &PreviewSurface {
        &self.surface
    }

    /// Snapshot of what gets persisted
    pub fn app_state(&self) -> AppState {
        AppState {
            subtitles: self.rows.rows().to_vec(),
            video_path: self.video_path.clone(),
        }
    }

    fn persist(&self) {
        self.store.persist(&self.app_state());
    }

    /// Replace the whole row collection (import, grid save) and persist it.
    ///
    /// Cues on the surface belong to the old rows and are dropped.
    pub fn update_subtitles(&mut self, rows: Vec<Row>) {
        self.rows.replace_all(rows);
        self.timing.clear_selection();
        let position = self.surface.current_time();
        self.surface.unload();
        if let Some(position) = position {
            self.surface.set_position(position);
        }
        self.persist();
    }

    /// Set the reference video and persist it
    pub fn update_video_path(&mut self, uri: String) {
        info!("Reference video: {}", uri);
        self.video_path = Some(uri);
        self.surface.unload();
        self.surface.set_position(0.0);
        self.persist();
    }

    /// Use `path` as reference video if it is an existing video file
    pub fn select_video(&mut self, path: &Path) -> Option<String> {
        let uri = FileManager::select_video_file(Some(path.to_path_buf()));
        match &uri {
            Some(uri) => self.update_video_path(uri.clone()),
            None => warn!("Not a playable video file: {}", path.display()),
        }
        uri
    }

    /// Import rows from a workbook. On failure the current rows are kept.
    pub fn import_spreadsheet(&mut self, path: &Path) -> Result<usize> {
        let bytes = FileManager::read_bytes(path)?;
        match import::rows_from_workbook(&bytes) {
            Ok(rows) => {
                let count = rows.len();
                self.update_subtitles(rows);
                info!("Imported {} rows from {}", count, path.display());
                Ok(count)
            }
            Err(e) => {
                error!("Import of {} produced no rows: {}", path.display(), e);
                Err(e).context(format!("Failed to import {}", path.display()))
            }
        }
    }

    /// Append an empty row, persist, and return its id
    pub fn new_row(&mut self) -> RowId {
        let id = self.rows.push_blank();
        self.persist();
        id
    }

    /// Export the current rows through the directory picker
    pub async fn export(&self, picker: &dyn DirectoryPicker) -> ExportOutcome {
        let exporter = SubtitleExporter::new(self.config.export_format);
        exporter.export_subtitles(self.rows.rows(), picker).await
    }

    /// Replay a session script against the preview surface.
    ///
    /// Parse errors abort the script; rejected timing operations are reported
    /// and the script carries on. Rows are saved when the script ends, including
    /// when it stops on an error.
    pub fn run_session<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let replayed = self.replay(input, &mut output, &mut summary);
        self.persist();
        replayed?;

        info!(
            "Session finished: {} commands, {} applied, {} ignored",
            summary.commands, summary.applied, summary.ignored
        );
        Ok(summary)
    }

    fn replay<R: BufRead, W: Write>(&mut self, input: R, output: &mut W, summary: &mut SessionSummary) -> Result<()> {
        for (number, line) in input.lines().enumerate() {
            let line = line.context("Failed to read session script")?;
            let Some(command) = SessionCommand::parse_line(&line)
                .with_context(|| format!("Session script line {}", number + 1))?
            else {
                continue;
            };

            summary.commands += 1;
            if let Some(transition) = self.apply(&command, output)? {
                if transition.is_applied() {
                    summary.applied += 1;
                } else {
                    summary.ignored += 1;
                }
                self.report(&transition, output)?;
            }
        }
        Ok(())
    }

    /// Execute one command; timing commands yield their transition
    fn apply<W: Write>(&mut self, command: &SessionCommand, output: &mut W) -> Result<Option<Transition>> {
        match command {
            SessionCommand::New => {
                let id = self.new_row();
                self.timing.select(&self.rows, id);
                writeln!(output, "row {} added", id)?;
                return Ok(None);
            }
            SessionCommand::List => {
                self.write_table(output)?;
                return Ok(None);
            }
            SessionCommand::Save => {
                self.persist();
                writeln!(output, "saved {} rows", self.rows.len())?;
                return Ok(None);
            }
            _ => {}
        }

        let rows = &mut self.rows;
        let surface = &mut self.surface;
        let timing = &mut self.timing;

        let transition = match command {
            SessionCommand::At(seconds) => {
                surface.set_position(*seconds);
                return Ok(None);
            }
            SessionCommand::Select(id) => {
                match timing.select(rows, *id) {
                    Some(label) => writeln!(output, "row {} selected [{}]", id, label)?,
                    None => writeln!(output, "row {} does not exist", id)?,
                }
                return Ok(None);
            }
            SessionCommand::Text(language, text) => {
                match timing.active_row() {
                    Some(id) if rows.set_text(id, *language, text.as_str()) => {
                        writeln!(output, "row {} {} = {}", id, language, text)?
                    }
                    _ => writeln!(output, "no row selected")?,
                }
                return Ok(None);
            }
            SessionCommand::Show => timing.show(rows, surface),
            SessionCommand::ShowNext => timing.show_next(rows, surface),
            SessionCommand::Hide => timing.hide(rows, surface),
            SessionCommand::Reset => timing.reset(rows, surface),
            SessionCommand::Goto => timing.jump_to_start(rows, surface),
            SessionCommand::Press => timing.primary(rows, surface),
            SessionCommand::New | SessionCommand::List | SessionCommand::Save => return Ok(None),
        };

        Ok(Some(transition))
    }

    fn report<W: Write>(&self, transition: &Transition, output: &mut W) -> Result<()> {
        match transition {
            Transition::Ignored(reason) => writeln!(output, "ignored: {}", reason)?,
            Transition::Seeked { row, position } => {
                writeln!(output, "row {}: playing from {}", row, position)?
            }
            Transition::Applied { row } => self.write_row_status(*row, output)?,
            Transition::Advanced { from, to, .. } => {
                self.write_row_status(*from, output)?;
                self.write_row_status(*to, output)?;
            }
        }
        Ok(())
    }

    fn write_row_status<W: Write>(&self, id: RowId, output: &mut W) -> Result<()> {
        if let Some(row) = self.rows.row(id) {
            writeln!(
                output,
                "row {}: {:?} start={} end={} [{}]",
                id,
                row.state(),
                format_time(row.start()),
                format_time(row.end()),
                ActionLabel::for_state(row.state())
            )?;
        }
        Ok(())
    }

    /// Print every row as `id | start | end | english | french | arabic`
    pub fn write_table<W: Write>(&self, output: &mut W) -> Result<()> {
        let active = self.timing.active_row();
        for row in self.rows.rows() {
            let marker = if Some(row.id) == active { ">" } else { " " };
            writeln!(
                output,
                "{}{:>4} | {:>8} | {:>8} | {} | {} | {}",
                marker,
                row.id,
                format_time(row.start()),
                format_time(row.end()),
                row.english,
                row.french,
                row.arabic
            )?;
        }
        Ok(())
    }
}

fn format_time(time: Option<Timestamp>) -> String {
    time.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
}
