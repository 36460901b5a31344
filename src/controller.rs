/*!
 * Row advancement controller.
 *
 * Drives the Show -> Show Next / Hide -> Reset cycle for the active row:
 * captures the playback clock, writes start/end into the row store and fans
 * every timing change out to the three language tracks of the playback
 * surface. Every operation completes synchronously; anything that cannot be
 * applied is reported as `Transition::Ignored` and leaves all state as it was.
 */

use log::{debug, warn};
use std::fmt;
use std::time::Duration;

use crate::language_utils::Language;
use crate::timeline::{RowId, RowState, RowStore, Timestamp};
use crate::tracks::PlaybackSurface;

/// Default lifetime of the provisional cue shown while a row's end is pending
pub const DEFAULT_PREVIEW_WINDOW: Duration = Duration::from_secs(60);

/// Label of the primary timing button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLabel {
    Show,
    ShowNext,
}

impl ActionLabel {
    /// Label for a row in the given state
    pub fn for_state(state: RowState) -> Self {
        match state {
            RowState::Showing => Self::ShowNext,
            RowState::Untimed | RowState::Timed => Self::Show,
        }
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "Show"),
            Self::ShowNext => write!(f, "Show Next"),
        }
    }
}

/// Why a transition was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing is selected
    NoActiveRow,
    /// The selected id is not in the row store
    UnknownRow(RowId),
    /// The playback clock could not be read
    PlaybackUnavailable,
    /// The transition does not apply to the row's current state
    InvalidState { row: RowId, state: RowState },
    /// The captured end would precede the row's start
    EndBeforeStart { row: RowId, start: Timestamp, end: Timestamp },
    /// Another row or cue already starts at the captured time
    StartTaken { row: RowId, start: Timestamp },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveRow => write!(f, "no row selected"),
            Self::UnknownRow(id) => write!(f, "row {} does not exist", id),
            Self::PlaybackUnavailable => write!(f, "playback time unavailable"),
            Self::InvalidState { row, state } => write!(f, "row {} is {:?}", row, state),
            Self::EndBeforeStart { row, start, end } => {
                write!(f, "end {} precedes start {} on row {}", end, start, row)
            }
            Self::StartTaken { row, start } => {
                write!(f, "a cue already starts at {}, row {} cannot start there", start, row)
            }
        }
    }
}

/// Outcome of a timing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The active row changed; selection did not move
    Applied { row: RowId },
    /// The active row was closed and the selection moved on.
    /// `started` tells whether the next row was opened at the same instant.
    Advanced { from: RowId, to: RowId, started: bool },
    /// Playback was moved to the row's start
    Seeked { row: RowId, position: Timestamp },
    /// Nothing changed
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Transition::Ignored(_))
    }

    /// Row the grid should scroll into view, if the selection moved
    pub fn revealed_row(&self) -> Option<RowId> {
        match self {
            Transition::Advanced { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Run `f` once per language, in track order
pub fn for_each_language<F: FnMut(Language)>(mut f: F) {
    for language in Language::ALL {
        f(language);
    }
}

/// Timing state machine over a single active row
#[derive(Debug, Clone)]
pub struct TimingController {
    // @field: Current grid selection
    active_row: Option<RowId>,

    // @field: Provisional cue length while the end is pending
    preview_window: Duration,
}

impl Default for TimingController {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingController {
    pub fn new() -> Self {
        Self::with_preview_window(DEFAULT_PREVIEW_WINDOW)
    }

    pub fn with_preview_window(preview_window: Duration) -> Self {
        TimingController {
            active_row: None,
            preview_window,
        }
    }

    pub fn active_row(&self) -> Option<RowId> {
        self.active_row
    }

    pub fn preview_window(&self) -> Duration {
        self.preview_window
    }

    /// Change the selection. Returns the recomputed label, or `None` (and
    /// keeps the old selection) when the row does not exist.
    pub fn select<R: RowStore + ?Sized>(&mut self, rows: &R, id: RowId) -> Option<ActionLabel> {
        let row = rows.row(id)?;
        self.active_row = Some(id);
        debug!("Selected row {} ({:?})", id, row.state());
        Some(ActionLabel::for_state(row.state()))
    }

    pub fn clear_selection(&mut self) {
        self.active_row = None;
    }

    /// Label of the primary button for the current selection
    pub fn label<R: RowStore + ?Sized>(&self, rows: &R) -> ActionLabel {
        self.active_row
            .and_then(|id| rows.row(id))
            .map(|row| ActionLabel::for_state(row.state()))
            .unwrap_or(ActionLabel::Show)
    }

    /// Press the primary button: Show or Show Next depending on its label
    pub fn primary<R, S>(&mut self, rows: &mut R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        match self.label(rows) {
            ActionLabel::Show => self.show(rows, surface),
            ActionLabel::ShowNext => self.show_next(rows, surface),
        }
    }

    /// Open the active row at the current playback time
    pub fn show<R, S>(&mut self, rows: &mut R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let id = match self.active_in_state(rows, &[RowState::Untimed]) {
            Ok(id) => id,
            Err(reason) => return ignored("show", reason),
        };
        let Some(now) = capture_time(surface) else {
            return ignored("show", IgnoreReason::PlaybackUnavailable);
        };
        if let Err(reason) = check_start_free(rows, surface, id, now) {
            return ignored("show", reason);
        }

        self.open_row(rows, surface, id, now);
        Transition::Applied { row: id }
    }

    /// Close the active row at the current playback time and move to the next
    /// row, opening it at the same instant if it has no timing yet
    pub fn show_next<R, S>(&mut self, rows: &mut R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let (id, start, now) = match self.closing(rows, surface) {
            Ok(closing) => closing,
            Err(reason) => return ignored("show next", reason),
        };

        // The next row opens at the same instant, so its start must be free
        // before anything is written
        let next = rows.next_row(id);
        let started = next
            .and_then(|next| rows.row(next))
            .is_some_and(|row| row.state() == RowState::Untimed);
        if let Some(next) = next.filter(|_| started) {
            if let Err(reason) = check_start_free(rows, surface, next, now) {
                return ignored("show next", reason);
            }
        }

        if let Err(reason) = close_row(rows, surface, id, start, now) {
            return ignored("show next", reason);
        }

        let Some(next) = next else {
            debug!("Row {} is the last row, nothing to advance to", id);
            return Transition::Applied { row: id };
        };

        self.active_row = Some(next);
        if started {
            self.open_row(rows, surface, next, now);
        }

        debug!("Advanced from row {} to row {} (opened: {})", id, next, started);
        Transition::Advanced { from: id, to: next, started }
    }

    /// Close the active row at the current playback time without moving
    pub fn hide<R, S>(&mut self, rows: &mut R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let closed = self
            .closing(rows, surface)
            .and_then(|(id, start, now)| close_row(rows, surface, id, start, now).map(|_| id));
        match closed {
            Ok(id) => Transition::Applied { row: id },
            Err(reason) => ignored("hide", reason),
        }
    }

    /// Clear the active row's timing and drop its cues from every track
    pub fn reset<R, S>(&mut self, rows: &mut R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let id = match self.active_in_state(rows, &[RowState::Showing, RowState::Timed]) {
            Ok(id) => id,
            Err(reason) => return ignored("reset", reason),
        };

        if let Some(start) = rows.clear_timing(id) {
            for_each_language(|language| surface.remove_cue(language, start));
            debug!("Reset row {} (was shown at {})", id, start);
        }
        Transition::Applied { row: id }
    }

    /// Seek playback to the active row's start and resume
    pub fn jump_to_start<R, S>(&self, rows: &R, surface: &mut S) -> Transition
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let id = match self.active_in_state(rows, &[RowState::Showing, RowState::Timed]) {
            Ok(id) => id,
            Err(reason) => return ignored("jump to start", reason),
        };
        let Some(start) = rows.row(id).and_then(|row| row.start()) else {
            return ignored("jump to start", IgnoreReason::UnknownRow(id));
        };

        surface.seek_and_play(start.as_seconds());
        Transition::Seeked { row: id, position: start }
    }

    /// Active row, provided its state is one of `allowed`
    fn active_in_state<R: RowStore + ?Sized>(
        &self,
        rows: &R,
        allowed: &[RowState],
    ) -> Result<RowId, IgnoreReason> {
        let id = self.active_row.ok_or(IgnoreReason::NoActiveRow)?;
        let row = rows.row(id).ok_or(IgnoreReason::UnknownRow(id))?;
        let state = row.state();
        if allowed.contains(&state) {
            Ok(id)
        } else {
            Err(IgnoreReason::InvalidState { row: id, state })
        }
    }

    /// Set the start of `id` and show provisional cues on all tracks
    fn open_row<R, S>(&self, rows: &mut R, surface: &mut S, id: RowId, start: Timestamp)
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        if !rows.set_start(id, start) {
            return;
        }
        let preview_end = start.saturating_add_millis(self.preview_window.as_millis() as u64);
        if let Some(row) = rows.row(id) {
            for_each_language(|language| {
                surface.add_cue(language, start, preview_end, row.text(language));
            });
        }
        debug!("Row {} shown at {}", id, start);
    }

    /// Checks shared by Show Next and Hide: the active row, its start and the
    /// captured end, without touching any state
    fn closing<R, S>(&self, rows: &R, surface: &S) -> Result<(RowId, Timestamp, Timestamp), IgnoreReason>
    where
        R: RowStore + ?Sized,
        S: PlaybackSurface + ?Sized,
    {
        let id = self.active_in_state(rows, &[RowState::Showing])?;
        let now = capture_time(surface).ok_or(IgnoreReason::PlaybackUnavailable)?;
        let start = rows
            .row(id)
            .and_then(|row| row.start())
            .ok_or(IgnoreReason::UnknownRow(id))?;

        if now < start {
            return Err(IgnoreReason::EndBeforeStart { row: id, start, end: now });
        }
        Ok((id, start, now))
    }
}

/// Set the end of `id` and move the end of its cue on all tracks
fn close_row<R, S>(rows: &mut R, surface: &mut S, id: RowId, start: Timestamp, end: Timestamp) -> Result<(), IgnoreReason>
where
    R: RowStore + ?Sized,
    S: PlaybackSurface + ?Sized,
{
    if !rows.set_end(id, end) {
        return Err(IgnoreReason::UnknownRow(id));
    }
    for_each_language(|language| surface.update_cue_end(language, start, end));
    debug!("Row {} hidden at {}", id, end);
    Ok(())
}

/// Cue tracks are keyed by start time: no two cues of a track may share one
fn check_start_free<R, S>(rows: &R, surface: &S, id: RowId, start: Timestamp) -> Result<(), IgnoreReason>
where
    R: RowStore + ?Sized,
    S: PlaybackSurface + ?Sized,
{
    let row_taken = rows.row_starting_at(start).is_some_and(|holder| holder != id);
    let cue_taken = Language::ALL.iter().any(|language| surface.has_cue(*language, start));
    if row_taken || cue_taken {
        return Err(IgnoreReason::StartTaken { row: id, start });
    }
    Ok(())
}

fn capture_time<S: PlaybackSurface + ?Sized>(surface: &S) -> Option<Timestamp> {
    surface.current_time().and_then(Timestamp::capture)
}

fn ignored(operation: &str, reason: IgnoreReason) -> Transition {
    match reason {
        IgnoreReason::EndBeforeStart { .. } | IgnoreReason::StartTaken { .. } => warn!("Ignoring {}: {}", operation, reason),
        _ => debug!("Ignoring {}: {}", operation, reason),
    }
    Transition::Ignored(reason)
}
