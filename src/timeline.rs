/*!
 * Cue timeline model.
 *
 * A `Row` is the single source of truth for one subtitle line: an optional
 * start/end timing pair and one text payload per language. Timing is kept as
 * fixed-point milliseconds (`Timestamp`) so cue keys compare exactly; seconds
 * only appear at the playback boundary and in the persisted JSON.
 */

use log::{debug, warn};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::language_utils::Language;

// @const: Capture precision in milliseconds (two decimals of a second)
const CAPTURE_STEP_MS: u64 = 10;

/// A point on the video timeline, stored as whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    /// Capture a playback position, truncated (not rounded) to two decimals.
    ///
    /// Returns `None` for positions that are not finite or negative, which is
    /// how an unreadable playback clock surfaces to the timing engine.
    pub fn capture(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        // seconds * 100 can land one step off the decimal boundary
        // (1.13 * 100 = 112.999...), so compare against the boundary itself
        let mut centis = (seconds * 100.0).floor() as u64;
        if (centis + 1) as f64 / 100.0 <= seconds {
            centis += 1;
        } else if centis > 0 && centis as f64 / 100.0 > seconds {
            centis -= 1;
        }
        Some(Timestamp(centis * CAPTURE_STEP_MS))
    }

    /// Parse a persisted value without truncation (three decimals kept)
    pub fn from_seconds(seconds: f64) -> Option<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        Some(Timestamp((seconds * 1000.0).round() as u64))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    // @returns: This timestamp shifted forward by `ms` milliseconds
    pub fn saturating_add_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}.{:02}", self.0 / 1000, (self.0 % 1000) / 10))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_seconds())
    }
}

/// Persisted timings may be numbers or fixed-point strings ("12.34")
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SecondsRepr {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl SecondsRepr {
    fn seconds(&self) -> Option<f64> {
        match self {
            SecondsRepr::Number(n) => Some(*n),
            SecondsRepr::Text(s) => s.trim().parse().ok(),
            SecondsRepr::Other(_) => None,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, SecondsRepr::Text(s) if s.trim().is_empty())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = SecondsRepr::deserialize(deserializer)?;
        repr.seconds()
            .and_then(Timestamp::from_seconds)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {:?}", repr)))
    }
}

/// Row timing field: blank or unreadable values load as "no timing"
/// instead of failing the whole document
fn lenient_timing<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
    let Some(repr) = Option::<SecondsRepr>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let timing = repr.seconds().and_then(Timestamp::from_seconds);
    if timing.is_none() && !repr.is_blank() {
        warn!("Dropping unreadable timing value {:?}", repr);
    }
    Ok(timing)
}

/// Stable row identifier; never reused within a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RowIdRepr {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RowIdRepr::deserialize(deserializer)? {
            RowIdRepr::Number(n) => Ok(RowId(n)),
            RowIdRepr::Text(s) => s.trim().parse().map(RowId).map_err(serde::de::Error::custom),
        }
    }
}

/// Timing state of a row, derived from its start/end fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// No start yet
    Untimed,
    /// Start set, end pending; a preview cue is on screen
    Showing,
    /// Both start and end set
    Timed,
}

// @struct: One subtitle line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    // @field: Stable identifier
    pub id: RowId,

    // @field: Show time
    #[serde(default, deserialize_with = "lenient_timing")]
    start: Option<Timestamp>,

    // @field: Hide time
    #[serde(default, deserialize_with = "lenient_timing")]
    end: Option<Timestamp>,

    #[serde(default)]
    pub english: String,

    #[serde(default)]
    pub french: String,

    #[serde(default)]
    pub arabic: String,

    // @field: True for rows created in the editor rather than imported
    #[serde(default)]
    pub is_new: bool,
}

impl Row {
    /// Create an untimed row carrying imported texts
    pub fn imported(id: RowId, english: String, french: String, arabic: String) -> Self {
        Row {
            id,
            start: None,
            end: None,
            english,
            french,
            arabic,
            is_new: false,
        }
    }

    /// Create an empty untimed row added from the editor
    pub fn blank(id: RowId) -> Self {
        Row {
            id,
            start: None,
            end: None,
            english: String::new(),
            french: String::new(),
            arabic: String::new(),
            is_new: true,
        }
    }

    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn state(&self) -> RowState {
        match (self.start, self.end) {
            (None, _) => RowState::Untimed,
            (Some(_), None) => RowState::Showing,
            (Some(_), Some(_)) => RowState::Timed,
        }
    }

    /// Text payload for one language
    pub fn text(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::French => &self.french,
            Language::Arabic => &self.arabic,
        }
    }

    pub fn set_text(&mut self, language: Language, text: impl Into<String>) {
        let text = text.into();
        match language {
            Language::English => self.english = text,
            Language::French => self.french = text,
            Language::Arabic => self.arabic = text,
        }
    }

    /// Set the show time; the hide time is left untouched
    pub fn set_start(&mut self, start: Timestamp) {
        self.start = Some(start);
    }

    /// Set the hide time. Refused while the row has no start.
    pub fn set_end(&mut self, end: Timestamp) -> bool {
        if self.start.is_none() {
            return false;
        }
        self.end = Some(end);
        true
    }

    /// Clear both timings at once, returning the former start
    pub fn clear_timing(&mut self) -> Option<Timestamp> {
        self.end = None;
        self.start.take()
    }

    /// Drop a hide time that has no show time (only reachable through hand-edited state)
    fn repair(&mut self) {
        if self.start.is_none() && self.end.is_some() {
            warn!("Row {} has an end time without a start time, clearing it", self.id);
            self.end = None;
        }
    }
}

/// Row access the timing controller needs; the grid owns the rows
pub trait RowStore {
    /// Look up a row by id
    fn row(&self, id: RowId) -> Option<&Row>;

    /// Set a row's start; false if the row is unknown
    fn set_start(&mut self, id: RowId, start: Timestamp) -> bool;

    /// Set a row's end; false if the row is unknown or has no start
    fn set_end(&mut self, id: RowId, end: Timestamp) -> bool;

    /// Clear a row's timing, returning the former start
    fn clear_timing(&mut self, id: RowId) -> Option<Timestamp>;

    /// Row following `id` in display order
    fn next_row(&self, id: RowId) -> Option<RowId>;

    /// Row whose start is exactly `start`, if any
    fn row_starting_at(&self, start: Timestamp) -> Option<RowId>;
}

/// Ordered row collection backing the editor grid
#[derive(Debug, Clone)]
pub struct RowCollection {
    rows: Vec<Row>,
    next_id: u64,
}

impl Default for RowCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl RowCollection {
    pub fn new() -> Self {
        Self { rows: Vec::new(), next_id: 1 }
    }

    /// Build a collection from existing rows, keeping their order and ids
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut collection = Self::new();
        collection.replace_all(rows);
        collection
    }

    /// Swap in a new row set (import or reload). Ids stay as given; the id
    /// allocator only ever moves forward.
    pub fn replace_all(&mut self, rows: Vec<Row>) {
        let max_id = rows.iter().map(|r| r.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        self.rows = rows;
        for row in &mut self.rows {
            row.repair();
        }
        debug!("Row collection now holds {} rows", self.rows.len());
    }

    /// Append an empty row with a fresh id
    pub fn push_blank(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.rows.push(Row::blank(id));
        id
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display position of a row
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }

    /// Direct grid edit of a text cell
    pub fn set_text(&mut self, id: RowId, language: Language, text: impl Into<String>) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.set_text(language, text);
                true
            }
            None => false,
        }
    }

    fn row_mut(&mut self, id: RowId) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }
}

impl RowStore for RowCollection {
    fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    fn set_start(&mut self, id: RowId, start: Timestamp) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.set_start(start);
                true
            }
            None => false,
        }
    }

    fn set_end(&mut self, id: RowId, end: Timestamp) -> bool {
        self.row_mut(id).is_some_and(|row| row.set_end(end))
    }

    fn clear_timing(&mut self, id: RowId) -> Option<Timestamp> {
        self.row_mut(id).and_then(|row| row.clear_timing())
    }

    fn next_row(&self, id: RowId) -> Option<RowId> {
        let index = self.position(id)?;
        self.rows.get(index + 1).map(|r| r.id)
    }

    fn row_starting_at(&self, start: Timestamp) -> Option<RowId> {
        self.rows.iter().find(|r| r.start == Some(start)).map(|r| r.id)
    }
}
