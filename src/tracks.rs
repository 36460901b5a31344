/*!
 * Track synchronizer and playback surface.
 *
 * The playback surface owns one cue track per language. Tracks are keyed by
 * cue start time, not by row id: update and removal look a cue up by its
 * `Timestamp` start. The primitives here work on a single language; the
 * three-way fan-out that keeps the tracks aligned lives in the controller.
 */

use log::{debug, trace};

use crate::language_utils::Language;
use crate::timeline::Timestamp;

// @struct: Timed single-language caption entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

/// Cues shown for one language
#[derive(Debug, Clone)]
pub struct CueTrack {
    language: Language,
    label: String,
    cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new(language: Language) -> Self {
        CueTrack {
            language,
            label: language.track_label(),
            cues: Vec::new(),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Human-readable track name shown in the player menu
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Insert a cue, keeping the track ordered by start time.
    ///
    /// No uniqueness check: callers must remove a start before adding it again.
    pub fn add_cue(&mut self, start: Timestamp, end: Timestamp, text: impl Into<String>) {
        let index = self.cues.partition_point(|c| c.start <= start);
        self.cues.insert(index, Cue { start, end, text: text.into() });
        trace!("{} track: added cue at {} (until {})", self.language, start, end);
    }

    /// Rewrite the end of the cue starting at `start`. Returns false on a miss.
    pub fn update_end_time(&mut self, start: Timestamp, new_end: Timestamp) -> bool {
        match self.cues.iter_mut().find(|c| c.start == start) {
            Some(cue) => {
                cue.end = new_end;
                true
            }
            None => {
                debug!("{} track: no cue at {} to update", self.language, start);
                false
            }
        }
    }

    /// Remove the cue starting at `start`. Returns false on a miss.
    pub fn remove_cue(&mut self, start: Timestamp) -> bool {
        match self.cues.iter().position(|c| c.start == start) {
            Some(index) => {
                self.cues.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn cue_at(&self, start: Timestamp) -> Option<&Cue> {
        self.cues.iter().find(|c| c.start == start)
    }

    pub fn start_times(&self) -> Vec<Timestamp> {
        self.cues.iter().map(|c| c.start).collect()
    }

    /// Cues visible at `position` (start inclusive, end exclusive)
    pub fn active_cues(&self, position: Timestamp) -> impl Iterator<Item = &Cue> {
        self.cues
            .iter()
            .filter(move |c| c.start <= position && position < c.end)
    }
}

/// The three language tracks of the player
#[derive(Debug, Clone)]
pub struct TrackSet {
    english: CueTrack,
    french: CueTrack,
    arabic: CueTrack,
}

impl Default for TrackSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackSet {
    pub fn new() -> Self {
        TrackSet {
            english: CueTrack::new(Language::English),
            french: CueTrack::new(Language::French),
            arabic: CueTrack::new(Language::Arabic),
        }
    }

    pub fn track(&self, language: Language) -> &CueTrack {
        match language {
            Language::English => &self.english,
            Language::French => &self.french,
            Language::Arabic => &self.arabic,
        }
    }

    pub fn track_mut(&mut self, language: Language) -> &mut CueTrack {
        match language {
            Language::English => &mut self.english,
            Language::French => &mut self.french,
            Language::Arabic => &mut self.arabic,
        }
    }

    /// True when every track holds cues at the same start times
    pub fn is_aligned(&self) -> bool {
        let reference = self.english.start_times();
        self.french.start_times() == reference && self.arabic.start_times() == reference
    }

    pub fn clear(&mut self) {
        for language in Language::ALL {
            self.track_mut(language).cues.clear();
        }
    }
}

/// Video surface collaborator: playback clock plus the cue tracks it renders
pub trait PlaybackSurface {
    /// Current playback position in seconds, `None` when no media is loaded
    fn current_time(&self) -> Option<f64>;

    /// Move the playhead and resume playback
    fn seek_and_play(&mut self, seconds: f64);

    /// True when the track of `language` holds a cue starting at `start`
    fn has_cue(&self, language: Language, start: Timestamp) -> bool;

    fn add_cue(&mut self, language: Language, start: Timestamp, end: Timestamp, text: &str);

    /// Silent no-op when no cue starts at `start`
    fn update_cue_end(&mut self, language: Language, start: Timestamp, end: Timestamp);

    /// Silent no-op when no cue starts at `start`
    fn remove_cue(&mut self, language: Language, start: Timestamp);
}

/// Headless playback surface: a settable clock and in-memory tracks.
///
/// Used by the CLI session runner and the tests in place of a video widget.
#[derive(Debug, Clone, Default)]
pub struct PreviewSurface {
    position: Option<f64>,
    playing: bool,
    tracks: TrackSet,
}

impl PreviewSurface {
    /// Surface without media; the clock reads as unavailable
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface with media loaded, paused at `seconds`
    pub fn at(seconds: f64) -> Self {
        PreviewSurface {
            position: Some(seconds),
            ..Self::default()
        }
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.position = Some(seconds);
    }

    /// Unload media; the clock becomes unavailable and all cues are dropped
    pub fn unload(&mut self) {
        self.position = None;
        self.playing = false;
        self.tracks.clear();
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    pub fn track(&self, language: Language) -> &CueTrack {
        self.tracks.track(language)
    }
}

impl PlaybackSurface for PreviewSurface {
    fn current_time(&self) -> Option<f64> {
        self.position
    }

    fn seek_and_play(&mut self, seconds: f64) {
        self.position = Some(seconds);
        self.playing = true;
    }

    fn has_cue(&self, language: Language, start: Timestamp) -> bool {
        self.tracks.track(language).cue_at(start).is_some()
    }

    fn add_cue(&mut self, language: Language, start: Timestamp, end: Timestamp, text: &str) {
        self.tracks.track_mut(language).add_cue(start, end, text);
    }

    fn update_cue_end(&mut self, language: Language, start: Timestamp, end: Timestamp) {
        self.tracks.track_mut(language).update_end_time(start, end);
    }

    fn remove_cue(&mut self, language: Language, start: Timestamp) {
        self.tracks.track_mut(language).remove_cue(start);
    }
}
