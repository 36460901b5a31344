/*!
 * Tests for the row advancement controller
 */

use std::time::Duration;

use tricue::controller::{ActionLabel, IgnoreReason, TimingController, Transition, for_each_language};
use tricue::language_utils::Language;
use tricue::timeline::{RowCollection, RowId, RowState, RowStore, Timestamp};
use tricue::tracks::{PlaybackSurface, PreviewSurface};
use crate::common;

fn ms(value: u64) -> Timestamp {
    Timestamp::from_millis(value)
}

/// Controller with `count` sample rows, row 1 selected, clock at `position`
fn setup(count: usize, position: f64) -> (TimingController, RowCollection, PreviewSurface) {
    let rows = common::sample_collection(count);
    let mut controller = TimingController::new();
    controller.select(&rows, RowId(1)).unwrap();
    (controller, rows, PreviewSurface::at(position))
}

fn assert_aligned(surface: &PreviewSurface) {
    assert!(surface.tracks().is_aligned(), "language tracks diverged");
}

#[test]
fn test_for_each_language_shouldVisitAllInOrder() {
    let mut seen = Vec::new();
    for_each_language(|language| seen.push(language));
    assert_eq!(seen, vec![Language::English, Language::French, Language::Arabic]);
}

/// Show sets the start, leaves the end and adds a provisional cue per language
#[test]
fn test_show_onUntimedRow_shouldSetStartAndAddPreviewCues() {
    let (mut controller, mut rows, mut surface) = setup(2, 12.349);

    let transition = controller.show(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Applied { row: RowId(1) });

    let row = rows.row(RowId(1)).unwrap();
    assert_eq!(row.start(), Some(ms(12_340)));
    assert_eq!(row.end(), None);
    assert_eq!(row.state(), RowState::Showing);
    assert_eq!(controller.label(&rows), ActionLabel::ShowNext);

    for language in Language::ALL {
        let cue = surface.track(language).cue_at(ms(12_340)).unwrap();
        assert_eq!(cue.end, ms(72_340));
        assert_eq!(cue.text, row.text(language));
    }
    assert_aligned(&surface);
}

#[test]
fn test_show_withCustomPreviewWindow_shouldUseIt() {
    let mut rows = common::sample_collection(1);
    let mut controller = TimingController::with_preview_window(Duration::from_secs(5));
    controller.select(&rows, RowId(1));
    let mut surface = PreviewSurface::at(1.0);

    controller.show(&mut rows, &mut surface);
    assert_eq!(surface.track(Language::English).cue_at(ms(1_000)).unwrap().end, ms(6_000));
}

/// Show on a row that already has a start changes nothing
#[test]
fn test_show_onShowingRow_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(1, 1.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(2.0);

    let transition = controller.show(&mut rows, &mut surface);
    assert_eq!(
        transition,
        Transition::Ignored(IgnoreReason::InvalidState { row: RowId(1), state: RowState::Showing })
    );
    assert_eq!(rows.row(RowId(1)).unwrap().start(), Some(ms(1_000)));
    assert_eq!(surface.track(Language::English).len(), 1);
}

/// Show Next sets end = T, keeps start, and updates every track
#[test]
fn test_show_next_onShowingRow_shouldSetEndAndKeepStart() {
    let (mut controller, mut rows, mut surface) = setup(1, 3.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(5.678);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Applied { row: RowId(1) });

    let row = rows.row(RowId(1)).unwrap();
    assert_eq!(row.start(), Some(ms(3_000)));
    assert_eq!(row.end(), Some(ms(5_670)));
    for language in Language::ALL {
        assert_eq!(surface.track(language).cue_at(ms(3_000)).unwrap().end, ms(5_670));
    }
}

/// Two adjacent untimed rows: Show at T1, Show Next at T2
#[test]
fn test_show_next_withUntimedNextRow_shouldAdvanceAndOpenIt() {
    let (mut controller, mut rows, mut surface) = setup(2, 1.5);
    controller.show(&mut rows, &mut surface);
    surface.set_position(4.25);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Advanced { from: RowId(1), to: RowId(2), started: true });
    assert_eq!(transition.revealed_row(), Some(RowId(2)));

    let first = rows.row(RowId(1)).unwrap();
    assert_eq!((first.start(), first.end()), (Some(ms(1_500)), Some(ms(4_250))));
    assert_eq!(first.state(), RowState::Timed);

    let second = rows.row(RowId(2)).unwrap();
    assert_eq!((second.start(), second.end()), (Some(ms(4_250)), None));
    assert_eq!(second.state(), RowState::Showing);

    assert_eq!(controller.active_row(), Some(RowId(2)));
    assert_eq!(controller.label(&rows), ActionLabel::ShowNext);

    for language in Language::ALL {
        let track = surface.track(language);
        assert_eq!(track.start_times(), vec![ms(1_500), ms(4_250)]);
        assert_eq!(track.cue_at(ms(4_250)).unwrap().end, ms(64_250));
    }
    assert_aligned(&surface);
}

/// The next row is selected but left alone when it is already timed
#[test]
fn test_show_next_withTimedNextRow_shouldSelectWithoutOpening() {
    let (mut controller, mut rows, mut surface) = setup(2, 10.0);
    controller.select(&rows, RowId(2));
    controller.show(&mut rows, &mut surface);
    surface.set_position(11.0);
    controller.hide(&mut rows, &mut surface);

    controller.select(&rows, RowId(1));
    surface.set_position(1.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(2.0);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Advanced { from: RowId(1), to: RowId(2), started: false });

    let second = rows.row(RowId(2)).unwrap();
    assert_eq!((second.start(), second.end()), (Some(ms(10_000)), Some(ms(11_000))));
    assert_eq!(controller.active_row(), Some(RowId(2)));
    assert_eq!(controller.label(&rows), ActionLabel::Show);
    assert_eq!(surface.track(Language::French).len(), 2);
    assert_aligned(&surface);
}

/// On the last row the end is set and the selection stays
#[test]
fn test_show_next_onLastRow_shouldSkipAdvance() {
    let (mut controller, mut rows, mut surface) = setup(1, 1.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(2.0);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Applied { row: RowId(1) });
    assert_eq!(transition.revealed_row(), None);
    assert_eq!(controller.active_row(), Some(RowId(1)));
    assert_eq!(rows.row(RowId(1)).unwrap().state(), RowState::Timed);
}

/// Hide closes the row without moving the selection
#[test]
fn test_hide_onShowingRow_shouldNotAdvance() {
    let (mut controller, mut rows, mut surface) = setup(3, 7.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(9.5);

    let transition = controller.hide(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Applied { row: RowId(1) });
    assert_eq!(controller.active_row(), Some(RowId(1)));
    assert_eq!(rows.row(RowId(1)).unwrap().end(), Some(ms(9_500)));
    assert_eq!(rows.row(RowId(2)).unwrap().state(), RowState::Untimed);
    assert_eq!(controller.label(&rows), ActionLabel::Show);
    for language in Language::ALL {
        assert_eq!(surface.track(language).cue_at(ms(7_000)).unwrap().end, ms(9_500));
    }
}

#[test]
fn test_hide_onUntimedRow_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(1, 3.0);
    let transition = controller.hide(&mut rows, &mut surface);
    assert!(!transition.is_applied());
    assert_eq!(rows.row(RowId(1)).unwrap().end(), None);
}

/// Reset on a timed row removes its cue from every track
#[test]
fn test_reset_onTimedRow_shouldClearTimingAndRemoveCues() {
    let (mut controller, mut rows, mut surface) = setup(1, 2.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(3.0);
    controller.hide(&mut rows, &mut surface);

    let transition = controller.reset(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Applied { row: RowId(1) });

    let row = rows.row(RowId(1)).unwrap();
    assert_eq!((row.start(), row.end()), (None, None));
    for language in Language::ALL {
        assert!(surface.track(language).cue_at(ms(2_000)).is_none());
    }
    assert_eq!(controller.label(&rows), ActionLabel::Show);
}

#[test]
fn test_reset_onShowingRow_shouldRemovePreviewCues() {
    let (mut controller, mut rows, mut surface) = setup(1, 2.0);
    controller.show(&mut rows, &mut surface);

    controller.reset(&mut rows, &mut surface);
    for language in Language::ALL {
        assert!(surface.track(language).is_empty());
    }
}

#[test]
fn test_reset_onUntimedRow_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(1, 2.0);
    let transition = controller.reset(&mut rows, &mut surface);
    assert_eq!(
        transition,
        Transition::Ignored(IgnoreReason::InvalidState { row: RowId(1), state: RowState::Untimed })
    );
}

/// Reset, Show, Show Next reproduces a consistent row with one cue per language
#[test]
fn test_reset_then_retime_shouldLeaveOneCuePerLanguage() {
    let (mut controller, mut rows, mut surface) = setup(1, 5.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(6.0);
    controller.hide(&mut rows, &mut surface);

    controller.reset(&mut rows, &mut surface);
    surface.set_position(5.5);
    controller.show(&mut rows, &mut surface);
    surface.set_position(6.75);
    controller.show_next(&mut rows, &mut surface);

    let row = rows.row(RowId(1)).unwrap();
    let (start, end) = (row.start().unwrap(), row.end().unwrap());
    assert!(start <= end);
    for language in Language::ALL {
        let track = surface.track(language);
        assert_eq!(track.len(), 1);
        assert_eq!(track.cue_at(start).unwrap().end, end);
    }
}

/// Every operation keeps the three tracks on the same start times
#[test]
fn test_mixed_operations_shouldKeepTracksAligned() {
    let (mut controller, mut rows, mut surface) = setup(4, 0.0);
    let steps: Vec<(f64, fn(&mut TimingController, &mut RowCollection, &mut PreviewSurface) -> Transition)> = vec![
        (1.0, |c, r, s| c.show(r, s)),
        (2.0, |c, r, s| c.show_next(r, s)),
        (3.0, |c, r, s| c.hide(r, s)),
        (3.5, |c, r, s| c.reset(r, s)),
        (4.0, |c, r, s| c.primary(r, s)),
        (5.0, |c, r, s| c.primary(r, s)),
        (6.0, |c, r, s| c.show_next(r, s)),
        (7.0, |c, r, s| c.reset(r, s)),
        (8.0, |c, r, s| c.show(r, s)),
    ];

    for (position, step) in steps {
        surface.set_position(position);
        step(&mut controller, &mut rows, &mut surface);
        assert_aligned(&surface);
    }
}

/// Without a selection every operation is a no-op
#[test]
fn test_operations_withoutActiveRow_shouldBeIgnored() {
    let mut rows = common::sample_collection(2);
    let mut controller = TimingController::new();
    let mut surface = PreviewSurface::at(1.0);

    let expected = Transition::Ignored(IgnoreReason::NoActiveRow);
    assert_eq!(controller.show(&mut rows, &mut surface), expected);
    assert_eq!(controller.show_next(&mut rows, &mut surface), expected);
    assert_eq!(controller.hide(&mut rows, &mut surface), expected);
    assert_eq!(controller.reset(&mut rows, &mut surface), expected);
    assert_eq!(controller.jump_to_start(&rows, &mut surface), expected);
    assert!(surface.track(Language::English).is_empty());
}

/// Without a readable clock nothing changes
#[test]
fn test_operations_withoutPlaybackTime_shouldBeIgnored() {
    let mut rows = common::sample_collection(1);
    let mut controller = TimingController::new();
    controller.select(&rows, RowId(1));
    let mut surface = PreviewSurface::new();

    let transition = controller.show(&mut rows, &mut surface);
    assert_eq!(transition, Transition::Ignored(IgnoreReason::PlaybackUnavailable));
    assert_eq!(rows.row(RowId(1)).unwrap().state(), RowState::Untimed);

    surface.set_position(1.0);
    controller.show(&mut rows, &mut surface);
    surface.unload();
    assert_eq!(
        controller.hide(&mut rows, &mut surface),
        Transition::Ignored(IgnoreReason::PlaybackUnavailable)
    );
    assert_eq!(rows.row(RowId(1)).unwrap().state(), RowState::Showing);
}

/// Closing a row before its start (playhead moved back) is refused
#[test]
fn test_hide_beforeStart_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(1, 10.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(4.0);

    let transition = controller.hide(&mut rows, &mut surface);
    assert!(matches!(transition, Transition::Ignored(IgnoreReason::EndBeforeStart { .. })));
    assert_eq!(rows.row(RowId(1)).unwrap().end(), None);
    assert_eq!(surface.track(Language::English).cue_at(ms(10_000)).unwrap().end, ms(70_000));
}

/// The primary button follows the label
#[test]
fn test_primary_shouldDispatchOnLabel() {
    let (mut controller, mut rows, mut surface) = setup(2, 1.0);
    assert_eq!(controller.label(&rows), ActionLabel::Show);
    assert_eq!(controller.primary(&mut rows, &mut surface), Transition::Applied { row: RowId(1) });

    surface.set_position(2.0);
    assert_eq!(controller.label(&rows), ActionLabel::ShowNext);
    assert_eq!(
        controller.primary(&mut rows, &mut surface),
        Transition::Advanced { from: RowId(1), to: RowId(2), started: true }
    );
}

/// Selecting recomputes the label from the row's state
#[test]
fn test_select_shouldRecomputeLabel() {
    let (mut controller, mut rows, mut surface) = setup(3, 1.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(2.0);
    controller.hide(&mut rows, &mut surface);
    controller.select(&rows, RowId(2));
    controller.show(&mut rows, &mut surface);

    assert_eq!(controller.select(&rows, RowId(1)), Some(ActionLabel::Show));
    assert_eq!(controller.select(&rows, RowId(2)), Some(ActionLabel::ShowNext));
    assert_eq!(controller.select(&rows, RowId(3)), Some(ActionLabel::Show));
    assert_eq!(controller.select(&rows, RowId(42)), None);
    assert_eq!(controller.active_row(), Some(RowId(3)));

    assert_eq!(ActionLabel::ShowNext.to_string(), "Show Next");
    assert_eq!(ActionLabel::Show.to_string(), "Show");
}

/// Jumping seeks to the row's start and resumes playback
#[test]
fn test_jump_to_start_withStart_shouldSeekAndPlay() {
    let (mut controller, mut rows, mut surface) = setup(1, 3.21);
    assert!(!controller.jump_to_start(&rows, &mut surface).is_applied());

    controller.show(&mut rows, &mut surface);
    surface.set_position(30.0);
    let transition = controller.jump_to_start(&rows, &mut surface);

    assert_eq!(transition, Transition::Seeked { row: RowId(1), position: ms(3_210) });
    assert_eq!(surface.current_time(), Some(3.21));
    assert!(surface.is_playing());
    assert_eq!(rows.row(RowId(1)).unwrap().state(), RowState::Showing);
}

/// Show Next at the instant the row was shown would open the next row on an
/// occupied start; nothing changes
#[test]
fn test_show_next_atSameInstantAsShow_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(2, 5.0);
    controller.show(&mut rows, &mut surface);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert_eq!(
        transition,
        Transition::Ignored(IgnoreReason::StartTaken { row: RowId(2), start: ms(5_000) })
    );
    assert_eq!(controller.active_row(), Some(RowId(1)));
    assert_eq!(rows.row(RowId(1)).unwrap().state(), RowState::Showing);
    assert_eq!(rows.row(RowId(2)).unwrap().state(), RowState::Untimed);
    for language in Language::ALL {
        assert_eq!(surface.track(language).start_times(), vec![ms(5_000)]);
    }

    // Resetting the untouched row cannot remove the first row's cue
    controller.select(&rows, RowId(2));
    assert!(!controller.reset(&mut rows, &mut surface).is_applied());
    assert_eq!(surface.track(Language::English).cue_at(ms(5_000)).unwrap().text, "Line 1");
}

/// Hide at the same instant still closes the row with a zero-length cue
#[test]
fn test_hide_atSameInstantAsShow_shouldApply() {
    let (mut controller, mut rows, mut surface) = setup(2, 5.0);
    controller.show(&mut rows, &mut surface);

    assert!(controller.hide(&mut rows, &mut surface).is_applied());
    let row = rows.row(RowId(1)).unwrap();
    assert_eq!((row.start(), row.end()), (Some(ms(5_000)), Some(ms(5_000))));
}

/// Show on a start another row already holds is refused
#[test]
fn test_show_onStartUsedByAnotherRow_shouldBeIgnored() {
    let (mut controller, mut rows, mut surface) = setup(3, 8.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(9.0);
    controller.hide(&mut rows, &mut surface);

    controller.select(&rows, RowId(3));
    surface.set_position(8.004);
    let transition = controller.show(&mut rows, &mut surface);
    assert_eq!(
        transition,
        Transition::Ignored(IgnoreReason::StartTaken { row: RowId(3), start: ms(8_000) })
    );
    assert_eq!(rows.row(RowId(3)).unwrap().start(), None);
    assert_eq!(surface.track(Language::French).len(), 1);
    assert_aligned(&surface);

    // Once the holder is reset the start is free again
    controller.select(&rows, RowId(1));
    controller.reset(&mut rows, &mut surface);
    controller.select(&rows, RowId(3));
    assert!(controller.show(&mut rows, &mut surface).is_applied());
    assert_eq!(surface.track(Language::French).cue_at(ms(8_000)).unwrap().text, "Ligne 3");
}

/// Auto-advance must not open the next row on a start held by a later row
#[test]
fn test_show_next_whenNextStartHeldElsewhere_shouldLeaveRowsUntouched() {
    let (mut controller, mut rows, mut surface) = setup(3, 4.0);
    controller.select(&rows, RowId(3));
    controller.show(&mut rows, &mut surface);
    surface.set_position(6.0);
    controller.hide(&mut rows, &mut surface);

    controller.select(&rows, RowId(1));
    surface.set_position(2.0);
    controller.show(&mut rows, &mut surface);
    surface.set_position(4.0);

    let transition = controller.show_next(&mut rows, &mut surface);
    assert!(matches!(transition, Transition::Ignored(IgnoreReason::StartTaken { .. })));
    assert_eq!(rows.row(RowId(1)).unwrap().end(), None);
    assert_eq!(rows.row(RowId(2)).unwrap().start(), None);
    assert_eq!(controller.active_row(), Some(RowId(1)));
    assert_aligned(&surface);
}
