use super::*;
use crate::host::RecordingHost;
use crate::strip::model::Strip;
use crate::strip::timing;

fn session() -> (EditSession<RecordingHost>, StripId, StripId) {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 20).with_selected(true));
    let b = tl.insert(ListRef::Root, Strip::movie("b", 2, 30, 10));
    timing::recalc_all(&mut tl);
    (EditSession::new(tl, RecordingHost::new()), a, b)
}

#[test]
fn split_reports_outcome_and_notifies_once() {
    let (mut s, a, _) = session();
    let out = s.split(SplitOpts::at(8)).unwrap();
    assert_eq!(out.created.len(), 1);
    assert_eq!(out.mutated, vec![a]);
    assert!(out.destroyed.is_empty());
    assert_eq!(s.host().notifications(), vec![ChangeScope::Structure]);

    let right = out.created[0];
    let tl = s.timeline();
    assert_eq!((tl[a].start_disp, tl[a].end_disp), (0, 8));
    assert_eq!((tl[right].start_disp, tl[right].end_disp), (8, 20));
}

#[test]
fn failed_operation_leaves_everything_untouched() {
    let (mut s, _, _) = session();
    let before = s.timeline().clone();
    let err = s.split(SplitOpts::at(25)).unwrap_err();
    assert_eq!(err.to_string(), "precondition failed: no strip crosses frame 25");
    assert_eq!(s.timeline(), &before);
    assert!(s.host().notifications().is_empty());
}

#[test]
fn split_inside_meta_still_trims_without_duplicate() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("M", 1).with_selected(true));
    tl.insert(ListRef::Meta(m), Strip::movie("a", 1, 0, 20));
    tl[m].start_still = 5;
    timing::recalc_all(&mut tl);
    let mut s = EditSession::new(tl, RecordingHost::new());

    let out = s.split(SplitOpts::at(-2)).unwrap();
    assert!(out.created.is_empty());
    assert_eq!(out.mutated, vec![m]);
    assert_eq!(s.host().notifications(), vec![ChangeScope::Structure]);

    let meta = &s.timeline()[m];
    assert_eq!(meta.start_still, 2);
    assert_eq!((meta.start_disp, meta.end_disp), (-2, 20));
}

#[test]
fn split_right_of_selection_fails_without_reordering() {
    let (mut s, a, b) = session();
    s.select(&[b], false).unwrap();
    let before = s.timeline().clone();

    let err = s.split(SplitOpts::at(10)).unwrap_err();
    assert!(err.to_string().contains("no strip crosses frame 10"));
    assert_eq!(s.timeline().list(ListRef::Root), &[a, b]);
    assert_eq!(s.timeline(), &before);
}

#[test]
fn slip_returns_the_clamped_offset() {
    let (mut s, a, _) = session();
    s.timeline_mut()[a].start_ofs = 5;
    s.timeline_mut()[a].end_ofs = 5;
    timing::recalc_all(s.timeline_mut());

    let (applied, out) = s.slip(100).unwrap();
    assert_eq!(applied, 14);
    assert_eq!(out.mutated, vec![a]);
}

#[test]
fn slip_drag_confirm_notifies_with_outcome() {
    let (mut s, a, _) = session();
    let view = TimelineView::new(1.0);
    s.slip_begin(Point::new(10.0, 0.0), view).unwrap();
    assert!(s.slip_in_progress());
    assert!(s.snap(0).is_err());

    let update = s.slip_event(SlipEvent::PointerMove { x: 13.0 }).unwrap();
    assert_eq!(update.status, SlipStatus::Running { offset: 3 });
    assert!(update.outcome.is_none());
    assert!(s.host().notifications().is_empty());

    let update = s.slip_event(SlipEvent::Confirm).unwrap();
    assert_eq!(update.status, SlipStatus::Confirmed { offset: 3 });
    assert_eq!(update.outcome.unwrap().mutated, vec![a]);
    assert_eq!(s.host().notifications(), vec![ChangeScope::Structure]);
    assert!(!s.slip_in_progress());
    assert!(s.slip_event(SlipEvent::Confirm).is_err());
}

#[test]
fn slip_drag_cancel_restores_without_notifying() {
    let (mut s, _, _) = session();
    let before = s.timeline().clone();
    s.slip_begin(Point::new(0.0, 0.0), TimelineView::new(1.0)).unwrap();
    s.slip_event(SlipEvent::PointerMove { x: -6.0 }).unwrap();
    let update = s.slip_event(SlipEvent::Cancel).unwrap();
    assert_eq!(update.status, SlipStatus::Cancelled);
    assert_eq!(s.timeline(), &before);
    assert!(s.host().notifications().is_empty());
}

#[test]
fn strip_jump_moves_the_cursor_frame_only() {
    let (mut s, _, _) = session();
    assert_eq!(s.strip_jump(true, false).unwrap(), 20);
    assert_eq!(s.strip_jump(true, false).unwrap(), 30);
    assert_eq!(s.strip_jump(false, false).unwrap(), 20);
    assert_eq!(s.strip_jump(true, true).unwrap(), 35);
    assert_eq!(s.timeline().current_frame, 35);
    assert!(s.strip_jump(true, true).is_err());
    assert_eq!(s.timeline().current_frame, 35);
    assert_eq!(s.host().notifications(), vec![ChangeScope::FrameOnly; 4]);
}

#[test]
fn meta_edits_follow_the_working_list() {
    let (mut s, a, b) = session();
    s.select(&[a, b], false).unwrap();
    s.meta_make().unwrap();
    let meta = s.timeline().active().unwrap();
    assert_eq!(s.timeline().list(ListRef::Root), &[meta]);

    s.meta_enter().unwrap();
    assert_eq!(s.working_list(), ListRef::Meta(meta));

    s.select(&[b], false).unwrap();
    s.timeline_mut().current_frame = 35;
    let out = s.split(SplitOpts::at(35)).unwrap();
    let right = out.created[0];
    assert_eq!(s.timeline().parent_list(right), ListRef::Meta(meta));

    s.meta_exit().unwrap();
    assert_eq!(s.working_list(), ListRef::Root);
    assert_eq!(s.timeline().active(), Some(meta));
    assert_eq!(
        (s.timeline()[meta].start_disp, s.timeline()[meta].end_disp),
        (0, 40)
    );
}

#[test]
fn select_rejects_strips_outside_the_working_list() {
    let (mut s, a, _) = session();
    s.select(&[a], false).unwrap();
    s.meta_make().unwrap();
    let meta = s.timeline().active().unwrap();
    let err = s.select(&[a], false).unwrap_err();
    assert!(err.to_string().contains("not in the working list"));
    assert!(s.select(&[StripId(99)], false).is_err());
    assert!(s.timeline()[meta].flags.selected);
}

#[test]
fn copy_paste_through_the_session_clipboard() {
    let (mut s, a, _) = session();
    assert!(s.paste().is_err());
    assert_eq!(s.copy().unwrap(), 1);

    s.set_current_frame(100);
    let out = s.paste().unwrap();
    assert_eq!(out.created.len(), 1);
    assert!(out.mutated.contains(&a));
    let pasted = out.created[0];
    assert_eq!(s.timeline()[pasted].start_disp, 100);
}

#[test]
fn gap_insert_uses_the_configured_default() {
    let (s, _, b) = session();
    let mut settings = EditSettings::default();
    settings.gap_insert_frames = 7;
    let mut s = s.with_settings(settings).unwrap();
    s.set_current_frame(25);
    s.gap_insert(None).unwrap();
    assert_eq!(s.timeline()[b].start_disp, 37);
    s.gap_remove(false).unwrap();
    assert_eq!(s.timeline()[b].start_disp, 20);
    assert!(s.gap_insert(Some(0)).is_err());
}

#[test]
fn invalid_settings_are_rejected() {
    let (s, _, _) = session();
    let settings = EditSettings {
        handle_min_px: 40.0,
        handle_max_px: 10.0,
        ..EditSettings::default()
    };
    let err = s.with_settings(settings).err().unwrap();
    assert!(err.to_string().contains("handle_min_px"));
}

#[test]
fn pick_maps_region_pixels_into_the_working_list() {
    let (s, a, b) = session();
    let mut view = TimelineView::new(1.0);
    view.channels_per_pixel = 0.1;
    assert_eq!(s.pick(Point::new(10.0, 15.0), &view).map(|(id, _)| id), Some(a));
    assert_eq!(s.pick(Point::new(35.0, 25.0), &view).map(|(id, _)| id), Some(b));
    assert_eq!(s.pick(Point::new(25.0, 15.0), &view), None);
}

#[test]
fn refresh_all_invalidates_then_notifies() {
    let (mut s, _, _) = session();
    s.refresh_all().unwrap();
    assert_eq!(s.host().invalidations(), 1);
    assert_eq!(s.host().notifications(), vec![ChangeScope::Structure]);
}

#[test]
fn subtitles_need_an_active_text_strip() {
    let (mut s, a, _) = session();
    let dir = std::env::temp_dir().join(format!("stripline-srt-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    s.timeline_mut().set_active(Some(a));
    let err = s.export_subtitles(dir.join("subs")).unwrap_err();
    assert!(err.to_string().contains("not a text strip"));

    let mut text = Strip::effect("caption", EffectKind::Text, 3, &[]);
    text.start = 25;
    text.len = 50;
    text.content.text = Some("Hi".into());
    let id = s.timeline_mut().insert(ListRef::Root, text);
    timing::recalc_all(s.timeline_mut());
    s.timeline_mut().set_active(Some(id));

    let (path, cues) = s.export_subtitles(dir.join("subs")).unwrap();
    assert_eq!(cues, 1);
    assert_eq!(path, dir.join("subs.srt"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "1\n00:00:01,000 --> 00:00:03,000\nHi\n\n");
}
