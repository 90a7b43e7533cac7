use super::*;
use crate::host::{NullHost, RecordingHost};
use crate::strip::model::Strip;

/// Movie of `len` content frames at 0, trimmed to show `[from, to)`, selected.
fn trimmed(len: Frame, from: Frame, to: Frame) -> (Timeline, StripId) {
    let mut tl = Timeline::new();
    let id = tl.insert(ListRef::Root, Strip::movie("A", 1, 0, len).with_selected(true));
    tl[id].start_ofs = from;
    tl[id].end_ofs = len - to;
    timing::recalc_all(&mut tl);
    (tl, id)
}

fn view() -> TimelineView {
    TimelineView::new(1.0)
}

#[test]
fn slip_keeps_display_range_and_moves_offsets() {
    let (mut tl, a) = trimmed(20, 5, 15);
    let applied = slip_exec(&mut tl, &mut NullHost, ListRef::Root, 3).unwrap();
    assert_eq!(applied, 3);
    let s = &tl[a];
    assert_eq!((s.start_disp, s.end_disp), (5, 15));
    assert_eq!((s.start, s.start_ofs, s.end_ofs), (3, 2, 8));
    assert_eq!((s.start_still, s.end_still), (0, 0));
}

#[test]
fn slip_is_clamped_to_keep_one_content_frame_visible() {
    let (tl0, _) = trimmed(20, 5, 15);
    for requested in [-100, -15, -14, 0, 14, 15, 100] {
        let mut tl = tl0.clone();
        let applied = slip_exec(&mut tl, &mut NullHost, ListRef::Root, requested).unwrap();
        assert!((-14..=14).contains(&applied), "{requested} -> {applied}");
        for s in tl.strips() {
            assert_eq!((s.start_disp, s.end_disp), (5, 15));
            let content = (s.start, s.start + s.len);
            assert!(content.0 < s.end_disp && content.1 > s.start_disp);
        }
    }
}

#[test]
fn slip_past_content_turns_trims_into_stills() {
    let (mut tl, a) = trimmed(20, 5, 15);
    assert_eq!(slip_exec(&mut tl, &mut NullHost, ListRef::Root, 100).unwrap(), 14);
    let s = &tl[a];
    assert_eq!((s.start_still, s.start_ofs, s.end_ofs), (9, 0, 19));
    assert_eq!((s.start_disp, s.end_disp), (5, 15));
}

#[test]
fn slip_moves_meta_children_with_the_content() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("M", 1).with_selected(true));
    let c = tl.insert(ListRef::Meta(m), Strip::movie("c", 1, 0, 20));
    timing::recalc_all(&mut tl);
    tl[m].start_ofs = 5;
    timing::calc(&mut tl, m);
    assert_eq!((tl[m].start_disp, tl[m].end_disp), (5, 20));

    slip_exec(&mut tl, &mut NullHost, ListRef::Root, 2).unwrap();
    assert_eq!((tl[c].start_disp, tl[c].end_disp), (2, 22));
    assert_eq!((tl[m].start_disp, tl[m].end_disp), (5, 20));
    assert_eq!((tl[m].start_ofs, tl[m].end_ofs), (3, 2));
}

#[test]
fn slip_without_selection_is_rejected() {
    let (mut tl, a) = trimmed(20, 5, 15);
    tl[a].flags.selected = false;
    let err = slip_exec(&mut tl, &mut NullHost, ListRef::Root, 3).unwrap_err();
    assert!(matches!(err, StriplineError::Precondition(_)));
}

#[test]
fn effects_are_not_slipped() {
    let (mut tl, a) = trimmed(20, 5, 15);
    tl[a].flags.selected = false;
    let fx = tl.insert(
        ListRef::Root,
        Strip::effect("fx", crate::strip::model::EffectKind::Glow, 2, &[a]).with_selected(true),
    );
    timing::recalc_all(&mut tl);
    assert!(collect(&tl, ListRef::Root).is_empty());
    assert!(tl.contains(fx));
}

#[test]
fn drag_follows_pointer_delta() {
    let (mut tl, a) = trimmed(100, 40, 60);
    let mut drag =
        SlipDrag::begin(&tl, ListRef::Root, Point::new(100.0, 0.0), view(), 0.1).unwrap();
    let status = drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 107.0 });
    assert_eq!(status, SlipStatus::Running { offset: 7 });
    assert_eq!(tl[a].start, 7);
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 95.0 });
    assert_eq!(tl[a].start, -5);
    assert_eq!((tl[a].start_disp, tl[a].end_disp), (40, 60));
}

#[test]
fn slow_mode_scales_motion_around_the_anchor() {
    let (mut tl, a) = trimmed(100, 40, 60);
    let mut drag =
        SlipDrag::begin(&tl, ListRef::Root, Point::new(100.0, 0.0), view(), 0.1).unwrap();
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 110.0 });
    drag.handle(&mut tl, &mut NullHost, SlipEvent::SlowBegin { x: 110.0 });
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 150.0 });
    assert_eq!(drag.offset(), 14);
    drag.handle(&mut tl, &mut NullHost, SlipEvent::SlowEnd);
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 150.0 });
    assert_eq!(drag.offset(), 50);
    assert_eq!(tl[a].start, 50);
}

#[test]
fn numeric_entry_overrides_pointer() {
    let (mut tl, a) = trimmed(100, 40, 60);
    let mut drag = SlipDrag::begin(&tl, ListRef::Root, Point::new(0.0, 0.0), view(), 0.1).unwrap();
    drag.handle(&mut tl, &mut NullHost, SlipEvent::Numeric(Some(-2.6)));
    assert_eq!(drag.offset(), -3);
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 20.0 });
    assert_eq!(tl[a].start, -3);
    drag.handle(&mut tl, &mut NullHost, SlipEvent::Numeric(None));
    drag.handle(&mut tl, &mut NullHost, SlipEvent::PointerMove { x: 20.0 });
    assert_eq!(tl[a].start, 20);
}

#[test]
fn drag_and_exec_agree_for_the_same_offset() {
    let (base, a) = trimmed(100, 40, 60);
    let mut by_exec = base.clone();
    slip_exec(&mut by_exec, &mut NullHost, ListRef::Root, 12).unwrap();

    let mut by_drag = base;
    let mut drag =
        SlipDrag::begin(&by_drag, ListRef::Root, Point::new(0.0, 0.0), view(), 0.1).unwrap();
    drag.handle(&mut by_drag, &mut NullHost, SlipEvent::PointerMove { x: 30.0 });
    drag.handle(&mut by_drag, &mut NullHost, SlipEvent::PointerMove { x: 12.0 });
    drag.handle(&mut by_drag, &mut NullHost, SlipEvent::Confirm);
    assert_eq!(by_drag[a].snapshot(), by_exec[a].snapshot());
}

#[test]
fn cancel_restores_every_snapshot() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("M", 1).with_selected(true));
    tl.insert(ListRef::Meta(m), Strip::movie("c", 1, 0, 20));
    tl.insert(ListRef::Meta(m), Strip::movie("d", 2, 4, 30));
    let a = tl.insert(ListRef::Root, Strip::movie("A", 3, 10, 40).with_selected(true));
    tl[a].start_ofs = 6;
    tl[a].end_still = 3;
    timing::recalc_all(&mut tl);
    let before: Vec<_> = tl.strips().map(Strip::snapshot).collect();

    let mut host = RecordingHost::new();
    let mut drag = SlipDrag::begin(&tl, ListRef::Root, Point::new(0.0, 0.0), view(), 0.1).unwrap();
    for x in [5.0, -30.0, 12.0] {
        drag.handle(&mut tl, &mut host, SlipEvent::PointerMove { x });
    }
    host.take_calls();
    assert_eq!(drag.handle(&mut tl, &mut host, SlipEvent::Cancel), SlipStatus::Cancelled);
    let after: Vec<_> = tl.strips().map(Strip::snapshot).collect();
    assert_eq!(after, before);
    assert!(host.invalidations() > 0);

    // Idempotent, and later events are ignored.
    assert_eq!(drag.handle(&mut tl, &mut host, SlipEvent::Cancel), SlipStatus::Cancelled);
    drag.handle(&mut tl, &mut host, SlipEvent::PointerMove { x: 40.0 });
    let again: Vec<_> = tl.strips().map(Strip::snapshot).collect();
    assert_eq!(again, before);
}
