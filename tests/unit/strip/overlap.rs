use super::*;

fn two_on_one_channel() -> (Timeline, StripId, StripId) {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 10));
    let b = tl.insert(ListRef::Root, Strip::movie("b", 1, 5, 10));
    (tl, a, b)
}

#[test]
fn touching_strips_do_not_overlap() {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 10));
    let _b = tl.insert(ListRef::Root, Strip::movie("b", 1, 10, 10));
    assert!(!test_overlap(&tl, ListRef::Root, a));
}

#[test]
fn shuffle_changes_channel_only() {
    let (mut tl, a, b) = two_on_one_channel();
    assert!(test_overlap(&tl, ListRef::Root, b));
    let (s0, e0) = (tl[b].start_disp, tl[b].end_disp);

    assert!(shuffle(&mut tl, ListRef::Root, b));
    assert_eq!(tl[b].channel, 2);
    assert_eq!((tl[b].start_disp, tl[b].end_disp), (s0, e0));
    assert!(!test_overlap(&tl, ListRef::Root, a));
    assert!(!test_overlap(&tl, ListRef::Root, b));
}

#[test]
fn shuffle_skips_occupied_channels() {
    let (mut tl, _a, b) = two_on_one_channel();
    tl.insert(ListRef::Root, Strip::movie("c2", 2, 0, 30));
    tl.insert(ListRef::Root, Strip::movie("c3", 3, 8, 2));
    shuffle(&mut tl, ListRef::Root, b);
    assert_eq!(tl[b].channel, 4);
}

#[test]
fn shuffle_without_conflict_is_a_noop() {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 3, 0, 10));
    assert!(!shuffle(&mut tl, ListRef::Root, a));
    assert_eq!(tl[a].channel, 3);
}

#[test]
fn shuffle_overlapping_clears_flag() {
    let (mut tl, _a, b) = two_on_one_channel();
    tl[b].flags.overlap = true;
    shuffle_overlapping(&mut tl, ListRef::Root, &[b]);
    assert!(!tl[b].flags.overlap);
    assert_eq!(tl[b].channel, 2);
}
