use super::*;
use crate::strip::model::EffectKind;

fn duration_holds(s: &Strip) -> bool {
    s.end_disp - s.start_disp == s.len - s.start_ofs - s.end_ofs + s.start_still + s.end_still
        && s.start_disp <= s.end_disp
}

#[test]
fn plain_strip_spans_its_content() {
    let mut s = Strip::movie("a", 1, 0, 10);
    calc_disp(&mut s);
    assert_eq!((s.start_disp, s.end_disp), (0, 10));
    assert!(duration_holds(&s));
}

#[test]
fn offsets_consume_and_stills_extend() {
    let mut s = Strip::movie("a", 1, 10, 20);
    s.start_ofs = 3;
    s.end_ofs = 2;
    calc_disp(&mut s);
    assert_eq!((s.start_disp, s.end_disp), (13, 28));

    let mut s = Strip::movie("b", 1, 10, 20);
    s.start_still = 4;
    s.end_still = 5;
    calc_disp(&mut s);
    assert_eq!((s.start_disp, s.end_disp), (6, 35));
    assert!(duration_holds(&s));
}

#[test]
fn offset_wins_over_still_on_the_same_side() {
    let mut s = Strip::movie("a", 1, 0, 10);
    s.start_ofs = 2;
    s.start_still = 3;
    calc_disp(&mut s);
    assert_eq!(s.start_still, 0);
    assert_eq!(s.start_disp, 2);
    assert!(duration_holds(&s));
}

#[test]
fn meta_spans_children() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("m", 1));
    tl.insert(ListRef::Meta(m), Strip::movie("a", 1, 5, 10));
    tl.insert(ListRef::Meta(m), Strip::movie("b", 2, 20, 10));
    calc(&mut tl, m);
    assert_eq!((tl[m].start_disp, tl[m].end_disp), (5, 30));
    assert_eq!(tl[m].len, 25);
    assert!(duration_holds(&tl[m]));
}

#[test]
fn meta_anim_offsets_shrink_length() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("m", 1));
    tl.insert(ListRef::Meta(m), Strip::movie("a", 1, 0, 30));
    tl[m].anim_start_ofs = 5;
    tl[m].start_ofs = 5;
    calc(&mut tl, m);
    assert_eq!(tl[m].start, 5);
    assert_eq!(tl[m].len, 25);
    assert_eq!((tl[m].start_disp, tl[m].end_disp), (10, 30));
}

#[test]
fn effect_takes_input_intersection() {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 20));
    let b = tl.insert(ListRef::Root, Strip::movie("b", 2, 10, 20));
    let e = tl.insert(ListRef::Root, Strip::effect("x", EffectKind::Cross, 3, &[a, b]));
    recalc_all(&mut tl);
    assert_eq!((tl[e].start_disp, tl[e].end_disp), (10, 20));
    assert!(!tl[e].flags.invalid_effect);
    assert!(duration_holds(&tl[e]));
}

#[test]
fn disjoint_effect_inputs_flag_invalid_and_keep_length_positive() {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 10));
    let b = tl.insert(ListRef::Root, Strip::movie("b", 2, 20, 10));
    let e = tl.insert(ListRef::Root, Strip::effect("x", EffectKind::Cross, 3, &[a, b]));
    recalc_all(&mut tl);
    assert!(tl[e].flags.invalid_effect);
    assert_eq!((tl[e].start_disp, tl[e].end_disp), (10, 20));
    assert!(tl[e].len >= 0);
}

#[test]
fn translate_moves_meta_children() {
    let mut tl = Timeline::new();
    let m = tl.insert(ListRef::Root, Strip::meta("m", 1));
    let a = tl.insert(ListRef::Meta(m), Strip::movie("a", 1, 0, 10));
    recalc_all(&mut tl);
    translate(&mut tl, m, 7);
    assert_eq!(tl[a].start_disp, 7);
    assert_eq!(tl[m].start_disp, 7);
}

#[test]
fn final_handles_roundtrip_through_setters() {
    let mut s = Strip::movie("a", 1, 10, 20);
    set_final_left(&mut s, 4);
    assert_eq!((s.start_still, s.start_ofs), (6, 0));
    set_final_left(&mut s, 15);
    assert_eq!((s.start_still, s.start_ofs), (0, 5));
    set_final_right(&mut s, 40);
    assert_eq!((s.end_still, s.end_ofs), (10, 0));
    set_final_right(&mut s, 25);
    assert_eq!((s.end_still, s.end_ofs), (0, 5));
    assert_eq!((final_left(&s), final_right(&s)), (15, 25));
}

#[test]
fn xlimits_keep_one_frame() {
    let mut s = Strip::movie("a", 1, 0, 10);
    set_final_left(&mut s, 12);
    handle_xlimits(&mut s, true, false);
    assert_eq!(final_left(&s), 9);
    calc_disp(&mut s);
    assert_eq!(s.end_disp - s.start_disp, 1);
}

#[test]
fn sounds_never_hold_stills() {
    let mut s = Strip::sound("a", 1, 10, 10);
    set_final_left(&mut s, 5);
    handle_xlimits(&mut s, true, false);
    assert_eq!(s.start_still, 0);
}

#[test]
fn single_image_keeps_content_at_left_handle() {
    let mut s = Strip::image("img", 1, 10, vec!["a.png".into()]);
    set_final_left(&mut s, 4);
    set_final_right(&mut s, 20);
    single_fix(&mut s);
    calc_disp(&mut s);
    assert_eq!(s.start, 4);
    assert_eq!((s.start_disp, s.end_disp), (4, 20));
}

#[test]
fn tx_test_rejects_effects_with_inputs() {
    let a = Strip::movie("a", 1, 0, 10);
    let color = Strip::effect("c", EffectKind::Color, 1, &[]);
    let cross = Strip::effect("x", EffectKind::Cross, 1, &[StripId(0), StripId(1)]);
    assert!(tx_test(&a));
    assert!(tx_test(&color));
    assert!(!tx_test(&cross));
}
