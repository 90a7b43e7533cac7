use super::*;
use crate::host::NullHost;
use crate::strip::model::Strip;

struct Rig {
    tl: Timeline,
    a: StripId,
    b: StripId,
    c: StripId,
    fx: StripId,
}

fn rig() -> Rig {
    let mut tl = Timeline::new();
    let a = tl.insert(ListRef::Root, Strip::movie("a", 1, 0, 20));
    let b = tl.insert(ListRef::Root, Strip::movie("b", 2, 5, 20));
    let c = tl.insert(ListRef::Root, Strip::movie("c", 3, 10, 20));
    let fx = tl.insert(
        ListRef::Root,
        Strip::effect("cross", EffectKind::Cross, 4, &[a, b]),
    );
    timing::recalc_all(&mut tl);
    tl.set_active(Some(fx));
    Rig { tl, a, b, c, fx }
}

#[test]
fn selection_pick_follows_list_order() {
    let Rig { mut tl, a, b, .. } = rig();
    tl[a].flags.selected = true;
    tl[b].flags.selected = true;
    tl.set_active(None);

    let picked = effect_inputs_from_selection(&tl, ListRef::Root, None, EffectKind::Cross).unwrap();
    assert_eq!(picked, [Some(b), Some(a), None]);
    let picked = effect_inputs_from_selection(&tl, ListRef::Root, None, EffectKind::Glow).unwrap();
    assert_eq!(picked, [Some(b), None, None]);
    let picked = effect_inputs_from_selection(&tl, ListRef::Root, None, EffectKind::Color).unwrap();
    assert_eq!(picked, [None; 3]);
}

#[test]
fn selection_pick_takes_the_active_strip_second() {
    let Rig { mut tl, a, b, .. } = rig();
    tl[a].flags.selected = true;
    tl[b].flags.selected = true;
    tl.set_active(Some(b));
    let picked = effect_inputs_from_selection(&tl, ListRef::Root, None, EffectKind::Cross).unwrap();
    assert_eq!(picked, [Some(a), Some(b), None]);
}

#[test]
fn selection_pick_errors() {
    let Rig { mut tl, a, b, c, fx } = rig();
    let err = effect_inputs_from_selection(&tl, ListRef::Root, Some(fx), EffectKind::Glow)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "selection error: At least one selected sequence strip is needed"
    );

    tl[a].flags.selected = true;
    let err = effect_inputs_from_selection(&tl, ListRef::Root, Some(fx), EffectKind::Cross)
        .unwrap_err();
    assert_eq!(err.to_string(), "selection error: 2 selected sequence strips are needed");

    for id in [b, c] {
        tl[id].flags.selected = true;
    }
    let d = tl.insert(ListRef::Root, Strip::movie("d", 5, 0, 10).with_selected(true));
    let err = effect_inputs_from_selection(&tl, ListRef::Root, Some(fx), EffectKind::Cross)
        .unwrap_err();
    assert!(err.to_string().contains("more than 3"));

    tl[d].flags.selected = false;
    tl.insert(ListRef::Root, Strip::sound("s", 6, 0, 10).with_selected(true));
    let err = effect_inputs_from_selection(&tl, ListRef::Root, Some(fx), EffectKind::Cross)
        .unwrap_err();
    assert!(err.to_string().contains("audio"));
}

#[test]
fn reassign_inputs_rewires_and_retimes() {
    let Rig { mut tl, b, c, fx, .. } = rig();
    tl[b].flags.selected = true;
    tl[c].flags.selected = true;

    reassign_inputs(&mut tl, &mut NullHost, ListRef::Root).unwrap();
    assert_eq!(tl[fx].inputs, [Some(c), Some(b), None]);
    assert_eq!((tl[fx].start_disp, tl[fx].end_disp), (10, 25));
}

#[test]
fn reassign_inputs_refuses_cycles_without_mutation() {
    let Rig { mut tl, a, fx, .. } = rig();
    let glow = tl.insert(ListRef::Root, Strip::effect("glow", EffectKind::Glow, 5, &[fx]));
    timing::recalc_all(&mut tl);
    tl[a].flags.selected = true;
    tl[glow].flags.selected = true;
    let before = tl.clone();

    let err = reassign_inputs(&mut tl, &mut NullHost, ListRef::Root).unwrap_err();
    assert!(err.to_string().contains("recursion detected"));
    assert_eq!(tl, before);
}

#[test]
fn reassign_inputs_needs_an_effect_with_inputs() {
    let Rig { mut tl, a, .. } = rig();
    tl.set_active(Some(a));
    assert!(reassign_inputs(&mut tl, &mut NullHost, ListRef::Root).is_err());

    let color = tl.insert(ListRef::Root, Strip::effect("color", EffectKind::Color, 6, &[]));
    tl.set_active(Some(color));
    let err = reassign_inputs(&mut tl, &mut NullHost, ListRef::Root).unwrap_err();
    assert!(err.to_string().contains("strip has no inputs"));
}

#[test]
fn swap_inputs_and_pairs() {
    let Rig { mut tl, a, b, fx, .. } = rig();
    swap_inputs(&mut tl, &mut NullHost, ListRef::Root).unwrap();
    assert_eq!(tl[fx].inputs, [Some(b), Some(a), None]);

    change_effect_input(&mut tl, &mut NullHost, ListRef::Root, InputPair::AB).unwrap();
    assert_eq!(tl[fx].inputs, [Some(a), Some(b), None]);

    let err = change_effect_input(&mut tl, &mut NullHost, ListRef::Root, InputPair::BC)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "precondition failed: One of the effect inputs is unset, cannot swap"
    );

    tl[fx].inputs[1] = None;
    let err = swap_inputs(&mut tl, &mut NullHost, ListRef::Root).unwrap_err();
    assert_eq!(err.to_string(), "precondition failed: No valid inputs to swap");
}

#[test]
fn change_effect_kind_only_narrows_inputs() {
    let Rig { mut tl, a, fx, .. } = rig();
    change_effect_kind(&mut tl, &mut NullHost, ListRef::Root, EffectKind::Wipe).unwrap();
    assert_eq!(tl[fx].kind, StripKind::Effect(EffectKind::Wipe));

    change_effect_kind(&mut tl, &mut NullHost, ListRef::Root, EffectKind::Glow).unwrap();
    assert_eq!(tl[fx].inputs, [Some(a), None, None]);
    assert_eq!((tl[fx].start_disp, tl[fx].end_disp), (0, 20));

    let err =
        change_effect_kind(&mut tl, &mut NullHost, ListRef::Root, EffectKind::Cross).unwrap_err();
    assert_eq!(err.to_string(), "precondition failed: New effect needs more input strips");
}
