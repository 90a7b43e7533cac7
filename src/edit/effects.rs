//! Effect input wiring.

use crate::edit::invalidate_strip;
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, EditHost};
use crate::strip::model::{EffectKind, StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// A pair of effect input slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPair {
    #[default]
    AB,
    BC,
    AC,
}

impl InputPair {
    fn slots(self) -> (usize, usize) {
        match self {
            Self::AB => (0, 1),
            Self::BC => (1, 2),
            Self::AC => (0, 2),
        }
    }
}

/// Pick effect inputs for `kind` from the selection of `list`.
///
/// `exclude` is left out of the pick (the effect being rewired). Without it the active strip
/// is taken first. Slots beyond the input count of `kind` stay empty.
pub fn effect_inputs_from_selection(
    tl: &Timeline,
    list: ListRef,
    exclude: Option<StripId>,
    kind: EffectKind,
) -> StriplineResult<[Option<StripId>; 3]> {
    let needed = kind.input_count();
    let (mut first, mut second, mut third) = (None, None, None);
    if exclude.is_none() {
        second = tl.active().filter(|&id| tl.parent_list(id) == list);
    }

    for &id in tl.list(list) {
        let s = &tl[id];
        if !s.flags.selected {
            continue;
        }
        if s.kind.is_sound() && needed != 0 {
            return Err(StriplineError::selection(
                "Cannot apply effects to audio sequence strips",
            ));
        }
        if Some(id) == exclude || Some(id) == second {
            continue;
        }
        if second.is_none() {
            second = Some(id);
        } else if first.is_none() {
            first = Some(id);
        } else if third.is_none() {
            third = Some(id);
        } else {
            return Err(StriplineError::selection(
                "Cannot apply effect to more than 3 sequence strips",
            ));
        }
    }

    // With three strips the last one picked goes last.
    if third.is_some() && second.is_some() {
        std::mem::swap(&mut second, &mut third);
    }

    match needed {
        0 => return Ok([None; 3]),
        1 => {
            if second.is_none() {
                return Err(StriplineError::selection(
                    "At least one selected sequence strip is needed",
                ));
            }
            first = first.or(second);
        }
        _ => {
            if first.is_none() || second.is_none() {
                return Err(StriplineError::selection(
                    "2 selected sequence strips are needed",
                ));
            }
        }
    }

    let mut inputs = [first, second, third];
    for slot in inputs.iter_mut().skip(needed) {
        *slot = None;
    }
    Ok(inputs)
}

/// Active strip of `list`, required to be an effect.
fn active_effect(tl: &Timeline, list: ListRef) -> StriplineResult<(StripId, EffectKind)> {
    let id = tl
        .active()
        .filter(|&id| tl.parent_list(id) == list)
        .ok_or_else(|| StriplineError::precondition("no active strip"))?;
    match tl[id].kind {
        StripKind::Effect(kind) => Ok((id, kind)),
        _ => Err(StriplineError::precondition(format!(
            "strip '{}' is not an effect strip",
            tl[id].name
        ))),
    }
}

fn refresh(tl: &mut Timeline, host: &mut dyn EditHost, list: ListRef, id: StripId) {
    timing::calc(tl, id);
    timing::recalc_effects(tl, list);
    invalidate_strip(host, id, CacheKind::All);
}

/// Rewire the active effect of `list` to the other selected strips.
#[tracing::instrument(skip(tl, host))]
pub fn reassign_inputs(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
) -> StriplineResult<StripId> {
    let (fx, kind) = active_effect(tl, list)?;
    if kind.input_count() == 0 {
        return Err(StriplineError::precondition(
            "Cannot reassign inputs: strip has no inputs",
        ));
    }
    let inputs = effect_inputs_from_selection(tl, list, Some(fx), kind)?;
    if inputs.iter().flatten().any(|&i| tl.input_reaches(i, fx)) {
        return Err(StriplineError::integrity(
            "Cannot reassign inputs: recursion detected",
        ));
    }
    tl[fx].inputs = inputs;
    refresh(tl, host, list, fx);
    Ok(fx)
}

/// Swap the first two inputs of the active effect of `list`.
pub fn swap_inputs(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
) -> StriplineResult<StripId> {
    let (fx, _) = active_effect(tl, list)?;
    let inputs = &mut tl[fx].inputs;
    if inputs[0].is_none() || inputs[1].is_none() {
        return Err(StriplineError::precondition("No valid inputs to swap"));
    }
    inputs.swap(0, 1);
    refresh(tl, host, list, fx);
    Ok(fx)
}

/// Swap one pair of input slots of the active effect of `list`.
pub fn change_effect_input(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    pair: InputPair,
) -> StriplineResult<StripId> {
    let (fx, _) = active_effect(tl, list)?;
    let (a, b) = pair.slots();
    let inputs = &mut tl[fx].inputs;
    if inputs[a].is_none() || inputs[b].is_none() {
        return Err(StriplineError::precondition(
            "One of the effect inputs is unset, cannot swap",
        ));
    }
    inputs.swap(a, b);
    refresh(tl, host, list, fx);
    Ok(fx)
}

/// Turn the active effect of `list` into `kind`.
///
/// The new kind may not need more inputs than the old one; surplus inputs are dropped.
#[tracing::instrument(skip(tl, host))]
pub fn change_effect_kind(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    kind: EffectKind,
) -> StriplineResult<StripId> {
    let (fx, old) = active_effect(tl, list)?;
    if kind.input_count() > old.input_count() {
        return Err(StriplineError::precondition(
            "New effect needs more input strips",
        ));
    }
    let s = &mut tl[fx];
    s.kind = StripKind::Effect(kind);
    for slot in s.inputs.iter_mut().skip(kind.input_count()) {
        *slot = None;
    }
    refresh(tl, host, list, fx);
    Ok(fx)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/effects.rs"]
mod tests;
