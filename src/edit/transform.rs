//! Moves that reposition or exchange strips without creating or deleting any.

use crate::edit::query::{Side, SelectFilter, find_nearest_in_direction};
use crate::edit::{invalidate_strip, shift_strip};
use crate::foundation::core::Frame;
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, EditHost};
use crate::strip::model::StripId;
use crate::strip::overlap::{shuffle, shuffle_overlapping, test_overlap};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// Snap the selection of `list` to `frame`.
///
/// Strips without a selected handle move so their content start lands on `frame`; a selected
/// handle is set to `frame` instead. Locked top-level strips stay put. Returns the strips that
/// were snapped.
#[tracing::instrument(skip(tl, host))]
pub fn snap(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    frame: Frame,
) -> Vec<StripId> {
    let movable = |tl: &Timeline, id: StripId| {
        let s = &tl[id];
        s.flags.selected && !(s.depth == 0 && s.flags.locked)
    };

    let mut snapped = Vec::new();
    for id in tl.list(list).to_vec() {
        if !movable(tl, id) || !timing::tx_test(&tl[id]) {
            continue;
        }
        let f = tl[id].flags;
        if !f.left_handle && !f.right_handle {
            let s = &tl[id];
            let delta = (frame - s.start_ofs + s.start_still) - s.start;
            shift_strip(tl, host, id, delta);
        } else {
            let s = &mut tl[id];
            if f.left_handle {
                timing::set_final_left(s, frame);
            } else {
                timing::set_final_right(s, frame);
            }
            timing::handle_xlimits(s, f.left_handle, f.right_handle);
            timing::single_fix(s);
        }
        timing::calc(tl, id);
        snapped.push(id);
    }

    let moved: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| movable(tl, id))
        .collect();
    shuffle_overlapping(tl, list, &moved);

    for id in tl.list(list).to_vec() {
        let s = &tl[id];
        if s.is_effect() && s.input_ids().any(|i| tl.get(i).is_some_and(|i| i.flags.selected)) {
            let delta = frame - s.start_disp;
            host.offset_animation(&s.name, delta);
            invalidate_strip(host, id, CacheKind::All);
        }
    }
    timing::recalc_effects(tl, list);
    tl.sort(list);
    snapped
}

/// Swap `left` and `right` in time, keeping the gap between them.
fn swap_pair(tl: &mut Timeline, host: &mut dyn EditHost, left: StripId, right: StripId) {
    let gap = tl[right].start_disp - tl[left].end_disp;

    let delta = tl[left].start_disp - tl[right].start_disp;
    shift_strip(tl, host, right, delta);
    timing::calc(tl, right);

    let delta = tl[right].end_disp + gap - tl[left].start_disp;
    shift_strip(tl, host, left, delta);
    timing::calc(tl, left);
}

/// Swap the active strip with its nearest neighbour on `side`.
///
/// Returns the neighbour it was swapped with.
#[tracing::instrument(skip(tl, host))]
pub fn swap(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    side: Side,
) -> StriplineResult<StripId> {
    let active = tl
        .active()
        .filter(|&id| tl.parent_list(id) == list)
        .ok_or_else(|| StriplineError::precondition("no active strip"))?;
    let other = find_nearest_in_direction(tl, list, active, side, SelectFilter::Any)
        .ok_or_else(|| StriplineError::precondition("no strip to swap with"))?;
    for id in [active, other] {
        let s = &tl[id];
        if s.kind.input_count() >= 1 && s.has_inputs() {
            return Err(StriplineError::precondition(format!(
                "effect strip '{}' cannot be swapped",
                s.name
            )));
        }
    }

    match side {
        Side::Left => swap_pair(tl, host, other, active),
        Side::Right => swap_pair(tl, host, active, other),
    }

    let dependents: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| {
            let s = &tl[id];
            s.is_effect() && s.input_ids().any(|i| i == active || i == other)
        })
        .collect();
    timing::recalc_effects(tl, list);
    for id in dependents {
        if test_overlap(tl, list, id) {
            shuffle(tl, list, id);
        }
    }
    invalidate_strip(host, active, CacheKind::All);
    invalidate_strip(host, other, CacheKind::All);
    tl.sort(list);
    Ok(other)
}

/// Exchange the content of the active strip with the one other selected strip of `list`.
///
/// Names, channels and timing stay where they were. Returns the other strip.
#[tracing::instrument(skip(tl, host))]
pub fn swap_data(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
) -> StriplineResult<StripId> {
    let active = tl.active().filter(|&id| tl.parent_list(id) == list);
    let others: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| Some(id) != active && tl[id].flags.selected)
        .collect();
    let (a, b) = match (active, others.as_slice()) {
        (Some(a), &[b]) => (a, b),
        _ => return Err(StriplineError::selection("Please select two strips")),
    };

    let (sa, sb) = (&tl[a], &tl[b]);
    if sa.len != sb.len {
        return Err(StriplineError::precondition("Strips must be the same length"));
    }
    if sa.kind != sb.kind {
        if sa.kind.is_sound() || sb.kind.is_sound() || sa.is_effect() != sb.is_effect() {
            return Err(StriplineError::precondition("Strips were not compatible"));
        }
        if sa.kind.input_count() != sb.kind.input_count() {
            return Err(StriplineError::precondition(
                "Strips must have the same number of inputs",
            ));
        }
    }
    if sa.input_ids().any(|i| i == b) || sb.input_ids().any(|i| i == a) {
        return Err(StriplineError::precondition("Strips were not compatible"));
    }

    let mut left = tl[a].clone();
    let mut right = tl[b].clone();
    std::mem::swap(&mut left.kind, &mut right.kind);
    std::mem::swap(&mut left.content, &mut right.content);
    std::mem::swap(&mut left.inputs, &mut right.inputs);
    std::mem::swap(&mut left.children, &mut right.children);
    tl[a] = left;
    tl[b] = right;
    tl.adopt_children(a);
    tl.adopt_children(b);

    timing::calc(tl, a);
    timing::calc(tl, b);
    invalidate_strip(host, a, CacheKind::Raw);
    invalidate_strip(host, b, CacheKind::Raw);
    Ok(b)
}

/// Zero offsets and stills on selected non-effect strips of `list`.
pub fn offset_clear(tl: &mut Timeline, list: ListRef) -> Vec<StripId> {
    let cleared: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| !tl[id].is_effect() && tl[id].flags.selected)
        .collect();
    for &id in &cleared {
        let s = &mut tl[id];
        s.start_ofs = 0;
        s.end_ofs = 0;
        s.start_still = 0;
        s.end_still = 0;
    }
    timing::calc_list(tl, list);
    shuffle_overlapping(tl, list, &cleared);
    cleared
}

#[cfg(test)]
#[path = "../../tests/unit/edit/transform.rs"]
mod tests;
