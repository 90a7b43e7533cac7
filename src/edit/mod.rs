//! Editing engines and the operations built on them.
//!
//! Functions here work on a [`Timeline`] and one working list; they leave validation of user
//! intent to the callers in [`crate::EditSession`] and never notify the host themselves.

pub mod effects;
pub mod flags;
pub mod gap;
pub mod meta;
pub mod query;
pub mod slip;
pub mod split;
pub mod structure;
pub mod subtitles;
pub mod transform;

use crate::foundation::core::{Frame, FrameSpan};
use crate::host::{CacheKind, CacheTarget, EditHost};
use crate::strip::model::{Strip, StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// Translate a strip and its descendants, carrying their animation data along.
pub(crate) fn shift_strip(tl: &mut Timeline, host: &mut dyn EditHost, id: StripId, delta: Frame) {
    if delta == 0 {
        return;
    }
    for d in tl.subtree(id) {
        host.offset_animation(&tl[d].name, delta);
    }
    timing::translate(tl, id, delta);
}

/// Re-derive `len` from the backing media.
///
/// With `preserve_length` the display handles stay where they were and only the content
/// mapping changes. Metas and effects have no backing media and are only recalculated.
pub(crate) fn reload_strip(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    id: StripId,
    preserve_length: bool,
) {
    if !matches!(
        tl[id].kind,
        StripKind::Movie | StripKind::Image | StripKind::Sound | StripKind::Scene
    ) {
        timing::calc(tl, id);
        return;
    }
    let prev = {
        let s = &tl[id];
        (timing::final_left(s), timing::final_right(s))
    };
    if let Some(total) = host.source_length(&tl[id]) {
        let s = &mut tl[id];
        s.len = (total - s.anim_start_ofs - s.anim_end_ofs).max(0);
    }
    if preserve_length {
        let s = &mut tl[id];
        timing::set_final_left(s, prev.0);
        timing::set_final_right(s, prev.1);
        timing::handle_xlimits(s, true, true);
    }
    timing::calc(tl, id);
}

/// Deep-copy `ids` into `list`, copying animation data for every new strip.
///
/// Returns old-to-new id pairs, pre-order.
pub(crate) fn duplicate_into(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    ids: &[StripId],
) -> Vec<(StripId, StripId)> {
    let nodes = tl.clone_subtrees(ids);
    graft_with_animation(tl, host, list, nodes, true)
}

/// [`Timeline::graft`] plus an animation copy from each node's old name to its new one.
pub(crate) fn graft_with_animation(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    nodes: Vec<Strip>,
    keep_outside_inputs: bool,
) -> Vec<(StripId, StripId)> {
    let names: Vec<String> = nodes.iter().map(|n| n.name.clone()).collect();
    let pairs = tl.graft(list, nodes, keep_outside_inputs);
    for ((_, new), from) in pairs.iter().zip(&names) {
        host.duplicate_animation(from, &tl[*new].name);
    }
    pairs
}

pub(crate) fn invalidate_strip(host: &mut dyn EditHost, id: StripId, kind: CacheKind) {
    host.invalidate(CacheTarget::Strip(id), kind);
}

/// Invalidate every frame covered by `a` and `b` together.
pub(crate) fn invalidate_between(
    tl: &Timeline,
    host: &mut dyn EditHost,
    a: StripId,
    b: StripId,
    kind: CacheKind,
) {
    let span: FrameSpan = tl[a].disp_span().union(tl[b].disp_span());
    host.invalidate(CacheTarget::Range(span), kind);
}

/// Clear selection (and handle selection) on every strip of `list`, recursively.
pub(crate) fn deselect_recursive(tl: &mut Timeline, list: ListRef) {
    for id in tl.iter_recursive(list) {
        tl[id].flags.deselect();
    }
}
