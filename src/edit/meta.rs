//! Meta strips: entering and leaving them, grouping a selection, and ungrouping.

use crate::edit::flags::select_recursive;
use crate::edit::invalidate_strip;
use crate::edit::query::isolated_selection;
use crate::foundation::core::FrameSpan;
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, EditHost};
use crate::strip::model::{Strip, StripId};
use crate::strip::overlap::{shuffle, shuffle_overlapping, test_overlap};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// One entered meta strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetaFrame {
    pub parent: StripId,
    /// Working list before the meta was entered.
    pub outer_list: ListRef,
    /// Display range of the meta when it was entered. An empty range marks data saved before
    /// ranges were recorded.
    pub disp_range: FrameSpan,
}

/// Metas entered so far, innermost last.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetaStack {
    frames: Vec<MetaFrame>,
}

impl MetaStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list edits currently operate on.
    pub fn current_list(&self) -> ListRef {
        self.frames
            .last()
            .map(|f| ListRef::Meta(f.parent))
            .unwrap_or(ListRef::Root)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[MetaFrame] {
        &self.frames
    }

    /// Drop frames whose meta no longer exists, innermost first.
    pub fn prune(&mut self, tl: &Timeline) {
        while self.frames.last().is_some_and(|f| !tl.contains(f.parent)) {
            self.frames.pop();
        }
    }
}

/// Enter the active meta. It must be selected and live in the current list.
#[tracing::instrument(skip(tl, stack))]
pub fn meta_enter(tl: &mut Timeline, stack: &mut MetaStack) -> StriplineResult<StripId> {
    let list = stack.current_list();
    let meta = tl
        .active()
        .filter(|&id| tl[id].is_meta() && tl[id].flags.selected)
        .filter(|&id| tl.parent_list(id) == list)
        .ok_or_else(|| StriplineError::precondition("active strip is not a selected meta strip"))?;
    let s = &tl[meta];
    stack.frames.push(MetaFrame {
        parent: meta,
        outer_list: list,
        disp_range: s.disp_span(),
    });
    tl.set_active(None);
    tracing::debug!(depth = stack.depth(), "entered meta");
    Ok(meta)
}

/// Leave the innermost meta, keeping its display range as it was on entry.
#[tracing::instrument(skip(tl, stack))]
pub fn meta_exit(tl: &mut Timeline, stack: &mut MetaStack) -> StriplineResult<StripId> {
    let frame = stack
        .frames
        .pop()
        .ok_or_else(|| StriplineError::precondition("not inside a meta strip"))?;
    let meta = frame.parent;
    if !tl.contains(meta) {
        return Err(StriplineError::integrity(format!(
            "entered meta {meta} no longer exists"
        )));
    }

    timing::calc_list(tl, frame.outer_list);
    if !frame.disp_range.is_empty() {
        let s = &mut tl[meta];
        timing::set_final_left(s, frame.disp_range.start);
        timing::set_final_right(s, frame.disp_range.end);
        timing::single_fix(s);
        timing::calc(tl, meta);
        timing::recalc_effects(tl, frame.outer_list);
    }

    tl.set_active(Some(meta));
    tl[meta].flags.selected = true;
    select_recursive(tl, meta);
    tracing::debug!(depth = stack.depth(), "left meta");
    Ok(meta)
}

/// Enter the active meta if possible, otherwise leave the current one.
pub fn meta_toggle(tl: &mut Timeline, stack: &mut MetaStack) -> StriplineResult<StripId> {
    let enterable = tl
        .active()
        .is_some_and(|id| tl[id].is_meta() && tl[id].flags.selected);
    if enterable {
        meta_enter(tl, stack)
    } else {
        meta_exit(tl, stack)
    }
}

/// Group the selected strips of `list` into a new meta strip.
///
/// The meta takes the active strip's channel, or the highest selected channel.
#[tracing::instrument(skip(tl, host))]
pub fn meta_make(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
) -> StriplineResult<StripId> {
    if !isolated_selection(tl, list) {
        return Err(StriplineError::selection("Please select all related strips"));
    }
    let active = tl.active();
    let selected: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| tl[id].flags.selected)
        .collect();
    let channel_max = selected.iter().map(|&id| tl[id].channel).max().unwrap_or(1);
    let channel = active.map(|a| tl[a].channel).unwrap_or(channel_max);

    let meta = tl.insert(list, Strip::meta("MetaStrip", channel).with_selected(true));
    for &id in &selected {
        invalidate_strip(host, id, CacheKind::Composite);
        tl.move_to_list(id, ListRef::Meta(meta));
    }
    timing::calc(tl, meta);
    tl.set_active(Some(meta));
    if test_overlap(tl, list, meta) {
        shuffle(tl, list, meta);
    }
    invalidate_strip(host, meta, CacheKind::Composite);
    tracing::debug!(children = selected.len(), "made meta strip");
    Ok(meta)
}

/// Dissolve the active meta of `list` into it.
///
/// Effects depending on the meta go with it. Returns the freed ids.
#[tracing::instrument(skip(tl, host))]
pub fn meta_separate(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
) -> StriplineResult<Vec<StripId>> {
    let meta = tl
        .active()
        .filter(|&id| tl[id].is_meta() && tl.parent_list(id) == list)
        .ok_or_else(|| StriplineError::precondition("active strip is not a meta strip"))?;

    let children = tl[meta].children.clone();
    for &c in &children {
        invalidate_strip(host, c, CacheKind::Composite);
        tl.move_to_list(c, list);
    }

    let dependents: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| tl[id].is_effect() && id != meta && tl.input_reaches(id, meta))
        .collect();
    let mut freed = tl.remove_recursive(meta);
    for id in dependents {
        freed.extend(tl.remove_recursive(id));
    }

    let selected: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| tl[id].flags.selected)
        .collect();
    shuffle_overlapping(tl, list, &selected);
    tl.sort(list);
    Ok(freed)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/meta.rs"]
mod tests;
