//! Operations that create or destroy strips: duplicate, delete, image separation, the
//! clipboard, and media reloads.

use crate::edit::query::isolated_selection;
use crate::edit::{
    deselect_recursive, duplicate_into, graft_with_animation, invalidate_strip, reload_strip,
    shift_strip,
};
use crate::foundation::core::Frame;
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, CacheTarget, EditHost};
use crate::strip::model::{Strip, StripContent, StripId, StripKind};
use crate::strip::overlap::{shuffle, shuffle_overlapping, test_overlap};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;
use std::collections::{HashMap, HashSet};

fn selected_in(tl: &Timeline, list: ListRef) -> Vec<StripId> {
    tl.list(list)
        .iter()
        .copied()
        .filter(|&id| tl[id].flags.selected)
        .collect()
}

/// Recalculate `list` and every meta enclosing it.
fn recalc_upwards(tl: &mut Timeline, list: ListRef) {
    timing::calc_list(tl, list);
    let mut up = list;
    while let ListRef::Meta(m) = up {
        if !tl.contains(m) {
            break;
        }
        timing::calc(tl, m);
        up = tl.parent_list(m);
    }
}

/// Deep-copy the selected strips of `list`, meta children included.
///
/// Originals lose their selection, copies keep it with handles and locks cleared, and the
/// active strip moves to its copy. Effect inputs pointing inside the copied set follow the
/// copies. Returns the top-level copies.
#[tracing::instrument(skip(tl, host))]
pub fn duplicate(tl: &mut Timeline, host: &mut dyn EditHost, list: ListRef) -> Vec<StripId> {
    let originals = selected_in(tl, list);
    if originals.is_empty() {
        return Vec::new();
    }
    let pairs = duplicate_into(tl, host, list, &originals);
    let map: HashMap<StripId, StripId> = pairs.iter().copied().collect();

    let active = tl.active();
    let mut copies = Vec::with_capacity(originals.len());
    for &old in &originals {
        let new = map[&old];
        tl[old].flags.deselect();
        let f = &mut tl[new].flags;
        f.selected = true;
        f.left_handle = false;
        f.right_handle = false;
        f.locked = false;
        if active == Some(old) {
            tl.set_active(Some(new));
        }
        copies.push(new);
    }

    timing::recalc_effects(tl, list);
    shuffle_overlapping(tl, list, &copies);
    tl.sort(list);
    tracing::debug!(count = copies.len(), "duplicated strips");
    copies
}

/// Delete the selected strips of `list` (at any depth) and every effect that depends on them.
///
/// Returns every freed id.
#[tracing::instrument(skip(tl, host))]
pub fn delete(tl: &mut Timeline, host: &mut dyn EditHost, list: ListRef) -> Vec<StripId> {
    let scope = tl.iter_recursive(list);
    let in_scope: HashSet<StripId> = scope.iter().copied().collect();
    let mut doomed: Vec<StripId> = scope
        .iter()
        .copied()
        .filter(|&id| tl[id].flags.selected)
        .collect();

    let mut i = 0;
    while i < doomed.len() {
        for fx in tl.effects_using(doomed[i]) {
            if in_scope.contains(&fx) && !doomed.contains(&fx) {
                doomed.push(fx);
            }
        }
        i += 1;
    }

    let mut freed = Vec::new();
    for id in doomed {
        if !tl.contains(id) {
            continue;
        }
        host.invalidate(CacheTarget::Range(tl[id].disp_span()), CacheKind::Composite);
        freed.extend(tl.remove_recursive(id));
    }
    if !freed.is_empty() {
        recalc_upwards(tl, list);
    }
    freed
}

/// Element shown by an image strip at timeline frame `frame`.
///
/// Frames in the still regions repeat the first or last element.
fn element_at(s: &Strip, frame: Frame) -> Option<&String> {
    if s.len <= 0 {
        return None;
    }
    let index = (frame - s.start).clamp(0, s.len - 1) + s.anim_start_ofs;
    usize::try_from(index).ok().and_then(|i| s.content.elements.get(i))
}

/// Break every selected multi-frame image strip of `list` into single-frame strips.
///
/// Piece `i` starts at the original left handle plus `i * length` and holds its frame for
/// `length` frames. Returns the created strips.
#[tracing::instrument(skip(tl, host))]
pub fn images_separate(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    length: Frame,
) -> Vec<StripId> {
    let step = length.max(1);
    let mut created = Vec::new();
    for id in tl.list(list).to_vec() {
        let s = &tl[id];
        if !(s.flags.selected && s.kind == StripKind::Image && s.len > 1) {
            continue;
        }
        let source = s.clone();
        invalidate_strip(host, id, CacheKind::All);
        tl.remove_recursive(id);

        let mut frame = timing::final_left(&source);
        let end = timing::final_right(&source);
        let mut start = frame;
        while frame < end {
            let mut piece = source.clone();
            piece.content.elements = element_at(&source, frame).cloned().into_iter().collect();
            piece.start = start;
            piece.len = 1;
            piece.start_ofs = 0;
            piece.end_ofs = 0;
            piece.start_still = 0;
            piece.end_still = step - 1;
            piece.anim_start_ofs = 0;
            piece.anim_end_ofs = 0;
            piece.flags.overlap = false;
            let new = tl.insert(list, piece);
            timing::calc(tl, new);
            if step > 1 && test_overlap(tl, list, new) {
                shuffle(tl, list, new);
            }
            created.push(new);
            frame += 1;
            start += step;
        }
    }
    if !created.is_empty() {
        timing::recalc_effects(tl, list);
        tl.sort(list);
    }
    created
}

/// Copied strips waiting to be pasted, with the frame they were copied at.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clipboard {
    nodes: Vec<Strip>,
    roots: Vec<StripId>,
    frame: Frame,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of top-level strips held.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Current frame at copy time.
    pub fn frame(&self) -> Frame {
        self.frame
    }
}

/// Copy the selected strips of `list`.
///
/// The selection must be closed under effect relations.
pub fn copy(tl: &Timeline, list: ListRef) -> StriplineResult<Clipboard> {
    if !isolated_selection(tl, list) {
        return Err(StriplineError::selection("Please select all related strips"));
    }
    let roots = selected_in(tl, list);
    Ok(Clipboard {
        nodes: tl.clone_subtrees(&roots),
        roots,
        frame: tl.current_frame,
    })
}

/// Paste `clip` into `list`, offset by how far the current frame moved since the copy.
///
/// Everything else is deselected first; the pasted strips end up selected and shuffled clear
/// of overlaps. Returns the top-level pasted strips.
#[tracing::instrument(skip(tl, host, clip))]
pub fn paste(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    clip: &Clipboard,
) -> Vec<StripId> {
    deselect_recursive(tl, ListRef::Root);
    let pairs = graft_with_animation(tl, host, list, clip.nodes.clone(), false);
    let map: HashMap<StripId, StripId> = pairs.into_iter().collect();
    let offset = tl.current_frame - clip.frame;

    let pasted: Vec<StripId> = clip.roots.iter().filter_map(|r| map.get(r).copied()).collect();
    for &id in &pasted {
        tl[id].flags.selected = true;
        shift_strip(tl, host, id, offset);
        timing::calc(tl, id);
    }
    timing::recalc_effects(tl, list);
    shuffle_overlapping(tl, list, &pasted);
    tl.sort(list);
    pasted
}

/// Re-read the media behind every selected strip of `list`, recursively.
///
/// With `adjust_length` the strip takes the new source length and is shuffled if it now
/// overlaps; otherwise its display range is kept. Returns the reloaded strips.
#[tracing::instrument(skip(tl, host))]
pub fn reload(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    adjust_length: bool,
) -> Vec<StripId> {
    let targets: Vec<StripId> = tl
        .iter_recursive(list)
        .into_iter()
        .filter(|&id| tl[id].flags.selected)
        .collect();
    for &id in &targets {
        reload_strip(tl, host, id, !adjust_length);
        invalidate_strip(host, id, CacheKind::Raw);
        if adjust_length {
            let parent = tl.parent_list(id);
            if test_overlap(tl, parent, id) {
                shuffle(tl, parent, id);
            }
        }
    }
    if !targets.is_empty() {
        recalc_upwards(tl, list);
    }
    targets
}

/// Drop every cached image so all strips are decoded and composited afresh.
pub fn refresh_all(host: &mut dyn EditHost) {
    host.invalidate(CacheTarget::Everything, CacheKind::All);
}

/// Point the active strip of `list` at new media and reload it, keeping its display range.
///
/// Proxy settings carry over from the old content.
#[tracing::instrument(skip(tl, host, content))]
pub fn change_path(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    mut content: StripContent,
) -> StriplineResult<StripId> {
    let id = tl
        .active()
        .filter(|&id| tl.parent_list(id) == list)
        .ok_or_else(|| StriplineError::precondition("no active strip"))?;
    let s = &mut tl[id];
    if !matches!(s.kind, StripKind::Movie | StripKind::Image | StripKind::Sound) {
        return Err(StriplineError::precondition(format!(
            "strip '{}' has no media path",
            s.name
        )));
    }
    if s.kind == StripKind::Image && content.elements.is_empty() {
        return Err(StriplineError::precondition("no image files given"));
    }
    content.proxy = std::mem::take(&mut s.content.proxy);
    s.content = content;
    if s.kind == StripKind::Image {
        s.anim_start_ofs = 0;
        s.anim_end_ofs = 0;
    }
    reload_strip(tl, host, id, true);
    invalidate_strip(host, id, CacheKind::All);
    timing::recalc_effects(tl, list);
    Ok(id)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/structure.rs"]
mod tests;
