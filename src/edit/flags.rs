//! Selection, mute/lock, range and proxy-setting toggles.

use crate::edit::invalidate_strip;
use crate::foundation::core::{Frame, FrameSpan};
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, EditHost};
use crate::strip::model::{StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};

/// Mute or unmute strips of `list`; `unselected` targets the unselected ones instead.
///
/// Locked strips are left alone. Returns the strips that changed.
pub fn set_mute(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    muted: bool,
    unselected: bool,
) -> Vec<StripId> {
    let mut changed = Vec::new();
    for id in tl.list(list).to_vec() {
        let s = &mut tl[id];
        if s.flags.locked || s.flags.selected == unselected || s.flags.muted == muted {
            continue;
        }
        s.flags.muted = muted;
        invalidate_strip(host, id, CacheKind::Composite);
        changed.push(id);
    }
    changed
}

/// Lock or unlock the selected strips of `list`.
pub fn set_lock(tl: &mut Timeline, list: ListRef, locked: bool) -> Vec<StripId> {
    let mut changed = Vec::new();
    for id in tl.list(list).to_vec() {
        let s = &mut tl[id];
        if s.flags.selected && s.flags.locked != locked {
            s.flags.locked = locked;
            changed.push(id);
        }
    }
    changed
}

/// Clear selection on every strip of the timeline.
pub fn deselect_all(tl: &mut Timeline) {
    crate::edit::deselect_recursive(tl, ListRef::Root);
}

/// Propagate the selection state of `meta` to its descendants.
///
/// A meta with a selected handle deselects its children; otherwise children copy its selection.
pub fn select_recursive(tl: &mut Timeline, meta: StripId) {
    let f = tl[meta].flags;
    for c in tl[meta].children.clone() {
        let child = &mut tl[c].flags;
        if f.left_handle || f.right_handle || !f.selected {
            child.deselect();
        } else {
            child.selected = true;
        }
        if tl[c].is_meta() {
            select_recursive(tl, c);
        }
    }
}

/// Set the preview range (or, without `preview`, the scene range) to cover the selection.
///
/// Returns `false` when the preview range already matches.
pub fn set_preview_range_to_strips(
    tl: &mut Timeline,
    list: ListRef,
    preview: bool,
) -> StriplineResult<bool> {
    let mut range: Option<(Frame, Frame)> = None;
    for id in tl.iter_recursive(list) {
        let s = &tl[id];
        if s.flags.selected {
            let (lo, hi) = range.unwrap_or((Frame::MAX, Frame::MIN));
            range = Some((lo.min(s.start_disp), hi.max(s.end_disp - 1)));
        }
    }
    let Some((start, last)) = range else {
        return Err(StriplineError::selection("Select one or more strips"));
    };
    if last < 0 {
        return Err(StriplineError::precondition("Can't set a negative range"));
    }
    if preview {
        let span = FrameSpan::new(start, last + 1)?;
        if tl.preview_range == Some(span) {
            return Ok(false);
        }
        tl.preview_range = Some(span);
    } else {
        tl.preview_range = None;
        tl.frame_start = start;
        tl.frame_end = last;
    }
    Ok(true)
}

/// Enable proxies at `sizes` (percent) on selected movie and image strips; empty disables.
pub fn set_proxies(
    tl: &mut Timeline,
    list: ListRef,
    sizes: &[u32],
    overwrite: bool,
) -> Vec<StripId> {
    let mut changed = Vec::new();
    for id in tl.iter_recursive(list) {
        let s = &mut tl[id];
        if !s.flags.selected || !matches!(s.kind, StripKind::Movie | StripKind::Image) {
            continue;
        }
        let proxy = &mut s.content.proxy;
        proxy.enabled = !sizes.is_empty();
        proxy.sizes = sizes.to_vec();
        proxy.overwrite = overwrite;
        changed.push(id);
    }
    changed
}

#[cfg(test)]
#[path = "../../tests/unit/edit/flags.rs"]
mod tests;
