//! Gaps: frames of the working list where nothing visible plays.

use crate::edit::query::{bounding_box, visible_count_at};
use crate::edit::{invalidate_strip, shift_strip};
use crate::foundation::core::Frame;
use crate::host::{CacheKind, EditHost};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// Whether any unmuted strip of `list` covers `frame`.
pub fn has_content_at(tl: &Timeline, list: ListRef, frame: Frame) -> bool {
    visible_count_at(tl, list, frame) > 0
}

/// Translate every strip of `list` starting at or after `frame` by `delta`.
///
/// Markers at or after `frame` move too unless markers are locked. Returns whether any strip
/// moved.
pub fn offset_after_frame(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    delta: Frame,
    frame: Frame,
) -> bool {
    let mut moved = false;
    for id in tl.list(list).to_vec() {
        if tl[id].start_disp >= frame {
            shift_strip(tl, host, id, delta);
            timing::calc(tl, id);
            invalidate_strip(host, id, CacheKind::Preprocessed);
            moved = true;
        }
    }
    if !tl.lock_markers {
        for m in tl.markers.iter_mut().filter(|m| m.frame >= frame) {
            m.frame += delta;
        }
    }
    moved
}

/// Close the gap after `frame` by rippling later strips left, one frame at a time.
///
/// Scanning starts at the last frame with content at or before `frame`. With `all`, every
/// later gap is closed too. Returns whether anything moved.
#[tracing::instrument(skip(tl, host))]
pub fn gap_remove(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    frame: Frame,
    all: bool,
) -> bool {
    let bounds = bounding_box(tl, list);
    let (first_frame, last_frame) = (bounds.x0 as Frame, bounds.x1 as Frame);

    let mut cursor = frame;
    let mut seen_content = false;
    while cursor >= first_frame {
        if has_content_at(tl, list, cursor) {
            seen_content = true;
            break;
        }
        cursor -= 1;
    }

    let mut changed = false;
    while cursor < last_frame {
        if !seen_content {
            seen_content = has_content_at(tl, list, cursor);
        } else if !has_content_at(tl, list, cursor) {
            let mut closed = true;
            while !has_content_at(tl, list, cursor) {
                let later = tl.list(list).iter().any(|&id| tl[id].start_disp >= cursor);
                if !later {
                    closed = false;
                    break;
                }
                offset_after_frame(tl, host, list, -1, cursor);
                changed = true;
            }
            if !closed || !all {
                break;
            }
        }
        cursor += 1;
    }
    if changed {
        tracing::debug!(frame = cursor, "closed gap");
    }
    timing::recalc_effects(tl, list);
    changed
}

/// Open a gap of `frames` frames at `frame`.
pub fn gap_insert(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    frame: Frame,
    frames: Frame,
) -> bool {
    let moved = offset_after_frame(tl, host, list, frames, frame);
    timing::recalc_effects(tl, list);
    moved
}

#[cfg(test)]
#[path = "../../tests/unit/edit/gap.rs"]
mod tests;
