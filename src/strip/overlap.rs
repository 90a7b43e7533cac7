use crate::strip::model::{Strip, StripId};
use crate::strip::timeline::{ListRef, Timeline};

/// Whether two strips share a channel and their display ranges intersect.
pub fn strips_overlap(a: &Strip, b: &Strip) -> bool {
    a.id != b.id && a.channel == b.channel && a.disp_span().overlaps(b.disp_span())
}

/// Whether `id` collides with any sibling in `list`.
pub fn test_overlap(tl: &Timeline, list: ListRef, id: StripId) -> bool {
    let s = &tl[id];
    tl.list(list)
        .iter()
        .any(|&other| strips_overlap(s, &tl[other]))
}

/// Move `id` up to the first channel, at or above its own, where it collides with nothing.
///
/// Timing is never touched. Returns whether the channel changed.
#[tracing::instrument(skip(tl))]
pub fn shuffle(tl: &mut Timeline, list: ListRef, id: StripId) -> bool {
    let orig = tl[id].channel;
    tl[id].channel = orig.max(1);
    while test_overlap(tl, list, id) {
        tl[id].channel += 1;
    }
    let moved = tl[id].channel != orig;
    if moved {
        tracing::debug!(from = orig, to = tl[id].channel, "shuffled strip");
    }
    moved
}

/// Shuffle each of `ids` that currently overlaps a sibling and clear its overlap flag.
pub fn shuffle_overlapping(tl: &mut Timeline, list: ListRef, ids: &[StripId]) {
    for &id in ids {
        if !tl.contains(id) {
            continue;
        }
        if test_overlap(tl, list, id) {
            shuffle(tl, list, id);
        }
        tl[id].flags.overlap = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strip/overlap.rs"]
mod tests;
