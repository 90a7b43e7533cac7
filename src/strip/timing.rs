//! Derived-field recalculation.
//!
//! Authoritative fields (`start`, `len`, offsets, stills) are edited freely by operations; the
//! functions here restore `start_disp`/`end_disp` afterwards. Nothing in this module fails:
//! every input that reaches it has already been validated.

use crate::foundation::core::Frame;
use crate::strip::model::{Strip, StripId, StripKind};
use crate::strip::order::effect_order;
use crate::strip::timeline::{ListRef, Timeline};

/// Recompute display bounds from the authoritative fields of `s`.
pub fn calc_disp(s: &mut Strip) {
    if s.start_ofs != 0 && s.start_still != 0 {
        s.start_still = 0;
    }
    if s.end_ofs != 0 && s.end_still != 0 {
        s.end_still = 0;
    }
    s.start_disp = s.start + s.start_ofs - s.start_still;
    s.end_disp = s.start + s.len - s.end_ofs + s.end_still;
}

/// Recalculate one strip.
///
/// Metas recalculate their whole child list first and then span it. Effects with inputs take
/// the intersection of their inputs' display ranges; the inputs must be current already.
pub fn calc(tl: &mut Timeline, id: StripId) {
    match tl[id].kind {
        StripKind::Meta => {
            calc_list(tl, ListRef::Meta(id));
            let bounds = tl
                .list(ListRef::Meta(id))
                .iter()
                .map(|&c| (tl[c].start_disp, tl[c].end_disp))
                .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)));
            let s = &mut tl[id];
            if let Some((min, max)) = bounds {
                s.start = min + s.anim_start_ofs;
                s.len = max - min - s.anim_start_ofs - s.anim_end_ofs;
            }
            calc_disp(s);
        }
        StripKind::Effect(_) if tl[id].has_inputs() => {
            let (mut lo, mut hi) = (Frame::MIN, Frame::MAX);
            for input in tl[id].input_ids().collect::<Vec<_>>() {
                if let Some(src) = tl.get(input) {
                    lo = lo.max(src.start_disp);
                    hi = hi.min(src.end_disp);
                }
            }
            let s = &mut tl[id];
            if lo == Frame::MIN || hi == Frame::MAX {
                calc_disp(s);
                return;
            }
            s.start_ofs = 0;
            s.end_ofs = 0;
            s.start_still = 0;
            s.end_still = 0;
            if hi < lo {
                std::mem::swap(&mut lo, &mut hi);
                s.flags.invalid_effect = true;
            } else {
                s.flags.invalid_effect = false;
            }
            s.start = lo;
            s.start_disp = lo;
            s.end_disp = hi;
            s.len = hi - lo;
        }
        _ => calc_disp(&mut tl[id]),
    }
}

/// Recalculate every strip of `list`: plain strips and metas first, then effects inputs-first.
pub fn calc_list(tl: &mut Timeline, list: ListRef) {
    let ids = tl.list(list).to_vec();
    for id in ids {
        if !tl[id].is_effect() {
            calc(tl, id);
        }
    }
    recalc_effects(tl, list);
}

/// Recalculate the effect strips of `list` in dependency order.
pub fn recalc_effects(tl: &mut Timeline, list: ListRef) {
    for id in effect_order(tl, list) {
        calc(tl, id);
    }
}

/// Recalculate the whole timeline.
pub fn recalc_all(tl: &mut Timeline) {
    calc_list(tl, ListRef::Root);
}

/// Move `id` (and, for metas, all descendants) by `delta` frames.
pub fn translate(tl: &mut Timeline, id: StripId, delta: Frame) {
    if delta == 0 {
        return;
    }
    tl[id].start += delta;
    let children = tl[id].children.clone();
    for c in children {
        translate(tl, c, delta);
    }
    calc_disp(&mut tl[id]);
}

/// Frame of the left handle, computed from authoritative fields.
pub fn final_left(s: &Strip) -> Frame {
    s.start - s.start_still + s.start_ofs
}

/// Frame of the right handle, computed from authoritative fields.
pub fn final_right(s: &Strip) -> Frame {
    s.start + s.len + s.end_still - s.end_ofs
}

/// Place the left handle at `val`, as a trim into content or a leading still before it.
pub fn set_final_left(s: &mut Strip, val: Frame) {
    if val < s.start {
        s.start_still = s.start - val;
        s.start_ofs = 0;
    } else {
        s.start_ofs = val - s.start;
        s.start_still = 0;
    }
}

/// Place the right handle at `val`, as a trim into content or a trailing still after it.
pub fn set_final_right(s: &mut Strip, val: Frame) {
    let content_end = s.start + s.len;
    if val > content_end {
        s.end_still = val - content_end;
        s.end_ofs = 0;
    } else {
        s.end_ofs = content_end - val;
        s.end_still = 0;
    }
}

/// Keep at least one frame between the handles after moving one of them.
///
/// Handles of strips that cannot hold a still may not pass the content boundary; sounds never
/// hold stills.
pub fn handle_xlimits(s: &mut Strip, left: bool, right: bool) {
    if left {
        if final_left(s) >= final_right(s) {
            let v = final_right(s) - 1;
            set_final_left(s, v);
        }
        if !single_check(s) && final_left(s) >= s.start + s.len {
            let v = s.start + s.len - 1;
            set_final_left(s, v);
        }
    }
    if right {
        if final_right(s) <= final_left(s) {
            let v = final_left(s) + 1;
            set_final_right(s, v);
        }
        if !single_check(s) && final_right(s) <= s.start {
            let v = s.start + 1;
            set_final_right(s, v);
        }
    }
    if s.kind.is_sound() {
        s.start_still = 0;
        s.end_still = 0;
    }
}

/// Single-frame strip whose one content frame can be held for any duration.
pub fn single_check(s: &Strip) -> bool {
    s.len == 1
        && match s.kind {
            StripKind::Image => true,
            StripKind::Effect(k) => k.input_count() == 0,
            _ => false,
        }
}

/// Keep the content frame of a single-frame strip at its left handle.
pub fn single_fix(s: &mut Strip) {
    if !single_check(s) {
        return;
    }
    let left = final_left(s);
    if s.start != left {
        let offset = left - s.start;
        let (l, r) = (final_left(s) - offset, final_right(s) - offset);
        set_final_left(s, l);
        set_final_right(s, r);
        s.start += offset;
    }
}

/// Whether the strip can be moved directly rather than following effect inputs.
pub fn tx_test(s: &Strip) -> bool {
    !s.is_effect() || s.kind.input_count() == 0 || !s.has_inputs()
}

#[cfg(test)]
#[path = "../../tests/unit/strip/timing.rs"]
mod tests;
