//! Split one strip, or a batch of strips, at a frame.

use crate::edit::{duplicate_into, invalidate_between, reload_strip};
use crate::foundation::core::{Channel, Frame};
use crate::host::{CacheKind, EditHost};
use crate::strip::model::StripId;
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;
use std::collections::HashMap;

/// How content is divided between the two pieces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    /// Both pieces keep the whole source; only trim offsets change. Reversible.
    #[default]
    Soft,
    /// Discarded content moves into animation offsets and the source is reloaded.
    Hard,
}

/// Which pieces stay selected after a batch split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSide {
    Left,
    Right,
    #[default]
    Both,
    NoChange,
}

impl SplitSide {
    /// Side picked by where the pointer sits relative to the split frame.
    pub fn from_pointer(pointer_frame: f64, split_frame: Frame) -> Self {
        if pointer_frame < split_frame as f64 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Which strips a batch split considers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Every selected strip crossing the frame.
    #[default]
    Selection,
    /// The strip under the cursor on one channel, selected or not.
    Cursor { channel: Channel },
}

/// Batch split request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitOpts {
    pub frame: Frame,
    #[serde(default)]
    pub method: SplitMethod,
    #[serde(default)]
    pub side: SplitSide,
    #[serde(default)]
    pub mode: SplitMode,
    /// With [`SplitMode::Cursor`]: the right piece only stays selected if the left one is.
    #[serde(default)]
    pub ignore_selection: bool,
}

impl SplitOpts {
    pub fn at(frame: Frame) -> Self {
        Self {
            frame,
            method: SplitMethod::default(),
            side: SplitSide::default(),
            mode: SplitMode::default(),
            ignore_selection: false,
        }
    }
}

/// Split `id` at `frame`, returning the new right-hand strip.
///
/// Returns `None` when no duplicate is produced: metas split inside a still region only have
/// their still trimmed.
#[tracing::instrument(skip(tl, host))]
pub fn split_strip(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    id: StripId,
    frame: Frame,
    method: SplitMethod,
) -> Option<StripId> {
    let hard = method == SplitMethod::Hard;
    let is_meta = tl[id].is_meta();
    let mut is_end_exact = tl[id].start + tl[id].len == frame;
    let ts = tl[id].snapshot();
    let mut skip_dup = false;

    if hard && !is_meta {
        // The stored length may not match the media anymore.
        reload_strip(tl, host, id, true);
    }

    {
        let s = &mut tl[id];
        if s.start_still != 0 && frame <= s.start {
            tracing::debug!("left piece: inside leading still");
            if is_meta {
                skip_dup = true;
                s.start_still = s.start - frame;
            } else {
                s.start = frame - 1;
                s.start_still = frame - s.start_disp - 1;
                if hard {
                    s.anim_end_ofs += s.len - 1;
                } else {
                    s.end_ofs = s.len - 1;
                }
                s.end_still = 0;
            }
        } else if !is_end_exact && frame >= s.start && frame <= s.start + s.len {
            tracing::debug!("left piece: inside content");
            if hard {
                s.end_ofs = 0;
                s.end_still = 0;
                s.anim_end_ofs += s.start + s.len - frame;
            } else {
                s.end_ofs = s.start + s.len - frame;
            }
        } else if is_end_exact || (s.start + s.len < frame && s.end_still != 0) {
            tracing::debug!("left piece: inside trailing still");
            s.end_still -= s.end_disp - frame;
            if is_meta {
                skip_dup = true;
            }
        }
    }

    if hard {
        reload_strip(tl, host, id, false);
    } else {
        timing::calc(tl, id);
    }

    if skip_dup {
        return None;
    }

    let new_id = duplicate_into(tl, host, list, &[id])
        .first()
        .map(|&(_, n)| n)?;
    tl[new_id].flags.selected = true;

    if !hard {
        is_end_exact = tl[new_id].start + tl[new_id].len == frame;
    }

    {
        let s = &mut tl[new_id];
        if s.start_still != 0 && frame == s.start + 1 {
            s.start = ts.start;
            s.start_still = ts.start - frame;
            if hard {
                s.anim_end_ofs = ts.anim_end_ofs;
            } else {
                s.end_ofs = ts.end_ofs;
            }
            s.end_still = ts.end_still;
        } else if !is_end_exact && frame >= s.start && frame <= s.start + s.len {
            if hard {
                s.start = frame;
                s.start_ofs = 0;
                s.anim_start_ofs += frame - ts.start;
                s.anim_end_ofs = ts.anim_end_ofs;
            } else {
                s.start_ofs = frame - ts.start;
            }
            s.start_still = 0;
            s.end_ofs = ts.end_ofs;
            s.end_still = ts.end_still;
        } else if is_end_exact || (s.start + s.len < frame && s.end_still != 0) {
            if hard {
                s.start = frame;
                s.start_ofs = 0;
                s.anim_start_ofs += ts.len - 1;
            } else {
                s.start = frame - ts.len + 1;
                s.start_ofs = ts.len - 1;
            }
            s.end_still = ts.end_disp - frame - 1;
            s.start_still = 0;
        }
    }

    if hard {
        reload_strip(tl, host, new_id, false);
    } else {
        timing::calc(tl, new_id);
    }
    invalidate_between(tl, host, id, new_id, CacheKind::All);
    Some(new_id)
}

/// What a batch split changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitResult {
    /// `(left, right)` pieces of every duplicated strip.
    pub pairs: Vec<(StripId, StripId)>,
    /// Metas cut inside a still region: only their still was trimmed.
    pub trimmed: Vec<StripId>,
}

impl SplitResult {
    pub fn changed(&self) -> bool {
        !self.pairs.is_empty() || !self.trimmed.is_empty()
    }
}

/// Split every strip `mode` selects in `list`.
///
/// Strips wholly right of the cut are moved to the tail of the list so the walk stops before
/// reaching anything it created.
pub fn split_list(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    frame: Frame,
    mode: SplitMode,
    method: SplitMethod,
) -> SplitResult {
    let mut out = SplitResult::default();
    let mut first_new: Option<StripId> = None;
    let mut i = 0;
    loop {
        let Some(&id) = tl.list(list).get(i) else {
            break;
        };
        if Some(id) == first_new {
            break;
        }
        let s = &tl[id];
        let crossing = s.start_disp < frame && s.end_disp > frame;
        let wanted = match mode {
            SplitMode::Cursor { channel } => s.channel == channel && crossing,
            SplitMode::Selection if s.flags.selected => {
                if !crossing && s.start_disp >= frame {
                    tl.move_to_tail(id);
                    first_new.get_or_insert(id);
                    // The next strip now occupies slot `i`.
                    continue;
                }
                crossing
            }
            SplitMode::Selection => false,
        };
        if wanted {
            let before = tl[id].snapshot();
            match split_strip(tl, host, list, id, frame, method) {
                Some(n) => {
                    first_new.get_or_insert(n);
                    out.pairs.push((id, n));
                }
                None if tl[id].snapshot() != before => out.trimmed.push(id),
                None => {}
            }
        }
        i += 1;
    }
    out
}

/// Full split: batch split, selection retention, effect relinking, recalculation and sort.
///
/// When nothing was split or trimmed the list order is restored and the timeline is left as
/// it was.
pub fn split(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    opts: SplitOpts,
) -> SplitResult {
    let order = tl.list(list).to_vec();
    let result = split_list(tl, host, list, opts.frame, opts.mode, opts.method);
    if !result.changed() {
        tl.set_list_order(list, order);
        return result;
    }
    let pairs = &result.pairs;
    let frame = opts.frame;

    // Right-hand effect pieces read from the right-hand pieces of their inputs.
    let right_of: HashMap<StripId, StripId> = pairs.iter().copied().collect();
    for &(_, right) in pairs {
        for input in tl[right].inputs.iter_mut() {
            if let Some(r) = input.and_then(|i| right_of.get(&i).copied()) {
                *input = Some(r);
            }
        }
    }

    let ids = tl.iter_recursive(list);
    match (opts.mode, opts.ignore_selection) {
        (SplitMode::Cursor { channel }, true) => {
            let left_selected = ids.iter().any(|&id| {
                let s = &tl[id];
                s.end_disp == frame && s.channel == channel && s.flags.selected
            });
            if !left_selected {
                for &id in &ids {
                    let s = &mut tl[id];
                    if s.start_disp == frame && s.channel == channel {
                        s.flags.deselect();
                    }
                }
            }
        }
        (_, true) => {}
        (_, false) => {
            for &id in &ids {
                let s = &mut tl[id];
                let drop = match opts.side {
                    SplitSide::Left => s.start_disp >= frame,
                    SplitSide::Right => s.end_disp <= frame,
                    SplitSide::Both | SplitSide::NoChange => false,
                };
                if drop {
                    s.flags.deselect();
                }
            }
        }
    }

    timing::recalc_effects(tl, list);
    tl.sort(list);
    result
}

#[cfg(test)]
#[path = "../../tests/unit/edit/split.rs"]
mod tests;
