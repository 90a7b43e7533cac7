//! Read-only queries over one working list: hit-testing, neighbours, bounds and edit points.

use crate::foundation::core::{Channel, Frame, Point, Rect};
use crate::foundation::settings::EditSettings;
use crate::strip::model::{Strip, StripId};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

const STRIP_OFS_BOTTOM: f64 = 0.05;
const STRIP_OFS_TOP: f64 = 0.95;

/// Mapping from region pixels to timeline space (x in frames, y in channels).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimelineView {
    /// Timeline position shown at region pixel (0, 0).
    pub origin: Point,
    pub frames_per_pixel: f64,
    pub channels_per_pixel: f64,
}

impl TimelineView {
    /// View anchored at frame 0, channel 0, one channel per 20 pixels.
    pub fn new(frames_per_pixel: f64) -> Self {
        Self {
            origin: Point::ORIGIN,
            frames_per_pixel,
            channels_per_pixel: 0.05,
        }
    }

    pub fn to_timeline(&self, region: Point) -> Point {
        Point::new(
            self.origin.x + region.x * self.frames_per_pixel,
            self.origin.y + region.y * self.channels_per_pixel,
        )
    }
}

/// Direction along the time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

/// Which part of a strip a pointer landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleHit {
    Left,
    Right,
    Body,
}

/// Selection state a neighbour query accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectFilter {
    #[default]
    Any,
    Selected,
    Unselected,
}

impl SelectFilter {
    pub fn accepts(self, s: &Strip) -> bool {
        match self {
            Self::Any => true,
            Self::Selected => s.flags.selected,
            Self::Unselected => !s.flags.selected,
        }
    }
}

/// Strip under `pointer` (timeline space) and the part of it that was hit.
///
/// The channel is `floor(pointer.y)`; the frame range is start-inclusive, end-exclusive.
/// Handles only exist on directly movable strips wider than `handle_min_strip_px`.
pub fn find_nearest(
    tl: &Timeline,
    list: ListRef,
    pointer: Point,
    view: &TimelineView,
    settings: &EditSettings,
) -> Option<(StripId, HandleHit)> {
    let px = view.frames_per_pixel;
    let x = pointer.x;
    let channel = pointer.y.floor();
    if channel < 1.0 {
        return None;
    }
    let channel = channel as Channel;

    let s = tl.list(list).iter().map(|&id| &tl[id]).find(|s| {
        s.channel == channel && (s.start_disp as f64) <= x && x < s.end_disp as f64
    })?;

    let mut hit = HandleHit::Body;
    if timing::tx_test(s) {
        let disp_len = s.disp_span().len_frames() as f64;
        let mut hand = 2.0 * (settings.handle_size_px * px).min(disp_len / 4.0);
        if disp_len / px > settings.handle_min_strip_px {
            if disp_len / 3.0 < settings.handle_max_px * px {
                hand = disp_len / 3.0;
            } else {
                hand = hand
                    .max(settings.handle_min_px * px)
                    .min(settings.handle_max_px * px);
            }
            if s.start_disp as f64 + hand >= x {
                hit = HandleHit::Left;
            } else if s.end_disp as f64 - hand <= x {
                hit = HandleHit::Right;
            }
        }
    }
    Some((s.id, hit))
}

/// Sibling on the same channel whose edge touches `id` exactly on `side`.
pub fn find_touching(
    tl: &Timeline,
    list: ListRef,
    id: StripId,
    side: Side,
    filter: SelectFilter,
) -> Option<StripId> {
    let test = &tl[id];
    tl.list(list)
        .iter()
        .map(|&o| &tl[o])
        .filter(|o| o.id != id && o.channel == test.channel && filter.accepts(o))
        .find(|o| match side {
            Side::Left => o.end_disp == test.start_disp,
            Side::Right => o.start_disp == test.end_disp,
        })
        .map(|o| o.id)
}

/// Closest sibling on `side` of `id`, same channel and depth, measured by the gap between them.
pub fn find_nearest_in_direction(
    tl: &Timeline,
    list: ListRef,
    id: StripId,
    side: Side,
    filter: SelectFilter,
) -> Option<StripId> {
    let test = &tl[id];
    let mut best: Option<(Frame, StripId)> = None;
    for &o in tl.list(list) {
        let s = &tl[o];
        if o == id || s.channel != test.channel || s.depth != test.depth || !filter.accepts(s) {
            continue;
        }
        let dist = match side {
            Side::Left if s.end_disp <= test.start_disp => test.start_disp - s.end_disp,
            Side::Right if s.start_disp >= test.end_disp => s.start_disp - test.end_disp,
            _ => continue,
        };
        if dist == 0 {
            return Some(o);
        }
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, o));
        }
    }
    best.map(|(_, o)| o)
}

/// Whether the selection of `list` is closed under effect relations.
///
/// Fails when nothing is selected, when a selected effect reads an unselected input, or when an
/// unselected effect reads a selected one.
pub fn isolated_selection(tl: &Timeline, list: ListRef) -> bool {
    let ids = tl.list(list);
    if !ids.iter().any(|&id| tl[id].flags.selected) {
        return false;
    }
    ids.iter().map(|&id| &tl[id]).filter(|s| s.is_effect()).all(|s| {
        let sel = s.flags.selected;
        s.input_ids()
            .all(|i| tl.get(i).is_none_or(|input| input.flags.selected == sel))
    })
}

/// Area the view should be able to scroll over: the scene range plus every strip.
pub fn bounding_box(tl: &Timeline, list: ListRef) -> Rect {
    let mut min_x = tl.frame_start as f64;
    let mut max_x = (tl.frame_end + 1) as f64;
    let mut max_y = 8.0_f64;
    for &id in tl.list(list) {
        let s = &tl[id];
        min_x = min_x.min((s.start_disp - 1) as f64);
        max_x = max_x.max((s.end_disp + 1) as f64);
        max_y = max_y.max(f64::from(s.channel) + 2.0);
    }
    Rect::new(min_x, 0.0, max_x, max_y)
}

/// Drawn rectangle of one strip.
pub fn strip_rect(s: &Strip) -> Rect {
    let y = f64::from(s.channel);
    Rect::new(
        s.start_disp as f64,
        y + STRIP_OFS_BOTTOM,
        s.end_disp as f64,
        y + STRIP_OFS_TOP,
    )
}

/// Unmuted strips of `list` whose display range covers `frame`.
pub fn visible_count_at(tl: &Timeline, list: ListRef, frame: Frame) -> usize {
    tl.list(list)
        .iter()
        .map(|&id| &tl[id])
        .filter(|s| !s.flags.muted && s.disp_span().contains(frame))
        .count()
}

/// Nearest strip edge (or centre) strictly on `side` of `frame`, searching nested lists too.
pub fn next_edit_frame(
    tl: &Timeline,
    list: ListRef,
    frame: Frame,
    side: Side,
    skip_muted: bool,
    center: bool,
) -> Option<Frame> {
    let mut best: Option<Frame> = None;
    for id in tl.iter_recursive(list) {
        let s = &tl[id];
        if skip_muted && s.flags.muted {
            continue;
        }
        let candidates = if center {
            [Some((s.start_disp + s.end_disp) / 2), None]
        } else {
            [Some(s.start_disp), Some(s.end_disp)]
        };
        for f in candidates.into_iter().flatten() {
            let better = match side {
                Side::Right => f > frame && best.is_none_or(|b| f < b),
                Side::Left => f < frame && best.is_none_or(|b| f > b),
            };
            if better {
                best = Some(f);
            }
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/edit/query.rs"]
mod tests;
