//! Slip: shift the content under selected strips while their display ranges stay put.
//!
//! Three drivers share one limit/apply pair: [`slip_exec`] for a one-shot offset, and [`SlipDrag`]
//! for pointer drags (with a slow fine-adjust mode) and typed numeric offsets.

use crate::edit::query::TimelineView;
use crate::edit::reload_strip;
use crate::foundation::core::{Frame, FrameSpan, Point};
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, CacheTarget, EditHost};
use crate::strip::model::{StripId, TimingSnapshot};
use crate::strip::timeline::{ListRef, Timeline};
use crate::strip::timing;

/// One strip taking part in a slip, with its timing before the slip began.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlipEntry {
    pub id: StripId,
    /// Trimmable strips get new offsets/stills; the rest move with the content.
    pub trim: bool,
    pub snap: TimingSnapshot,
}

/// Selected non-effect strips of `list`, each followed by all descendants when it is a meta.
pub fn collect(tl: &Timeline, list: ListRef) -> Vec<SlipEntry> {
    let mut out = Vec::new();
    for &id in tl.list(list) {
        let s = &tl[id];
        if s.is_effect() || !s.flags.selected {
            continue;
        }
        out.push(SlipEntry {
            id,
            trim: true,
            snap: s.snapshot(),
        });
        for &d in tl.subtree(id).iter().skip(1) {
            out.push(SlipEntry {
                id: d,
                trim: false,
                snap: tl[d].snapshot(),
            });
        }
    }
    out
}

/// Clamp `offset` so every trimmed strip still shows at least one frame of its content.
///
/// Each trimmed strip admits an interval of offsets; the result is `offset` clamped into their
/// intersection. If the intervals do not intersect (the strips were already out of range), the
/// corrections are accumulated strip by strip instead.
pub fn apply_limits(entries: &[SlipEntry], offset: Frame) -> Frame {
    let mut lo = Frame::MIN;
    let mut hi = Frame::MAX;
    for e in entries.iter().filter(|e| e.trim) {
        let content = e.snap.len + e.snap.anim_start_ofs + e.snap.anim_end_ofs;
        hi = hi.min(e.snap.end_disp - e.snap.start - 1);
        lo = lo.max(e.snap.start_disp - e.snap.start - content + 1);
    }
    if lo <= hi {
        return offset.clamp(lo, hi);
    }

    let mut offset = offset;
    for e in entries.iter().filter(|e| e.trim) {
        let content_start = e.snap.start + offset;
        let content_end = content_start + e.snap.len + e.snap.anim_start_ofs + e.snap.anim_end_ofs;
        let mut diff = 0;
        if content_start >= e.snap.end_disp {
            diff = e.snap.end_disp - content_start - 1;
        }
        if content_end <= e.snap.start_disp {
            diff = e.snap.start_disp - content_end + 1;
        }
        offset += diff;
    }
    offset
}

/// Apply `offset` relative to the captured snapshots, children before their metas.
pub fn apply(tl: &mut Timeline, host: &mut dyn EditHost, entries: &[SlipEntry], offset: Frame) {
    for e in entries.iter().rev() {
        let s = &mut tl[e.id];
        s.start = e.snap.start + offset;
        if e.trim {
            let end_frame = s.start + s.len;
            if end_frame > s.end_disp {
                s.end_still = 0;
                s.end_ofs = end_frame - s.end_disp;
            } else {
                s.end_still = s.end_disp - end_frame;
                s.end_ofs = 0;
            }
            if s.start > s.start_disp {
                s.start_still = s.start - s.start_disp;
                s.start_ofs = 0;
            } else {
                s.start_still = 0;
                s.start_ofs = s.start_disp - s.start;
            }
        } else {
            let span = e.snap.disp_span().shift(offset);
            s.start_disp = span.start;
            s.end_disp = span.end;
        }
        if !s.is_effect() {
            timing::calc(tl, e.id);
        }
    }
    invalidate_touched(tl, host, entries);
}

/// Put every entry back to its snapshot and re-derive content.
pub fn restore(tl: &mut Timeline, host: &mut dyn EditHost, entries: &[SlipEntry]) {
    for e in entries {
        tl[e.id].restore(&e.snap);
    }
    for e in entries {
        reload_strip(tl, host, e.id, false);
    }
    invalidate_touched(tl, host, entries);
}

fn invalidate_touched(tl: &Timeline, host: &mut dyn EditHost, entries: &[SlipEntry]) {
    let span = entries
        .iter()
        .map(|e| tl[e.id].disp_span())
        .reduce(FrameSpan::union);
    if let Some(span) = span {
        host.invalidate(CacheTarget::Range(span), CacheKind::All);
    }
}

/// One-shot slip of the selection in `list`. Returns the offset actually applied.
#[tracing::instrument(skip(tl, host))]
pub fn slip_exec(
    tl: &mut Timeline,
    host: &mut dyn EditHost,
    list: ListRef,
    offset: Frame,
) -> StriplineResult<Frame> {
    let entries = collect(tl, list);
    if entries.is_empty() {
        return Err(StriplineError::precondition("no selected strips to slip"));
    }
    let offset = apply_limits(&entries, offset);
    apply(tl, host, &entries, offset);
    Ok(offset)
}

/// Input delivered to a running [`SlipDrag`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipEvent {
    /// Pointer moved to this region position (pixels).
    PointerMove { x: f64 },
    /// Fine-adjust modifier pressed with the pointer at `x`.
    SlowBegin { x: f64 },
    SlowEnd,
    /// Typed offset in frames; `None` leaves numeric entry and returns to the pointer.
    Numeric(Option<f64>),
    Confirm,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipStatus {
    Running { offset: Frame },
    Confirmed { offset: Frame },
    Cancelled,
}

/// Interactive slip, created when the drag starts and finished by confirm or cancel.
///
/// Every applied event is computed from the snapshots taken at [`SlipDrag::begin`], never
/// from the previous event's result, so the order of intermediate events cannot drift.
#[derive(Clone, Debug)]
pub struct SlipDrag {
    list: ListRef,
    entries: Vec<SlipEntry>,
    view: TimelineView,
    init_frame: f64,
    slow_anchor: Option<f64>,
    slow_factor: f64,
    numeric: Option<f64>,
    offset: Frame,
    status: SlipStatus,
}

impl SlipDrag {
    /// Capture the selection of `list` with the pointer at region position `pointer`.
    pub fn begin(
        tl: &Timeline,
        list: ListRef,
        pointer: Point,
        view: TimelineView,
        slow_factor: f64,
    ) -> StriplineResult<Self> {
        let entries = collect(tl, list);
        if entries.is_empty() {
            return Err(StriplineError::precondition("no selected strips to slip"));
        }
        Ok(Self {
            list,
            init_frame: view.to_timeline(pointer).x,
            entries,
            view,
            slow_anchor: None,
            slow_factor,
            numeric: None,
            offset: 0,
            status: SlipStatus::Running { offset: 0 },
        })
    }

    pub fn list(&self) -> ListRef {
        self.list
    }

    pub fn offset(&self) -> Frame {
        self.offset
    }

    pub fn status(&self) -> SlipStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, SlipStatus::Running { .. })
    }

    pub fn entries(&self) -> &[SlipEntry] {
        &self.entries
    }

    /// Handle one event to completion. Events after confirm or cancel are ignored.
    pub fn handle(
        &mut self,
        tl: &mut Timeline,
        host: &mut dyn EditHost,
        event: SlipEvent,
    ) -> SlipStatus {
        if self.is_finished() {
            return self.status;
        }
        match event {
            SlipEvent::PointerMove { x } => {
                if self.numeric.is_none() {
                    let x = match self.slow_anchor {
                        Some(anchor) => (x - anchor) * self.slow_factor + anchor,
                        None => x,
                    };
                    let frame = self.view.to_timeline(Point::new(x, 0.0)).x;
                    self.update(tl, host, (frame - self.init_frame) as Frame);
                }
            }
            SlipEvent::SlowBegin { x } => {
                if self.numeric.is_none() {
                    self.slow_anchor = Some(x);
                }
            }
            SlipEvent::SlowEnd => self.slow_anchor = None,
            SlipEvent::Numeric(Some(v)) => {
                self.numeric = Some(v);
                self.update(tl, host, v.round() as Frame);
            }
            SlipEvent::Numeric(None) => self.numeric = None,
            SlipEvent::Confirm => {
                self.status = SlipStatus::Confirmed {
                    offset: self.offset,
                };
            }
            SlipEvent::Cancel => {
                restore(tl, host, &self.entries);
                self.offset = 0;
                self.status = SlipStatus::Cancelled;
            }
        }
        self.status
    }

    fn update(&mut self, tl: &mut Timeline, host: &mut dyn EditHost, requested: Frame) {
        let offset = apply_limits(&self.entries, requested);
        apply(tl, host, &self.entries, offset);
        self.offset = offset;
        self.status = SlipStatus::Running { offset };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/slip.rs"]
mod tests;
