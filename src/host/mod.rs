//! Interfaces to the collaborators that live outside the editing engine.
//!
//! The engine never owns caches, the undo/scene-graph layer, media lookups or animation data.
//! It reaches them through [`EditHost`], whose methods all default to doing nothing so a host
//! only implements what it actually backs.

use crate::foundation::core::{Frame, FrameSpan};
use crate::strip::model::{Strip, StripId, StripKind};
use std::collections::HashMap;

/// Which cached images an invalidation drops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// Decoded source frames.
    Raw,
    /// Source frames after per-strip modifiers.
    Preprocessed,
    /// Final composited frames.
    Composite,
    All,
}

/// What an invalidation covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTarget {
    /// Everything cached for one strip.
    Strip(StripId),
    /// Every frame in the span, across strips.
    Range(FrameSpan),
    /// Every cached image of the timeline.
    Everything,
}

/// Granularity of a completed-operation notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    /// Strips were created, destroyed, moved or retimed.
    Structure,
    /// Only the current frame (or preview range) changed.
    FrameOnly,
}

/// Collaborator calls issued by the engine.
pub trait EditHost {
    /// Drop cached images for `target`.
    fn invalidate(&mut self, target: CacheTarget, kind: CacheKind) {
        let _ = (target, kind);
    }

    /// Called once per completed operation.
    fn notify(&mut self, scope: ChangeScope) {
        let _ = scope;
    }

    /// Full content length of the media behind `strip`, before animation offsets.
    ///
    /// `None` means the length cannot be re-derived and the strip keeps its current `len`.
    fn source_length(&mut self, strip: &Strip) -> Option<Frame> {
        recorded_source_length(strip)
    }

    /// Shift animation data keyed on the strip named `name` by `delta` frames.
    fn offset_animation(&mut self, name: &str, delta: Frame) {
        let _ = (name, delta);
    }

    /// Copy animation data from the strip named `from` to its duplicate `to`.
    fn duplicate_animation(&mut self, from: &str, to: &str) {
        let _ = (from, to);
    }
}

/// Length recorded in the strip's own content block.
pub fn recorded_source_length(strip: &Strip) -> Option<Frame> {
    match strip.kind {
        StripKind::Image if !strip.content.elements.is_empty() => {
            Some(strip.content.elements.len() as Frame)
        }
        StripKind::Image | StripKind::Movie | StripKind::Sound | StripKind::Scene => {
            strip.content.source_len
        }
        StripKind::Meta | StripKind::Effect(_) => None,
    }
}

/// Host that ignores every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHost;

impl EditHost for NullHost {}

/// One recorded collaborator call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    Invalidate { target: CacheTarget, kind: CacheKind },
    Notify { scope: ChangeScope },
    OffsetAnimation { name: String, delta: Frame },
    DuplicateAnimation { from: String, to: String },
}

/// In-memory host for tests and the command line tool.
///
/// Records every call and can override media lengths per strip name.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    lengths: HashMap<String, Frame>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the media behind the strip named `name` is `len` frames long.
    pub fn set_source_length(&mut self, name: impl Into<String>, len: Frame) {
        self.lengths.insert(name.into(), len);
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn notifications(&self) -> Vec<ChangeScope> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Notify { scope } => Some(*scope),
                _ => None,
            })
            .collect()
    }

    pub fn invalidations(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Invalidate { .. }))
            .count()
    }
}

impl EditHost for RecordingHost {
    fn invalidate(&mut self, target: CacheTarget, kind: CacheKind) {
        self.calls.push(HostCall::Invalidate { target, kind });
    }

    fn notify(&mut self, scope: ChangeScope) {
        self.calls.push(HostCall::Notify { scope });
    }

    fn source_length(&mut self, strip: &Strip) -> Option<Frame> {
        self.lengths
            .get(&strip.name)
            .copied()
            .or_else(|| recorded_source_length(strip))
    }

    fn offset_animation(&mut self, name: &str, delta: Frame) {
        self.calls.push(HostCall::OffsetAnimation {
            name: name.to_string(),
            delta,
        });
    }

    fn duplicate_animation(&mut self, from: &str, to: &str) {
        self.calls.push(HostCall::DuplicateAnimation {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/host.rs"]
mod tests;
