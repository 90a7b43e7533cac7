//! Stripline is the editing engine behind a non-linear video sequencer timeline.
//!
//! It owns no pixels and no audio. A [`Timeline`] holds strips (movie, image, sound, scene,
//! meta and effect items) on numbered channels; the engine keeps their timing consistent and
//! implements the interactive edits on top:
//!
//! - Load a [`Timeline`] from JSON, or build one in code
//! - Wrap it in an [`EditSession`] together with an [`EditHost`]
//! - Run operations (split, slip, snap, gaps, metas, effects, ...) and read back an
//!   [`EditOutcome`] per operation
//!
//! Lower-level engines live in [`strip`] and [`edit`] for callers that manage their own
//! transactions.
#![forbid(unsafe_code)]

mod foundation;

/// Collaborator interfaces: cache invalidation, change notification, media lookups.
pub mod host;
/// Editing operations over one working list.
pub mod edit;
/// Proxy rebuild queueing and background jobs.
pub mod proxy;
pub(crate) mod session;
/// Strip model, timeline arena, timing and overlap engines.
pub mod strip;

pub use crate::foundation::core::{Channel, Fps, Frame, FrameSpan, Point, Rect};
pub use crate::foundation::error::{StriplineError, StriplineResult};
pub use crate::foundation::report::Reports;
pub use crate::foundation::settings::EditSettings;

pub use crate::edit::effects::InputPair;
pub use crate::edit::meta::{MetaFrame, MetaStack};
pub use crate::edit::query::{HandleHit, SelectFilter, Side, TimelineView};
pub use crate::edit::slip::{SlipDrag, SlipEvent, SlipStatus};
pub use crate::edit::split::{SplitMethod, SplitMode, SplitOpts, SplitResult, SplitSide};
pub use crate::edit::structure::Clipboard;
pub use crate::host::{
    CacheKind, CacheTarget, ChangeScope, EditHost, HostCall, NullHost, RecordingHost,
};
pub use crate::proxy::job::{JobStatus, ProxyJob, ProxyReport};
pub use crate::proxy::{ProxyBuilder, ProxyContext};
pub use crate::session::edit_session::{EditSession, SlipUpdate};
pub use crate::session::outcome::EditOutcome;
pub use crate::strip::model::{
    EffectKind, ProxySettings, Strip, StripContent, StripFlags, StripId, StripKind,
    TimingSnapshot,
};
pub use crate::strip::timeline::{ListRef, Marker, Timeline};
