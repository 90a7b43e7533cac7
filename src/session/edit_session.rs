use crate::edit::effects::{self, InputPair};
use crate::edit::flags;
use crate::edit::gap;
use crate::edit::meta::{self, MetaStack};
use crate::edit::query::{self, HandleHit, Side, TimelineView};
use crate::edit::slip::{SlipDrag, SlipEvent, SlipStatus, slip_exec};
use crate::edit::split::{self, SplitOpts};
use crate::edit::structure::{self, Clipboard};
use crate::edit::subtitles;
use crate::edit::transform;
use crate::foundation::core::{Frame, Point};
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::foundation::report::Reports;
use crate::foundation::settings::EditSettings;
use crate::host::{ChangeScope, EditHost};
use crate::proxy::job::ProxyJob;
use crate::proxy::{ProxyBuilder, build_proxy_queue};
use crate::session::outcome::EditOutcome;
use crate::strip::model::{EffectKind, StripContent, StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Slip drag in progress plus the timeline as it was when the drag began.
struct ActiveSlip {
    drag: SlipDrag,
    before: Timeline,
}

/// Result of feeding one event to a running slip drag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlipUpdate {
    pub status: SlipStatus,
    /// Set once the drag is confirmed.
    pub outcome: Option<EditOutcome>,
}

/// Editing front end over one timeline.
///
/// Every mutating operation is atomic: preconditions are checked before anything changes, a
/// failure leaves the timeline exactly as it was, and a success notifies the host once and
/// reports which strips were created, mutated and destroyed.
pub struct EditSession<H: EditHost> {
    tl: Timeline,
    host: H,
    settings: EditSettings,
    metas: MetaStack,
    clipboard: Clipboard,
    slip: Option<ActiveSlip>,
}

impl<H: EditHost> EditSession<H> {
    pub fn new(timeline: Timeline, host: H) -> Self {
        Self {
            tl: timeline,
            host,
            settings: EditSettings::default(),
            metas: MetaStack::new(),
            clipboard: Clipboard::default(),
            slip: None,
        }
    }

    /// Replace the editing settings. Fails, leaving the session unbuilt, on invalid settings.
    pub fn with_settings(mut self, settings: EditSettings) -> StriplineResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.tl
    }

    /// Direct access for selection and cursor changes that need no notification.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.tl
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &EditSettings {
        &self.settings
    }

    pub fn metas(&self) -> &MetaStack {
        &self.metas
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn into_parts(self) -> (Timeline, H) {
        (self.tl, self.host)
    }

    /// The list operations currently apply to: the innermost entered meta, or the root.
    pub fn working_list(&self) -> ListRef {
        self.metas.current_list()
    }

    /// Run `op` on the working list, rolling back on error and notifying on success.
    fn run<T>(
        &mut self,
        scope: ChangeScope,
        op: impl FnOnce(&mut Self, ListRef) -> StriplineResult<T>,
    ) -> StriplineResult<(T, EditOutcome)> {
        if self.slip.is_some() {
            return Err(StriplineError::precondition("a slip is in progress"));
        }
        self.metas.prune(&self.tl);
        let list = self.metas.current_list();
        let before = self.tl.clone();
        let metas = self.metas.clone();
        match op(self, list) {
            Ok(value) => {
                let outcome = EditOutcome::diff(&before, &self.tl);
                self.host.notify(scope);
                tracing::debug!(
                    created = outcome.created.len(),
                    mutated = outcome.mutated.len(),
                    destroyed = outcome.destroyed.len(),
                    "edit applied"
                );
                Ok((value, outcome))
            }
            Err(e) => {
                self.tl = before;
                self.metas = metas;
                Err(e)
            }
        }
    }

    fn edit(
        &mut self,
        op: impl FnOnce(&mut Self, ListRef) -> StriplineResult<()>,
    ) -> StriplineResult<EditOutcome> {
        self.run(ChangeScope::Structure, op).map(|(_, o)| o)
    }

    /// Split strips at `opts.frame`.
    ///
    /// A meta cut inside its still region is trimmed without a duplicate. Fails when nothing
    /// was split or trimmed.
    #[tracing::instrument(skip(self))]
    pub fn split(&mut self, opts: SplitOpts) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            let result = split::split(&mut s.tl, &mut s.host, list, opts);
            if !result.changed() {
                return Err(StriplineError::precondition(format!(
                    "no strip crosses frame {}",
                    opts.frame
                )));
            }
            Ok(())
        })
    }

    /// Slip the selection by `offset` frames. Returns the offset actually applied.
    #[tracing::instrument(skip(self))]
    pub fn slip(&mut self, offset: Frame) -> StriplineResult<(Frame, EditOutcome)> {
        self.run(ChangeScope::Structure, |s, list| {
            slip_exec(&mut s.tl, &mut s.host, list, offset)
        })
    }

    /// Start an interactive slip with the pointer at region position `pointer`.
    pub fn slip_begin(&mut self, pointer: Point, view: TimelineView) -> StriplineResult<()> {
        if self.slip.is_some() {
            return Err(StriplineError::precondition("a slip is in progress"));
        }
        self.metas.prune(&self.tl);
        let list = self.metas.current_list();
        let drag = SlipDrag::begin(&self.tl, list, pointer, view, self.settings.slip_slow_factor)?;
        self.slip = Some(ActiveSlip {
            drag,
            before: self.tl.clone(),
        });
        Ok(())
    }

    /// Feed one event to the running slip.
    ///
    /// Confirming notifies the host and reports the outcome; cancelling restores every strip
    /// and notifies nothing.
    pub fn slip_event(&mut self, event: SlipEvent) -> StriplineResult<SlipUpdate> {
        let active = self
            .slip
            .as_mut()
            .ok_or_else(|| StriplineError::precondition("no slip is in progress"))?;
        let status = active.drag.handle(&mut self.tl, &mut self.host, event);
        let outcome = match status {
            SlipStatus::Running { .. } => None,
            SlipStatus::Confirmed { .. } => {
                let done = self.slip.take();
                let outcome = done.map(|d| EditOutcome::diff(&d.before, &self.tl));
                self.host.notify(ChangeScope::Structure);
                outcome
            }
            SlipStatus::Cancelled => {
                self.slip = None;
                None
            }
        };
        Ok(SlipUpdate { status, outcome })
    }

    pub fn slip_in_progress(&self) -> bool {
        self.slip.is_some()
    }

    #[tracing::instrument(skip(self))]
    pub fn snap(&mut self, frame: Frame) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            transform::snap(&mut s.tl, &mut s.host, list, frame);
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn swap(&mut self, side: Side) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| transform::swap(&mut s.tl, &mut s.host, list, side).map(drop))
    }

    pub fn swap_data(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| transform::swap_data(&mut s.tl, &mut s.host, list).map(drop))
    }

    pub fn offset_clear(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            transform::offset_clear(&mut s.tl, list);
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn duplicate(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            structure::duplicate(&mut s.tl, &mut s.host, list);
            Ok(())
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            structure::delete(&mut s.tl, &mut s.host, list);
            Ok(())
        })
    }

    /// Break selected image sequences into single-frame strips held for `length` frames.
    #[tracing::instrument(skip(self))]
    pub fn images_separate(&mut self, length: Frame) -> StriplineResult<EditOutcome> {
        if length < 1 {
            return Err(StriplineError::validation("length must be >= 1"));
        }
        self.edit(|s, list| {
            structure::images_separate(&mut s.tl, &mut s.host, list, length);
            Ok(())
        })
    }

    /// Copy the selection to the session clipboard. Returns the number of strips copied.
    pub fn copy(&mut self) -> StriplineResult<usize> {
        self.metas.prune(&self.tl);
        self.clipboard = structure::copy(&self.tl, self.metas.current_list())?;
        Ok(self.clipboard.len())
    }

    #[tracing::instrument(skip(self))]
    pub fn paste(&mut self) -> StriplineResult<EditOutcome> {
        if self.clipboard.is_empty() {
            return Err(StriplineError::precondition("nothing to paste"));
        }
        self.edit(|s, list| {
            structure::paste(&mut s.tl, &mut s.host, list, &s.clipboard);
            Ok(())
        })
    }

    /// Drop every cached image. Notifies the host like a structural edit.
    pub fn refresh_all(&mut self) -> StriplineResult<()> {
        self.run(ChangeScope::Structure, |s, _| {
            structure::refresh_all(&mut s.host);
            Ok(())
        })
        .map(drop)
    }

    /// Write every text strip to `path` as SubRip subtitles, in display order.
    ///
    /// The active strip must be a text strip. `.srt` is appended to `path` when missing.
    /// Returns the path written and the number of cues.
    #[tracing::instrument(skip(self, path))]
    pub fn export_subtitles(&self, path: impl AsRef<Path>) -> StriplineResult<(PathBuf, usize)> {
        let active_text = self
            .tl
            .active()
            .is_some_and(|id| self.tl[id].kind == StripKind::Effect(EffectKind::Text));
        if !active_text {
            return Err(StriplineError::precondition("active strip is not a text strip"));
        }
        let path = subtitles::srt_path(path.as_ref());
        let mut buf = Vec::new();
        let cues = subtitles::write_subrip(&self.tl, &mut buf)?;
        std::fs::write(&path, buf)
            .with_context(|| format!("write subtitles '{}'", path.display()))?;
        Ok((path, cues))
    }

    pub fn reload(&mut self, adjust_length: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            structure::reload(&mut s.tl, &mut s.host, list, adjust_length);
            Ok(())
        })
    }

    pub fn change_path(&mut self, content: StripContent) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| structure::change_path(&mut s.tl, &mut s.host, list, content).map(drop))
    }

    pub fn reassign_inputs(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| effects::reassign_inputs(&mut s.tl, &mut s.host, list).map(drop))
    }

    pub fn swap_inputs(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| effects::swap_inputs(&mut s.tl, &mut s.host, list).map(drop))
    }

    pub fn change_effect_input(&mut self, pair: InputPair) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            effects::change_effect_input(&mut s.tl, &mut s.host, list, pair).map(drop)
        })
    }

    pub fn change_effect_kind(&mut self, kind: EffectKind) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            effects::change_effect_kind(&mut s.tl, &mut s.host, list, kind).map(drop)
        })
    }

    pub fn set_mute(&mut self, muted: bool, unselected: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            flags::set_mute(&mut s.tl, &mut s.host, list, muted, unselected);
            Ok(())
        })
    }

    pub fn set_lock(&mut self, locked: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            flags::set_lock(&mut s.tl, list, locked);
            Ok(())
        })
    }

    /// Select `ids` (all in the working list), making the last one active.
    ///
    /// Without `extend` everything else is deselected first.
    pub fn select(&mut self, ids: &[StripId], extend: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            for &id in ids {
                s.tl.strip(id)?;
                if s.tl.parent_list(id) != list {
                    return Err(StriplineError::validation(format!(
                        "strip '{}' is not in the working list",
                        s.tl[id].name
                    )));
                }
            }
            if !extend {
                flags::deselect_all(&mut s.tl);
            }
            for &id in ids {
                s.tl[id].flags.selected = true;
            }
            if let Some(&last) = ids.last() {
                s.tl.set_active(Some(last));
            }
            Ok(())
        })
    }

    pub fn deselect_all(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, _| {
            flags::deselect_all(&mut s.tl);
            Ok(())
        })
    }

    /// Set the scene range (or, with `preview`, the preview range) to cover the selection.
    pub fn set_preview_range_to_strips(&mut self, preview: bool) -> StriplineResult<bool> {
        self.run(ChangeScope::FrameOnly, |s, list| {
            flags::set_preview_range_to_strips(&mut s.tl, list, preview)
        })
        .map(|(changed, _)| changed)
    }

    pub fn set_proxies(&mut self, sizes: &[u32], overwrite: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            flags::set_proxies(&mut s.tl, list, sizes, overwrite);
            Ok(())
        })
    }

    /// Queue proxy builds for the selection and start them on a worker thread.
    ///
    /// Skipped strips are listed in the returned reports. Call [`ProxyJob::finish`] with
    /// [`EditSession::host_mut`] once the job is done.
    pub fn rebuild_proxies<B: ProxyBuilder>(&mut self, builder: B) -> (ProxyJob, Reports) {
        self.metas.prune(&self.tl);
        let mut reports = Reports::default();
        let queue = build_proxy_queue(&self.tl, self.metas.current_list(), &mut reports);
        (ProxyJob::submit(queue, builder), reports)
    }

    pub fn meta_enter(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, _| meta::meta_enter(&mut s.tl, &mut s.metas).map(drop))
    }

    pub fn meta_exit(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, _| meta::meta_exit(&mut s.tl, &mut s.metas).map(drop))
    }

    pub fn meta_toggle(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, _| meta::meta_toggle(&mut s.tl, &mut s.metas).map(drop))
    }

    #[tracing::instrument(skip(self))]
    pub fn meta_make(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| meta::meta_make(&mut s.tl, &mut s.host, list).map(drop))
    }

    #[tracing::instrument(skip(self))]
    pub fn meta_separate(&mut self) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| meta::meta_separate(&mut s.tl, &mut s.host, list).map(drop))
    }

    /// Close the gap at the current frame; with `all`, every later gap too.
    #[tracing::instrument(skip(self))]
    pub fn gap_remove(&mut self, all: bool) -> StriplineResult<EditOutcome> {
        self.edit(|s, list| {
            let frame = s.tl.current_frame;
            gap::gap_remove(&mut s.tl, &mut s.host, list, frame, all);
            Ok(())
        })
    }

    /// Open a gap at the current frame, `frames` long or the configured default.
    #[tracing::instrument(skip(self))]
    pub fn gap_insert(&mut self, frames: Option<Frame>) -> StriplineResult<EditOutcome> {
        let frames = frames.unwrap_or(self.settings.gap_insert_frames);
        if frames < 1 {
            return Err(StriplineError::validation("gap length must be >= 1"));
        }
        self.edit(|s, list| {
            let frame = s.tl.current_frame;
            gap::gap_insert(&mut s.tl, &mut s.host, list, frame, frames);
            Ok(())
        })
    }

    /// Move the current frame to the next (or previous) strip edge, or strip centre.
    ///
    /// Muted strips are skipped. Returns the new current frame.
    pub fn strip_jump(&mut self, next: bool, center: bool) -> StriplineResult<Frame> {
        let side = if next { Side::Right } else { Side::Left };
        self.run(ChangeScope::FrameOnly, |s, list| {
            let frame = query::next_edit_frame(&s.tl, list, s.tl.current_frame, side, true, center)
                .ok_or_else(|| StriplineError::precondition("no edit point in that direction"))?;
            s.tl.current_frame = frame;
            Ok(frame)
        })
        .map(|(frame, _)| frame)
    }

    /// Move the current frame. Notifies with the frame-only scope.
    pub fn set_current_frame(&mut self, frame: Frame) {
        self.tl.current_frame = frame;
        self.host.notify(ChangeScope::FrameOnly);
    }

    /// Strip and handle under region position `pointer`, in the working list.
    pub fn pick(&self, pointer: Point, view: &TimelineView) -> Option<(StripId, HandleHit)> {
        query::find_nearest(
            &self.tl,
            self.metas.current_list(),
            view.to_timeline(pointer),
            view,
            &self.settings,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/edit_session.rs"]
mod tests;
