use crate::foundation::error::{StriplineError, StriplineResult};
use crate::host::{CacheKind, CacheTarget, EditHost};
use crate::proxy::{ProxyBuilder, ProxyContext};
use crate::strip::model::StripId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

/// Observed state of a running [`ProxyJob`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    /// Still building; `progress` covers the whole queue, in `0.0..=1.0`.
    Running { progress: f32 },
    /// The worker exited after a cancel request.
    Stopped,
    /// The worker exited after the last item.
    Finished,
}

/// Worker-to-editor messages.
enum Progress {
    Step(f32),
    /// Sent once, after the last item or after stopping on a cancel request.
    Done { stopped: bool },
}

/// What a joined job did.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProxyReport {
    /// Items built to completion.
    pub built: Vec<StripId>,
    pub stopped: bool,
}

/// Background proxy build over a fixed queue.
///
/// The worker only reads its own copy of the queue; strips are never touched. Caches for the
/// queued strips are invalidated in [`ProxyJob::finish`], back on the editing thread.
pub struct ProxyJob {
    stop: Arc<AtomicBool>,
    progress_rx: mpsc::Receiver<Progress>,
    progress: f32,
    /// Set from the worker's final message: whether it stopped early.
    done: Option<bool>,
    strips: Vec<StripId>,
    worker: Option<JoinHandle<StriplineResult<ProxyReport>>>,
}

impl ProxyJob {
    /// Start building `queue` with `builder` on a new thread.
    pub fn submit<B: ProxyBuilder>(queue: Vec<ProxyContext>, mut builder: B) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, progress_rx) = mpsc::channel();
        let strips = queue.iter().map(|c| c.strip).collect();

        let worker_stop = Arc::clone(&stop);
        let worker = std::thread::spawn(move || -> StriplineResult<ProxyReport> {
            let total = queue.len().max(1) as f32;
            let mut report = ProxyReport::default();
            for (i, ctx) in queue.iter().enumerate() {
                if worker_stop.load(Ordering::Relaxed) {
                    report.stopped = true;
                    break;
                }
                let mut on_progress = |p: f32| {
                    let _ = tx.send(Progress::Step((i as f32 + p.clamp(0.0, 1.0)) / total));
                };
                builder.build(ctx, &worker_stop, &mut on_progress)?;
                if worker_stop.load(Ordering::Relaxed) {
                    report.stopped = true;
                    break;
                }
                report.built.push(ctx.strip);
                let _ = tx.send(Progress::Step((i + 1) as f32 / total));
            }
            let _ = tx.send(Progress::Done {
                stopped: report.stopped,
            });
            if report.stopped {
                tracing::info!(built = report.built.len(), "proxy rebuild cancelled");
            }
            Ok(report)
        });

        Self {
            stop,
            progress_rx,
            progress: 0.0,
            done: None,
            strips,
            worker: Some(worker),
        }
    }

    /// Current state. A job that completed its queue reports `Finished` even when a cancel
    /// request arrived afterwards.
    pub fn poll(&mut self) -> JobStatus {
        let exited = self.worker.as_ref().is_none_or(JoinHandle::is_finished);
        while let Ok(msg) = self.progress_rx.try_recv() {
            match msg {
                Progress::Step(p) => self.progress = p,
                Progress::Done { stopped } => self.done = Some(stopped),
            }
        }
        match (self.done, exited) {
            (Some(true), _) => JobStatus::Stopped,
            (Some(false), _) => JobStatus::Finished,
            // Exited on a builder error, without a final message.
            (None, true) if self.stop.load(Ordering::Relaxed) => JobStatus::Stopped,
            (None, true) => JobStatus::Finished,
            (None, false) => JobStatus::Running {
                progress: self.progress,
            },
        }
    }

    /// Ask the worker to stop. Repeated calls are harmless.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Strips whose proxies this job builds.
    pub fn strips(&self) -> &[StripId] {
        &self.strips
    }

    /// Wait for the worker, then invalidate cached images of every queued strip.
    ///
    /// Invalidation happens even when the job was cancelled or a build failed.
    pub fn finish(mut self, host: &mut dyn EditHost) -> StriplineResult<ProxyReport> {
        let joined = match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| StriplineError::Other(anyhow::anyhow!("proxy worker panicked")))
                .and_then(|r| r),
            None => Ok(ProxyReport::default()),
        };
        for &id in &self.strips {
            host.invalidate(CacheTarget::Strip(id), CacheKind::All);
        }
        joined
    }
}

impl Drop for ProxyJob {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop.store(true, Ordering::Relaxed);
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/proxy/job.rs"]
mod tests;
