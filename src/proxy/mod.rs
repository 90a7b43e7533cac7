//! Proxy rebuilds: choosing what to build, and running the build off the editing thread.
//!
//! The engine never encodes proxies itself. [`build_proxy_queue`] turns the selection into
//! [`ProxyContext`] work items and [`job::ProxyJob`] feeds them to a host-supplied
//! [`ProxyBuilder`] on a worker thread.

pub mod job;

use crate::foundation::report::Reports;
use crate::strip::model::{StripId, StripKind};
use crate::strip::timeline::{ListRef, Timeline};
use std::collections::HashSet;
use std::path::PathBuf;

/// One proxy build work item, detached from the timeline.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProxyContext {
    pub strip: StripId,
    pub name: String,
    /// Movie file, or the directory of an image sequence.
    pub media: PathBuf,
    /// Build sizes in percent of the source resolution.
    pub sizes: Vec<u32>,
    pub overwrite: bool,
}

/// Encoder for proxy media, supplied by the host.
pub trait ProxyBuilder: Send + 'static {
    /// Build every size of `ctx`.
    ///
    /// Implementations check `stop` between units of work and return early once it is set.
    /// `progress` takes the completed fraction of this item, in `0.0..=1.0`.
    fn build(
        &mut self,
        ctx: &ProxyContext,
        stop: &std::sync::atomic::AtomicBool,
        progress: &mut dyn FnMut(f32),
    ) -> crate::StriplineResult<()>;
}

/// Collect proxy work for the selected movie, image and meta strips of `list`, recursively.
///
/// Strips that cannot be built are skipped with a warning in `reports`. A media file shared by
/// several strips is queued once.
pub fn build_proxy_queue(tl: &Timeline, list: ListRef, reports: &mut Reports) -> Vec<ProxyContext> {
    let mut queue = Vec::new();
    let mut seen_media = HashSet::new();
    let mut any_selected = false;

    for id in tl.iter_recursive(list) {
        let s = &tl[id];
        let proxyable = matches!(s.kind, StripKind::Movie | StripKind::Image | StripKind::Meta);
        if !s.flags.selected || !proxyable {
            continue;
        }
        any_selected = true;
        if s.is_meta() {
            continue;
        }
        let proxy = &s.content.proxy;
        if !proxy.enabled {
            reports.warn(format!("Proxy is not enabled for {}, skipping", s.name));
            continue;
        }
        if proxy.sizes.is_empty() {
            reports.warn(format!("Resolution is not selected for {}, skipping", s.name));
            continue;
        }

        let mut media = PathBuf::from(&s.content.directory);
        if let (StripKind::Movie, Some(file)) = (s.kind, s.content.path.as_ref()) {
            media.push(file);
        }
        if !seen_media.insert(media.clone()) {
            if !proxy.overwrite {
                reports.warn(format!("Overwrite is not checked for {}, skipping", s.name));
            }
            continue;
        }
        queue.push(ProxyContext {
            strip: id,
            name: s.name.clone(),
            media,
            sizes: proxy.sizes.clone(),
            overwrite: proxy.overwrite,
        });
    }

    if !any_selected {
        reports.warn("Select movie or image strips");
    }
    queue
}

#[cfg(test)]
#[path = "../../tests/unit/proxy/queue.rs"]
mod tests;
