use crate::foundation::core::{Fps, Frame, FrameSpan};
use crate::foundation::error::{StriplineError, StriplineResult};
use crate::strip::model::{Strip, StripId};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const NAME_SUFFIX_DIGITS: usize = 3;

/// Addresses one sibling list: the top-level list or a meta strip's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ListRef {
    Root,
    Meta(StripId),
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Marker {
    pub frame: Frame,
    pub name: String,
    #[serde(default)]
    pub selected: bool,
}

fn default_frame_end() -> Frame {
    250
}

/// JSON-facing layout of a [`Timeline`]: strips as a flat list, nesting via `children`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
struct TimelineDoc {
    #[serde(default)]
    fps: Fps,
    #[serde(default)]
    current_frame: Frame,
    #[serde(default)]
    frame_start: Frame,
    #[serde(default = "default_frame_end")]
    frame_end: Frame,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preview_range: Option<FrameSpan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    markers: Vec<Marker>,
    #[serde(default)]
    lock_markers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active: Option<StripId>,
    root: Vec<StripId>,
    strips: Vec<Strip>,
}

/// Arena of strips plus the scene state editing operations read and write.
///
/// Every strip lives in exactly one sibling list, either the root list or the `children` of a
/// meta strip. Lists keep their order; operations that care about time order sort explicitly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(into = "TimelineDoc", try_from = "TimelineDoc")]
pub struct Timeline {
    slots: Vec<Option<Strip>>,
    root: Vec<StripId>,
    active: Option<StripId>,
    pub fps: Fps,
    pub current_frame: Frame,
    /// Scene playback range start.
    pub frame_start: Frame,
    /// Scene playback range end (inclusive, like the scene end frame).
    pub frame_end: Frame,
    pub preview_range: Option<FrameSpan>,
    pub markers: Vec<Marker>,
    pub lock_markers: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            root: Vec::new(),
            active: None,
            fps: Fps::default(),
            current_frame: 0,
            frame_start: 0,
            frame_end: default_frame_end(),
            preview_range: None,
            markers: Vec::new(),
            lock_markers: false,
        }
    }
}

impl std::ops::Index<StripId> for Timeline {
    type Output = Strip;

    fn index(&self, id: StripId) -> &Strip {
        match self.slots.get(id.0 as usize).and_then(Option::as_ref) {
            Some(s) => s,
            None => panic!("strip {id} is not part of this timeline"),
        }
    }
}

impl std::ops::IndexMut<StripId> for Timeline {
    fn index_mut(&mut self, id: StripId) -> &mut Strip {
        match self.slots.get_mut(id.0 as usize).and_then(Option::as_mut) {
            Some(s) => s,
            None => panic!("strip {id} is not part of this timeline"),
        }
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a timeline from a JSON reader, validate it and recalculate derived timing.
    pub fn from_reader<R: std::io::Read>(r: R) -> StriplineResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StriplineError::serde(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StriplineResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StriplineError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_writer<W: std::io::Write>(&self, w: W) -> StriplineResult<()> {
        serde_json::to_writer_pretty(w, self)
            .map_err(|e| StriplineError::serde(format!("write timeline JSON: {e}")))
    }

    pub fn get(&self, id: StripId) -> Option<&Strip> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: StripId) -> Option<&mut Strip> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: StripId) -> bool {
        self.get(id).is_some()
    }

    /// Resolve `id` or fail with a validation error naming it.
    pub fn strip(&self, id: StripId) -> StriplineResult<&Strip> {
        self.get(id)
            .ok_or_else(|| StriplineError::validation(format!("unknown strip {id}")))
    }

    /// Number of live strips, including nested meta children.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Every live strip, in arena order.
    pub fn strips(&self) -> impl Iterator<Item = &Strip> {
        self.slots.iter().flatten()
    }

    pub fn active(&self) -> Option<StripId> {
        self.active.filter(|id| self.contains(*id))
    }

    pub fn set_active(&mut self, id: Option<StripId>) {
        self.active = id.filter(|id| self.contains(*id));
    }

    /// Ordered ids of one sibling list. Unknown metas yield an empty list.
    pub fn list(&self, list: ListRef) -> &[StripId] {
        match list {
            ListRef::Root => &self.root,
            ListRef::Meta(id) => self.get(id).map(|s| s.children.as_slice()).unwrap_or(&[]),
        }
    }

    fn list_mut(&mut self, list: ListRef) -> &mut Vec<StripId> {
        match list {
            ListRef::Root => &mut self.root,
            ListRef::Meta(id) => &mut self[id].children,
        }
    }

    /// The list `id` currently lives in.
    pub fn parent_list(&self, id: StripId) -> ListRef {
        match self.get(id).and_then(|s| s.parent) {
            Some(p) => ListRef::Meta(p),
            None => ListRef::Root,
        }
    }

    /// Depth assigned to strips placed directly in `list`.
    pub fn list_depth(&self, list: ListRef) -> u32 {
        match list {
            ListRef::Root => 0,
            ListRef::Meta(id) => self.get(id).map(|s| s.depth + 1).unwrap_or(0),
        }
    }

    /// Pre-order walk over `list` and every nested meta child list.
    pub fn iter_recursive(&self, list: ListRef) -> Vec<StripId> {
        let mut out = Vec::new();
        for &id in self.list(list) {
            self.collect_subtree(id, &mut out);
        }
        out
    }

    /// `id` followed by all of its descendants, pre-order.
    pub fn subtree(&self, id: StripId) -> Vec<StripId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: StripId, out: &mut Vec<StripId>) {
        out.push(id);
        for &c in &self[id].children {
            self.collect_subtree(c, out);
        }
    }

    fn alloc_id(&mut self) -> StripId {
        let id = StripId(self.slots.len() as u32);
        self.slots.push(None);
        id
    }

    /// Append `strip` to `list`, assigning it a fresh id and a name unique in that list.
    pub fn insert(&mut self, list: ListRef, mut strip: Strip) -> StripId {
        let id = self.alloc_id();
        strip.id = id;
        strip.name = self.unique_name(list, &strip.name, None);
        strip.children.clear();
        self.slots[id.0 as usize] = Some(strip);
        self.attach(list, id);
        id
    }

    /// Remove `id` from its list without freeing it.
    pub(crate) fn detach(&mut self, id: StripId) {
        let list = self.parent_list(id);
        self.list_mut(list).retain(|&c| c != id);
        self[id].parent = None;
    }

    /// Append an already-allocated, detached strip to `list` and refresh descendant depths.
    pub(crate) fn attach(&mut self, list: ListRef, id: StripId) {
        let depth = self.list_depth(list);
        self.list_mut(list).push(id);
        self[id].parent = match list {
            ListRef::Root => None,
            ListRef::Meta(m) => Some(m),
        };
        self.set_depth_recursive(id, depth);
    }

    /// Move `id` (with its descendants) to the tail of `list`.
    pub fn move_to_list(&mut self, id: StripId, list: ListRef) {
        self.detach(id);
        self.attach(list, id);
    }

    /// Move `id` to the tail of the list it already lives in.
    pub(crate) fn move_to_tail(&mut self, id: StripId) {
        let list = self.parent_list(id);
        let ids = self.list_mut(list);
        ids.retain(|&c| c != id);
        ids.push(id);
    }

    /// Replace the order of `list` with `order`, a permutation of its current members.
    pub(crate) fn set_list_order(&mut self, list: ListRef, order: Vec<StripId>) {
        *self.list_mut(list) = order;
    }

    /// Point the children of `id` back at it after its `children` were replaced.
    pub(crate) fn adopt_children(&mut self, id: StripId) {
        let depth = self[id].depth;
        self.set_depth_recursive(id, depth);
    }

    fn set_depth_recursive(&mut self, id: StripId, depth: u32) {
        self[id].depth = depth;
        let children = self[id].children.clone();
        for c in children {
            self[c].parent = Some(id);
            self.set_depth_recursive(c, depth + 1);
        }
    }

    /// Free `id` and its descendants. Effect inputs pointing at freed strips are cleared.
    ///
    /// Returns every freed id, pre-order.
    pub fn remove_recursive(&mut self, id: StripId) -> Vec<StripId> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.detach(id);
        let freed = self.subtree(id);
        for &f in &freed {
            self.slots[f.0 as usize] = None;
        }
        let gone: HashSet<StripId> = freed.iter().copied().collect();
        for s in self.slots.iter_mut().flatten() {
            for input in s.inputs.iter_mut() {
                if input.is_some_and(|i| gone.contains(&i)) {
                    *input = None;
                }
            }
        }
        if self.active.is_some_and(|a| gone.contains(&a)) {
            self.active = None;
        }
        freed
    }

    /// Name derived from `base` that no other strip in `list` uses.
    ///
    /// Collisions append a `.NNN` counter to the base name with any existing counter removed.
    pub fn unique_name(&self, list: ListRef, base: &str, exclude: Option<StripId>) -> String {
        let taken: HashSet<&str> = self
            .list(list)
            .iter()
            .filter(|&&id| Some(id) != exclude)
            .filter_map(|&id| self.get(id))
            .map(|s| s.name.as_str())
            .collect();
        if !taken.contains(base) {
            return base.to_string();
        }
        let (stem, mut n) = split_name_counter(base);
        loop {
            n += 1;
            let candidate = format!("{stem}.{n:0width$}", width = NAME_SUFFIX_DIGITS);
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
        }
    }

    /// Rename `id`, resolving collisions within its sibling list.
    pub fn rename(&mut self, id: StripId, name: &str) -> String {
        let list = self.parent_list(id);
        let unique = self.unique_name(list, name, Some(id));
        self[id].name = unique.clone();
        unique
    }

    /// Order `list` with non-effect strips first, then effects, each by channel.
    pub fn sort(&mut self, list: ListRef) {
        let mut ids = self.list(list).to_vec();
        ids.sort_by_key(|&id| {
            let s = &self[id];
            (s.is_effect(), s.channel)
        });
        *self.list_mut(list) = ids;
    }

    /// Whether `from` reaches `target` through effect inputs (or is `target`).
    pub fn input_reaches(&self, from: StripId, target: StripId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(s) = self.get(id) {
                stack.extend(s.input_ids());
            }
        }
        false
    }

    /// Effects anywhere in the timeline that take `id` as a direct input.
    pub fn effects_using(&self, id: StripId) -> Vec<StripId> {
        self.strips()
            .filter(|s| s.input_ids().any(|i| i == id))
            .map(|s| s.id)
            .collect()
    }

    /// Deep clones of `ids` and their descendants, pre-order, for [`Timeline::graft`].
    pub(crate) fn clone_subtrees(&self, ids: &[StripId]) -> Vec<Strip> {
        let mut out = Vec::new();
        for &id in ids {
            for d in self.subtree(id) {
                out.push(self[d].clone());
            }
        }
        out
    }

    /// Insert strips produced by [`Timeline::clone_subtrees`] under fresh ids.
    ///
    /// Nodes whose parent is not part of `nodes` land at the tail of `list` with a unique
    /// name. Effect inputs pointing inside `nodes` follow the copies; inputs pointing outside
    /// are kept when `keep_outside_inputs` is set and dropped otherwise. Returns the old-to-new
    /// id pairs in insertion order.
    pub(crate) fn graft(
        &mut self,
        list: ListRef,
        nodes: Vec<Strip>,
        keep_outside_inputs: bool,
    ) -> Vec<(StripId, StripId)> {
        let mut map = HashMap::with_capacity(nodes.len());
        let mut pairs = Vec::with_capacity(nodes.len());
        for n in &nodes {
            let new_id = self.alloc_id();
            map.insert(n.id, new_id);
            pairs.push((n.id, new_id));
        }

        let mut tops = Vec::new();
        for mut n in nodes {
            let old = n.id;
            let new_id = map[&old];
            let top = !n.parent.is_some_and(|p| map.contains_key(&p));
            n.id = new_id;
            n.parent = n.parent.and_then(|p| map.get(&p).copied());
            n.children = n.children.iter().filter_map(|c| map.get(c).copied()).collect();
            for input in n.inputs.iter_mut() {
                *input = match *input {
                    Some(i) => match map.get(&i) {
                        Some(&m) => Some(m),
                        None if keep_outside_inputs && self.contains(i) => Some(i),
                        None => None,
                    },
                    None => None,
                };
            }
            self.slots[new_id.0 as usize] = Some(n);
            if top {
                tops.push(new_id);
            }
        }

        for id in tops {
            let base = self[id].name.clone();
            self[id].name = self.unique_name(list, &base, None);
            self.attach(list, id);
        }
        pairs
    }

    /// Check structural invariants: list membership, parents, channels, names, timing, inputs.
    pub fn validate(&self) -> StriplineResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        let mut seen = HashSet::new();
        let mut lists = vec![ListRef::Root];
        while let Some(list) = lists.pop() {
            let mut names = HashSet::new();
            let parent = match list {
                ListRef::Root => None,
                ListRef::Meta(m) => Some(m),
            };
            for &id in self.list(list) {
                let s = self.get(id).ok_or_else(|| {
                    StriplineError::validation(format!("list references unknown strip {id}"))
                })?;
                if !seen.insert(id) {
                    return Err(StriplineError::validation(format!(
                        "strip '{}' appears in more than one list",
                        s.name
                    )));
                }
                if s.parent != parent {
                    return Err(StriplineError::validation(format!(
                        "strip '{}' has an inconsistent parent",
                        s.name
                    )));
                }
                if s.channel == 0 {
                    return Err(StriplineError::validation(format!(
                        "strip '{}' is on channel 0 (channels start at 1)",
                        s.name
                    )));
                }
                if !names.insert(s.name.as_str()) {
                    return Err(StriplineError::validation(format!(
                        "duplicate strip name '{}' in one list",
                        s.name
                    )));
                }
                validate_timing(s)?;
                if !s.children.is_empty() && !s.is_meta() {
                    return Err(StriplineError::validation(format!(
                        "strip '{}' has children but is not a meta strip",
                        s.name
                    )));
                }
                if s.is_meta() {
                    lists.push(ListRef::Meta(id));
                }
            }
        }
        if seen.len() != self.len() {
            return Err(StriplineError::validation(
                "timeline holds strips that are not in any list",
            ));
        }

        for s in self.strips() {
            for input in s.input_ids() {
                let target = self.get(input).ok_or_else(|| {
                    StriplineError::validation(format!(
                        "effect '{}' references unknown input {input}",
                        s.name
                    ))
                })?;
                if self.input_reaches(input, s.id) {
                    return Err(StriplineError::integrity(format!(
                        "effect '{}' depends on itself through '{}'",
                        s.name, target.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Authoritative timing fields must keep `start_disp <= end_disp` after recalculation.
fn validate_timing(s: &Strip) -> StriplineResult<()> {
    let fields = [
        ("len", s.len),
        ("start_ofs", s.start_ofs),
        ("end_ofs", s.end_ofs),
        ("start_still", s.start_still),
        ("end_still", s.end_still),
        ("anim_start_ofs", s.anim_start_ofs),
        ("anim_end_ofs", s.anim_end_ofs),
    ];
    if let Some((field, v)) = fields.into_iter().find(|&(_, v)| v < 0) {
        return Err(StriplineError::validation(format!(
            "strip '{}' has negative {field} ({v})",
            s.name
        )));
    }
    if s.start_ofs.checked_add(s.end_ofs).is_none_or(|trim| trim > s.len) {
        return Err(StriplineError::validation(format!(
            "strip '{}' trims {} + {} frames off a length of {}",
            s.name, s.start_ofs, s.end_ofs, s.len
        )));
    }
    Ok(())
}

/// Split `name.001` into `("name", 1)`; names without a numeric counter give `(name, 0)`.
fn split_name_counter(name: &str) -> (&str, u32) {
    if let Some((stem, digits)) = name.rsplit_once('.') {
        if !stem.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = digits.parse() {
                return (stem, n);
            }
        }
    }
    (name, 0)
}

impl From<Timeline> for TimelineDoc {
    fn from(tl: Timeline) -> Self {
        let order = tl.iter_recursive(ListRef::Root);
        let Timeline {
            mut slots,
            root,
            active,
            fps,
            current_frame,
            frame_start,
            frame_end,
            preview_range,
            markers,
            lock_markers,
        } = tl;
        let strips = order
            .into_iter()
            .filter_map(|id| slots.get_mut(id.0 as usize).and_then(Option::take))
            .collect();
        Self {
            fps,
            current_frame,
            frame_start,
            frame_end,
            preview_range,
            markers,
            lock_markers,
            active,
            root,
            strips,
        }
    }
}

impl TryFrom<TimelineDoc> for Timeline {
    type Error = StriplineError;

    fn try_from(doc: TimelineDoc) -> Result<Self, Self::Error> {
        let TimelineDoc {
            root,
            active,
            strips,
            ..
        } = doc;

        // File ids are only keys: renumber them densely in ascending order.
        let mut file_ids: Vec<StripId> = strips.iter().map(|s| s.id).collect();
        file_ids.sort_unstable();
        if let Some(w) = file_ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(StriplineError::validation(format!(
                "duplicate strip id {}",
                w[0]
            )));
        }
        let dense: HashMap<StripId, StripId> = file_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, StripId(i as u32)))
            .collect();
        let remap_list = |ids: Vec<StripId>| -> StriplineResult<Vec<StripId>> {
            ids.into_iter()
                .map(|id| {
                    dense.get(&id).copied().ok_or_else(|| {
                        StriplineError::validation(format!("list references unknown strip {id}"))
                    })
                })
                .collect()
        };

        let mut slots: Vec<Option<Strip>> = vec![None; strips.len()];
        for mut s in strips {
            let id = dense[&s.id];
            s.id = id;
            s.children = remap_list(std::mem::take(&mut s.children))?;
            for input in s.inputs.iter_mut() {
                let Some(old) = *input else { continue };
                *input = Some(dense.get(&old).copied().ok_or_else(|| {
                    StriplineError::validation(format!(
                        "effect '{}' references unknown input {old}",
                        s.name
                    ))
                })?);
            }
            slots[id.0 as usize] = Some(s);
        }
        let root = remap_list(root)?;
        let active = active.and_then(|a| dense.get(&a).copied());

        let mut tl = Timeline {
            slots,
            root,
            active,
            fps: doc.fps,
            current_frame: doc.current_frame,
            frame_start: doc.frame_start,
            frame_end: doc.frame_end,
            preview_range: doc.preview_range,
            markers: doc.markers,
            lock_markers: doc.lock_markers,
        };

        let mut metas = Vec::new();
        for &id in &tl.root {
            if let Some(s) = tl.get(id) {
                if s.is_meta() {
                    metas.push(id);
                }
            }
        }
        let mut visited = HashSet::new();
        while let Some(m) = metas.pop() {
            if !visited.insert(m) {
                continue;
            }
            let children = tl[m].children.clone();
            let depth = tl[m].depth + 1;
            for c in children {
                if let Some(s) = tl.get_mut(c) {
                    s.parent = Some(m);
                    s.depth = depth;
                    if s.is_meta() {
                        metas.push(c);
                    }
                }
            }
        }

        tl.validate()?;
        tl.active = tl.active();
        crate::strip::timing::recalc_all(&mut tl);
        Ok(tl)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/strip/timeline.rs"]
mod tests;
