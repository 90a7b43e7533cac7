use crate::strip::model::StripId;
use crate::strip::timeline::{ListRef, Timeline};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Effect inputs of one node; never more than three.
pub(crate) type InputDeps = SmallVec<[u32; 3]>;

/// Deterministic dependency-count scheduler over the effect strips of one list.
///
/// Nodes are list positions. An effect depends on each of its inputs that is itself an effect
/// in the same list. Determinism rule: when several effects are ready, the one earliest in the
/// list is returned first.
pub(crate) struct EffectScheduler {
    indeg: Vec<u32>,
    dependents: Vec<Vec<u32>>,
    ready: BinaryHeap<Reverse<u32>>,
    remaining: usize,
}

impl EffectScheduler {
    /// `deps[i]` lists the node indices node `i` consumes.
    pub(crate) fn new(deps: &[InputDeps]) -> Self {
        let n = deps.len();
        let mut indeg = vec![0u32; n];
        let mut dependents = vec![Vec::<u32>::new(); n];

        for (i, ds) in deps.iter().enumerate() {
            for &d in ds {
                dependents[d as usize].push(i as u32);
                indeg[i] = indeg[i].saturating_add(1);
            }
        }

        let mut ready = BinaryHeap::<Reverse<u32>>::new();
        for (i, &deg) in indeg.iter().enumerate() {
            if deg == 0 {
                ready.push(Reverse(i as u32));
            }
        }

        Self {
            indeg,
            dependents,
            ready,
            remaining: n,
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.remaining
    }

    pub(crate) fn pop_ready(&mut self) -> Option<u32> {
        let Reverse(i) = self.ready.pop()?;
        Some(i)
    }

    pub(crate) fn mark_done(&mut self, done: u32) {
        self.remaining = self.remaining.saturating_sub(1);
        for &dep in &self.dependents[done as usize] {
            let d = &mut self.indeg[dep as usize];
            *d = d.saturating_sub(1);
            if *d == 0 {
                self.ready.push(Reverse(dep));
            }
        }
    }
}

/// Effect strips of `list`, inputs before the effects that consume them.
///
/// Effects caught in an input cycle cannot be ordered; they follow in list order.
pub(crate) fn effect_order(tl: &Timeline, list: ListRef) -> Vec<StripId> {
    let effects: Vec<StripId> = tl
        .list(list)
        .iter()
        .copied()
        .filter(|&id| tl[id].is_effect())
        .collect();
    let index: HashMap<StripId, u32> = effects
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i as u32))
        .collect();
    let deps: Vec<InputDeps> = effects
        .iter()
        .map(|&id| {
            tl[id]
                .input_ids()
                .filter_map(|i| index.get(&i).copied())
                .collect()
        })
        .collect();

    let mut sched = EffectScheduler::new(&deps);
    let mut done = vec![false; effects.len()];
    let mut out = Vec::with_capacity(effects.len());
    while let Some(next) = sched.pop_ready() {
        out.push(effects[next as usize]);
        done[next as usize] = true;
        sched.mark_done(next);
    }
    if sched.remaining() > 0 {
        tracing::warn!(
            remaining = sched.remaining(),
            "effect inputs form a cycle; recalculating in list order"
        );
        out.extend(
            effects
                .iter()
                .zip(&done)
                .filter(|(_, d)| !**d)
                .map(|(id, _)| *id),
        );
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/strip/order.rs"]
mod tests;
