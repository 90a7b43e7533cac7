use crate::strip::model::StripId;
use crate::strip::timeline::Timeline;

/// Strips an operation touched, found by comparing the timeline before and after it.
///
/// Each list is sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EditOutcome {
    pub created: Vec<StripId>,
    /// Strips present before and after whose stored state differs.
    pub mutated: Vec<StripId>,
    pub destroyed: Vec<StripId>,
}

impl EditOutcome {
    pub fn diff(before: &Timeline, after: &Timeline) -> Self {
        let mut out = Self::default();
        for s in after.strips() {
            match before.get(s.id) {
                None => out.created.push(s.id),
                Some(old) if old != s => out.mutated.push(s.id),
                Some(_) => {}
            }
        }
        out.destroyed = before
            .strips()
            .map(|s| s.id)
            .filter(|&id| !after.contains(id))
            .collect();
        out.created.sort();
        out.mutated.sort();
        out.destroyed.sort();
        out
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.mutated.is_empty() && self.destroyed.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/outcome.rs"]
mod tests;
