//! Atomic, host-notifying editing operations over one timeline.

pub(crate) mod edit_session;
pub(crate) mod outcome;
