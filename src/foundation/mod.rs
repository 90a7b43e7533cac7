//! Shared primitives: frame arithmetic, the error taxonomy, editing settings and reports.

pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod report;
pub(crate) mod settings;
