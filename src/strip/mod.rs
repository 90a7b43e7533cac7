//! Strip entity model, timing recalculation and overlap resolution.

pub mod model;
pub(crate) mod order;
pub mod overlap;
pub mod timeline;
pub mod timing;
