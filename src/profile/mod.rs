//! User profile domain module
//!
//! Aggregated reputation and statistics per identity, mutated only through
//! atomic counter increments.

mod model;
mod service;

pub use model::*;
pub use service::ProfileService;
