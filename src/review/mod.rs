//! Review domain module
//!
//! One rating event per side per completed pickup request.

mod model;
mod service;

pub use model::*;
pub use service::ReviewService;
