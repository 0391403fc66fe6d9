//! Pickup request domain module
//!
//! Contains models, the lifecycle service, and the background expiry
//! sweeper for claims on food listings.

mod model;
mod service;
mod sweeper;

pub use model::*;
pub use service::RequestService;
pub use sweeper::expiry_sweeper;
