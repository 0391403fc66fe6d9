//! Listing domain module
//!
//! Contains models and service for posted food listings.

mod model;
mod service;

pub use model::*;
pub use service::ListingService;
