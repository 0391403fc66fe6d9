//! HTTP handlers for the PlateShare API

mod auth;
mod listing;
mod pricing;
mod profile;
mod request;
mod review;

pub use auth::*;
pub use listing::*;
pub use pricing::*;
pub use profile::*;
pub use request::*;
pub use review::*;
