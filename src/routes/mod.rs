//! Route definitions for the PlateShare API

mod auth;
mod listing;
mod pricing;
mod profile;
mod request;
mod review;

pub use auth::auth_routes;
pub use listing::listing_routes;
pub use pricing::pricing_routes;
pub use profile::profile_routes;
pub use request::request_routes;
pub use review::review_routes;
