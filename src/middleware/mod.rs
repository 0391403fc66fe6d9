//! HTTP middleware for the PlateShare server

mod auth;

pub use auth::{issue_token, AuthKeys, AuthenticatedUser, Claims};
