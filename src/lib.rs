//! PlateShare Core Service Library
//!
//! This library exports the core modules for the PlateShare food-sharing
//! backend: the listing/request lifecycle, the pricing fairness evaluator,
//! and their supporting infrastructure.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod profile;
pub mod request;
pub mod review;
pub mod routes;
pub mod state;
