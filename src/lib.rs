//! Tag and cast based recommendations for a catalog browsing site.
//!
//! The core is [`services::recommendations::RecommendationEngine`]; the
//! [`api`] module exposes it, together with the per-session preference
//! profile it reads from, over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
