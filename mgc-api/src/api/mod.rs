//! HTTP API handlers for mgc-api

pub mod analyze;
pub mod health;
pub mod ratings;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use ratings::rating_routes;
