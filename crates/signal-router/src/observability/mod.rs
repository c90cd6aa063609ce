//! Observability: health endpoints.
//!
//! The `/metrics` endpoint is served separately via
//! `metrics-exporter-prometheus`, composed onto the app router in main.

mod health;

pub use health::{health_router, HealthState};
