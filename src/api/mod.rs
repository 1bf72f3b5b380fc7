//! API layer
//!
//! HTTP handlers for:
//! - Landing page and dashboard
//! - Metrics (Prometheus)

pub mod metrics;
mod views;

pub use metrics::metrics_router;
pub use views::{app_router, home_router, render_dashboard, render_home};
