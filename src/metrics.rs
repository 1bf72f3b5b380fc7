//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Auth Metrics
    pub static ref LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("octogate_logins_total", "Total number of completed OAuth callbacks"),
        &["provider", "outcome"]
    ).expect("metric can be created");
    pub static ref SESSIONS_ACTIVE: IntGauge = IntGauge::new(
        "octogate_sessions_active",
        "Number of live sessions in the session store"
    ).expect("metric can be created");

    // User Metrics
    pub static ref USERS_CREATED_TOTAL: IntCounter = IntCounter::new(
        "octogate_users_created_total",
        "Total number of user records created on first login"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("octogate_errors_total", "Total number of error responses"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Register all metrics with the global registry
///
/// Safe to call more than once; duplicate registrations are ignored.
pub fn init_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(LOGINS_TOTAL.clone()),
        Box::new(SESSIONS_ACTIVE.clone()),
        Box::new(USERS_CREATED_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
    ];

    for collector in collectors {
        if let Err(error) = REGISTRY.register(collector) {
            if !matches!(error, prometheus::Error::AlreadyReg) {
                tracing::warn!(%error, "Failed to register metric");
            }
        }
    }
}

/// Record the outcome of an OAuth callback
pub fn record_login(provider: &str, outcome: &str) {
    LOGINS_TOTAL.with_label_values(&[provider, outcome]).inc();
}
