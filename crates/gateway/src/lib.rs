//! OpLang gateway
//!
//! Serves the data source operations over HTTP for dashboard hosts, plus
//! liveness, readiness and Prometheus endpoints.

pub mod api;
pub mod config;
