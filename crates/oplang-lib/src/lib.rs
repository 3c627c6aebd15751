//! Adapter library between the OpLang execution API and a visualization host
//!
//! This crate provides the core functionality for:
//! - Building OpLang statements from host queries
//! - Executing statements against the `/v1/execute` endpoint
//! - Decoding backend responses into typed shapes
//! - Normalizing responses into frames, variable values and events
//! - Health checks and observability

pub mod client;
pub mod datasource;
pub mod error;
pub mod health;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod response;
pub mod statement;
pub mod template;

pub use client::{
    Executor, HttpTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
pub use datasource::{DataSource, DataSourceSettings};
pub use error::{DataSourceError, InputField, Result};
pub use health::{
    ComponentHealth, ComponentStatus, DataSourceHealth, HealthRegistry, HealthResponse,
    HealthStatus, ReadinessResponse,
};
pub use models::*;
pub use observability::{AdapterMetrics, RequestKind, StructuredLogger};
pub use response::{BackendResponse, Symbol};
pub use template::{Interpolator, NoopInterpolator, VariableInterpolator};
