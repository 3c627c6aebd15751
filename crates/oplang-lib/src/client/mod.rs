//! Communication with the OpLang execution endpoint
//!
//! This module provides:
//! - The [`Transport`] boundary standing in for the host's request service
//! - A reqwest-backed [`HttpTransport`] with bearer credential injection
//! - The [`Executor`], the single choke point every statement goes through

mod executor;
mod transport;

pub use executor::{Executor, EXECUTE_PATH, IDEMPOTENCY_HEADER};
pub use transport::{
    HttpTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
