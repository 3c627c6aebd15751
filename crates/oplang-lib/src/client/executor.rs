//! Statement execution against `POST <base>/v1/execute`

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::transport::{Transport, TransportRequest};
use crate::error::{DataSourceError, InputField, Result};
use crate::observability::AdapterMetrics;
use crate::response::{BackendResponse, Payload, Symbol};
use crate::statement::list_statement;

pub const EXECUTE_PATH: &str = "/v1/execute";
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Sends statements to the backend through the host transport
#[derive(Clone)]
pub struct Executor {
    base_url: String,
    transport: Arc<dyn Transport>,
    metrics: AdapterMetrics,
}

impl Executor {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            metrics: AdapterMetrics::new(),
        }
    }

    pub fn execute_url(&self) -> String {
        format!("{}{}", self.base_url, EXECUTE_PATH)
    }

    /// Execute a statement and return the unwrapped JSON body
    ///
    /// Every request carries a fresh UUIDv4 idempotency key so the backend can
    /// drop duplicates of a retried request.
    pub async fn execute(&self, statement: &str) -> Result<serde_json::Value> {
        if statement.is_empty() {
            return Err(DataSourceError::MissingInput(InputField::Statement));
        }

        let idempotency_key = Uuid::new_v4().to_string();
        let mut headers = BTreeMap::new();
        headers.insert(IDEMPOTENCY_HEADER.to_string(), idempotency_key.clone());

        let request = TransportRequest {
            method: Method::POST,
            url: self.execute_url(),
            headers,
            body: json!({ "statement": statement }),
        };

        debug!(statement = %statement, idempotency_key = %idempotency_key, "Executing statement");
        let started = Instant::now();
        let result = self.transport.request(request).await;
        self.metrics
            .observe_execute_latency(started.elapsed().as_secs_f64());

        match result {
            Ok(response) => Ok(response.data),
            Err(err) => {
                warn!(statement = %statement, error = %err, "Statement execution failed");
                Err(err.into())
            }
        }
    }

    /// Run `list <kind>` and return the symbol catalog
    pub async fn list_symbols(&self, kind: &str) -> Result<Vec<Symbol>> {
        let raw = self.execute(list_statement(kind).as_str()).await?;
        match BackendResponse::decode(&raw)?.payload {
            Payload::Symbols(symbols) => Ok(symbols),
            _ => Err(DataSourceError::MissingSymbols),
        }
    }
}
