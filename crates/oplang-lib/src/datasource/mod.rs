//! Request orchestration
//!
//! [`DataSource`] drives each host request kind through the same pipeline:
//! build the statement, interpolate it, execute it, normalize the response.
//! - time-series queries fan out one request per target and join them
//! - variable and annotation queries issue a single request
//! - the health check runs `host` and looks for a resource list

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use tracing::debug;

use crate::client::{Executor, HttpTransport, Transport};
use crate::error::{DataSourceError, Result};
use crate::health::DataSourceHealth;
use crate::models::{
    AnnotationQuery, Event, MetricFindValue, QueryRequest, QueryResponse, ScopedVars,
    VariableQuery,
};
use crate::normalize::{
    frames_from_response, normalize_annotations, normalize_variable_response, sort_frames,
};
use crate::observability::{AdapterMetrics, RequestKind, StructuredLogger};
use crate::response::{BackendResponse, Symbol};
use crate::statement::{
    build_annotation_statement, build_query_statement, build_variable_statement,
};
use crate::template::{Interpolator, VariableInterpolator};


/// Statement used by the connectivity check
pub const HEALTH_STATEMENT: &str = "host";

/// Connection settings for one backend
#[derive(Debug, Clone)]
pub struct DataSourceSettings {
    pub name: String,
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl DataSourceSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: "oplang".to_string(),
            url: url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The adapter between host requests and the OpLang backend
pub struct DataSource {
    executor: Executor,
    interpolator: Arc<dyn Interpolator>,
    metrics: AdapterMetrics,
    logger: StructuredLogger,
}

impl DataSource {
    pub fn new(settings: &DataSourceSettings, transport: Arc<dyn Transport>) -> Self {
        Self {
            executor: Executor::new(settings.url.clone(), transport),
            interpolator: Arc::new(VariableInterpolator::new()),
            metrics: AdapterMetrics::new(),
            logger: StructuredLogger::new(settings.name.clone()),
        }
    }

    /// Data source over a reqwest transport built from `settings`
    pub fn connect(settings: &DataSourceSettings) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout, settings.api_key.clone())?;
        Ok(Self::new(settings, Arc::new(transport)))
    }

    pub fn with_interpolator(mut self, interpolator: Arc<dyn Interpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    fn observe<T>(&self, kind: RequestKind, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.metrics.inc_request_errors(kind);
            self.logger.log_failure(kind, err);
        }
        result
    }

    async fn execute_decoded(&self, statement: &str) -> Result<BackendResponse> {
        let raw = self.executor.execute(statement).await?;
        BackendResponse::decode(&raw)
    }

    /// Frames for every target, sorted by name descending
    ///
    /// Targets run concurrently; the first failure fails the whole query.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        let started = Instant::now();
        let result = self.run_query(request).await;
        if let Ok(response) = &result {
            self.metrics.add_frames(response.data.len());
            self.logger.log_query(
                request.targets.len(),
                response.data.len(),
                started.elapsed().as_millis(),
            );
        }
        self.observe(RequestKind::Query, result)
    }

    async fn run_query(&self, request: &QueryRequest) -> Result<QueryResponse> {
        // validate every target before anything goes on the wire
        let statements = request
            .targets
            .iter()
            .map(|target| {
                let statement = build_query_statement(target, request.range)?;
                let interpolated = self
                    .interpolator
                    .interpolate(statement.as_str(), &request.scoped_vars);
                Ok::<_, DataSourceError>((target.ref_id.as_str(), interpolated))
            })
            .collect::<Result<Vec<_>>>()?;

        self.metrics
            .inc_statements(RequestKind::Query, statements.len() as u64);

        let per_target = try_join_all(statements.iter().map(|(ref_id, statement)| async move {
            let response = self.execute_decoded(statement).await?;
            let frames = frames_from_response(&response, ref_id, statement);
            debug!(ref_id = %ref_id, frames = frames.len(), "Normalized target response");
            Ok::<_, DataSourceError>(frames)
        }))
        .await?;

        Ok(QueryResponse {
            data: sort_frames(per_target.into_iter().flatten().collect()),
        })
    }

    /// Values for a template variable dropdown
    ///
    /// The query is interpolated only when a scope is supplied.
    pub async fn metric_find_query(
        &self,
        query: &VariableQuery,
        scope: Option<&ScopedVars>,
    ) -> Result<Vec<MetricFindValue>> {
        let result = async {
            let statement = build_variable_statement(&query.query)?.into_string();
            let statement = match scope {
                Some(scope) => self.interpolator.interpolate(&statement, scope),
                None => statement,
            };
            self.metrics.inc_statements(RequestKind::Variable, 1);

            let response = self.execute_decoded(&statement).await?;
            let values = normalize_variable_response(&response)?;
            self.logger.log_variable_query(&statement, values.len());
            Ok::<_, DataSourceError>(values)
        }
        .await;
        self.observe(RequestKind::Variable, result)
    }

    /// Events for an annotation expression over its time range
    pub async fn annotation_query(&self, query: &AnnotationQuery) -> Result<Vec<Event>> {
        let result = async {
            let statement = build_annotation_statement(&query.expr, query.range)?;
            self.metrics.inc_statements(RequestKind::Annotation, 1);

            let response = self.execute_decoded(statement.as_str()).await?;
            let events = normalize_annotations(&response)?;
            self.metrics.add_events(events.len());
            self.logger.log_annotations(statement.as_str(), events.len());
            Ok::<_, DataSourceError>(events)
        }
        .await;
        self.observe(RequestKind::Annotation, result)
    }

    /// Connectivity check: success iff the `host` response carries a `resources` key
    ///
    /// The body is not decoded, so any value under `resources` counts.
    /// Transport failures are returned as errors, not as an error status.
    pub async fn test_datasource(&self) -> Result<DataSourceHealth> {
        let result = async {
            self.metrics.inc_statements(RequestKind::Health, 1);
            let raw = self.executor.execute(HEALTH_STATEMENT).await?;

            let has_resources = raw
                .as_object()
                .is_some_and(|body| body.contains_key("resources"));
            let health = if has_resources {
                DataSourceHealth::success()
            } else {
                DataSourceHealth::error(format!(
                    "Health check test query failed, response data: {}",
                    raw
                ))
            };
            self.logger
                .log_health_check(health.is_success(), &health.message);
            Ok::<_, DataSourceError>(health)
        }
        .await;
        self.observe(RequestKind::Health, result)
    }

    /// Symbol catalog for `kind`, e.g. `metrics` or `resources`
    pub async fn get_symbols(&self, kind: &str) -> Result<Vec<Symbol>> {
        self.metrics.inc_statements(RequestKind::Symbols, 1);
        let result = self.executor.list_symbols(kind).await;
        self.observe(RequestKind::Symbols, result)
    }
}
