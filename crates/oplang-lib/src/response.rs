//! Typed decoding of `/v1/execute` responses
//!
//! The backend answers every statement with one JSON object whose key set
//! says what was run. [`BackendResponse::decode`] is the only place that
//! inspects those keys: it validates the document with serde and classifies
//! it into a single [`Payload`] variant. `resources` and `stmt` are kept
//! beside the payload because they accompany several shapes (a metric query
//! carries the resources used for name resolution).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DataSourceError, Result};

/// Resource identifier; the backend emits both numbers and strings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Number(n) => write!(f, "{}", n),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

/// Decodes `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The parts of a resource used for name resolution; other keys are ignored
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A resource, or a parent-to-child path such as `host | pod`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ResourceEntry {
    Chain(Vec<Resource>),
    Single(Resource),
}

impl ResourceEntry {
    /// The addressed resource: the single one, or the last of a chain
    pub fn effective(&self) -> Option<&Resource> {
        match self {
            ResourceEntry::Single(resource) => Some(resource),
            ResourceEntry::Chain(chain) => chain.last(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupKind {
    Metric,
    Resource,
    Tag,
    #[serde(other)]
    Other,
}

/// `{group, name, value}` metadata attached to a series
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupInfo {
    pub group: GroupKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetricPoints {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamps: Vec<i64>,
    /// Gaps arrive as `null` and are passed through unfilled
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub group_infos: Vec<GroupInfo>,
    #[serde(default)]
    pub metric: MetricPoints,
}

/// Output of a shell command run on one resource
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CommandResult {
    #[serde(default)]
    pub pod: Option<String>,
    #[serde(default)]
    pub host_id: Option<ResourceId>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_status: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Symbol {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Symbol {
    pub fn description(&self) -> Option<&str> {
        self.attributes
            .get("description")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ResourceData {
    #[serde(default)]
    pub resource_name: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<ResourceId>,
}

/// Alarm, bot or action referenced by an annotation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NamedEntity {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Step {
    pub step_type: String,
    pub timestamp: i64,
    #[serde(default)]
    pub title: Option<String>,
}

/// One annotation of the rollup; `entity_type` selects which context applies
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnnotationRecord {
    pub entity_type: String,
    #[serde(default)]
    pub resource_data: Option<ResourceData>,
    #[serde(default)]
    pub alarm: Option<NamedEntity>,
    #[serde(default)]
    pub bot: Option<NamedEntity>,
    #[serde(default)]
    pub action: Option<NamedEntity>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The shape-determining part of a response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    MetricSeries(Vec<MetricSeries>),
    CommandOutput(Vec<CommandResult>),
    Annotations(Vec<AnnotationRecord>),
    Symbols(Vec<Symbol>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    /// Statement as echoed by the backend (`stmt`)
    pub statement: Option<String>,
    pub resources: Option<Vec<ResourceEntry>>,
    pub payload: Payload,
}

#[derive(Deserialize)]
struct WireListType {
    #[serde(default)]
    symbol: Option<Vec<Symbol>>,
}

#[derive(Deserialize)]
struct WireRollup {
    #[serde(default)]
    annotation_list: Option<Vec<AnnotationRecord>>,
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    stmt: Option<String>,
    #[serde(default)]
    resources: Option<Vec<ResourceEntry>>,
    #[serde(default)]
    metric_query: Option<Vec<MetricSeries>>,
    #[serde(default)]
    linux_cmd: Option<Vec<CommandResult>>,
    #[serde(default)]
    list_type: Option<WireListType>,
    #[serde(default)]
    annotation_query_rollup: Option<WireRollup>,
}

impl BackendResponse {
    pub fn decode(raw: &serde_json::Value) -> Result<Self> {
        let wire = WireResponse::deserialize(raw)?;

        if let Some(resources) = &wire.resources {
            if let Some(index) = resources
                .iter()
                .position(|entry| matches!(entry, ResourceEntry::Chain(chain) if chain.is_empty()))
            {
                return Err(DataSourceError::InvalidResponse(format!(
                    "empty resource chain at index {}",
                    index
                )));
            }
        }

        let symbols = wire.list_type.and_then(|list| list.symbol);
        let annotations = wire
            .annotation_query_rollup
            .and_then(|rollup| rollup.annotation_list);

        let payload = if let Some(series) = wire.metric_query {
            Payload::MetricSeries(series)
        } else if let Some(results) = wire.linux_cmd {
            Payload::CommandOutput(results)
        } else if let Some(records) = annotations {
            Payload::Annotations(records)
        } else if let Some(symbols) = symbols {
            Payload::Symbols(symbols)
        } else {
            Payload::Other
        };

        Ok(Self {
            statement: wire.stmt,
            resources: wire.resources,
            payload,
        })
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        self.resources.as_deref().unwrap_or_default()
    }
}
