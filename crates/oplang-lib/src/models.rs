//! Core data models exchanged with the visualization host

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Template variables available to interpolation, keyed by variable name
pub type ScopedVars = BTreeMap<String, String>;

/// Inclusive query window in epoch milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    pub fn from_datetimes(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: from.timestamp_millis(),
            to: to.timestamp_millis(),
        }
    }

    /// Window ending now and spanning `window`
    pub fn last(window: Duration) -> Self {
        let to = Utc::now();
        Self::from_datetimes(to - window, to)
    }
}

/// A single panel target as the host sends it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTarget {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_query_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_query_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_query_text: Option<String>,
}

impl QueryTarget {
    /// Target built from a resource expression and a metric expression
    pub fn structured(
        ref_id: impl Into<String>,
        resource: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            ref_id: ref_id.into(),
            custom: false,
            custom_query_text: None,
            resource_query_text: Some(resource.into()),
            metric_query_text: Some(metric.into()),
        }
    }

    /// Target carrying raw OpLang text
    pub fn custom(ref_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            custom: true,
            custom_query_text: Some(text.into()),
            resource_query_text: None,
            metric_query_text: None,
        }
    }
}

/// Request for the time-series orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub targets: Vec<QueryTarget>,
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default)]
    pub scoped_vars: ScopedVars,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub data: Vec<Frame>,
}

/// Template variable lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableQuery {
    #[serde(default)]
    pub query: String,
}

impl VariableQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Annotation (event) lookup over a time window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationQuery {
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub range: TimeRange,
}

/// One variable dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFindValue {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Time,
    Number,
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Time(Vec<i64>),
    /// `None` is a gap and serializes as `null`
    Number(Vec<Option<f64>>),
    String(Vec<String>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Time(v) => v.len(),
            FieldValues::Number(v) => v.len(),
            FieldValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column of a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub values: FieldValues,
}

impl Field {
    pub fn time(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Time,
            values: FieldValues::Time(values),
        }
    }

    pub fn number(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Number,
            values: FieldValues::Number(values),
        }
    }

    pub fn string(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            values: FieldValues::String(values),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameMeta {
    #[serde(rename = "executedQueryString")]
    pub executed_statement: String,
}

/// Normalized tabular output unit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub ref_id: String,
    pub name: String,
    pub meta: FrameMeta,
    pub fields: Vec<Field>,
}

impl Frame {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Flattened annotation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_from_datetimes_uses_millis() {
        let from = Utc.timestamp_millis_opt(1_500).unwrap();
        let to = Utc.timestamp_millis_opt(2_750).unwrap();
        assert_eq!(TimeRange::from_datetimes(from, to), TimeRange::new(1_500, 2_750));
    }

    #[test]
    fn test_query_target_deserializes_host_json() {
        let target: QueryTarget = serde_json::from_str(
            r#"{"refId":"A","resourceQueryText":"host","metricQueryText":"cpu_usage"}"#,
        )
        .unwrap();
        assert_eq!(target, QueryTarget::structured("A", "host", "cpu_usage"));
    }

    #[test]
    fn test_frame_serializes_for_host() {
        let frame = Frame {
            ref_id: "A".to_string(),
            name: "cpu_usage: i-1234".to_string(),
            meta: FrameMeta {
                executed_statement: "host | cpu_usage".to_string(),
            },
            fields: vec![Field::time("Time", vec![1000]), Field::number("Value", vec![Some(3.0)])],
        };

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["refId"], "A");
        assert_eq!(json["meta"]["executedQueryString"], "host | cpu_usage");
        assert_eq!(json["fields"][0]["type"], "time");
        assert_eq!(json["fields"][0]["values"][0], 1000);
        assert_eq!(json["fields"][1]["type"], "number");
    }

    #[test]
    fn test_event_skips_absent_optionals() {
        let event = Event {
            title: "ALARM_FIRE: host".to_string(),
            time: 10,
            text: None,
            tags: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("text").is_none());
        assert!(json.get("tags").is_none());
    }
}
