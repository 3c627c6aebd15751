//! Annotation records to host events
//!
//! Each record describes one entity (a resource, action, alarm or bot) and
//! the steps it went through. Every step becomes one event; steps are
//! ordered by timestamp within their record, records keep their order.

use std::str::FromStr;

use crate::error::{DataSourceError, Result};
use crate::models::Event;
use crate::response::{AnnotationRecord, BackendResponse, NamedEntity, Payload, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Resource,
    Action,
    Alarm,
    Bot,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Resource => "RESOURCE",
            EntityKind::Action => "ACTION",
            EntityKind::Alarm => "ALARM",
            EntityKind::Bot => "BOT",
        }
    }
}

impl FromStr for EntityKind {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RESOURCE" => Ok(EntityKind::Resource),
            "ACTION" => Ok(EntityKind::Action),
            "ALARM" => Ok(EntityKind::Alarm),
            "BOT" => Ok(EntityKind::Bot),
            other => Err(DataSourceError::UnsupportedEntityType(other.to_string())),
        }
    }
}

fn context<'a>(
    kind: EntityKind,
    entity: &'a Option<NamedEntity>,
    field: &'static str,
) -> Result<&'a str> {
    entity
        .as_ref()
        .map(|e| e.name.as_str())
        .ok_or(DataSourceError::MissingEntityContext {
            entity: kind.as_str(),
            field,
        })
}

/// Titles and texts shared by every step of one record
struct Projection {
    subject: String,
    text: Option<String>,
    tags: Option<Vec<String>>,
}

fn project(kind: EntityKind, record: &AnnotationRecord) -> Result<Projection> {
    let resource_name = record
        .resource_data
        .as_ref()
        .map(|data| data.resource_name.as_str())
        .ok_or(DataSourceError::MissingEntityContext {
            entity: kind.as_str(),
            field: "resource_data",
        })?;
    let status = || Some(vec![record.status.clone().unwrap_or_default()]);

    let projection = match kind {
        EntityKind::Resource => Projection {
            subject: resource_name.to_string(),
            text: None,
            tags: None,
        },
        EntityKind::Action => {
            let action = context(kind, &record.action, "action")?;
            let bot = context(kind, &record.bot, "bot")?;
            Projection {
                subject: format!("{} on {}", action, resource_name),
                text: Some(format!("BOT: {}, ACTION: {}", bot, action)),
                tags: status(),
            }
        }
        EntityKind::Alarm => {
            let alarm = context(kind, &record.alarm, "alarm")?;
            Projection {
                subject: format!("{} on {}", alarm, resource_name),
                text: None,
                tags: status(),
            }
        }
        EntityKind::Bot => {
            let bot = context(kind, &record.bot, "bot")?;
            let alarm = context(kind, &record.alarm, "alarm")?;
            let action = context(kind, &record.action, "action")?;
            Projection {
                subject: format!("{} on {}", bot, resource_name),
                text: Some(format!("ALARM: {}, ACTION: {}", alarm, action)),
                tags: status(),
            }
        }
    };
    Ok(projection)
}

fn record_to_events(record: &AnnotationRecord) -> Result<Vec<Event>> {
    let kind: EntityKind = record.entity_type.parse()?;
    let projection = project(kind, record)?;

    // stable: steps sharing a timestamp keep their order
    let mut steps: Vec<&Step> = record.steps.iter().collect();
    steps.sort_by_key(|step| step.timestamp);

    Ok(steps
        .into_iter()
        .map(|step| Event {
            title: format!("{}: {}", step.step_type, projection.subject),
            time: step.timestamp,
            text: projection.text.clone(),
            tags: projection.tags.clone(),
        })
        .collect())
}

/// Flatten records into events, record order first, then step time
pub fn records_to_events(records: &[AnnotationRecord]) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for record in records {
        events.extend(record_to_events(record)?);
    }
    Ok(events)
}

/// Events for an annotation query response
pub fn normalize_annotations(response: &BackendResponse) -> Result<Vec<Event>> {
    match &response.payload {
        Payload::Annotations(records) => records_to_events(records),
        _ => Err(DataSourceError::MissingAnnotations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<AnnotationRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn resource_data() -> serde_json::Value {
        json!({
            "host_id": "1",
            "resource_id": "1",
            "resource_name": "i-1234",
            "resource_type": "HOST"
        })
    }

    #[test]
    fn test_alarm_steps_sorted_by_time() {
        let events = records_to_events(&records(json!([{
            "entity_type": "ALARM",
            "alarm": {"name": "cpu_host_alarm"},
            "resource_data": resource_data(),
            "status": "resolved",
            "steps": [
                {"step_type": "ALARM_CLEAR", "timestamp": 1652933813000i64},
                {"step_type": "ALARM_FIRE", "timestamp": 1652933807000i64}
            ]
        }])))
        .unwrap();

        assert_eq!(
            events,
            vec![
                Event {
                    title: "ALARM_FIRE: cpu_host_alarm on i-1234".to_string(),
                    time: 1652933807000,
                    text: None,
                    tags: Some(vec!["resolved".to_string()]),
                },
                Event {
                    title: "ALARM_CLEAR: cpu_host_alarm on i-1234".to_string(),
                    time: 1652933813000,
                    text: None,
                    tags: Some(vec!["resolved".to_string()]),
                },
            ]
        );
    }

    #[test]
    fn test_resource_events_have_no_tags() {
        let events = records_to_events(&records(json!([{
            "entity_type": "RESOURCE",
            "resource_data": resource_data(),
            "status": "open",
            "steps": [{"step_type": "RESOURCE_CREATED", "timestamp": 5}]
        }])))
        .unwrap();

        assert_eq!(events[0].title, "RESOURCE_CREATED: i-1234");
        assert_eq!(events[0].tags, None);
        assert_eq!(events[0].text, None);
    }

    #[test]
    fn test_action_and_bot_texts() {
        let events = records_to_events(&records(json!([
            {
                "entity_type": "ACTION",
                "action": {"name": "restart_pod"},
                "bot": {"name": "cpu_bot"},
                "resource_data": resource_data(),
                "status": "completed",
                "steps": [{"step_type": "ACTION_START", "timestamp": 1}]
            },
            {
                "entity_type": "BOT",
                "action": {"name": "restart_pod"},
                "alarm": {"name": "cpu_host_alarm"},
                "bot": {"name": "cpu_bot"},
                "resource_data": resource_data(),
                "status": "completed",
                "steps": [{"step_type": "BOT_TRIGGERED", "timestamp": 0}]
            }
        ])))
        .unwrap();

        assert_eq!(events[0].title, "ACTION_START: restart_pod on i-1234");
        assert_eq!(events[0].text.as_deref(), Some("BOT: cpu_bot, ACTION: restart_pod"));
        assert_eq!(events[0].tags, Some(vec!["completed".to_string()]));

        // records are not re-sorted against each other
        assert_eq!(events[1].title, "BOT_TRIGGERED: cpu_bot on i-1234");
        assert_eq!(
            events[1].text.as_deref(),
            Some("ALARM: cpu_host_alarm, ACTION: restart_pod")
        );
    }

    #[test]
    fn test_equal_timestamps_keep_order() {
        let events = records_to_events(&records(json!([{
            "entity_type": "RESOURCE",
            "resource_data": resource_data(),
            "steps": [
                {"step_type": "B", "timestamp": 2},
                {"step_type": "FIRST", "timestamp": 1},
                {"step_type": "SECOND", "timestamp": 1}
            ]
        }])))
        .unwrap();

        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["FIRST: i-1234", "SECOND: i-1234", "B: i-1234"]);
    }

    #[test]
    fn test_unknown_entity_type_fails() {
        let err = records_to_events(&records(json!([{
            "entity_type": "UNKNOWN",
            "resource_data": resource_data(),
            "steps": []
        }])))
        .unwrap_err();

        assert!(matches!(err, DataSourceError::UnsupportedEntityType(ref t) if t == "UNKNOWN"));
        assert!(err.to_string().contains("UNKNOWN"));
    }

    #[test]
    fn test_missing_context_is_reported() {
        let err = records_to_events(&records(json!([{
            "entity_type": "ACTION",
            "action": null,
            "bot": {"name": "cpu_bot"},
            "resource_data": resource_data(),
            "steps": [{"step_type": "ACTION_START", "timestamp": 1}]
        }])))
        .unwrap_err();

        assert_eq!(err.to_string(), "ACTION event is missing `action`");
    }

    #[test]
    fn test_normalize_requires_annotation_list() {
        let response = BackendResponse::decode(&json!({"annotation_query_rollup": {}})).unwrap();
        let err = normalize_annotations(&response).unwrap_err();
        assert_eq!(err.to_string(), "annotation query result missing from response");
    }
}
