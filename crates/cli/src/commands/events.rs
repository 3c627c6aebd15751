//! Annotation events command

use anyhow::Result;
use oplang_lib::{AnnotationQuery, DataSource, Event, TimeRange};
use serde::Serialize;
use tabled::Tabled;

use super::format_millis;
use crate::output::{print_json, print_table, OutputFormat};

/// Row for the events table
#[derive(Tabled, Serialize)]
struct EventRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Details")]
    text: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            time: format_millis(event.time),
            title: event.title.clone(),
            text: event.text.clone().unwrap_or_default(),
            tags: event.tags.as_deref().unwrap_or_default().join(", "),
        }
    }
}

/// Show events for an annotation expression
pub async fn show_events(
    datasource: &DataSource,
    expr: &str,
    range: TimeRange,
    format: OutputFormat,
) -> Result<()> {
    let events = datasource
        .annotation_query(&AnnotationQuery {
            expr: expr.to_string(),
            range,
        })
        .await?;

    match format {
        OutputFormat::Json => print_json(&events)?,
        OutputFormat::Table => {
            let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
            print_table(&rows, format);
        }
    }
    Ok(())
}
