//! Time-series query command

use anyhow::{bail, Result};
use colored::Colorize;
use oplang_lib::{
    DataSource, FieldValues, Frame, QueryRequest, QueryTarget, ScopedVars, TimeRange,
};
use tabled::{builder::Builder, settings::Style};

use crate::output::{print_json, print_warning, OutputFormat};

/// Build the single target the command runs
pub fn target(
    resource: Option<String>,
    metric: Option<String>,
    custom: Option<String>,
) -> Result<QueryTarget> {
    match (custom, resource, metric) {
        (Some(text), None, None) => Ok(QueryTarget::custom("A", text)),
        (None, resource, metric) => Ok(QueryTarget {
            ref_id: "A".to_string(),
            custom: false,
            custom_query_text: None,
            resource_query_text: resource,
            metric_query_text: metric,
        }),
        _ => bail!("--custom cannot be combined with --resource or --metric"),
    }
}

fn cell(values: &FieldValues, row: usize) -> String {
    match values {
        FieldValues::Time(v) => v.get(row).map(|ms| super::format_millis(*ms)),
        FieldValues::Number(v) => v.get(row).copied().flatten().map(|n| n.to_string()),
        FieldValues::String(v) => v.get(row).cloned(),
    }
    .unwrap_or_default()
}

fn frame_table(frame: &Frame) -> String {
    let rows = frame.fields.iter().map(|f| f.values.len()).max().unwrap_or(0);

    let mut builder = Builder::default();
    builder.push_record(frame.fields.iter().map(|f| f.name.clone()));
    for row in 0..rows {
        builder.push_record(frame.fields.iter().map(|f| cell(&f.values, row)));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Run one query and print its frames
pub async fn run_query(
    datasource: &DataSource,
    target: QueryTarget,
    range: TimeRange,
    scoped_vars: ScopedVars,
    format: OutputFormat,
) -> Result<()> {
    let request = QueryRequest {
        targets: vec![target],
        range,
        scoped_vars,
    };
    let response = datasource.query(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            if response.data.is_empty() {
                print_warning("Query returned no series");
                return Ok(());
            }
            for frame in &response.data {
                println!("{}", frame.name.bold());
                println!("{}", frame.meta.executed_statement.dimmed());
                println!("{}", frame_table(frame));
                println!();
            }
        }
    }

    Ok(())
}
