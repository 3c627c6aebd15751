//! Template variable lookup command

use anyhow::Result;
use oplang_lib::{DataSource, ScopedVars, VariableQuery};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct ValueRow {
    #[tabled(rename = "Value")]
    text: String,
}

/// Print the dropdown values a variable statement produces
///
/// Variables are only substituted when at least one `--var` was given.
pub async fn find_values(
    datasource: &DataSource,
    statement: &str,
    scoped_vars: ScopedVars,
    format: OutputFormat,
) -> Result<()> {
    let scope = (!scoped_vars.is_empty()).then_some(&scoped_vars);
    let values = datasource
        .metric_find_query(&VariableQuery::new(statement), scope)
        .await?;

    let rows: Vec<ValueRow> = values
        .into_iter()
        .map(|value| ValueRow { text: value.text })
        .collect();
    print_table(&rows, format);
    Ok(())
}
