//! Symbol catalog command

use anyhow::Result;
use oplang_lib::{DataSource, Symbol};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_json, print_table, OutputFormat};

#[derive(Tabled, Serialize)]
struct SymbolRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Symbol> for SymbolRow {
    fn from(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind.clone().unwrap_or_default(),
            description: symbol.description().unwrap_or_default().to_string(),
        }
    }
}

/// List the symbols of one kind, e.g. `metrics` or `resources`
pub async fn list_symbols(datasource: &DataSource, kind: &str, format: OutputFormat) -> Result<()> {
    let symbols = datasource.get_symbols(kind).await?;

    match format {
        OutputFormat::Json => print_json(&symbols)?,
        OutputFormat::Table => {
            let rows: Vec<SymbolRow> = symbols.iter().map(SymbolRow::from).collect();
            print_table(&rows, format);
        }
    }
    Ok(())
}
