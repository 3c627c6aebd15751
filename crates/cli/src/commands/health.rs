//! Backend connectivity check

use anyhow::{bail, Result};
use oplang_lib::DataSource;

use crate::output::{print_error, print_json, print_success, OutputFormat};

/// Run the health statement; a failed check exits non-zero
pub async fn check(datasource: &DataSource, format: OutputFormat) -> Result<()> {
    let health = datasource.test_datasource().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table if health.is_success() => print_success(&health.message),
        OutputFormat::Table => print_error(&health.message),
    }

    if !health.is_success() {
        bail!("backend health check failed");
    }
    Ok(())
}
