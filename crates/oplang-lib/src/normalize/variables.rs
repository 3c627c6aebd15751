use crate::error::{DataSourceError, Result};
use crate::models::MetricFindValue;
use crate::response::{BackendResponse, Payload, ResourceEntry};

/// Dropdown values from a resource list or a symbol catalog
///
/// Resources win when both are present.
pub fn normalize_variable_response(response: &BackendResponse) -> Result<Vec<MetricFindValue>> {
    if let Some(resources) = &response.resources {
        return Ok(resources
            .iter()
            .filter_map(ResourceEntry::effective)
            .map(|resource| MetricFindValue {
                text: resource.name.clone(),
            })
            .collect());
    }

    if let Payload::Symbols(symbols) = &response.payload {
        return Ok(symbols
            .iter()
            .map(|symbol| MetricFindValue {
                text: symbol.name.clone(),
            })
            .collect());
    }

    Err(DataSourceError::UnrecognizedVariableResponse)
}
