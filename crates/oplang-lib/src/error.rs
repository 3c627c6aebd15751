//! Error types shared by the builder, executor and normalizers

use std::fmt;

use thiserror::Error;

use crate::client::TransportError;

pub type Result<T> = std::result::Result<T, DataSourceError>;

/// Caller-supplied text that must be non-empty before anything is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    CustomQuery,
    ResourceQuery,
    MetricQuery,
    VariableQuery,
    AnnotationQuery,
    Statement,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InputField::CustomQuery => "an OpLang query",
            InputField::ResourceQuery => "a resource query",
            InputField::MetricQuery => "a metric query",
            InputField::VariableQuery => "a nonempty query",
            InputField::AnnotationQuery => "a nonempty annotation query",
            InputField::Statement => "a nonempty statement",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("must provide {0}")]
    MissingInput(InputField),

    #[error("variable query must be a resource query or list symbol")]
    UnrecognizedVariableResponse,

    #[error("annotation query result missing from response")]
    MissingAnnotations,

    #[error("list response missing list_type.symbol")]
    MissingSymbols,

    #[error("{entity} event is missing `{field}`")]
    MissingEntityContext {
        entity: &'static str,
        field: &'static str,
    },

    #[error("events of type {0} not supported")]
    UnsupportedEntityType(String),

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl DataSourceError {
    /// True for faults detected before any request was issued
    pub fn is_validation(&self) -> bool {
        matches!(self, DataSourceError::MissingInput(_))
    }
}
