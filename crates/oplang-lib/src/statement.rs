//! OpLang statement assembly
//!
//! Statements are pipelines of the form
//! `<lhs> [| <stage>]* [| from=<ms>] [| to=<ms>]`. They are only ever built
//! here, never parsed; the backend owns the language.

use std::fmt;

use crate::error::{DataSourceError, InputField, Result};
use crate::models::{QueryTarget, TimeRange};

const STAGE_SEPARATOR: &str = " | ";

/// Statement text ready to be interpolated and executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(String);

impl Statement {
    fn pipeline<'a>(stages: impl IntoIterator<Item = &'a str>, range: Option<TimeRange>) -> Self {
        let mut text = stages.into_iter().collect::<Vec<_>>().join(STAGE_SEPARATOR);
        if let Some(range) = range {
            text.push_str(&format!(
                "{sep}from={}{sep}to={}",
                range.from,
                range.to,
                sep = STAGE_SEPARATOR
            ));
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Statement {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated view of a [`QueryTarget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind<'a> {
    Custom(&'a str),
    Structured { resource: &'a str, metric: &'a str },
}

impl<'a> QueryKind<'a> {
    pub fn of(target: &'a QueryTarget) -> Result<Self> {
        if target.custom {
            let text = required(target.custom_query_text.as_deref(), InputField::CustomQuery)?;
            return Ok(QueryKind::Custom(text));
        }

        let resource = required(target.resource_query_text.as_deref(), InputField::ResourceQuery)?;
        let metric = required(target.metric_query_text.as_deref(), InputField::MetricQuery)?;
        Ok(QueryKind::Structured { resource, metric })
    }
}

fn required(text: Option<&str>, field: InputField) -> Result<&str> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(DataSourceError::MissingInput(field)),
    }
}

/// Statement for a panel target over `range`
pub fn build_query_statement(target: &QueryTarget, range: TimeRange) -> Result<Statement> {
    let statement = match QueryKind::of(target)? {
        QueryKind::Custom(text) => Statement::pipeline([text], Some(range)),
        QueryKind::Structured { resource, metric } => {
            Statement::pipeline([resource, metric], Some(range))
        }
    };
    Ok(statement)
}

/// Statement for an annotation expression over `range`
pub fn build_annotation_statement(expr: &str, range: TimeRange) -> Result<Statement> {
    let expr = required(Some(expr), InputField::AnnotationQuery)?;
    Ok(Statement::pipeline([expr], Some(range)))
}

/// Variable queries are sent as written
pub fn build_variable_statement(query: &str) -> Result<Statement> {
    let query = required(Some(query), InputField::VariableQuery)?;
    Ok(Statement::pipeline([query], None))
}

/// `list <kind>` catalog lookup
pub fn list_statement(kind: &str) -> Statement {
    Statement(format!("list {}", kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> TimeRange {
        TimeRange::new(1000, 2000)
    }

    #[test]
    fn test_structured_statement() {
        let target = QueryTarget::structured("A", "host", "cpu_usage");
        let stmt = build_query_statement(&target, range()).unwrap();
        assert_eq!(stmt.as_str(), "host | cpu_usage | from=1000 | to=2000");
    }

    #[test]
    fn test_custom_statement_ends_with_range() {
        let target = QueryTarget::custom("A", "host | filter(name =~ \"i-\") | cpu_usage");
        let range = TimeRange::new(1_652_933_800_000, 1_652_933_900_000);
        let stmt = build_query_statement(&target, range).unwrap();
        assert!(stmt
            .as_str()
            .ends_with("| from=1652933800000 | to=1652933900000"));
        assert!(stmt.as_str().starts_with("host | filter"));
    }

    #[test]
    fn test_custom_ignores_structured_fields() {
        let mut target = QueryTarget::custom("A", "pods");
        target.resource_query_text = Some("host".to_string());
        let stmt = build_query_statement(&target, range()).unwrap();
        assert_eq!(stmt.as_str(), "pods | from=1000 | to=2000");
    }

    #[test]
    fn test_custom_requires_text() {
        let mut target = QueryTarget::custom("A", "");
        let err = build_query_statement(&target, range()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingInput(InputField::CustomQuery)));

        target.custom_query_text = None;
        let err = build_query_statement(&target, range()).unwrap_err();
        assert_eq!(err.to_string(), "must provide an OpLang query");
    }

    #[test]
    fn test_structured_missing_fields_are_distinct() {
        let mut target = QueryTarget::structured("A", "", "cpu_usage");
        let err = build_query_statement(&target, range()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingInput(InputField::ResourceQuery)));
        assert_eq!(err.to_string(), "must provide a resource query");

        target.resource_query_text = Some("host".to_string());
        target.metric_query_text = None;
        let err = build_query_statement(&target, range()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingInput(InputField::MetricQuery)));
        assert_eq!(err.to_string(), "must provide a metric query");
    }

    #[test]
    fn test_resource_checked_before_metric() {
        let target = QueryTarget {
            ref_id: "A".to_string(),
            ..Default::default()
        };
        let err = build_query_statement(&target, range()).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingInput(InputField::ResourceQuery)));
    }

    #[test]
    fn test_annotation_statement() {
        let stmt = build_annotation_statement("events", range()).unwrap();
        assert_eq!(stmt.to_string(), "events | from=1000 | to=2000");

        let err = build_annotation_statement("", range()).unwrap_err();
        assert_eq!(err.to_string(), "must provide a nonempty annotation query");
    }

    #[test]
    fn test_variable_statement_passes_through() {
        let stmt = build_variable_statement("list resources").unwrap();
        assert_eq!(stmt.into_string(), "list resources");

        let err = build_variable_statement("").unwrap_err();
        assert!(matches!(err, DataSourceError::MissingInput(InputField::VariableQuery)));
    }

    #[test]
    fn test_list_statement() {
        assert_eq!(list_statement("metrics").as_str(), "list metrics");
    }
}
