//! CLI command implementations and their shared argument parsing

pub mod events;
pub mod health;
pub mod query;
pub mod symbols;
pub mod vars;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use clap::Args;
use oplang_lib::{ScopedVars, TimeRange};

/// Time window flags shared by `query` and `events`
#[derive(Args, Debug, Clone)]
pub struct TimeArgs {
    /// Look back this far from now (e.g., 15m, 1h, 7d)
    #[arg(long, default_value = "1h", conflicts_with_all = ["from", "to"])]
    pub since: String,

    /// Window start (epoch milliseconds or RFC 3339)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Window end (epoch milliseconds or RFC 3339)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl TimeArgs {
    pub fn range(&self) -> Result<TimeRange> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => {
                let range = TimeRange::new(parse_time(from)?, parse_time(to)?);
                if range.from > range.to {
                    bail!("--from must not be after --to");
                }
                Ok(range)
            }
            _ => Ok(TimeRange::last(parse_since(&self.since)?)),
        }
    }
}

/// Parse a lookback such as `30s`, `15m`, `1h`, `7d` or `2w`
pub fn parse_since(since: &str) -> Result<Duration> {
    let since = since.trim();
    let split = since
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(since.len());
    let (amount, unit) = since.split_at(split);
    let amount: i64 = amount
        .parse()
        .with_context(|| format!("invalid duration: {}", since))?;

    let duration = match unit {
        "s" => Duration::seconds(amount),
        "m" => Duration::minutes(amount),
        "h" | "" => Duration::hours(amount),
        "d" => Duration::days(amount),
        "w" => Duration::weeks(amount),
        other => bail!("unknown duration unit '{}' in {}", other, since),
    };
    Ok(duration)
}

/// Epoch milliseconds from either a bare integer or an RFC 3339 timestamp
pub fn parse_time(value: &str) -> Result<i64> {
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid timestamp: {}", value))?;
    Ok(parsed.timestamp_millis())
}

/// Template variables from repeated `--var name=value` flags
pub fn parse_vars(vars: &[String]) -> Result<ScopedVars> {
    let mut scope = ScopedVars::new();
    for var in vars {
        let (name, value) = var
            .split_once('=')
            .with_context(|| format!("expected name=value, got {}", var))?;
        if name.is_empty() {
            bail!("variable name missing in {}", var);
        }
        scope.insert(name.to_string(), value.to_string());
    }
    Ok(scope)
}

/// Format epoch milliseconds for display
pub fn format_millis(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_since_units() {
        assert_eq!(parse_since("30s").unwrap(), Duration::seconds(30));
        assert_eq!(parse_since("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_since("2").unwrap(), Duration::hours(2));
        assert_eq!(parse_since("7d").unwrap(), Duration::days(7));
        assert!(parse_since("1y").is_err());
        assert!(parse_since("h").is_err());
    }

    #[test]
    fn test_parse_time_accepts_millis_and_rfc3339() {
        assert_eq!(parse_time("1652933807000").unwrap(), 1652933807000);
        assert_eq!(parse_time("1970-01-01T00:00:01.500Z").unwrap(), 1500);
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn test_explicit_range() {
        let args = TimeArgs {
            since: "1h".to_string(),
            from: Some("1000".to_string()),
            to: Some("2000".to_string()),
        };
        assert_eq!(args.range().unwrap(), TimeRange::new(1000, 2000));

        let reversed = TimeArgs {
            since: "1h".to_string(),
            from: Some("2000".to_string()),
            to: Some("1000".to_string()),
        };
        assert!(reversed.range().is_err());
    }

    #[test]
    fn test_since_range_spans_window() {
        let args = TimeArgs {
            since: "1h".to_string(),
            from: None,
            to: None,
        };
        let range = args.range().unwrap();
        assert_eq!(range.to - range.from, 3_600_000);
    }

    #[test]
    fn test_parse_vars() {
        let scope = parse_vars(&["host=i-1234".to_string(), "q=a=b".to_string()]).unwrap();
        assert_eq!(scope["host"], "i-1234");
        assert_eq!(scope["q"], "a=b");

        assert!(parse_vars(&["novalue".to_string()]).is_err());
        assert!(parse_vars(&["=x".to_string()]).is_err());
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "1970-01-01 00:00:00");
    }
}
