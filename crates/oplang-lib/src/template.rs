//! Template variable interpolation
//!
//! The host normally owns interpolation; the core only depends on the
//! [`Interpolator`] trait. [`VariableInterpolator`] covers the common
//! `$name`, `${name}`, `${name:format}` and `[[name]]` forms so the gateway
//! and CLI can run without a host.

use crate::models::ScopedVars;

/// Pure string substitution of variables from `scope` into `text`
pub trait Interpolator: Send + Sync {
    fn interpolate(&self, text: &str, scope: &ScopedVars) -> String;
}

/// Returns the text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopInterpolator;

impl Interpolator for NoopInterpolator {
    fn interpolate(&self, text: &str, _scope: &ScopedVars) -> String {
        text.to_string()
    }
}

/// Substitutes known variables, leaving unknown references untouched
#[derive(Debug, Clone, Default)]
pub struct VariableInterpolator {
    defaults: ScopedVars,
}

impl VariableInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values used when the request scope does not define a variable
    pub fn with_defaults(defaults: ScopedVars) -> Self {
        Self { defaults }
    }

    fn lookup<'a>(&'a self, name: &str, scope: &'a ScopedVars) -> Option<&'a str> {
        scope
            .get(name)
            .or_else(|| self.defaults.get(name))
            .map(String::as_str)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl Interpolator for VariableInterpolator {
    fn interpolate(&self, text: &str, scope: &ScopedVars) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find(|c: char| c == '$' || c == '[') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            // (reference length, variable name)
            let reference = if let Some(body) = tail.strip_prefix("${") {
                body.find('}').map(|end| {
                    let inner = &body[..end];
                    let name = inner.split(':').next().unwrap_or(inner);
                    (end + 3, name)
                })
            } else if let Some(body) = tail.strip_prefix("[[") {
                body.find("]]").map(|end| {
                    let inner = &body[..end];
                    let name = inner.split(':').next().unwrap_or(inner);
                    (end + 4, name)
                })
            } else if let Some(body) = tail.strip_prefix('$') {
                let end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
                Some((end + 1, &body[..end]))
            } else {
                None
            };

            match reference.and_then(|(len, name)| self.lookup(name, scope).map(|v| (len, v))) {
                Some((len, value)) => {
                    out.push_str(value);
                    rest = &tail[len..];
                }
                None => {
                    // not a known variable, keep the leading character
                    let c = tail.chars().next().map(char::len_utf8).unwrap_or(1);
                    out.push_str(&tail[..c]);
                    rest = &tail[c..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}
