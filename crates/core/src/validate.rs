use regex::Regex;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;

use crate::arm::ArmId;

/// Table-driven value checks attached to schema attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validator {
    NonEmpty,
    OneOf(&'static [&'static str]),
    OneOfIgnoreCase(&'static [&'static str]),
    ResourceId,
    HttpUrl,
    IntAtLeast(i64),
    IntBetween(i64, i64),
    Pattern { regex: &'static str, hint: &'static str },
}

/// Azure resource group names.
pub const RESOURCE_GROUP_NAME: Validator = Validator::Pattern {
    regex: r"^[-\w._()]{0,89}[-\w_()]$",
    hint: "may only contain alphanumeric characters, dashes, underscores, parentheses and periods, cannot end in a period and is at most 90 characters",
};

impl Validator {
    /// Checks a single value. Values of the wrong JSON type pass here;
    /// type conformance is reported by the schema walk.
    pub fn check(&self, value: &Json) -> Result<(), String> {
        match self {
            Validator::NonEmpty => match value.as_str() {
                Some(s) if s.trim().is_empty() => Err("must not be empty".into()),
                _ => Ok(()),
            },
            Validator::OneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.contains(&s) => {
                    Err(format!("expected one of {:?}, got {:?}", allowed, s))
                }
                _ => Ok(()),
            },
            Validator::OneOfIgnoreCase(allowed) => match value.as_str() {
                Some(s) if !allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) => {
                    Err(format!("expected one of {:?}, got {:?}", allowed, s))
                }
                _ => Ok(()),
            },
            Validator::ResourceId => match value.as_str() {
                Some(s) => ArmId::parse(s)
                    .map(|_| ())
                    .map_err(|e| format!("expected a resource id: {}", e)),
                None => Ok(()),
            },
            Validator::HttpUrl => match value.as_str() {
                Some(s) => check_http_url(s),
                None => Ok(()),
            },
            Validator::IntAtLeast(min) => match value.as_i64() {
                Some(n) if n < *min => Err(format!("must be at least {}, got {}", min, n)),
                _ => Ok(()),
            },
            Validator::IntBetween(min, max) => match value.as_i64() {
                Some(n) if n < *min || n > *max => {
                    Err(format!("must be between {} and {}, got {}", min, max, n))
                }
                _ => Ok(()),
            },
            Validator::Pattern { regex, hint } => match value.as_str() {
                Some(s) => {
                    let re = compiled(*regex)?;
                    if re.is_match(s) { Ok(()) } else { Err(hint.to_string()) }
                }
                None => Ok(()),
            },
        }
    }
}

/// Compiles each pattern once per process. `Regex` clones share the compiled program.
fn compiled(pattern: &'static str) -> Result<Regex, String> {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();
    let mut cache = CACHE
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern).map_err(|e| format!("bad pattern {:?}: {}", pattern, e))?;
    cache.insert(pattern, re.clone());
    Ok(re)
}

fn check_http_url(s: &str) -> Result<(), String> {
    let parsed = url::Url::parse(s).map_err(|e| format!("expected a URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(format!("URL {:?} has no host", s)),
        other => Err(format!("expected an http or https URL, got scheme {:?}", other)),
    }
}

/// One failed check, addressed by a dotted attribute path (`criteria.0.metric_name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every violation found in one pass over a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

fn join(v: &[Violation]) -> String {
    v.iter().map(|x| x.to_string()).collect::<Vec<_>>().join("; ")
}

impl ValidationErrors {
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.path.as_str()).collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.iter().any(|v| v.path == path)
    }
}
