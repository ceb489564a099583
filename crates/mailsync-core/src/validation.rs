//! Declarative field validation
//!
//! Rule sets are plain data: a slice of [`FieldRule`]s, each naming a field
//! path and the predicates that apply to it. A single [`validate`] function
//! interprets any rule set against a JSON object.
//!
//! ## Paths
//!
//! - `email_address`: a top-level key
//! - `contact.company`: a key of the `contact` object
//! - `marketing_permissions.*.enabled`: a key of every element of the
//!   `marketing_permissions` sequence
//!
//! A nested rule only applies when its parent value has the right shape.
//! If `contact` is missing, `contact.company` is not checked; the rule on
//! `contact` itself reports the problem.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Field path -> one or more violation messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Whether a field must carry a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Missing, `null`, blank strings and empty sequences are rejected
    Required,
    /// Missing and `null` are accepted
    Nullable,
}

/// Expected shape of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    /// A JSON number or a string that parses as one
    Numeric,
    Object,
    Array,
    Email,
    Ip,
}

/// A single declarative rule
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub path: &'static str,
    pub presence: Presence,
    pub kind: FieldType,
    /// Allowed string values; empty means unrestricted
    pub one_of: &'static [&'static str],
    /// Exact string length in characters
    pub size: Option<usize>,
}

/// A rule set is a slice of rules
pub type RuleSet = [FieldRule];

impl FieldRule {
    pub const fn required(path: &'static str, kind: FieldType) -> Self {
        Self {
            path,
            presence: Presence::Required,
            kind,
            one_of: &[],
            size: None,
        }
    }

    pub const fn nullable(path: &'static str, kind: FieldType) -> Self {
        Self {
            path,
            presence: Presence::Nullable,
            kind,
            one_of: &[],
            size: None,
        }
    }

    /// Restrict the value to one of `values`
    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = values;
        self
    }

    /// Require an exact length
    pub const fn size(mut self, len: usize) -> Self {
        self.size = Some(len);
        self
    }

    /// First path segment, i.e. the top-level key this rule belongs to
    pub fn root(&self) -> &'static str {
        match self.path.split_once('.') {
            Some((root, _)) => root,
            None => self.path,
        }
    }

    fn is_top_level(&self) -> bool {
        !self.path.contains('.')
    }
}

/// Validate `data` against `rules`
///
/// Returns every violation found, keyed by concrete field path
/// (`*` segments are replaced by the element index).
pub fn validate(data: &Map<String, Value>, rules: &RuleSet) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    for rule in rules {
        for (path, value) in resolve(data, rule.path) {
            if let Some(message) = check(rule, &path, value) {
                errors.entry(path).or_default().push(message);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Keep only the top-level keys that some rule declares
pub fn retain_declared(data: Map<String, Value>, rules: &RuleSet) -> Map<String, Value> {
    data.into_iter()
        .filter(|(key, _)| rules.iter().any(|rule| rule.is_top_level() && rule.path == key))
        .collect()
}

/// Expand a rule path into the concrete (path, value) targets present in `data`
fn resolve<'a>(data: &'a Map<String, Value>, path: &str) -> Vec<(String, Option<&'a Value>)> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Vec::new();
    };

    let mut targets = vec![(first.to_string(), data.get(first))];

    for segment in segments {
        let mut next = Vec::new();
        for (prefix, value) in targets {
            match (segment, value) {
                ("*", Some(Value::Array(items))) => {
                    for (index, item) in items.iter().enumerate() {
                        next.push((format!("{prefix}.{index}"), Some(item)));
                    }
                }
                ("*", _) => {}
                (key, Some(Value::Object(map))) => {
                    next.push((format!("{prefix}.{key}"), map.get(key)));
                }
                _ => {}
            }
        }
        targets = next;
    }

    targets
}

fn check(rule: &FieldRule, path: &str, value: Option<&Value>) -> Option<String> {
    let label = display_name(path);

    let value = match value {
        Some(value) if !is_blank(value) => value,
        Some(Value::Null) | None => {
            return match rule.presence {
                Presence::Required => Some(format!("The {label} field is required.")),
                Presence::Nullable => None,
            };
        }
        // Blank but present: only `required` cares, otherwise type-check it
        Some(value) => {
            if rule.presence == Presence::Required {
                return Some(format!("The {label} field is required."));
            }
            value
        }
    };

    let type_error = match rule.kind {
        FieldType::String => (!value.is_string()).then(|| format!("The {label} must be a string.")),
        FieldType::Boolean => {
            (!value.is_boolean()).then(|| format!("The {label} field must be true or false."))
        }
        FieldType::Numeric => (!is_numeric(value)).then(|| format!("The {label} must be a number.")),
        FieldType::Object => (!value.is_object()).then(|| format!("The {label} must be an object.")),
        FieldType::Array => (!value.is_array()).then(|| format!("The {label} must be an array.")),
        FieldType::Email => (!value.as_str().is_some_and(is_email))
            .then(|| format!("The {label} must be a valid email address.")),
        FieldType::Ip => (!value.as_str().is_some_and(|s| s.parse::<IpAddr>().is_ok()))
            .then(|| format!("The {label} must be a valid IP address.")),
    };
    if type_error.is_some() {
        return type_error;
    }

    if !rule.one_of.is_empty() && !value.as_str().is_some_and(|s| rule.one_of.contains(&s)) {
        return Some(format!("The selected {label} is invalid."));
    }

    if let Some(len) = rule.size
        && value.as_str().is_some_and(|s| s.chars().count() != len)
    {
        return Some(format!("The {label} must be {len} characters."));
    }

    None
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn display_name(path: &str) -> String {
    path.replace(['_', '.'], " ")
}
