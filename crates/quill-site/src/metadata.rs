//! Front-matter metadata decoding and typed accessors.
//!
//! Front matter is decoded from YAML into an ordered map. Well-known keys have
//! typed accessors; everything else is reachable through [`Meta::get`] and
//! [`Meta::meta`], which return a defined absent value instead of failing.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use quill_storage::RawFrontMatter;
use serde_json::{Map, Value};

use crate::error::ContentParseError;

/// Ordered front-matter map of a page.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    values: Map<String, Value>,
}

impl Meta {
    /// Decode a raw front-matter block.
    ///
    /// An absent or whitespace-only block yields an empty map.
    ///
    /// # Errors
    ///
    /// Returns [`ContentParseError::FrontMatter`] when the block is
    /// unterminated, malformed, or not a mapping.
    pub fn decode(raw: &RawFrontMatter, path: &Path) -> Result<Self, ContentParseError> {
        let error = |message: String| ContentParseError::FrontMatter {
            path: path.to_path_buf(),
            message,
        };

        let block = match raw {
            RawFrontMatter::Absent => return Ok(Self::default()),
            RawFrontMatter::Unterminated => {
                return Err(error("missing closing --- delimiter".to_owned()));
            }
            RawFrontMatter::Block(block) => block,
        };
        if block.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_yaml::from_str::<Value>(block) {
            Ok(Value::Object(values)) => Ok(Self { values }),
            Ok(Value::Null) => Ok(Self::default()),
            Ok(other) => Err(error(format!(
                "expected a mapping, found {}",
                value_kind(&other)
            ))),
            Err(e) => Err(error(e.to_string())),
        }
    }

    /// Raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Value for a key, or `default` when the key is absent or null.
    #[must_use]
    pub fn meta(&self, key: &str, default: Value) -> Value {
        match self.values.get(key) {
            Some(Value::Null) | None => default,
            Some(value) => value.clone(),
        }
    }

    /// String value for a key; numbers and booleans are stringified.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<String> {
        self.values.get(key).and_then(scalar_to_string)
    }

    /// `title` value.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.string("title").filter(|t| !t.trim().is_empty())
    }

    /// `navigationTitle` value.
    #[must_use]
    pub fn navigation_title(&self) -> Option<String> {
        self.string("navigationTitle")
            .filter(|t| !t.trim().is_empty())
    }

    /// `type` value.
    #[must_use]
    pub fn page_type(&self) -> Option<String> {
        self.string("type").filter(|t| !t.is_empty())
    }

    /// `template` value.
    #[must_use]
    pub fn template(&self) -> Option<String> {
        self.string("template").filter(|t| !t.is_empty())
    }

    /// `weight` value; integer or numeric string.
    #[must_use]
    pub fn weight(&self) -> Option<i64> {
        match self.values.get("weight")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// `date` value.
    ///
    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS`
    /// and RFC 3339. Offsets are normalised to UTC.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDateTime> {
        match self.values.get("date")? {
            Value::String(s) => parse_date(s),
            _ => None,
        }
    }

    /// `draft` flag; `true` or the string `"true"`.
    #[must_use]
    pub fn draft(&self) -> bool {
        match self.values.get("draft") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Underlying ordered map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for Meta {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// Parse a front-matter date string.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Stringify a scalar JSON value.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
