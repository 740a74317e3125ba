//! Query-string encoding for paginated, filtered and sorted searches.
//!
//! Filters travel in a single `request` parameter using the backend's
//! grammar: comma-separated ``field<op>`value` `` tokens where `<op>` is one
//! of `:` (equal / contains), `<` or `>`.
use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters escaped in the filter fragment. Mirrors what a browser's
/// `encodeURI` leaves intact, minus the delimiters of the query string itself.
const FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'$');

static FILTER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+?)(:|<|>)`([^`]+)`$").expect("valid filter token pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("malformed filter `{0}`")]
    Malformed(String),
    #[error("filter fragment is not valid UTF-8 once decoded")]
    Encoding,
    #[error("unknown sort direction `{0}`")]
    Direction(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOrder {
    #[default]
    Equal,
    LessThan,
    GreaterThan,
}

impl FilterOrder {
    pub fn as_operator(&self) -> char {
        match self {
            FilterOrder::Equal => ':',
            FilterOrder::LessThan => '<',
            FilterOrder::GreaterThan => '>',
        }
    }

    pub fn from_operator(op: char) -> Option<Self> {
        match op {
            ':' => Some(FilterOrder::Equal),
            '<' => Some(FilterOrder::LessThan),
            '>' => Some(FilterOrder::GreaterThan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: String,
    #[serde(default)]
    pub order: FilterOrder,
}

impl Filter {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_order(field, value, FilterOrder::Equal)
    }

    pub fn with_order(
        field: impl Into<String>,
        value: impl Into<String>,
        order: FilterOrder,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            order,
        }
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_order(field, value, FilterOrder::LessThan)
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_order(field, value, FilterOrder::GreaterThan)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}`{}`", self.field, self.order.as_operator(), self.value)
    }
}

/// Parses `field:value`, `field<value` or `field>value`. The value may be
/// backquoted already.
impl FromStr for Filter {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || FilterParseError::Malformed(s.to_string());
        let (idx, op) = s
            .char_indices()
            .find(|(_, c)| FilterOrder::from_operator(*c).is_some())
            .ok_or_else(malformed)?;
        let field = s[..idx].trim();
        let raw = s[idx + op.len_utf8()..].trim();
        let value = raw
            .strip_prefix('`')
            .and_then(|v| v.strip_suffix('`'))
            .unwrap_or(raw);
        let order = FilterOrder::from_operator(op).ok_or_else(malformed)?;
        if field.is_empty() || value.is_empty() {
            return Err(malformed());
        }
        Ok(Filter::with_order(field, value, order))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Value of the `order` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(FilterParseError::Direction(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Parses `field`, `field:asc` or `field:desc`.
impl FromStr for Sort {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field.trim(), dir.parse()?),
            None => (s.trim(), SortDirection::Ascending),
        };
        if field.is_empty() {
            return Err(FilterParseError::Malformed(s.to_string()));
        }
        Ok(Sort {
            field: field.to_string(),
            direction,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// Page length, at least 1.
    pub size: u32,
    /// 0-based page index.
    pub page: u32,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: Option<Sort>,
}

impl SearchParameters {
    pub fn new(size: u32, page: u32) -> Self {
        Self {
            size: size.max(1),
            page,
            filters: Vec::new(),
            sort: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Raw grammar text of the filters, before percent-encoding.
pub fn encode_filters(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Serializes the parameters into a query string (without the leading `?`).
pub fn encode_query(params: &SearchParameters) -> String {
    // Fields are public and deserializable, so `new`'s clamp may be bypassed.
    let mut query = format!("size={}&page={}", params.size.max(1), params.page);
    if !params.filters.is_empty() {
        let fragment = encode_filters(&params.filters);
        query.push_str("&request=");
        query.push_str(&utf8_percent_encode(&fragment, FRAGMENT).to_string());
    }
    if let Some(sort) = &params.sort {
        query.push_str("&sortBy=");
        query.push_str(&utf8_percent_encode(&sort.field, FRAGMENT).to_string());
        query.push_str("&order=");
        query.push_str(sort.direction.as_param());
    }
    query
}

/// Request target for a search against `path`.
pub fn search_target(path: &str, params: &SearchParameters) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, encode_query(params))
}

/// Recovers the filters from an encoded `request` fragment, in order.
pub fn decode_filters(fragment: &str) -> Result<Vec<Filter>, FilterParseError> {
    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .map_err(|_| FilterParseError::Encoding)?;
    if decoded.is_empty() {
        return Ok(Vec::new());
    }
    decoded
        .split(',')
        .map(|token| {
            let caps = FILTER_TOKEN
                .captures(token)
                .ok_or_else(|| FilterParseError::Malformed(token.to_string()))?;
            let order = caps[2]
                .chars()
                .next()
                .and_then(FilterOrder::from_operator)
                .ok_or_else(|| FilterParseError::Malformed(token.to_string()))?;
            Ok(Filter::with_order(&caps[1], &caps[3], order))
        })
        .collect()
}
