//! Filter descriptors.
//!
//! [`Filters`] is the caller-facing selection input: either one AND-group or
//! a sequence of AND-groups combined with OR. A group maps column paths to
//! [`FilterValue`]s, in insertion order.
//!
//! The value side is an explicit tagged union rather than shape probing, so
//! a legitimate object value (bound as `jsonb`) can never be mistaken for an
//! explicit filter. The JSON conversion layer ([`Filters::from_json`],
//! [`FilterGroup::from_json`]) keeps the permissive contract of the
//! descriptor format: entries that do not classify are dropped, never an
//! error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of an explicit filter.
///
/// # Example
/// ```ignore
/// use pgchain::{FilterGroup, FilterValue};
///
/// let group = FilterGroup::new()
///     .with("age", FilterValue::gte(21))
///     .with("status", FilterValue::not_in(["banned", "deleted"]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not in")]
    NotIn,
}

impl FilterOp {
    /// Parse the descriptor spelling of an operator.
    ///
    /// Unknown spellings yield `None`; the surrounding entry is then dropped
    /// rather than raising.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Gte),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Lte),
            "in" => Some(Self::In),
            "not in" => Some(Self::NotIn),
            _ => None,
        }
    }

    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }
}

/// One column constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A bare scalar, compared with `=`.
    Scalar(Value),
    /// A list of scalars; defaults to `in` on a single-column path.
    List(Vec<Value>),
    /// An explicit operator and value.
    Filter { op: FilterOp, value: Value },
}

impl FilterValue {
    /// Classify a JSON descriptor value.
    ///
    /// Arrays become lists. An object must carry exactly an `op` key with a
    /// recognized operator and a `value` key (the value may be null); any
    /// other object shape is malformed and yields `None`, dropping the entry.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::List(items.clone())),
            Value::Object(map) => {
                if map.len() != 2 {
                    return None;
                }
                let op = map.get("op")?.as_str().and_then(FilterOp::parse)?;
                let value = map.get("value")?.clone();
                Some(Self::Filter { op, value })
            }
            other => Some(Self::Scalar(other.clone())),
        }
    }

    /// An explicit filter with the given operator.
    pub fn filter(op: FilterOp, value: impl Into<Value>) -> Self {
        Self::Filter {
            op,
            value: value.into(),
        }
    }

    pub fn eq(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Eq, value)
    }

    pub fn ne(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Ne, value)
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Gt, value)
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Gte, value)
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Lt, value)
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        Self::filter(FilterOp::Lte, value)
    }

    pub fn in_list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn not_in<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Filter {
            op: FilterOp::NotIn,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<Value> for FilterValue {
    /// Wrap a value as a bare scalar, without reclassification. Use
    /// [`FilterValue::from_json`] for descriptor semantics.
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Scalar(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// One AND-combined set of column constraints, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    entries: Vec<(String, FilterValue)>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint, chainable.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Add a constraint.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up the first constraint on a column path.
    pub fn get(&self, column: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Remove every constraint on a column path, returning the first.
    pub fn remove(&mut self, column: &str) -> Option<FilterValue> {
        let first = self
            .entries
            .iter()
            .position(|(c, _)| c == column)
            .map(|i| self.entries.remove(i).1);
        self.entries.retain(|(c, _)| c != column);
        first
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Classify a JSON object into a group, in the object's key order.
    ///
    /// Non-objects produce an empty group; entries whose value does not
    /// classify are dropped.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::new();
        };
        let mut group = Self::new();
        for (column, raw) in map {
            if let Some(value) = FilterValue::from_json(raw) {
                group.insert(column.clone(), value);
            }
        }
        group
    }
}

/// Selection input: one AND-group, or several combined with OR.
#[derive(Debug, Clone, PartialEq)]
pub enum Filters {
    Group(FilterGroup),
    Any(Vec<FilterGroup>),
}

impl Filters {
    /// No constraints at all.
    pub fn none() -> Self {
        Self::Any(Vec::new())
    }

    /// Coerce to the OR-sequence form, dropping empty groups.
    pub fn into_groups(self) -> Vec<FilterGroup> {
        let groups = match self {
            Self::Group(group) => vec![group],
            Self::Any(groups) => groups,
        };
        groups.into_iter().filter(|g| !g.is_empty()).collect()
    }

    /// Classify a JSON descriptor: an object is one group, an array is an
    /// OR-sequence of groups, anything else is no constraint.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Group(FilterGroup::from_json(value)),
            Value::Array(items) => Self::Any(items.iter().map(FilterGroup::from_json).collect()),
            _ => Self::none(),
        }
    }
}

impl Default for Filters {
    fn default() -> Self {
        Self::none()
    }
}

impl From<FilterGroup> for Filters {
    fn from(group: FilterGroup) -> Self {
        Self::Group(group)
    }
}

impl From<Vec<FilterGroup>> for Filters {
    fn from(groups: Vec<FilterGroup>) -> Self {
        Self::Any(groups)
    }
}

impl<'de> Deserialize<'de> for Filters {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}
