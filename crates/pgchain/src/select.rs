//! Select compilation.
//!
//! [`compile_select`] turns a table reference, a [`Filters`] descriptor, and
//! [`SelectOptions`] into a parameterized `select` statement. Chain-routed
//! tables are rewritten first (see [`crate::chain`]), then every filter key
//! is normalized to the schema's snake_case convention, then the predicate
//! is emitted.
//!
//! Malformed filter entries compile to "no constraint": a null value, an
//! empty list, a list containing a nested list, or an entry whose descriptor
//! shape did not classify is skipped silently. A selection whose every entry
//! is skipped compiles to the unfiltered select.
//!
//! # Example
//!
//! ```ignore
//! use pgchain::{compile_select, FilterGroup, SelectOptions};
//!
//! let payload = compile_select(
//!     "public.users",
//!     FilterGroup::new().with("id", 5_i64),
//!     &SelectOptions::default(),
//! )?;
//! assert_eq!(payload.sql, r#"select * from "public"."users" where "id" = $1"#);
//! ```

use crate::chain;
use crate::error::QueryResult;
use crate::filter::{FilterGroup, FilterOp, FilterValue, Filters};
use crate::ident;
use crate::naming;
use crate::sql::Sql;
use crate::value::{BindValue, QueryPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column holding the block height on chain-partitioned tables.
const BLOCK_NUMBER_COLUMN: &str = "block_number";

/// Sort direction for `order by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    /// Parse the descriptor spelling; unknown spellings yield `None` and the
    /// direction is omitted from the compiled statement.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// `order by` clause: one or more column paths and an optional direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub columns: Vec<String>,
    pub direction: Option<OrderDirection>,
}

impl OrderBy {
    /// Ascending sort on one column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
            direction: Some(OrderDirection::Asc),
        }
    }

    /// Descending sort on one column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            columns: vec![column.into()],
            direction: Some(OrderDirection::Desc),
        }
    }

    /// Sort on several columns.
    pub fn columns<I>(columns: I, direction: OrderDirection) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            direction: Some(direction),
        }
    }
}

impl<'de> Deserialize<'de> for OrderBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        #[derive(Deserialize)]
        struct Raw {
            column: OneOrMany,
            #[serde(default)]
            direction: Option<String>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let columns = match raw.column {
            OneOrMany::One(column) => vec![column],
            OneOrMany::Many(columns) => columns,
        };
        let direction = raw.direction.as_deref().and_then(OrderDirection::parse);
        Ok(Self { columns, direction })
    }
}

/// Inclusive block-height window, `[from]` or `[from, to]`.
///
/// Boundaries are embedded as literals, not bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: i64,
    pub to: Option<i64>,
}

impl BlockRange {
    /// Everything at or above `from`.
    pub fn since(from: i64) -> Self {
        Self { from, to: None }
    }

    /// Everything between `from` and `to`, inclusive.
    pub fn between(from: i64, to: i64) -> Self {
        Self { from, to: Some(to) }
    }
}

impl<'de> Deserialize<'de> for BlockRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bounds = Vec::<i64>::deserialize(deserializer)?;
        match bounds[..] {
            [from] => Ok(Self::since(from)),
            [from, to, ..] => Ok(Self::between(from, to)),
            [] => Err(serde::de::Error::invalid_length(0, &"[from] or [from, to]")),
        }
    }
}

/// Options applied around the compiled predicate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectOptions {
    pub order_by: Option<OrderBy>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    /// Explicit chain selection for logical-schema tables.
    pub chain_id: Option<String>,
    pub block_range: Option<BlockRange>,
}

/// Compile a `select * from <table>` with a WHERE clause, ordering/paging
/// suffix, and positional bindings.
///
/// Binding indices are contiguous from `$1` and `bindings[n - 1]` is the
/// value bound to `$n`. Malformed filter entries are skipped, never an
/// error; the fallible part is chain routing.
pub fn compile_select(
    table: &str,
    filters: impl Into<Filters>,
    options: &SelectOptions,
) -> QueryResult<QueryPayload> {
    let filters: Filters = filters.into();
    let (table, groups) = chain::route(table, filters.into_groups(), options)?;

    let mut sql = Sql::new("select * from ");
    sql.push_ident(&table);

    let group_sqls: Vec<Sql> = groups
        .iter()
        .map(compile_group)
        .filter(|g| !g.is_empty())
        .collect();
    let range_sql = options.block_range.map(block_range_sql);

    let has_predicate = !group_sqls.is_empty();
    let has_range = range_sql.is_some();

    if has_predicate || has_range {
        sql.push(" where ");
    }
    if has_predicate {
        if has_range {
            sql.push("(");
        }
        let many = group_sqls.len() > 1;
        for (i, group) in group_sqls.into_iter().enumerate() {
            if i > 0 {
                sql.push(" or ");
            }
            if many {
                sql.push("(");
            }
            sql.push_sql(group);
            if many {
                sql.push(")");
            }
        }
        if has_range {
            sql.push(")");
        }
    }
    if let Some(range) = range_sql {
        if has_predicate {
            sql.push(" and (");
            sql.push(&range);
            sql.push(")");
        } else {
            sql.push(&range);
        }
    }

    if let Some(order_by) = &options.order_by {
        if !order_by.columns.is_empty() {
            sql.push(" order by (");
            for (i, column) in order_by.columns.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                sql.push_ident(&naming::to_column_path(column));
            }
            sql.push(")");
            if let Some(direction) = order_by.direction {
                sql.push(" ");
                sql.push(direction.as_sql());
            }
        }
    }
    if let Some(offset) = options.offset {
        sql.push(" offset ");
        sql.push(&ident::literal(&Value::from(offset)));
    }
    if let Some(limit) = options.limit {
        sql.push(" limit ");
        sql.push(&ident::literal(&Value::from(limit)));
    }

    let payload = QueryPayload::new(&table, sql.to_sql(), sql.into_bindings());
    tracing::debug!(
        sql = %payload.sql,
        bindings = payload.bindings.len(),
        "compiled select"
    );
    Ok(payload)
}

/// The right-hand side of one compiled comparison.
enum Rhs<'a> {
    Single(&'a Value),
    Tuple(&'a [Value]),
}

/// Compile one AND-group into a `... and ...` statement list.
fn compile_group(group: &FilterGroup) -> Sql {
    let mut out = Sql::empty();
    for (path, value) in group.iter() {
        let normalized = naming::to_column_path(path);
        let columns: Vec<&str> = normalized.split(',').collect();
        let multi_column = columns.len() > 1;

        let Some((op, rhs)) = classify(value, multi_column) else {
            continue;
        };

        if !out.is_empty() {
            out.push(" and ");
        }
        if multi_column {
            out.push("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    out.push(", ");
                }
                out.push_ident(column);
            }
            out.push(")");
        } else {
            out.push_ident(columns[0]);
        }
        out.push(" ");
        out.push(op.as_sql());
        out.push(" ");
        match rhs {
            Rhs::Single(value) => {
                out.push_bind(BindValue::from_json(value));
            }
            Rhs::Tuple(values) => {
                out.push("(");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(", ");
                    }
                    out.push_bind(BindValue::from_json(value));
                }
                out.push(")");
            }
        }
    }
    out
}

/// Determine the operator and right-hand side of one entry, or `None` when
/// the entry compiles to no constraint.
fn classify<'a>(value: &'a FilterValue, multi_column: bool) -> Option<(FilterOp, Rhs<'a>)> {
    match value {
        FilterValue::Scalar(Value::Null) => None,
        FilterValue::Scalar(Value::Array(items)) => classify_list(items, multi_column, None),
        FilterValue::Scalar(value) => Some((FilterOp::Eq, Rhs::Single(value))),
        FilterValue::List(items) => classify_list(items, multi_column, None),
        FilterValue::Filter { op, value } => match value {
            Value::Array(items) => classify_list(items, multi_column, Some(*op)),
            value => Some((*op, Rhs::Single(value))),
        },
    }
}

fn classify_list<'a>(
    items: &'a [Value],
    multi_column: bool,
    op: Option<FilterOp>,
) -> Option<(FilterOp, Rhs<'a>)> {
    if items.is_empty() || items.iter().any(Value::is_array) {
        return None;
    }
    // A tuple comparison takes a value of matching arity; it never defaults
    // to `in`.
    let op = op.unwrap_or(if multi_column {
        FilterOp::Eq
    } else {
        FilterOp::In
    });
    Some((op, Rhs::Tuple(items)))
}

fn block_range_sql(range: BlockRange) -> String {
    let column = ident::ident(BLOCK_NUMBER_COLUMN);
    let mut out = format!("{column} >= {}", ident::literal(&Value::from(range.from)));
    if let Some(to) = range.to {
        out.push_str(&format!(
            " and {column} <= {}",
            ident::literal(&Value::from(to))
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_by_deserializes_single_column() {
        let order: OrderBy =
            serde_json::from_value(json!({"column": "blockNumber", "direction": "desc"})).unwrap();
        assert_eq!(order.columns, ["blockNumber"]);
        assert_eq!(order.direction, Some(OrderDirection::Desc));
    }

    #[test]
    fn order_by_deserializes_column_list() {
        let order: OrderBy =
            serde_json::from_value(json!({"column": ["a", "b"], "direction": "asc"})).unwrap();
        assert_eq!(order.columns, ["a", "b"]);
    }

    #[test]
    fn order_by_ignores_unknown_direction() {
        let order: OrderBy =
            serde_json::from_value(json!({"column": "a", "direction": "sideways"})).unwrap();
        assert_eq!(order.direction, None);
    }

    #[test]
    fn block_range_deserializes_one_or_two_bounds() {
        let range: BlockRange = serde_json::from_value(json!([100])).unwrap();
        assert_eq!(range, BlockRange::since(100));

        let range: BlockRange = serde_json::from_value(json!([100, 200])).unwrap();
        assert_eq!(range, BlockRange::between(100, 200));

        assert!(serde_json::from_value::<BlockRange>(json!([])).is_err());
    }

    #[test]
    fn select_options_deserialize_camel_case() {
        let options: SelectOptions = serde_json::from_value(json!({
            "orderBy": {"column": "blockNumber", "direction": "asc"},
            "offset": 10,
            "limit": 50,
            "chainId": "1",
            "blockRange": [5, 9],
        }))
        .unwrap();
        assert_eq!(options.offset, Some(10));
        assert_eq!(options.limit, Some(50));
        assert_eq!(options.chain_id.as_deref(), Some("1"));
        assert_eq!(options.block_range, Some(BlockRange::between(5, 9)));
    }

    #[test]
    fn classify_skips_null_and_empty_and_nested() {
        assert!(classify(&FilterValue::Scalar(Value::Null), false).is_none());
        assert!(classify(&FilterValue::List(vec![]), false).is_none());
        assert!(classify(&FilterValue::List(vec![json!([1])]), false).is_none());
    }

    #[test]
    fn classify_defaults_lists_to_in_on_single_column() {
        let value = FilterValue::List(vec![json!(1), json!(2)]);
        let (op, _) = classify(&value, false).unwrap();
        assert_eq!(op, FilterOp::In);
    }

    #[test]
    fn classify_never_defaults_tuples_to_in() {
        let value = FilterValue::List(vec![json!(1), json!(2)]);
        let (op, _) = classify(&value, true).unwrap();
        assert_eq!(op, FilterOp::Eq);
    }

    #[test]
    fn explicit_null_value_still_binds() {
        let value = FilterValue::Filter {
            op: FilterOp::Eq,
            value: Value::Null,
        };
        assert!(classify(&value, false).is_some());
    }

    #[test]
    fn block_range_renders_literals() {
        assert_eq!(block_range_sql(BlockRange::since(5)), r#""block_number" >= 5"#);
        assert_eq!(
            block_range_sql(BlockRange::between(5, 9)),
            r#""block_number" >= 5 and "block_number" <= 9"#
        );
    }
}
