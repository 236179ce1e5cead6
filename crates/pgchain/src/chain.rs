//! Chain schema routing.
//!
//! Chain-partitioned tables are exposed to callers under one reserved
//! logical schema; at compile time the router rewrites the table reference
//! to the physical per-chain schema. The chain is selected either explicitly
//! through [`SelectOptions::chain_id`](crate::SelectOptions) or implicitly
//! through a `chainId` property in the first filter group, which is then
//! stripped from every group (the selection is expressed as the schema, not
//! as a row predicate).
//!
//! An unrecognized or retired chain does not fail compilation: the query is
//! redirected to a fixed sentinel table/filter pair guaranteed to match zero
//! rows, so callers get an empty result set instead of an error.

use crate::error::{QueryError, QueryResult};
use crate::filter::{FilterGroup, FilterOp, FilterValue};
use crate::select::SelectOptions;
use serde_json::Value;

/// Reserved logical schema resolved at compile time.
pub const LOGICAL_SCHEMA: &str = "chain";

/// Filter property carrying the chain selection before routing.
pub const CHAIN_ID_FILTER: &str = "chainId";

/// Process-wide chain table: chain id to physical schema. Fixed at build
/// time and never mutated.
const CHAIN_SCHEMAS: &[(&str, &str)] = &[
    ("1", "eth_mainnet"),
    ("10", "op_mainnet"),
    ("137", "polygon"),
    ("8453", "base"),
    ("42161", "arbitrum_one"),
];

/// Fixed redirect target guaranteed to match zero rows.
const VOID_TABLE: &str = "chain_void.empty";

/// Physical schema for a chain id.
pub fn physical_schema(chain_id: &str) -> Option<&'static str> {
    CHAIN_SCHEMAS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, schema)| *schema)
}

/// Inverse lookup: chain id served by a physical schema.
pub fn chain_for_schema(schema: &str) -> Option<&'static str> {
    CHAIN_SCHEMAS
        .iter()
        .find(|(_, s)| *s == schema)
        .map(|(id, _)| *id)
}

fn void_filters() -> Vec<FilterGroup> {
    vec![FilterGroup::new().with(
        "blockNumber",
        FilterValue::Filter {
            op: FilterOp::Lt,
            value: Value::from(0),
        },
    )]
}

/// Rewrite a logical-schema table reference (and its filter groups) to the
/// physical per-chain schema.
///
/// Tables outside [`LOGICAL_SCHEMA`] pass through untouched. Fails with
/// [`QueryError::MissingChainIdFilter`] when no chain id is resolvable and
/// with [`QueryError::InconsistentChainIdAcrossFilterGroups`] when filter
/// groups disagree on the chain.
pub fn route(
    table: &str,
    mut groups: Vec<FilterGroup>,
    options: &SelectOptions,
) -> QueryResult<(String, Vec<FilterGroup>)> {
    let Some((schema, name)) = table.split_once('.') else {
        return Ok((table.to_string(), groups));
    };
    if schema != LOGICAL_SCHEMA {
        return Ok((table.to_string(), groups));
    }

    if let Some(chain_id) = options.chain_id.as_deref() {
        return Ok(resolve(chain_id, name, groups));
    }

    let Some(first) = groups.first() else {
        return Err(QueryError::missing_chain_id(table));
    };
    let Some(chain_id) = first.get(CHAIN_ID_FILTER).and_then(chain_key) else {
        return Err(QueryError::missing_chain_id(table));
    };
    for group in groups.iter().skip(1) {
        if let Some(other) = group.get(CHAIN_ID_FILTER).and_then(chain_key) {
            if other != chain_id {
                return Err(QueryError::InconsistentChainIdAcrossFilterGroups {
                    first: chain_id,
                    other,
                });
            }
        }
    }
    for group in &mut groups {
        group.remove(CHAIN_ID_FILTER);
    }
    Ok(resolve(&chain_id, name, groups))
}

fn resolve(chain_id: &str, name: &str, groups: Vec<FilterGroup>) -> (String, Vec<FilterGroup>) {
    match physical_schema(chain_id) {
        Some(physical) => (format!("{physical}.{name}"), groups),
        None => {
            tracing::debug!(chain_id, "unrecognized chain id, compiling to empty sentinel");
            (VOID_TABLE.to_string(), void_filters())
        }
    }
}

/// Canonical numeric-string key of a scalar chain-id filter value.
///
/// Lists and explicit filters cannot select a single schema and count as
/// absent.
fn chain_key(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Scalar(Value::String(s)) => Some(s.clone()),
        FilterValue::Scalar(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
