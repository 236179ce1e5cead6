//! Error types for pgchain

use thiserror::Error;

/// Result type alias for compile operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised by the compilers and the chain router.
///
/// All variants signal a caller programming error and are raised eagerly.
/// Malformed filter entries never reach this type: they are dropped from the
/// compiled predicate (see [`crate::filter::FilterValue`]).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Upsert called with no rows, or a first row with no keys
    #[error("no columns to upsert: the first row has no keys")]
    NoColumnsToUpsert,

    /// Logical-schema query with no resolvable chain id
    #[error("missing chain id filter for logical-schema query on '{table}'")]
    MissingChainIdFilter { table: String },

    /// Filter groups of one logical-schema query name different chains
    #[error("inconsistent chain id across filter groups: '{first}' vs '{other}'")]
    InconsistentChainIdAcrossFilterGroups { first: String, other: String },
}

impl QueryError {
    /// Create a missing-chain-id error for a table reference
    pub(crate) fn missing_chain_id(table: impl Into<String>) -> Self {
        Self::MissingChainIdFilter {
            table: table.into(),
        }
    }

    /// Check if this is a missing-chain-id error
    pub fn is_missing_chain_id_filter(&self) -> bool {
        matches!(self, Self::MissingChainIdFilter { .. })
    }

    /// Check if this is an inconsistent-chain-id error
    pub fn is_inconsistent_chain_id(&self) -> bool {
        matches!(self, Self::InconsistentChainIdAcrossFilterGroups { .. })
    }
}
