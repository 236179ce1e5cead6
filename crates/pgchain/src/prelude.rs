//! Convenient imports for typical `pgchain` usage.
//!
//! ```ignore
//! use pgchain::prelude::*;
//! ```

pub use crate::{
    BindValue, BlockRange, FilterGroup, FilterOp, FilterValue, Filters, OrderBy, OrderDirection,
    QueryError, QueryPayload, QueryResult, Returning, SelectOptions, Sql, Upsert, compile_select,
    sql,
};
