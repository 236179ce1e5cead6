//! # pgchain
//!
//! A query **compiler** for chain-partitioned PostgreSQL schemas.
//!
//! `pgchain` turns declarative filter/selection descriptors into
//! parameterized `select` and `insert ... on conflict` statements, with
//! identifier quoting, snake_case normalization of property names, and
//! routing of the reserved logical schema to per-chain physical schemas. It
//! is embedded by a higher-level data-access client and never opens a
//! connection or executes SQL itself.
//!
//! ## Compiling a select
//!
//! ```ignore
//! use pgchain::{compile_select, FilterGroup, SelectOptions};
//!
//! let payload = compile_select(
//!     "public.users",
//!     FilterGroup::new().with("id", 5_i64),
//!     &SelectOptions::default(),
//! )?;
//!
//! assert_eq!(payload.sql, r#"select * from "public"."users" where "id" = $1"#);
//! // payload.params_ref() plugs straight into tokio-postgres.
//! ```
//!
//! ## Compiling an upsert
//!
//! ```ignore
//! use pgchain::Upsert;
//! use serde_json::json;
//!
//! let payload = Upsert::new("public.users")
//!     .row(json!({"id": 1, "fullName": "Alice"}).as_object().unwrap().clone())
//!     .on_conflict(["id"])
//!     .update(["fullName"])
//!     .timestamp_guard("updatedAt")
//!     .compile()?;
//! ```
//!
//! Every compile call is pure and deterministic: identical inputs produce
//! byte-identical SQL and an identical bindings sequence, with no shared
//! state beyond the read-only chain table.

pub mod chain;
pub mod error;
pub mod filter;
pub mod ident;
pub mod naming;
pub mod prelude;
pub mod select;
pub mod sql;
pub mod upsert;
pub mod value;

pub use chain::{CHAIN_ID_FILTER, LOGICAL_SCHEMA, chain_for_schema, physical_schema, route};
pub use error::{QueryError, QueryResult};
pub use filter::{FilterGroup, FilterOp, FilterValue, Filters};
pub use naming::{to_column_name, to_column_path};
pub use select::{BlockRange, OrderBy, OrderDirection, SelectOptions, compile_select};
pub use sql::{Sql, sql};
pub use upsert::{Returning, Upsert, UpsertRow};
pub use value::{BindValue, QueryPayload};
