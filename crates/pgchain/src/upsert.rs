//! Upsert compilation.
//!
//! [`Upsert`] builds a conflict-aware `insert` statement:
//!
//! ```ignore
//! use pgchain::{Returning, Upsert};
//! use serde_json::json;
//!
//! let payload = Upsert::new("public.users")
//!     .row(json!({"id": 1, "fullName": "Alice"}).as_object().unwrap().clone())
//!     .on_conflict(["id"])
//!     .update(["fullName"])
//!     .returning("*")
//!     .compile()?;
//! ```
//!
//! Columns come from the first row's keys, sorted lexicographically, and the
//! same column order applies to every row; bindings are row-major in input
//! order. Upserts always target a physical table and bypass chain routing.

use crate::error::{QueryError, QueryResult};
use crate::ident;
use crate::naming;
use crate::sql::Sql;
use crate::value::{BindValue, QueryPayload};
use serde_json::{Map, Value};

/// One row payload: column name to value.
pub type UpsertRow = Map<String, Value>;

/// `returning` clause selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Returning {
    All,
    Columns(Vec<String>),
}

impl From<&str> for Returning {
    fn from(s: &str) -> Self {
        if s == "*" {
            Self::All
        } else {
            Self::Columns(vec![s.to_string()])
        }
    }
}

impl From<String> for Returning {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<Vec<String>> for Returning {
    fn from(columns: Vec<String>) -> Self {
        Self::Columns(columns)
    }
}

impl From<Vec<&str>> for Returning {
    fn from(columns: Vec<&str>) -> Self {
        Self::Columns(columns.into_iter().map(str::to_string).collect())
    }
}

/// Conflict-aware insert builder.
#[derive(Debug, Clone, Default)]
pub struct Upsert {
    table: String,
    rows: Vec<UpsertRow>,
    conflict_columns: Vec<String>,
    update_columns: Vec<String>,
    primary_timestamp_column: Option<String>,
    returning: Option<Returning>,
}

impl Upsert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append one row payload.
    pub fn row(mut self, row: UpsertRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Append several row payloads.
    pub fn rows(mut self, rows: impl IntoIterator<Item = UpsertRow>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Set the conflict target columns.
    ///
    /// Without a conflict target the statement compiles to a plain insert.
    pub fn on_conflict<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.conflict_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the columns rewritten on conflict.
    ///
    /// An empty set compiles to `do nothing`.
    pub fn update<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.update_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Guard the conflict update on a timestamp column: the update applies
    /// only when the incoming row's timestamp is newer than or equal to the
    /// stored row's, so an out-of-order write never overwrites newer data.
    pub fn timestamp_guard(mut self, column: impl Into<String>) -> Self {
        self.primary_timestamp_column = Some(column.into());
        self
    }

    /// Set the `returning` clause.
    pub fn returning(mut self, returning: impl Into<Returning>) -> Self {
        self.returning = Some(returning.into());
        self
    }

    /// Compile to SQL and row-major bindings.
    ///
    /// Fails with [`QueryError::NoColumnsToUpsert`] when there are no rows
    /// or the first row has no keys.
    pub fn compile(&self) -> QueryResult<QueryPayload> {
        let Some(first) = self.rows.first() else {
            return Err(QueryError::NoColumnsToUpsert);
        };
        if first.is_empty() {
            return Err(QueryError::NoColumnsToUpsert);
        }

        let mut keys: Vec<&String> = first.keys().collect();
        keys.sort();

        let mut sql = Sql::new("insert into ");
        sql.push_ident(&self.table);
        sql.push(" (");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                sql.push(", ");
            }
            sql.push(&quoted_column(key));
        }
        sql.push(") values ");
        for (r, row) in self.rows.iter().enumerate() {
            if r > 0 {
                sql.push(", ");
            }
            sql.push("(");
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                let value = row
                    .get(*key)
                    .map(BindValue::from_json)
                    .unwrap_or(BindValue::Null);
                sql.push_bind(value);
            }
            sql.push(")");
        }

        if !self.conflict_columns.is_empty() {
            sql.push(" on conflict (");
            for (i, column) in self.conflict_columns.iter().enumerate() {
                if i > 0 {
                    sql.push(", ");
                }
                sql.push(&quoted_column(column));
            }
            sql.push(")");

            if self.update_columns.is_empty() {
                sql.push(" do nothing");
            } else {
                sql.push(" do update set ");
                for (i, column) in self.update_columns.iter().enumerate() {
                    if i > 0 {
                        sql.push(", ");
                    }
                    let quoted = quoted_column(column);
                    sql.push(&quoted);
                    sql.push(" = excluded.");
                    sql.push(&quoted);
                }
                if let Some(timestamp) = &self.primary_timestamp_column {
                    let quoted = quoted_column(timestamp);
                    let table_name = self.table.rsplit('.').next().unwrap_or(&self.table);
                    sql.push(" where ");
                    sql.push(&ident::ident(table_name));
                    sql.push(".");
                    sql.push(&quoted);
                    sql.push(" <= excluded.");
                    sql.push(&quoted);
                }
            }
        }

        match &self.returning {
            Some(Returning::All) => {
                sql.push(" returning *");
            }
            Some(Returning::Columns(columns)) => {
                sql.push(" returning ");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        sql.push(", ");
                    }
                    sql.push(&quoted_column(column));
                }
            }
            None => {}
        }

        let payload = QueryPayload::new(&self.table, sql.to_sql(), sql.into_bindings());
        tracing::debug!(
            sql = %payload.sql,
            rows = self.rows.len(),
            bindings = payload.bindings.len(),
            "compiled upsert"
        );
        Ok(payload)
    }
}

fn quoted_column(name: &str) -> String {
    ident::ident(&naming::to_column_name(name))
}
