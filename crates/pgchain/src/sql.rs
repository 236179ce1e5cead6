//! SQL-first fragment writer.
//!
//! `Sql` stores SQL pieces and bound values separately and generates
//! `$1, $2, ...` placeholders automatically in the rendered string, so the
//! compilers never track placeholder indices by hand. Fragments compose:
//! appending one `Sql` into another renumbers its placeholders implicitly
//! because numbering happens at render time.
//!
//! # Example
//!
//! ```ignore
//! use pgchain::sql;
//!
//! let mut q = sql("select * from logs where address = ");
//! q.push_bind("0xabc");
//! q.push(" and block_number > ").push_bind(100_i64);
//!
//! assert_eq!(
//!     q.to_sql(),
//!     "select * from logs where address = $1 and block_number > $2"
//! );
//! ```

use crate::ident;
use crate::value::BindValue;

#[derive(Debug, Clone)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL fragment.
#[derive(Debug, Clone, Default)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<BindValue>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<BindValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a comma-separated list of placeholders and bind all values.
    ///
    /// If `values` is empty, this appends `null` (so `in (null)` stays valid
    /// SQL).
    pub fn push_bind_list<T>(&mut self, values: impl IntoIterator<Item = T>) -> &mut Self
    where
        T: Into<BindValue>,
    {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else {
            return self.push("null");
        };

        self.push_bind(first);
        for v in iter {
            self.push(", ");
            self.push_bind(v);
        }
        self
    }

    /// Append a quoted identifier, one quoted segment per `.`-separated part.
    pub fn push_ident(&mut self, path: &str) -> &mut Self {
        let quoted = ident::qualified(path);
        self.push(&quoted)
    }

    /// Append another `Sql` fragment, consuming it.
    ///
    /// The fragment's placeholders are renumbered to continue this builder's
    /// sequence.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        self.parts.append(&mut other.parts);
        self.params.append(&mut other.params);
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    use std::fmt::Write;
                    let _ = write!(&mut out, "${idx}");
                }
            }
        }
        out
    }

    /// The values bound so far, in placeholder order.
    pub fn bindings(&self) -> &[BindValue] {
        &self.params
    }

    /// Consume the builder, returning the bound values in placeholder order.
    pub fn into_bindings(self) -> Vec<BindValue> {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_placeholders_in_order() {
        let mut q = sql("select * from users where a = ");
        q.push_bind(1_i64).push(" and b = ").push_bind("x");

        assert_eq!(q.to_sql(), "select * from users where a = $1 and b = $2");
        assert_eq!(q.bindings().len(), 2);
    }

    #[test]
    fn can_compose_fragments() {
        let mut w = Sql::empty();
        w.push(" where id = ").push_bind(42_i64);

        let mut q = sql("select * from users");
        q.push_sql(w);

        assert_eq!(q.to_sql(), "select * from users where id = $1");
        assert_eq!(q.bindings(), &[BindValue::BigInt(42)]);
    }

    #[test]
    fn composed_fragments_renumber() {
        let mut a = Sql::empty();
        a.push("a = ").push_bind(1_i64);
        let mut b = Sql::empty();
        b.push("b = ").push_bind(2_i64);

        let mut q = sql("select 1 where ");
        q.push_sql(a);
        q.push(" and ");
        q.push_sql(b);

        assert_eq!(q.to_sql(), "select 1 where a = $1 and b = $2");
    }

    #[test]
    fn bind_list_renders_commas() {
        let mut q = sql("select * from users where id in (");
        q.push_bind_list([1_i64, 2, 3]).push(")");
        assert_eq!(q.to_sql(), "select * from users where id in ($1, $2, $3)");
        assert_eq!(q.bindings().len(), 3);
    }

    #[test]
    fn bind_list_empty_is_valid_sql() {
        let mut q = sql("select * from users where id in (");
        q.push_bind_list(Vec::<i64>::new()).push(")");
        assert_eq!(q.to_sql(), "select * from users where id in (null)");
        assert_eq!(q.bindings().len(), 0);
    }

    #[test]
    fn push_ident_quotes_dotted_paths() {
        let mut q = sql("select * from ");
        q.push_ident("public.users");
        assert_eq!(q.to_sql(), r#"select * from "public"."users""#);
    }

    #[test]
    fn empty_builder_reports_empty() {
        let mut q = Sql::empty();
        assert!(q.is_empty());
        q.push("");
        assert!(q.is_empty());
        q.push("x");
        assert!(!q.is_empty());
    }
}
