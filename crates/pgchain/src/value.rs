//! Bound values and compiled query payloads.

use bytes::BytesMut;
use serde_json::Value;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A value captured for a positional placeholder during compilation.
///
/// Bindings are plain data so compiled payloads can be compared, logged, and
/// replayed deterministically; the [`ToSql`] impl delegates to the underlying
/// scalar so a payload's parameters feed `tokio-postgres` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    BigInt(i64),
    Double(f64),
    Text(String),
    /// Arbitrary JSON payloads bind as `jsonb`.
    Json(Value),
}

impl BindValue {
    /// Capture a JSON scalar.
    ///
    /// Integers that fit `i64` bind as `bigint`, other numbers as `double
    /// precision`; arrays and objects bind as `jsonb`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::BigInt(i),
                None => match n.as_f64() {
                    Some(f) => Self::Double(f),
                    None => Self::Json(value.clone()),
                },
            },
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Json(value.clone()),
        }
    }
}

impl From<&Value> for BindValue {
    fn from(value: &Value) -> Self {
        Self::from_json(value)
    }
}

impl From<Value> for BindValue {
    fn from(value: Value) -> Self {
        Self::from_json(&value)
    }
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<i32> for BindValue {
    fn from(v: i32) -> Self {
        Self::BigInt(v.into())
    }
}

impl From<f64> for BindValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for BindValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for BindValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl ToSql for BindValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Self::Null => Ok(IsNull::Yes),
            Self::Bool(v) => v.to_sql(ty, out),
            Self::BigInt(v) => v.to_sql(ty, out),
            Self::Double(v) => v.to_sql(ty, out),
            Self::Text(v) => v.to_sql(ty, out),
            Self::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The concrete variant is only known at bind time.
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

/// A compiled statement: SQL text plus its positional bindings.
///
/// Every `$n` placeholder in `sql` has exactly one entry in `bindings`, in
/// emission order, so `bindings[n - 1]` is the value bound to `$n`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPayload {
    /// Schema segment of the (routed) table reference, if any.
    pub schema_name: Option<String>,
    /// Table segment of the (routed) table reference.
    pub table_name: Option<String>,
    pub sql: String,
    pub bindings: Vec<BindValue>,
}

impl QueryPayload {
    pub(crate) fn new(table: &str, sql: String, bindings: Vec<BindValue>) -> Self {
        let (schema_name, table_name) = match table.split_once('.') {
            Some((schema, name)) => (Some(schema.to_string()), Some(name.to_string())),
            None => (None, Some(table.to_string())),
        };
        Self {
            schema_name,
            table_name,
            sql,
            bindings,
        }
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.bindings
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_map_to_variants() {
        assert_eq!(BindValue::from_json(&json!(null)), BindValue::Null);
        assert_eq!(BindValue::from_json(&json!(true)), BindValue::Bool(true));
        assert_eq!(BindValue::from_json(&json!(7)), BindValue::BigInt(7));
        assert_eq!(BindValue::from_json(&json!(1.5)), BindValue::Double(1.5));
        assert_eq!(
            BindValue::from_json(&json!("x")),
            BindValue::Text("x".to_string())
        );
    }

    #[test]
    fn json_composites_stay_json() {
        assert_eq!(
            BindValue::from_json(&json!({"a": 1})),
            BindValue::Json(json!({"a": 1}))
        );
        assert_eq!(
            BindValue::from_json(&json!([1, 2])),
            BindValue::Json(json!([1, 2]))
        );
    }

    #[test]
    fn payload_splits_schema_and_table() {
        let p = QueryPayload::new("public.users", "select 1".to_string(), vec![]);
        assert_eq!(p.schema_name.as_deref(), Some("public"));
        assert_eq!(p.table_name.as_deref(), Some("users"));

        let p = QueryPayload::new("users", "select 1".to_string(), vec![]);
        assert_eq!(p.schema_name, None);
        assert_eq!(p.table_name.as_deref(), Some("users"));
    }

    #[test]
    fn params_ref_matches_bindings() {
        let p = QueryPayload::new(
            "t",
            "select * from t where a = $1".to_string(),
            vec![BindValue::BigInt(1)],
        );
        assert_eq!(p.params_ref().len(), 1);
    }
}
