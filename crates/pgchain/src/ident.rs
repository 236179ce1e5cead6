//! Identifier quoting and literal rendering.
//!
//! This is the low-level formatting layer every compiler goes through:
//! [`ident`] quotes a single identifier, [`qualified`] quotes each segment of
//! a dotted reference, and [`literal`] renders a value for direct embedding
//! in SQL text.
//!
//! Literals are used only where PostgreSQL does not accept a bound parameter
//! or where a bound parameter is not wanted (OFFSET/LIMIT and block-range
//! boundaries); every caller-supplied comparison value goes through the
//! bindings list instead.

use serde_json::Value;

/// Quote a single SQL identifier, escaping embedded `"` as `""`.
pub fn ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
    out
}

/// Quote a dotted reference (`schema.table` or `table.column`), one
/// identifier per `.`-separated segment.
pub fn qualified(path: &str) -> String {
    path.split('.').map(ident).collect::<Vec<_>>().join(".")
}

/// Render a value as a SQL literal.
///
/// Numbers and booleans are rendered bare, strings are single-quoted with
/// `'` escaped as `''`, and null renders as `null`. Arrays and objects are
/// rendered as their JSON text in a string literal.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        other => quote_string(&other.to_string()),
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
            out.push('\'');
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ident_quotes() {
        assert_eq!(ident("users"), r#""users""#);
        assert_eq!(ident("block_number"), r#""block_number""#);
    }

    #[test]
    fn ident_escapes_embedded_quote() {
        assert_eq!(ident(r#"has"quote"#), r#""has""quote""#);
    }

    #[test]
    fn qualified_quotes_each_segment() {
        assert_eq!(qualified("public.users"), r#""public"."users""#);
        assert_eq!(qualified("users"), r#""users""#);
    }

    #[test]
    fn literal_numbers_render_bare() {
        assert_eq!(literal(&json!(42)), "42");
        assert_eq!(literal(&json!(-1.5)), "-1.5");
    }

    #[test]
    fn literal_strings_are_quoted_and_escaped() {
        assert_eq!(literal(&json!("abc")), "'abc'");
        assert_eq!(literal(&json!("it's")), "'it''s'");
    }

    #[test]
    fn literal_null_and_bool() {
        assert_eq!(literal(&Value::Null), "null");
        assert_eq!(literal(&json!(true)), "true");
    }
}
