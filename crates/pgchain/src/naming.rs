//! Naming-convention normalization.
//!
//! Property names arrive in the caller's camelCase convention; the physical
//! schema is snake_case. [`to_column_name`] converts one name,
//! [`to_column_path`] converts every segment of a dotted (and possibly
//! comma-delimited) column path independently.

/// Convert a property name to the schema's snake_case convention.
///
/// Runs in two passes: interior acronym runs are first folded to lowercase so
/// that decamelization does not split them letter by letter (`parseHTTPBody`
/// becomes `parseHttpBody`, not `parse_h_t_t_p_body`), then the string is
/// decamelized.
///
/// The function is pure, total, and idempotent: applying it to an
/// already-normalized name is a no-op.
///
/// # Example
/// ```ignore
/// assert_eq!(to_column_name("blockNumber"), "block_number");
/// assert_eq!(to_column_name("txID"), "tx_id");
/// ```
pub fn to_column_name(name: &str) -> String {
    heck::AsSnakeCase(fold_acronyms(name)).to_string()
}

/// Normalize each dot- and comma-separated segment of a column path.
///
/// Dots separate schema/table/column references, commas separate the columns
/// of a tuple comparison; both delimiters are preserved.
pub fn to_column_path(path: &str) -> String {
    path.split(',')
        .map(|part| normalize_dotted(part.trim()))
        .collect::<Vec<_>>()
        .join(",")
}

fn normalize_dotted(path: &str) -> String {
    path.split('.')
        .map(to_column_name)
        .collect::<Vec<_>>()
        .join(".")
}

/// Lowercase every uppercase letter that is preceded by an uppercase letter
/// and followed by another uppercase letter or the end of the string. The
/// leading letter of a capital run keeps its case.
fn fold_acronyms(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    for (i, &c) in chars.iter().enumerate() {
        let prev_upper = i > 0 && chars[i - 1].is_uppercase();
        let next_upper = chars.get(i + 1).is_none_or(|n| n.is_uppercase());
        if c.is_uppercase() && prev_upper && next_upper {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_to_snake_case() {
        assert_eq!(to_column_name("blockNumber"), "block_number");
        assert_eq!(to_column_name("fullName"), "full_name");
        assert_eq!(to_column_name("id"), "id");
    }

    #[test]
    fn trailing_acronym_folds() {
        assert_eq!(to_column_name("txID"), "tx_id");
        assert_eq!(to_column_name("userID"), "user_id");
    }

    #[test]
    fn interior_acronym_folds() {
        assert_eq!(to_column_name("parseHTTPBody"), "parse_http_body");
        assert_eq!(to_column_name("rawJSONValue"), "raw_json_value");
    }

    #[test]
    fn leading_acronym_keeps_leading_letter() {
        assert_eq!(fold_acronyms("ABCDef"), "AbcDef");
        assert_eq!(to_column_name("ABCDef"), "abc_def");
    }

    #[test]
    fn idempotent() {
        for name in ["blockNumber", "block_number", "txID", "a", "", "col2"] {
            let once = to_column_name(name);
            assert_eq!(to_column_name(&once), once);
        }
    }

    #[test]
    fn digits_do_not_split() {
        assert_eq!(to_column_name("topic0"), "topic0");
        assert_eq!(to_column_name("value2Wei"), "value2_wei");
    }

    #[test]
    fn path_normalizes_each_dot_segment() {
        assert_eq!(to_column_path("myTable.someColumn"), "my_table.some_column");
    }

    #[test]
    fn path_normalizes_each_comma_segment() {
        assert_eq!(
            to_column_path("blockNumber,logIndex"),
            "block_number,log_index"
        );
        assert_eq!(to_column_path("a.bCol,c.dCol"), "a.b_col,c.d_col");
    }
}
