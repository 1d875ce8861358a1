//! Expression path construction
//!
//! Child nodes are named by appending a suffix (`.field`, `[i]`) or prefix
//! (`*`) to the path of their parent. [`guard`] parenthesizes the parent path
//! first whenever it could bind differently once the suffix is attached.

use std::borrow::Cow;

/// Parenthesize `expr` unless it is a plain identifier or already parenthesized
pub fn guard(expr: &str) -> Cow<'_, str> {
    if expr.starts_with('(') && expr.ends_with(')') {
        return Cow::Borrowed(expr);
    }

    if expr.chars().all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        Cow::Borrowed(expr)
    } else {
        Cow::Owned(format!("({})", expr))
    }
}

/// Path of the value a pointer path points to
pub fn deref_path(expr: &str) -> String {
    format!("*{}", guard(expr))
}

/// Path of element `index` of an array or pointer path
pub fn index_path(expr: &str, index: i64) -> String {
    format!("{}[{}]", guard(expr), index)
}

/// Path of member `field` of a struct/union path
pub fn field_path(expr: &str, field: &str) -> String {
    format!("{}.{}", guard(expr), field)
}
