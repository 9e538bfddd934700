//! Type-token utilities for PHPDoc bodies.
//!
//! This submodule provides helpers for pulling the leading type
//! expression off a tag body and for splitting a union into its
//! alternatives without disturbing nested generics or shapes.

use crate::util::split_top_level;

/// Split off the first type token from `s`, respecting `<…>`, `(…)`,
/// `{…}` and `[…]` nesting.
///
/// Whitespace only ends the token at depth zero, and not when the type
/// clearly continues (`int | string`, `callable(int): void`).
///
/// Returns `(type_token, remainder)` where `type_token` is the full type
/// (e.g. `Collection<int, User>`) and `remainder` is whatever follows.
pub fn split_type_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'<' | b'(' | b'{' | b'[' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' | b')' | b'}' | b']' => depth -= 1,
            c if c.is_ascii_whitespace() && depth <= 0 => {
                let prev = s[..i].trim_end().as_bytes().last().copied();
                let rest = s[i..].trim_start();
                let next = rest.as_bytes().first().copied();
                // `&$x` and `&...$x` are by-reference variables, not an
                // intersection.
                let by_ref = rest.starts_with("&$") || rest.starts_with("&...");
                let continues = matches!(prev, Some(b'|' | b'&' | b':' | b','))
                    || (matches!(next, Some(b'|' | b'&')) && !by_ref)
                    || (prev == Some(b')') && next == Some(b':'));
                if !continues {
                    return (&s[..i], &s[i..]);
                }
                // Skip the whitespace run and keep scanning the type.
                i = s.len() - rest.len();
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    (s, "")
}

/// Split a type expression into its top-level union alternatives, in
/// source order, without deduplication.
///
/// `"int|array<int|string>|null"` → `["int", "array<int|string>", "null"]`.
pub fn union_alternatives(type_expr: &str) -> Vec<&str> {
    split_top_level(type_expr, '|')
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Re-join union alternatives with `|`, dropping stray whitespace.
pub fn join_alternatives(type_expr: &str) -> String {
    union_alternatives(type_expr).join("|")
}
