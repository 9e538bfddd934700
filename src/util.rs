/// Small string helpers shared by the normalizer, the doc-block parser
/// and the source walkers.
use memchr::memchr_iter;

/// Return the last segment of a namespace-qualified name.
///
/// `"App\\Models\\User"` → `"User"`, `"\\Foo"` → `"Foo"`.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Split `s` on `sep` wherever it occurs outside `<…>`, `(…)`, `{…}` and
/// `[…]` nesting and outside quoted strings.
///
/// `"int|array<int|string>"` split on `|` → `["int", "array<int|string>"]`.
pub fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '<' | '(' | '{' | '[' => depth += 1,
            // `->` inside callable signatures is not a closing bracket.
            '>' if i > 0 && s.as_bytes()[i - 1] == b'-' => {}
            '>' | ')' | '}' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// `true` when every opening bracket in `s` has a matching closing one of
/// the same kind, in order.
pub fn brackets_balanced(s: &str) -> bool {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;
    let bytes = s.as_bytes();
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '<' | '(' | '{' | '[' => stack.push(c),
            '>' if i > 0 && bytes[i - 1] == b'-' => {}
            '>' | ')' | '}' | ']' => {
                let expected = match c {
                    '>' => '<',
                    ')' => '(',
                    '}' => '{',
                    _ => '[',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }
    stack.is_empty() && quote.is_none()
}

/// Whether `name` looks like a (possibly qualified) PHP class name.
pub fn is_class_like_name(name: &str) -> bool {
    let name = name.strip_prefix('\\').unwrap_or(name);
    !name.is_empty()
        && name.split('\\').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii())
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii())
        })
}

/// Whether `name` is a valid PHP variable name (without the `$`).
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.contains('\\') && is_class_like_name(name)
}

/// Convert a byte offset into a 1-based line number.
pub fn line_of_offset(content: &str, offset: u32) -> u32 {
    let end = (offset as usize).min(content.len());
    memchr_iter(b'\n', &content.as_bytes()[..end]).count() as u32 + 1
}
