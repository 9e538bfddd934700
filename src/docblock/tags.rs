//! PHPDoc tag extraction.
//!
//! This submodule reads the typed tags that describe a single symbol
//! (`@param`, `@var` and their `@psalm-` / `@phpstan-` twins), detects
//! `{@inheritDoc}`, collects constant metadata (`@deprecated`,
//! `@internal`, `@since`, `@see`, `@link`) and rebuilds a minimal doc
//! block for one parameter on the reflection path.

use super::block::DocBlock;
use super::types::{join_alternatives, split_type_token};
use crate::types::DocMeta;

/// Which family of tags describes a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocTarget {
    /// `@param Type $name`: the variable name is required.
    Param,
    /// `@var Type [$name]`: an unnamed tag applies to the symbol the
    /// comment is attached to.
    Var,
}

impl DocTarget {
    /// The primary tag name (without `@`).
    pub fn tag_name(self) -> &'static str {
        match self {
            DocTarget::Param => "param",
            DocTarget::Var => "var",
        }
    }

    fn accepts_unnamed(self) -> bool {
        matches!(self, DocTarget::Var)
    }
}

/// The body of a typed tag, split into its parts.
///
/// Handles common formats:
///   - `int $x`
///   - `int|string $x Some description text`
///   - `array<int, User> ...$users`
///   - `$x` (no type)
///   - `int` (no variable, typical for `@var`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedTag {
    /// The declared type expression as written.
    pub type_expr: Option<String>,
    /// The variable name WITHOUT the `$` prefix.
    pub variable: Option<String>,
    pub is_variadic: bool,
    pub is_reference: bool,
    /// Free text after the variable (or after the type when there is no
    /// variable).
    pub description: Option<String>,
}

impl TypedTag {
    pub fn parse(body: &str) -> TypedTag {
        let body = body.trim();
        let mut tag = TypedTag::default();

        let rest = if starts_with_variable(body) {
            body
        } else {
            let (type_token, remainder) = split_type_token(body);
            if !type_token.is_empty() {
                tag.type_expr = Some(type_token.to_string());
            }
            remainder.trim_start()
        };

        let rest = match rest.split_whitespace().next() {
            Some(token) if starts_with_variable(token) => {
                let mut name = token;
                if let Some(r) = name.strip_prefix('&') {
                    tag.is_reference = true;
                    name = r;
                }
                if let Some(r) = name.strip_prefix("...") {
                    tag.is_variadic = true;
                    name = r;
                }
                let name = name.trim_start_matches('$').trim_end_matches([',', '.']);
                if !name.is_empty() {
                    tag.variable = Some(name.to_string());
                }
                rest[token.len()..].trim()
            }
            _ => rest,
        };

        let description = rest.trim();
        if !description.is_empty() {
            tag.description = Some(description.to_string());
        }
        tag
    }

    /// Case-insensitive match against a symbol name (without `$`).
    pub fn names(&self, symbol_name: &str) -> bool {
        self.variable
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case(symbol_name))
    }

    /// The type expression with its union alternatives joined by `|`.
    pub fn union_type(&self) -> Option<String> {
        self.type_expr
            .as_deref()
            .map(join_alternatives)
            .filter(|t| !t.is_empty())
    }
}

fn starts_with_variable(token: &str) -> bool {
    token.starts_with('$')
        || token.starts_with("&$")
        || token.starts_with("...$")
        || token.starts_with("&...$")
}

/// Find the tag of `tag_name` that describes `symbol_name`.
///
/// Named tags are matched case-insensitively; doc comments are written by
/// hand and `$userId` vs `$userID` drift is common.  For [`DocTarget::Var`]
/// an unnamed tag is accepted as well, but a named match wins.
pub fn find_typed_tag(
    block: &DocBlock,
    tag_name: &str,
    target: DocTarget,
    symbol_name: &str,
) -> Option<TypedTag> {
    let mut unnamed = None;
    for tag in block.tags_by_name(tag_name) {
        let typed = TypedTag::parse(&tag.body);
        if typed.names(symbol_name) {
            return Some(typed);
        }
        if target.accepts_unnamed() && typed.variable.is_none() && unnamed.is_none() {
            unnamed = Some(typed);
        }
    }
    unnamed
}

/// Check whether a doc comment defers to its ancestor's documentation.
///
/// Matches `{@inheritDoc}`, `@inheritdoc` and any other casing.
pub fn is_inherit_doc(docblock: &str) -> bool {
    docblock.to_ascii_lowercase().contains("inheritdoc")
}

/// Extract the `@…param <type> $name` lines for one parameter from the
/// declaring function's doc comment and wrap them in a fresh doc block.
///
/// Reflection gives us the whole function comment; this trims it down to
/// the lines that concern the parameter so unrelated malformed tags
/// don't poison it.  Returns `None` when no line matches.
pub fn param_lines_for(docblock: &str, param_name: &str) -> Option<String> {
    let inner = docblock
        .trim()
        .strip_prefix("/**")
        .unwrap_or(docblock)
        .strip_suffix("*/")
        .unwrap_or(docblock);

    let mut lines = Vec::new();
    for line in inner.lines() {
        let trimmed = line.trim().trim_start_matches('*').trim();
        let Some(rest) = trimmed.strip_prefix('@') else {
            continue;
        };
        let Some(tag_end) = rest.find(char::is_whitespace) else {
            continue;
        };
        let tag_name = &rest[..tag_end];
        if !tag_name.to_ascii_lowercase().ends_with("param") {
            continue;
        }
        let typed = TypedTag::parse(&rest[tag_end..]);
        if typed.type_expr.is_some() && typed.names(param_name) {
            lines.push(trimmed.to_string());
        }
    }

    if lines.is_empty() {
        return None;
    }
    Some(format!("/**\n * {}\n */", lines.join("\n * ")))
}

/// Collect `@deprecated`, `@internal`, `@since`, `@see` and `@link`.
pub fn collect_doc_meta(block: &DocBlock) -> DocMeta {
    let mut meta = DocMeta::default();
    for tag in block.tags() {
        match tag.name.as_str() {
            "deprecated" => meta.is_deprecated = true,
            "internal" => meta.is_internal = true,
            "since" => {
                if meta.since.is_none() {
                    meta.since = tag.body.split_whitespace().next().map(str::to_string);
                }
            }
            "see" | "link" => {
                if let Some(target) = tag.body.split_whitespace().next() {
                    meta.references.push(target.to_string());
                }
            }
            _ => {}
        }
    }
    meta
}
