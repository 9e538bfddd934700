//! Doc-block structure.
//!
//! [`DocBlock::parse`] turns a `/** … */` comment into a summary and an
//! ordered list of [`Tag`]s.  A tag runs from its `@name` up to the next
//! line that starts a new tag; continuation lines are joined with `\n`.
//!
//! Parsing is strict about structure: a comment that is not a doc block,
//! an inline `{@tag` that never closes, or a typed tag whose leading type
//! expression has unbalanced brackets is rejected with a
//! [`DocParseError`].  Callers turn that into a diagnostic and carry on.

use thiserror::Error;

use super::types::split_type_token;
use crate::util::brackets_balanced;

/// Tags whose body starts with a type expression.
const TYPED_TAGS: &[&str] = &[
    "param",
    "var",
    "return",
    "property",
    "property-read",
    "property-write",
    "throws",
    "psalm-param",
    "psalm-var",
    "psalm-return",
    "phpstan-param",
    "phpstan-var",
    "phpstan-return",
];

/// Why a doc comment could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocParseError {
    #[error("doc comment must start with `/**` and end with `*/`")]
    NotADocBlock,

    #[error("unclosed inline tag `{{@{0}`")]
    UnclosedInlineTag(String),

    #[error("unbalanced type expression `{type_expr}` in @{tag}")]
    UnbalancedType { tag: String, type_expr: String },
}

/// One `@tag` of a doc block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the `@` (e.g. `param`, `phpstan-var`).
    pub name: String,
    /// Everything after the name, trimmed.
    pub body: String,
}

/// A parsed doc block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    /// Free text before the first tag.
    pub summary: String,
    tags: Vec<Tag>,
}

impl DocBlock {
    /// Parse a raw `/** … */` comment.
    pub fn parse(text: &str) -> Result<DocBlock, DocParseError> {
        let trimmed = text.trim();
        let inner = trimmed
            .strip_prefix("/**")
            .and_then(|s| s.strip_suffix("*/"))
            .ok_or(DocParseError::NotADocBlock)?;

        check_inline_tags(inner)?;

        let mut summary_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();

        for line in inner.lines() {
            let line = line.trim().trim_start_matches('*').trim();

            if let Some(rest) = line.strip_prefix('@') {
                let name_len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '\\')))
                    .unwrap_or(rest.len());
                if name_len > 0 {
                    tags.push(Tag {
                        name: rest[..name_len].to_string(),
                        body: rest[name_len..].trim().to_string(),
                    });
                    continue;
                }
            }

            match tags.last_mut() {
                Some(tag) => {
                    if !line.is_empty() {
                        if !tag.body.is_empty() {
                            tag.body.push('\n');
                        }
                        tag.body.push_str(line);
                    }
                }
                None => summary_lines.push(line),
            }
        }

        for tag in &tags {
            if !TYPED_TAGS.contains(&tag.name.as_str()) || tag.body.is_empty() {
                continue;
            }
            if tag.body.starts_with('$') || tag.body.starts_with("&$") || tag.body.starts_with("...$")
            {
                continue;
            }
            let (type_expr, _) = split_type_token(&tag.body);
            if !brackets_balanced(type_expr) {
                return Err(DocParseError::UnbalancedType {
                    tag: tag.name.clone(),
                    type_expr: type_expr.to_string(),
                });
            }
        }

        Ok(DocBlock {
            summary: summary_lines.join("\n").trim().to_string(),
            tags,
        })
    }

    /// All tags in declaration order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Tags named `name` (without `@`), in declaration order.
    pub fn tags_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| t.name == name)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags_by_name(name).next().is_some()
    }
}

/// Every `{@` must be closed by a `}` before the next `{@` opens.
fn check_inline_tags(inner: &str) -> Result<(), DocParseError> {
    let mut rest = inner;
    while let Some(open) = rest.find("{@") {
        let after = &rest[open + 2..];
        let name: String = after
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
            .collect();
        let close = after.find('}');
        let next_open = after.find("{@");
        match (close, next_open) {
            (Some(c), Some(n)) if n < c => return Err(DocParseError::UnclosedInlineTag(name)),
            (Some(c), _) => rest = &after[c + 1..],
            (None, _) => return Err(DocParseError::UnclosedInlineTag(name)),
        }
    }
    Ok(())
}
