//! Strict annotation dialects.
//!
//! Psalm (`@psalm-param`, `@psalm-var`) and PHPStan (`@phpstan-param`,
//! `@phpstan-var`) tags carry type expressions that tools check with a
//! real type grammar.  This submodule finds the dialect tag for a symbol
//! and validates its type with a [`StrictTypeValidator`].
//!
//! The candidate pool is every `@psalm-*` tag followed by every
//! `@phpstan-*` tag, each in declaration order; the first tag that names
//! the symbol is the only one considered.

use mago_database::file::FileId;
use mago_span::{Position, Span};
use thiserror::Error;

use super::block::DocBlock;
use super::tags::{DocTarget, TypedTag};
use crate::normalize::normalize_type;
use crate::types::Diagnostics;

/// Why a type expression failed strict validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrictTypeError {
    #[error("empty type expression")]
    Empty,

    #[error("invalid type `{type_expr}`: {message}")]
    Invalid { type_expr: String, message: String },
}

/// Validates a type expression against a strict type grammar and returns
/// its canonical spelling.
pub trait StrictTypeValidator: Send + Sync {
    fn validate(&self, type_expr: &str) -> Result<String, StrictTypeError>;
}

/// Validator backed by `mago-type-syntax`, the same grammar mago's
/// analyzer uses for Psalm/PHPStan types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagoTypeValidator;

impl StrictTypeValidator for MagoTypeValidator {
    fn validate(&self, type_expr: &str) -> Result<String, StrictTypeError> {
        let expr = type_expr.trim();
        if expr.is_empty() {
            return Err(StrictTypeError::Empty);
        }

        let file_id = FileId::new("docblock.php");
        let span = Span::new(file_id, Position::new(0), Position::new(expr.len() as u32));

        match mago_type_syntax::parse_str(span, expr) {
            Ok(_) => Ok(normalize_type(expr)),
            Err(err) => Err(StrictTypeError::Invalid {
                type_expr: expr.to_string(),
                message: err.to_string(),
            }),
        }
    }
}

/// Find the strict-dialect tag for `symbol_name` and validate it.
///
/// Returns `None` when no dialect tag names the symbol, when the matching
/// tag has no type, or when validation fails.  A failure is recorded in
/// `diagnostics` and is never fatal.
pub fn reconcile_strict_type(
    block: &DocBlock,
    target: DocTarget,
    symbol_name: &str,
    validator: &dyn StrictTypeValidator,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let psalm = format!("psalm-{}", target.tag_name());
    let phpstan = format!("phpstan-{}", target.tag_name());

    let pool = block.tags_by_name(&psalm).chain(block.tags_by_name(&phpstan));

    let mut unnamed = None;
    let mut chosen = None;
    for tag in pool {
        let typed = TypedTag::parse(&tag.body);
        if typed.names(symbol_name) {
            chosen = Some((tag.name.clone(), typed));
            break;
        }
        if target == DocTarget::Var && typed.variable.is_none() && unnamed.is_none() {
            unnamed = Some((tag.name.clone(), typed));
        }
    }
    let (tag_name, typed) = chosen.or(unnamed)?;
    let type_expr = typed.type_expr?;

    match validator.validate(&type_expr) {
        Ok(strict) => Some(strict),
        Err(err) => {
            tracing::debug!(tag = %tag_name, symbol = symbol_name, %err, "strict type rejected");
            diagnostics.push(format!("{symbol_name}: @{tag_name} {err}"));
            None
        }
    }
}
