//! Literal value extraction.
//!
//! [`ValueExtractor::extract`] folds the expressions that may appear as a
//! constant value or a parameter default into a [`PhpValue`] without
//! running any code.  Supported:
//!
//! - `null`, `true`, `false`, integer, float and plain string literals,
//! - `[...]` and `array(...)` with PHP key semantics and `...` spreads,
//! - unary `-` / `+`, parentheses,
//! - `.` concatenation and integer/float arithmetic (`+ - * /`, `|`, `&`),
//! - `Foo::class`, `__CLASS__`, `__NAMESPACE__`,
//! - class-constant and global-constant references resolvable through the
//!   file's own declarations, a small builtin table, or a
//!   [`ConstantLookup`].
//!
//! Anything else yields `None`.  `None` is the "could not evaluate"
//! sentinel and is distinct from `Some(PhpValue::Null)`.

use std::collections::HashMap;

use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::names::NameContext;
use crate::types::{ArrayKey, PhpValue};

/// Source of constant values declared outside the file being read.
///
/// Class names are fully qualified without a leading `\`.
pub trait ConstantLookup: Send + Sync {
    fn class_constant(&self, _class: &str, _name: &str) -> Option<PhpValue> {
        None
    }

    fn global_constant(&self, _name: &str) -> Option<PhpValue> {
        None
    }
}

/// A lookup that knows no constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstants;

impl ConstantLookup for NoConstants {}

/// Constants declared so far in the file being walked.
///
/// Filled in declaration order, so `const B = self::A . 'x';` sees `A`
/// when `A` is declared first.
#[derive(Debug, Clone, Default)]
pub struct LocalConstants {
    globals: HashMap<String, PhpValue>,
    class_constants: HashMap<(String, String), PhpValue>,
}

impl LocalConstants {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name` is fully qualified; a leading `\` is ignored.
    pub fn insert_global(&mut self, name: &str, value: PhpValue) {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.globals.insert(name.to_string(), value);
    }

    pub fn insert_class_constant(&mut self, class: &str, name: &str, value: PhpValue) {
        let class = class.strip_prefix('\\').unwrap_or(class);
        self.class_constants
            .insert((class.to_ascii_lowercase(), name.to_string()), value);
    }
}

impl ConstantLookup for LocalConstants {
    fn class_constant(&self, class: &str, name: &str) -> Option<PhpValue> {
        self.class_constants
            .get(&(class.to_ascii_lowercase(), name.to_string()))
            .cloned()
    }

    fn global_constant(&self, name: &str) -> Option<PhpValue> {
        self.globals.get(name).cloned()
    }
}

/// Values of the predefined constants that commonly appear in defaults.
pub fn builtin_constant(name: &str) -> Option<PhpValue> {
    let value = match name {
        "PHP_EOL" => PhpValue::String("\n".to_string()),
        "PHP_INT_MAX" => PhpValue::Int(i64::MAX),
        "PHP_INT_MIN" => PhpValue::Int(i64::MIN),
        "PHP_INT_SIZE" => PhpValue::Int(8),
        "PHP_FLOAT_EPSILON" => PhpValue::Float(f64::EPSILON),
        "PHP_FLOAT_MAX" => PhpValue::Float(f64::MAX),
        "PHP_FLOAT_MIN" => PhpValue::Float(f64::MIN_POSITIVE),
        "DIRECTORY_SEPARATOR" => PhpValue::String("/".to_string()),
        "M_PI" => PhpValue::Float(std::f64::consts::PI),
        "E_ALL" => PhpValue::Int(32767),
        _ => {
            return match name.to_ascii_lowercase().as_str() {
                "null" => Some(PhpValue::Null),
                "true" => Some(PhpValue::Bool(true)),
                "false" => Some(PhpValue::Bool(false)),
                _ => None,
            };
        }
    };
    Some(value)
}

/// Folds literal expressions into values.
pub struct ValueExtractor<'a> {
    /// Full source text; spans index into it.
    pub source: &'a str,
    pub names: &'a NameContext,
    /// Fully-qualified name (no leading `\`) of the enclosing class.
    pub current_class: Option<&'a str>,
    /// Fully-qualified name of the enclosing class's parent.
    pub parent_class: Option<&'a str>,
    pub local: &'a LocalConstants,
    pub external: &'a dyn ConstantLookup,
}

impl<'a> ValueExtractor<'a> {
    /// Evaluate `expr`; `None` means it cannot be evaluated safely.
    pub fn extract(&self, expr: &Expression<'_>) -> Option<PhpValue> {
        match expr {
            Expression::Literal(literal) => self.extract_literal(literal),
            Expression::Parenthesized(inner) => self.extract(inner.expression),
            Expression::Array(arr) => self.extract_elements(arr.elements.iter()),
            Expression::LegacyArray(arr) => self.extract_elements(arr.elements.iter()),
            Expression::UnaryPrefix(prefix) => self.extract_unary(prefix),
            Expression::Binary(binary) => self.extract_binary(binary),
            Expression::ConstantAccess(access) => {
                let name = self.text(access.span()).trim();
                self.global_constant(name)
            }
            Expression::Identifier(ident) => self.global_constant(ident.value()),
            Expression::Access(Access::ClassConstant(cca)) => {
                let ClassLikeConstantSelector::Identifier(ident) = &cca.constant else {
                    return None;
                };
                let class = self.class_of(cca.class)?;
                if ident.value.eq_ignore_ascii_case("class") {
                    return Some(PhpValue::String(class));
                }
                self.local
                    .class_constant(&class, ident.value)
                    .or_else(|| self.external.class_constant(&class, ident.value))
            }
            Expression::MagicConstant(magic) => match magic {
                MagicConstant::Class(_) => {
                    Some(PhpValue::String(self.current_class.unwrap_or_default().to_string()))
                }
                MagicConstant::Namespace(_) => Some(PhpValue::String(
                    self.names.namespace.clone().unwrap_or_default(),
                )),
                _ => None,
            },
            _ => None,
        }
    }

    fn extract_literal(&self, literal: &Literal<'_>) -> Option<PhpValue> {
        match literal {
            Literal::Null(_) => Some(PhpValue::Null),
            Literal::True(_) => Some(PhpValue::Bool(true)),
            Literal::False(_) => Some(PhpValue::Bool(false)),
            Literal::Integer(int_lit) => match int_lit.value {
                Some(v) if v <= i64::MAX as u64 => Some(PhpValue::Int(v as i64)),
                // Integer literals past i64::MAX are floats in PHP.
                _ => parse_overflowing_int(self.text(int_lit.span())).map(PhpValue::Float),
            },
            Literal::Float(float_lit) => {
                parse_float(self.text(float_lit.span())).map(PhpValue::Float)
            }
            Literal::String(lit_str) => lit_str.value.map(|v| PhpValue::String(v.to_string())),
            _ => None,
        }
    }

    fn extract_elements<'r, 's: 'r>(
        &self,
        elements: impl Iterator<Item = &'r ArrayElement<'s>>,
    ) -> Option<PhpValue> {
        let mut items: Vec<(ArrayKey, PhpValue)> = Vec::new();
        let mut next_index: i64 = 0;

        for element in elements {
            match element {
                ArrayElement::KeyValue(kv) => {
                    let key = ArrayKey::from_value(&self.extract(kv.key)?)?;
                    let value = self.extract(kv.value)?;
                    insert_element(&mut items, &mut next_index, Some(key), value);
                }
                ArrayElement::Value(v) => {
                    let value = self.extract(v.value)?;
                    insert_element(&mut items, &mut next_index, None, value);
                }
                ArrayElement::Variadic(v) => {
                    let PhpValue::Array(spread) = self.extract(v.value)? else {
                        return None;
                    };
                    for (key, value) in spread {
                        match key {
                            ArrayKey::Int(_) => {
                                insert_element(&mut items, &mut next_index, None, value)
                            }
                            key => insert_element(&mut items, &mut next_index, Some(key), value),
                        }
                    }
                }
                _ => return None,
            }
        }

        Some(PhpValue::Array(items))
    }

    fn extract_unary(&self, prefix: &UnaryPrefix<'_>) -> Option<PhpValue> {
        let operand = self.extract(prefix.operand)?;
        match (&prefix.operator, operand) {
            (UnaryPrefixOperator::Negation(_), PhpValue::Int(i)) => Some(
                i.checked_neg()
                    .map(PhpValue::Int)
                    .unwrap_or(PhpValue::Float(-(i as f64))),
            ),
            (UnaryPrefixOperator::Negation(_), PhpValue::Float(f)) => Some(PhpValue::Float(-f)),
            (UnaryPrefixOperator::Plus(_), operand @ (PhpValue::Int(_) | PhpValue::Float(_))) => {
                Some(operand)
            }
            _ => None,
        }
    }

    fn extract_binary(&self, binary: &Binary<'_>) -> Option<PhpValue> {
        let lhs = self.extract(binary.lhs)?;
        let rhs = self.extract(binary.rhs)?;

        match &binary.operator {
            BinaryOperator::StringConcat(_) => {
                let mut joined = lhs.to_php_string()?;
                joined.push_str(&rhs.to_php_string()?);
                Some(PhpValue::String(joined))
            }
            BinaryOperator::Addition(_) => arithmetic(lhs, rhs, i64::checked_add, |a, b| a + b),
            BinaryOperator::Subtraction(_) => arithmetic(lhs, rhs, i64::checked_sub, |a, b| a - b),
            BinaryOperator::Multiplication(_) => {
                arithmetic(lhs, rhs, i64::checked_mul, |a, b| a * b)
            }
            BinaryOperator::Division(_) => match (lhs, rhs) {
                (_, PhpValue::Int(0)) => None,
                (_, PhpValue::Float(f)) if f == 0.0 => None,
                // `PHP_INT_MIN / -1` has no checked remainder and takes the
                // float path, as in PHP.
                (PhpValue::Int(a), PhpValue::Int(b)) if a.checked_rem(b) == Some(0) => {
                    a.checked_div(b).map(PhpValue::Int)
                }
                (a, b) => Some(PhpValue::Float(as_float(&a)? / as_float(&b)?)),
            },
            BinaryOperator::BitwiseOr(_) => match (lhs, rhs) {
                (PhpValue::Int(a), PhpValue::Int(b)) => Some(PhpValue::Int(a | b)),
                _ => None,
            },
            BinaryOperator::BitwiseAnd(_) => match (lhs, rhs) {
                (PhpValue::Int(a), PhpValue::Int(b)) => Some(PhpValue::Int(a & b)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Resolve the class part of `X::NAME` to a fully-qualified name.
    fn class_of(&self, class: &Expression<'_>) -> Option<String> {
        match class {
            Expression::Self_(_) | Expression::Static(_) => {
                self.current_class.map(str::to_string)
            }
            Expression::Parent(_) => self.parent_class.map(str::to_string),
            Expression::Identifier(ident) => Some(self.names.resolve_class(ident.value())),
            _ => None,
        }
    }

    /// Resolve a bare or qualified global constant the way PHP does:
    /// namespaced name first, then the global fallback.
    fn global_constant(&self, name: &str) -> Option<PhpValue> {
        if let Some(fq) = name.strip_prefix('\\') {
            return self.lookup_global(fq);
        }
        if let Some(ns) = &self.names.namespace
            && let Some(value) = self.lookup_global(&format!("{ns}\\{name}"))
        {
            return Some(value);
        }
        self.lookup_global(name)
    }

    fn lookup_global(&self, name: &str) -> Option<PhpValue> {
        self.local
            .global_constant(name)
            .or_else(|| builtin_constant(name))
            .or_else(|| self.external.global_constant(name))
    }

    fn text(&self, span: mago_span::Span) -> &'a str {
        self.source
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }
}

/// Append an element, honouring PHP's auto-increment key rule.
fn insert_element(
    items: &mut Vec<(ArrayKey, PhpValue)>,
    next_index: &mut i64,
    key: Option<ArrayKey>,
    value: PhpValue,
) {
    let key = key.unwrap_or(ArrayKey::Int(*next_index));
    if let ArrayKey::Int(i) = key
        && i >= *next_index
    {
        *next_index = i.saturating_add(1);
    }
    match items.iter_mut().find(|(k, _)| *k == key) {
        // A repeated key overwrites the value but keeps its position.
        Some(slot) => slot.1 = value,
        None => items.push((key, value)),
    }
}

fn as_float(value: &PhpValue) -> Option<f64> {
    match value {
        PhpValue::Int(i) => Some(*i as f64),
        PhpValue::Float(f) => Some(*f),
        _ => None,
    }
}

fn arithmetic(
    lhs: PhpValue,
    rhs: PhpValue,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<PhpValue> {
    if let (PhpValue::Int(a), PhpValue::Int(b)) = (&lhs, &rhs) {
        return Some(match int_op(*a, *b) {
            Some(v) => PhpValue::Int(v),
            None => PhpValue::Float(float_op(*a as f64, *b as f64)),
        });
    }
    Some(PhpValue::Float(float_op(as_float(&lhs)?, as_float(&rhs)?)))
}

/// Parse a PHP float literal (`1_000.5`, `1e3`, `.5`).
fn parse_float(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    cleaned.parse::<f64>().ok()
}

/// Value of an integer literal too large for `i64`, as the float PHP
/// turns it into.  Hex, binary and octal (`0o17`, legacy `017`) are read
/// in their own radix; `None` when the digits do not fit that radix.
fn parse_overflowing_int(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (bin, 2)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (oct, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8)
    } else {
        if lower.is_empty() || !lower.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return lower.parse::<f64>().ok();
    };

    u128::from_str_radix(digits, radix).ok().map(|v| v as f64)
}
