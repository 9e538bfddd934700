//! Data types used throughout phpantom_types.
//!
//! This module contains the symbol records handed to the aggregation
//! layer ([`Constant`], [`Parameter`]), the shared per-symbol type evidence
//! ([`SymbolTypes`]), literal values ([`PhpValue`]) and the per-symbol
//! diagnostics collection ([`Diagnostics`]).
//!
//! All data is owned so records don't depend on the parser's arena
//! lifetime and can be sent across threads freely.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

use crate::normalize::{normalize_type, type_of_value};

// ─── Values ─────────────────────────────────────────────────────────────────

/// Key of a PHP array element.
///
/// PHP only has integer and string keys; numeric strings, booleans and
/// floats are coerced to integers when used as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    String(String),
}

impl ArrayKey {
    /// Coerce a value into an array key the way PHP does.
    ///
    /// Returns `None` for arrays, which are not valid keys.
    pub fn from_value(value: &PhpValue) -> Option<ArrayKey> {
        match value {
            PhpValue::Null => Some(ArrayKey::String(String::new())),
            PhpValue::Bool(b) => Some(ArrayKey::Int(i64::from(*b))),
            PhpValue::Int(i) => Some(ArrayKey::Int(*i)),
            PhpValue::Float(f) => Some(ArrayKey::Int(f.trunc() as i64)),
            PhpValue::String(s) => Some(Self::from_string(s)),
            PhpValue::Array(_) => None,
        }
    }

    /// `"5"` becomes `5`, but `"05"`, `"5.0"` and `" 5"` stay strings.
    pub fn from_string(s: &str) -> ArrayKey {
        let digits = s.strip_prefix('-').unwrap_or(s);
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
            && s != "-0";
        if canonical && let Ok(i) = s.parse::<i64>() {
            return ArrayKey::Int(i);
        }
        ArrayKey::String(s.to_string())
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{i}"),
            ArrayKey::String(s) => write!(f, "'{s}'"),
        }
    }
}

/// A literal PHP value extracted from source or reflection.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value pairs, as PHP arrays preserve insertion order.
    Array(Vec<(ArrayKey, PhpValue)>),
}

impl PhpValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Convert a value to its string form for concatenation.
    ///
    /// Arrays have no useful string form (PHP emits `"Array"` plus a
    /// warning), so they yield `None`.
    pub fn to_php_string(&self) -> Option<String> {
        match self {
            PhpValue::Null => Some(String::new()),
            PhpValue::Bool(true) => Some("1".to_string()),
            PhpValue::Bool(false) => Some(String::new()),
            PhpValue::Int(i) => Some(i.to_string()),
            PhpValue::Float(f) => Some(format_php_float(*f)),
            PhpValue::String(s) => Some(s.clone()),
            PhpValue::Array(_) => None,
        }
    }
}

/// Render a float the way PHP's string conversion does for common values.
fn format_php_float(f: f64) -> String {
    if f.is_nan() {
        return "NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if f.fract() == 0.0 && f.abs() < 1e15 {
        return format!("{}", f as i64);
    }
    format!("{f}")
}

impl From<serde_json::Value> for PhpValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PhpValue::Null,
            serde_json::Value::Bool(b) => PhpValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PhpValue::Int(i)
                } else {
                    PhpValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => PhpValue::String(s),
            serde_json::Value::Array(items) => PhpValue::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (ArrayKey::Int(i as i64), PhpValue::from(v)))
                    .collect(),
            ),
            serde_json::Value::Object(map) => PhpValue::Array(
                map.into_iter()
                    .map(|(k, v)| (ArrayKey::from_string(&k), PhpValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// ─── Diagnostics ────────────────────────────────────────────────────────────

/// Per-symbol collection of recovered failures.
///
/// Entries are keyed by a fingerprint of the message text, so the same
/// failure reported twice for one symbol is stored once while distinct
/// messages accumulate in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<(u64, String)>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fingerprint used as the key of a diagnostic message.
    pub fn fingerprint(message: &str) -> u64 {
        xxh3_64(message.as_bytes())
    }

    /// Record a message.  Returns `false` if an identical message was
    /// already present.
    pub fn push(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        let key = Self::fingerprint(&message);
        if self.entries.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.entries.push((key, message));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, fingerprint: u64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == fingerprint)
            .map(|(_, m)| m.as_str())
    }

    /// Iterate over `(fingerprint, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(k, m)| (*k, m.as_str()))
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, m)| m.as_str())
    }
}

// ─── Symbols ────────────────────────────────────────────────────────────────

/// Type evidence shared by every symbol kind.
///
/// Each field holds what one source said about the symbol; none of them
/// is the answer on its own.  [`SymbolTypes::resolve`] applies the
/// precedence policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTypes {
    /// Explicit type from the declaration (`int $x`, `const string FOO`)
    /// or the reflected type on the reflection path.
    pub raw_type_from_declaration: Option<String>,
    /// Type from the primary `@param` / `@var` tag, union alternatives
    /// joined with `|` in source order.
    pub type_from_doc_primary: Option<String>,
    /// Type from `@psalm-*` / `@phpstan-*` (or the primary tag) that
    /// passed strict validation.
    pub type_from_doc_strict: Option<String>,
    /// Type of the literal default / constant value.
    pub type_from_literal_value: Option<String>,
    /// Description text that followed the matched doc tag.
    pub free_text_comment: Option<String>,
    /// Recovered failures for this symbol.
    pub parse_errors: Diagnostics,
}

impl SymbolTypes {
    /// Pick the type exposed to callers: strict doc type, then the
    /// declaration, then the primary doc type.  The literal value never
    /// takes part.
    pub fn resolve(&self) -> Option<String> {
        [
            &self.type_from_doc_strict,
            &self.raw_type_from_declaration,
            &self.type_from_doc_primary,
        ]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .map(|t| normalize_type(t))
    }
}

/// Metadata collected from a constant's own doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMeta {
    pub is_deprecated: bool,
    pub is_internal: bool,
    /// Version given by `@since`, if any.
    pub since: Option<String>,
    /// Targets of `@see` and `@link` tags, in order.
    pub references: Vec<String>,
}

/// A global constant, a `define()` constant or a class constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    /// The constant name; namespaced global constants carry their
    /// namespace (e.g. `\App\VERSION`).
    pub name: String,
    /// The literal value, or `None` when it could not be evaluated.
    pub value: Option<PhpValue>,
    /// Fully-qualified name of the owning class for class constants.
    pub parent_name: Option<String>,
    /// 1-based source line (tree path only).
    pub line: Option<u32>,
    pub doc: DocMeta,
    pub types: SymbolTypes,
}

impl Constant {
    /// The resolved type of the constant.
    ///
    /// Follows [`SymbolTypes::resolve`] and then falls back to the type of
    /// the value: a constant cannot hold anything but its value, so here
    /// the literal is real evidence rather than a guess.
    pub fn get_type(&self) -> Option<String> {
        self.types
            .resolve()
            .or_else(|| self.types.type_from_literal_value.clone())
    }

    pub fn type_from_literal_value(&self) -> Option<&str> {
        self.types.type_from_literal_value.as_deref()
    }

    pub fn parse_errors(&self) -> &Diagnostics {
        &self.types.parse_errors
    }

    pub(crate) fn with_value(mut self, value: Option<PhpValue>) -> Self {
        self.types.type_from_literal_value = value.as_ref().map(type_of_value);
        self.value = value;
        self
    }
}

/// A function, method or closure parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name WITHOUT the `$` prefix.
    pub name: String,
    /// The declaration carries a default, whether or not it could be
    /// evaluated.
    pub has_default: bool,
    /// The default value, when present and safely evaluable.
    pub default_value: Option<PhpValue>,
    pub is_variadic: bool,
    pub is_passed_by_reference: bool,
    /// The doc comment defers to an ancestor (`{@inheritDoc}`).
    pub is_inherit_doc: bool,
    /// 1-based source line (tree path only).
    pub line: Option<u32>,
    pub types: SymbolTypes,
}

impl Parameter {
    /// The resolved type of the parameter.  See [`SymbolTypes::resolve`].
    pub fn get_type(&self) -> Option<String> {
        self.types.resolve()
    }

    /// Type of the default value, kept apart from [`Parameter::get_type`]
    /// so that `int|null $x = null` still reports `int|null`.
    pub fn type_from_literal_value(&self) -> Option<&str> {
        self.types.type_from_literal_value.as_deref()
    }

    pub fn parse_errors(&self) -> &Diagnostics {
        &self.types.parse_errors
    }

    /// `true` when the parameter may be omitted at the call site.
    pub fn is_optional(&self) -> bool {
        self.is_variadic || self.has_default
    }
}

/// The parameters of one function-like declaration, as returned by
/// [`crate::Extractor::extract_parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameters {
    /// Namespace-qualified without a leading `\`: `App\handle` for
    /// functions, `App\Service::map` for methods, `{closure}` for closures
    /// and arrow functions.
    pub function: String,
    pub parameters: Vec<Parameter>,
}
