//! Type-string normalization.
//!
//! Every type string that leaves this crate goes through
//! [`TypeNormalizer::normalize`], which maps the many spellings PHP and
//! its tooling use (`integer`, `boolean`, `double`, `?Foo`, `Foo|NULL`)
//! onto one grammar:
//!
//! - builtin names are lower-case and canonical (`int`, `bool`, `float`,
//!   `string`, `array`, `mixed`, `null`, `object`, …),
//! - nullability is spelled as a leading `null|` alternative,
//! - union alternatives are joined with `|`, in their original order,
//! - class names known to the [`TypeRegistry`] are fully qualified with a
//!   leading `\`.
//!
//! Normalization is total (unknown input passes through) and idempotent.

use std::collections::HashSet;

use crate::types::PhpValue;
use crate::util::{is_class_like_name, split_top_level};

/// Answers whether a name denotes a declared class-like type.
///
/// Used only to decide whether a class name gets the `\` prefix.  Lookups
/// must be read-only so extraction can run on several threads at once.
pub trait TypeRegistry: Send + Sync {
    /// `name` is given without a leading `\`.
    fn is_known_type(&self, name: &str) -> bool;
}

/// A registry that knows no types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoKnownTypes;

impl TypeRegistry for NoKnownTypes {
    fn is_known_type(&self, _name: &str) -> bool {
        false
    }
}

/// A set of known class names, matched case-insensitively like PHP does.
#[derive(Debug, Clone, Default)]
pub struct KnownTypes {
    names: HashSet<String>,
}

impl KnownTypes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known = Self::default();
        for name in names {
            known.insert(name.as_ref());
        }
        known
    }

    pub fn insert(&mut self, name: &str) {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.names.insert(name.to_ascii_lowercase());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TypeRegistry for KnownTypes {
    fn is_known_type(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }
}

impl TypeRegistry for HashSet<String> {
    fn is_known_type(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// Builtin spellings and their canonical form.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("int", "int"),
    ("integer", "int"),
    ("bool", "bool"),
    ("boolean", "bool"),
    ("float", "float"),
    ("double", "float"),
    ("real", "float"),
    ("string", "string"),
    ("array", "array"),
    ("mixed", "mixed"),
    ("null", "null"),
    ("object", "object"),
    ("callable", "callable"),
    ("iterable", "iterable"),
    ("resource", "resource"),
    ("resource (closed)", "resource"),
    ("void", "void"),
    ("never", "never"),
    ("true", "true"),
    ("false", "false"),
    ("self", "self"),
    ("static", "static"),
    ("parent", "parent"),
    ("unknown type", "mixed"),
];

/// Look up the canonical spelling of a builtin type name.
pub fn canonical_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_TYPES
        .iter()
        .find(|(spelling, _)| spelling.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
}

/// Normalizes type strings against a [`TypeRegistry`].
pub struct TypeNormalizer<'r> {
    registry: &'r dyn TypeRegistry,
}

impl<'r> TypeNormalizer<'r> {
    pub fn new(registry: &'r dyn TypeRegistry) -> Self {
        Self { registry }
    }

    /// Normalize a type string.  Never fails; unknown input is returned
    /// trimmed but otherwise unchanged.
    pub fn normalize(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        let mut alternatives: Vec<String> = Vec::new();
        for part in split_top_level(raw, '|') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            // `?int` and the degenerate `??int` both become `null|int`.
            let inner = part.trim_start_matches(|c: char| c == '?' || c.is_whitespace());
            if inner.len() < part.len() && !inner.is_empty() {
                alternatives.push("null".to_string());
                alternatives.push(self.normalize_atom(inner));
            } else {
                alternatives.push(self.normalize_atom(part));
            }
        }
        alternatives.join("|")
    }

    fn normalize_atom(&self, atom: &str) -> String {
        if let Some(canonical) = canonical_builtin(atom) {
            return canonical.to_string();
        }

        // `integer[]` → `int[]`
        if let Some(element) = atom.strip_suffix("[]")
            && !element.is_empty()
        {
            return format!("{}[]", self.normalize_atom(element));
        }

        if is_class_like_name(atom) {
            let bare = atom.strip_prefix('\\').unwrap_or(atom);
            if self.registry.is_known_type(bare) {
                return format!("\\{bare}");
            }
        }

        atom.to_string()
    }
}

/// Normalize without a registry: builtins and nullability only, class
/// names pass through untouched.
pub fn normalize_type(raw: &str) -> String {
    TypeNormalizer::new(&NoKnownTypes).normalize(raw)
}

/// The canonical type of a literal value.
pub fn type_of_value(value: &PhpValue) -> String {
    match value {
        PhpValue::Null => "null",
        PhpValue::Bool(_) => "bool",
        PhpValue::Int(_) => "int",
        PhpValue::Float(_) => "float",
        PhpValue::String(_) => "string",
        PhpValue::Array(_) => "array",
    }
    .to_string()
}
