/// Namespace and import context for name resolution.
///
/// Declaration hints, class-constant references and `Foo::class`
/// expressions are written relative to the file's namespace and `use`
/// imports.  [`NameContext`] holds both and renders such names fully
/// qualified.
use std::collections::HashMap;

use mago_syntax::ast::{Statement, UseItem, UseItems};

use crate::normalize::canonical_builtin;
use crate::util::{is_class_like_name, short_name};

/// Keywords that are never resolved as class names.
const TYPE_KEYWORDS: &[&str] = &[
    "self",
    "static",
    "parent",
    "$this",
    "mixed",
    "object",
    "void",
    "never",
    "null",
    "true",
    "false",
    "callable",
    "iterable",
    "array",
    "list",
    "non-empty-list",
    "non-empty-array",
    "class-string",
    "positive-int",
    "negative-int",
    "non-empty-string",
    "numeric-string",
    "array-key",
    "scalar",
    "numeric",
    "key-of",
    "value-of",
];

/// The namespace and class imports in effect at a point in a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameContext {
    /// Current namespace without leading `\` (e.g. `App\Models`).
    pub namespace: Option<String>,
    /// Maps imported short names (or aliases) to fully-qualified names
    /// without leading `\`.
    pub use_map: HashMap<String, String>,
}

impl NameContext {
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()),
            use_map: HashMap::new(),
        }
    }

    /// The context of one namespace scope: `namespace` plus the class
    /// imports among `statements`.
    ///
    /// Nested namespaces are not entered, they have their own scope.
    /// Function and constant imports never name a class and are skipped.
    pub(crate) fn from_statements<'a>(
        namespace: Option<String>,
        statements: impl Iterator<Item = &'a Statement<'a>>,
    ) -> Self {
        let mut names = Self::new(namespace);
        let mut register = |group: Option<&str>, item: &UseItem| {
            let fqn = match group {
                Some(prefix) => {
                    format!("{}\\{}", prefix.trim_end_matches('\\'), item.name.value())
                }
                None => item.name.value().to_string(),
            };
            let alias = match &item.alias {
                Some(alias) => alias.identifier.value.to_string(),
                None => short_name(&fqn).to_string(),
            };
            names.import(alias, fqn);
        };

        for statement in statements {
            let Statement::Use(use_stmt) = statement else {
                continue;
            };
            match &use_stmt.items {
                UseItems::Sequence(seq) => seq.items.iter().for_each(|item| register(None, item)),
                UseItems::TypedSequence(seq)
                    if !(seq.r#type.is_function() || seq.r#type.is_const()) =>
                {
                    seq.items.iter().for_each(|item| register(None, item))
                }
                UseItems::TypedList(list)
                    if !(list.r#type.is_function() || list.r#type.is_const()) =>
                {
                    let group = list.namespace.value();
                    list.items.iter().for_each(|item| register(Some(group), item))
                }
                UseItems::MixedList(list) => {
                    let group = list.namespace.value();
                    list.items
                        .iter()
                        .filter(|entry| {
                            !entry
                                .r#type
                                .as_ref()
                                .is_some_and(|t| t.is_function() || t.is_const())
                        })
                        .for_each(|entry| register(Some(group), &entry.item))
                }
                _ => {}
            }
        }
        names
    }

    /// Register `use Foo\Bar as Baz;`.
    pub fn import(&mut self, alias: impl Into<String>, fqn: impl Into<String>) {
        let fqn = fqn.into();
        let fqn = fqn.strip_prefix('\\').map(str::to_string).unwrap_or(fqn);
        self.use_map.insert(alias.into(), fqn);
    }

    /// Resolve a class name to its fully-qualified form, without a
    /// leading `\`.
    ///
    /// - `\Foo\Bar` → `Foo\Bar`
    /// - `Bar` imported via `use Foo\Bar` → `Foo\Bar`
    /// - `Sub\Bar` with `use Foo\Sub` → `Foo\Sub\Bar`
    /// - `Bar` in namespace `App` → `App\Bar`
    pub fn resolve_class(&self, name: &str) -> String {
        if let Some(fq) = name.strip_prefix('\\') {
            return fq.to_string();
        }

        if let Some(pos) = name.find('\\') {
            let first = &name[..pos];
            let rest = &name[pos..];
            if let Some(fqn) = self.use_map.get(first) {
                return format!("{fqn}{rest}");
            }
        } else if let Some(fqn) = self.use_map.get(name) {
            return fqn.clone();
        }

        match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Qualify a class or function declared in this namespace, without a
    /// leading `\`.  Imports do not apply to declarations.
    pub fn qualify_declaration(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Qualify a constant name declared in this namespace.
    ///
    /// `VERSION` in namespace `App` → `\App\VERSION`; global constants
    /// keep their bare name.
    pub fn qualify_constant(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("\\{ns}\\{name}"),
            None => name.to_string(),
        }
    }

    /// Rewrite every class name inside a type string to its
    /// fully-qualified `\`-prefixed form, leaving builtins, keywords and
    /// array-shape keys untouched.
    ///
    /// # Examples
    /// - `"?Country"` → `"?\\App\\Country"`
    /// - `"Country|null"` → `"\\App\\Country|null"`
    /// - `"array{name: User}"` → `"array{name: \\App\\User}"`
    pub fn resolve_type_string(&self, type_str: &str) -> String {
        let mut result = String::with_capacity(type_str.len() + 8);
        let bytes = type_str.as_bytes();
        let len = bytes.len();
        let mut i = 0;

        // Inside `{…}`, identifiers before `:` are shape keys.
        let mut brace_depth: u32 = 0;
        let mut in_shape_key = false;

        while i < len {
            let c = bytes[i] as char;

            if c.is_ascii_alphabetic() || c == '_' || c == '\\' {
                let start = i;
                while i < len
                    && (bytes[i].is_ascii_alphanumeric()
                        || bytes[i] == b'_'
                        || bytes[i] == b'\\'
                        || bytes[i] == b'-')
                {
                    i += 1;
                }
                let word = &type_str[start..i];

                if brace_depth > 0 && in_shape_key {
                    result.push_str(word);
                    continue;
                }

                let lower = word.to_ascii_lowercase();
                if canonical_builtin(word).is_some()
                    || TYPE_KEYWORDS.contains(&lower.as_str())
                    || !is_class_like_name(word)
                {
                    result.push_str(word);
                } else {
                    result.push('\\');
                    result.push_str(&self.resolve_class(word));
                }
            } else if c == '$' {
                let start = i;
                i += 1;
                while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                result.push_str(&type_str[start..i]);
            } else {
                let ch = type_str[i..].chars().next().unwrap_or(c);
                match ch {
                    '{' => {
                        brace_depth += 1;
                        in_shape_key = true;
                    }
                    '}' => {
                        brace_depth = brace_depth.saturating_sub(1);
                        in_shape_key = brace_depth > 0;
                    }
                    ':' if brace_depth > 0 => in_shape_key = false,
                    ',' if brace_depth > 0 => in_shape_key = true,
                    _ => {}
                }
                result.push(ch);
                i += ch.len_utf8();
            }
        }

        result
    }
}
