//! The reflection construction path.
//!
//! Symbols loaded at runtime are described by handles rather than syntax
//! nodes.  [`ConstantHandle`] and [`ParameterHandle`] abstract over where
//! the handle comes from; [`ReflectedConstant`] and [`ReflectedParameter`]
//! are owned implementations that deserialize from a reflection snapshot
//! (for example one dumped by a PHP script with `json_encode`).
//!
//! Reflection data comes from successfully loaded code, so there is no
//! degenerate branch: missing information just leaves fields unset.

use serde::Deserialize;

use crate::Extractor;
use crate::docblock::{DocTarget, is_inherit_doc, param_lines_for};
use crate::normalize::type_of_value;
use crate::types::{Constant, DocMeta, Parameter, PhpValue, SymbolTypes};
use crate::util::split_top_level;

/// A loaded constant.
pub trait ConstantHandle {
    fn name(&self) -> &str;
    fn value(&self) -> PhpValue;

    /// Fully-qualified name of the declaring class, for class constants.
    fn declaring_class(&self) -> Option<&str> {
        None
    }

    fn doc_comment(&self) -> Option<&str> {
        None
    }
}

/// A loaded function or method parameter.
pub trait ParameterHandle {
    /// The parameter name, with or without `$`.
    fn name(&self) -> &str;
    /// `None` when no default is available.
    fn default_value(&self) -> Option<PhpValue>;
    fn declaring_function_doc_comment(&self) -> Option<&str>;
    fn reflected_type(&self) -> Option<ReflectedType>;
    fn is_variadic(&self) -> bool;
    fn is_passed_by_reference(&self) -> bool;
}

/// A reflected type: its name (absent for untyped parameters) and
/// whether it admits `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReflectedType {
    pub name: Option<String>,
    pub allows_null: bool,
}

impl ReflectedType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            allows_null: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.allows_null = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReflectedConstant {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

impl ConstantHandle for ReflectedConstant {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> PhpValue {
        PhpValue::from(self.value.clone())
    }

    fn declaring_class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    fn doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }
}

/// Mirrors the parts of PHP's `ReflectionParameter` the extractor reads.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReflectedParameter {
    pub name: String,
    /// `ReflectionParameter::isDefaultValueAvailable()`; needed because a
    /// `null` default and no default look alike in JSON.
    pub is_default_value_available: bool,
    pub default_value: serde_json::Value,
    pub doc_comment: Option<String>,
    #[serde(rename = "type")]
    pub reflected_type: Option<ReflectedType>,
    pub is_variadic: bool,
    pub is_passed_by_reference: bool,
}

impl ParameterHandle for ReflectedParameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_value(&self) -> Option<PhpValue> {
        self.is_default_value_available
            .then(|| PhpValue::from(self.default_value.clone()))
    }

    fn declaring_function_doc_comment(&self) -> Option<&str> {
        self.doc_comment.as_deref()
    }

    fn reflected_type(&self) -> Option<ReflectedType> {
        self.reflected_type.clone()
    }

    fn is_variadic(&self) -> bool {
        self.is_variadic
    }

    fn is_passed_by_reference(&self) -> bool {
        self.is_passed_by_reference
    }
}

impl Extractor {
    /// Build a constant from a reflection handle.
    pub fn constant_from_reflection(&self, handle: &dyn ConstantHandle) -> Constant {
        let name = handle.name().to_string();
        let mut types = SymbolTypes::default();

        let doc = match handle.doc_comment() {
            Some(doc) => {
                let short = name.rsplit(['\\', ':']).next().unwrap_or(&name);
                self.read_symbol_doc(doc, DocTarget::Var, short, &mut types)
            }
            None => DocMeta::default(),
        };

        Constant {
            parent_name: handle
                .declaring_class()
                .map(|class| format!("\\{}", class.trim_start_matches('\\'))),
            name,
            value: None,
            line: None,
            doc,
            types,
        }
        .with_value(Some(handle.value()))
    }

    /// Build a parameter from a reflection handle.
    ///
    /// The declaring function's doc comment is cut down to the lines that
    /// describe this parameter before it is parsed, so a broken tag for a
    /// sibling parameter does not cost this one its doc type.
    pub fn parameter_from_reflection(&self, handle: &dyn ParameterHandle) -> Parameter {
        let name = handle.name().trim_start_matches('$').to_string();

        let mut types = SymbolTypes {
            raw_type_from_declaration: handle
                .reflected_type()
                .and_then(|reflected| self.compose_reflected_type(&reflected)),
            ..SymbolTypes::default()
        };

        let default_value = handle.default_value();
        types.type_from_literal_value = default_value.as_ref().map(type_of_value);

        let doc = handle.declaring_function_doc_comment();
        if let Some(lines) = doc.and_then(|doc| param_lines_for(doc, &name)) {
            self.read_symbol_doc(&lines, DocTarget::Param, &name, &mut types);
        }

        Parameter {
            has_default: default_value.is_some(),
            default_value,
            is_variadic: handle.is_variadic(),
            is_passed_by_reference: handle.is_passed_by_reference(),
            is_inherit_doc: doc.is_some_and(is_inherit_doc),
            line: None,
            types,
            name,
        }
    }

    /// `Foo` + nullable → `null|\Foo` (when `Foo` is known); no name +
    /// nullable → `null|mixed`.
    fn compose_reflected_type(&self, reflected: &ReflectedType) -> Option<String> {
        let name = reflected
            .name
            .as_deref()
            .map(|name| self.normalize(name))
            .filter(|name| !name.is_empty());

        match (name, reflected.allows_null) {
            (Some(name), true) => {
                let has_null = split_top_level(&name, '|')
                    .iter()
                    .any(|alt| alt.trim() == "null");
                Some(if has_null { name } else { format!("null|{name}") })
            }
            (Some(name), false) => Some(name),
            (None, true) => Some("null|mixed".to_string()),
            (None, false) => None,
        }
    }
}
