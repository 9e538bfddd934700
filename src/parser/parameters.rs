/// Parameter construction from syntax-tree nodes.
use std::sync::atomic::{AtomicU64, Ordering};

use mago_span::HasSpan;
use mago_syntax::ast::*;
use xxhash_rust::xxh3::xxh3_64;

use crate::Extractor;
use crate::docblock::{DocTarget, is_inherit_doc};
use crate::normalize::type_of_value;
use crate::types::{Parameter, SymbolTypes};
use crate::util::{is_valid_variable_name, line_of_offset};

use super::NodeScope;

/// Distinguishes placeholder names produced at the same offset.
static INVALID_PARAMETER_SEQ: AtomicU64 = AtomicU64::new(0);

impl Extractor {
    /// Build a parameter from its declaration.
    ///
    /// `doc` is the doc comment of the declaring function; the parameter's
    /// `@param` tag is looked up in it by name.
    pub(crate) fn parameter_from_node(
        &self,
        param: &FunctionLikeParameter<'_>,
        scope: &NodeScope<'_>,
        doc: Option<&str>,
    ) -> Parameter {
        let offset = param.span().start.offset;
        let line = line_of_offset(scope.content, offset);

        let raw_name = param.variable.name;
        let name = raw_name.strip_prefix('$').unwrap_or(raw_name);
        if !is_valid_variable_name(name) {
            return invalid_parameter(line, offset);
        }

        let mut types = SymbolTypes {
            raw_type_from_declaration: param
                .hint
                .as_ref()
                .map(|hint| scope.names.resolve_type_string(scope.text(hint.span()))),
            ..SymbolTypes::default()
        };

        let default_value = param
            .default_value
            .as_ref()
            .and_then(|default| scope.values(self.constant_lookup()).extract(&default.value));
        types.type_from_literal_value = default_value.as_ref().map(type_of_value);

        if let Some(doc) = doc {
            self.read_symbol_doc(doc, DocTarget::Param, name, &mut types);
        }

        Parameter {
            name: name.to_string(),
            has_default: param.default_value.is_some(),
            default_value,
            is_variadic: param.ellipsis.is_some(),
            is_passed_by_reference: param.ampersand.is_some(),
            is_inherit_doc: doc.is_some_and(is_inherit_doc),
            line: Some(line),
            types,
        }
    }
}

/// The degenerate branch: the node carries no usable name, so the
/// parameter gets a unique placeholder name, one diagnostic and nothing
/// else.
fn invalid_parameter(line: u32, offset: u32) -> Parameter {
    let seq = INVALID_PARAMETER_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut seed = [0u8; 12];
    seed[..4].copy_from_slice(&offset.to_le_bytes());
    seed[4..].copy_from_slice(&seq.to_le_bytes());
    let name = format!("__invalid_parameter_{:016x}", xxh3_64(&seed));

    tracing::debug!(line, offset, %name, "parameter without a usable name");

    let mut types = SymbolTypes::default();
    types
        .parse_errors
        .push(format!("{line}:{offset} | an expression is required at this position"));

    Parameter {
        name,
        has_default: false,
        default_value: None,
        is_variadic: false,
        is_passed_by_reference: false,
        is_inherit_doc: false,
        line: Some(line),
        types,
    }
}
