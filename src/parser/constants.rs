/// Constant construction from syntax-tree nodes.
///
/// Three declaration forms produce a [`Constant`]:
///   - `const NAME = value;` at file or namespace level,
///   - `const NAME = value;` (optionally typed) inside a class-like body,
///   - `define('NAME', value);` calls.
///
/// The doc comment preceding the declaration is read with `@var`
/// semantics: an unnamed `@var int` describes the constant, and a named
/// `@var int $NAME` matches when several constants share one comment.
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::Extractor;
use crate::docblock::DocTarget;
use crate::types::{Constant, DocMeta, SymbolTypes};
use crate::util::line_of_offset;

use super::NodeScope;

impl Extractor {
    /// Build a global constant from one item of a `const` statement.
    pub(crate) fn constant_from_item(
        &self,
        item: &ConstantItem<'_>,
        scope: &NodeScope<'_>,
        doc: Option<&str>,
    ) -> Constant {
        let short = item.name.value;
        let value = scope.values(self.constant_lookup()).extract(&item.value);

        self.build_constant(
            scope.names.qualify_constant(short),
            short,
            None,
            None,
            line_of_offset(scope.content, item.span().start.offset),
            doc,
        )
        .with_value(value)
    }

    /// Build a class constant from one item of a class-like `const`
    /// member.
    pub(crate) fn class_constant_from_item(
        &self,
        member: &ClassLikeConstant<'_>,
        item: &ClassLikeConstantItem<'_>,
        scope: &NodeScope<'_>,
        doc: Option<&str>,
    ) -> Constant {
        let name = item.name.value;
        let declared = member
            .hint
            .as_ref()
            .map(|hint| scope.names.resolve_type_string(scope.text(hint.span())));
        let parent_name = scope.class.map(|class| format!("\\{}", class.fqn));
        let value = scope.values(self.constant_lookup()).extract(&item.value);

        self.build_constant(
            name.to_string(),
            name,
            parent_name,
            declared,
            line_of_offset(scope.content, item.span().start.offset),
            doc,
        )
        .with_value(value)
    }

    /// Build a constant from a `define('NAME', value)` call.
    ///
    /// Returns `None` when `expr` is not such a call or the name is not a
    /// plain string literal.  An unevaluable value still yields a
    /// constant, with its value left unset.
    pub(crate) fn constant_from_define(
        &self,
        expr: &Expression<'_>,
        scope: &NodeScope<'_>,
        doc: Option<&str>,
    ) -> Option<Constant> {
        let Expression::Call(Call::Function(func_call)) = expr else {
            return None;
        };
        let Expression::Identifier(ident) = func_call.function else {
            return None;
        };
        let func_name = ident.value();
        let func_name = func_name.strip_prefix('\\').unwrap_or(func_name);
        if !func_name.eq_ignore_ascii_case("define") {
            return None;
        }

        let mut args = func_call.argument_list.arguments.iter().map(|arg| match arg {
            Argument::Positional(pos) => pos.value,
            Argument::Named(named) => named.value,
        });
        let Some(Expression::Literal(Literal::String(lit_str))) = args.next() else {
            return None;
        };
        let raw_name = lit_str.value.filter(|v| !v.is_empty())?;
        let raw_name = raw_name.strip_prefix('\\').unwrap_or(raw_name);

        let name = if raw_name.contains('\\') {
            format!("\\{raw_name}")
        } else {
            raw_name.to_string()
        };
        let short = raw_name.rsplit('\\').next().unwrap_or(raw_name);
        let value = args
            .next()
            .and_then(|value| scope.values(self.constant_lookup()).extract(value));

        Some(
            self.build_constant(
                name,
                short,
                None,
                None,
                line_of_offset(scope.content, expr.span().start.offset),
                doc,
            )
            .with_value(value),
        )
    }

    fn build_constant(
        &self,
        name: String,
        doc_name: &str,
        parent_name: Option<String>,
        declared: Option<String>,
        line: u32,
        doc: Option<&str>,
    ) -> Constant {
        let mut types = SymbolTypes {
            raw_type_from_declaration: declared,
            ..SymbolTypes::default()
        };
        let doc_meta = match doc {
            Some(doc) => self.read_symbol_doc(doc, DocTarget::Var, doc_name, &mut types),
            None => DocMeta::default(),
        };

        Constant {
            name,
            value: None,
            parent_name,
            line: Some(line),
            doc: doc_meta,
            types,
        }
    }
}
