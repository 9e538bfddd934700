//! PHP source parsing and the tree-node construction path.
//!
//! This module parses PHP source text with the mago_syntax parser and
//! walks the resulting AST, building a [`Constant`] for every global
//! `const`, class constant and `define()` call, and a [`Parameter`] for
//! every parameter of every function, method, closure and arrow
//! function.
//!
//! Sub-modules:
//! - [`constants`]: `Constant` factories for the three declaration forms
//! - [`parameters`]: the `Parameter` factory and its degenerate branch
mod constants;
mod parameters;

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::Extractor;
use crate::names::NameContext;
use crate::types::*;
use crate::types::Constant;
use crate::value::{ConstantLookup, LocalConstants, ValueExtractor};

/// Everything the tree path found in one file, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSymbols {
    pub constants: Vec<Constant>,
    pub functions: Vec<FunctionParameters>,
}

/// The class-like declaration currently being walked.
#[derive(Debug, Clone)]
pub(crate) struct ClassScope {
    /// Fully-qualified name without leading `\`.
    pub fqn: String,
    /// Fully-qualified parent class, for `parent::X`.
    pub parent: Option<String>,
}

/// What a tree-node factory can see of its surroundings.
pub(crate) struct NodeScope<'a> {
    pub content: &'a str,
    pub names: &'a NameContext,
    pub class: Option<&'a ClassScope>,
    pub local: &'a LocalConstants,
}

impl<'a> NodeScope<'a> {
    pub fn text(&self, span: Span) -> &'a str {
        self.content
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    pub fn values(&self, external: &'a dyn ConstantLookup) -> ValueExtractor<'a> {
        ValueExtractor {
            source: self.content,
            names: self.names,
            current_class: self.class.map(|c| c.fqn.as_str()),
            parent_class: self.class.and_then(|c| c.parent.as_deref()),
            local: self.local,
            external,
        }
    }
}

/// The doc comment attached to the node starting at `node_start`.
///
/// Walking back from the node, whitespace and plain comments are skipped;
/// any code in between detaches an earlier doc comment.
pub(crate) fn attached_doc_comment<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node_start: u32,
) -> Option<&'a str> {
    let preceding = &trivia[..trivia.partition_point(|t| t.span.start.offset < node_start)];
    let mut cursor = node_start as usize;

    for t in preceding.iter().rev() {
        let gap = content.get(t.span.end.offset as usize..cursor);
        if !gap.is_none_or(|gap| gap.trim().is_empty()) {
            return None;
        }
        if matches!(t.kind, TriviaKind::DocBlockComment) {
            return Some(t.value);
        }
        cursor = t.span.start.offset as usize;
    }
    None
}

/// Walks one file, carrying the namespace, class and local-constant
/// state the factories need.
struct FileWalker<'x> {
    extractor: &'x Extractor,
    content: &'x str,
    trivias: &'x [Trivia<'x>],
    names: NameContext,
    class: Option<ClassScope>,
    local: LocalConstants,
    out: FileSymbols,
}

impl<'x> FileWalker<'x> {
    fn scope(&self) -> NodeScope<'_> {
        NodeScope {
            content: self.content,
            names: &self.names,
            class: self.class.as_ref(),
            local: &self.local,
        }
    }

    fn doc_for(&self, node: &impl HasSpan) -> Option<&'x str> {
        attached_doc_comment(self.trivias, self.content, node.span().start.offset)
    }

    fn walk_statements<'s>(&mut self, statements: impl Iterator<Item = &'s Statement<'s>>) {
        for statement in statements {
            self.walk_statement(statement);
        }
    }

    fn walk_statement<'s>(&mut self, statement: &'s Statement<'s>) {
        match statement {
            Statement::Namespace(namespace) => {
                let ns_name = namespace
                    .name
                    .as_ref()
                    .map(|ident| ident.value().to_string())
                    .filter(|s| !s.is_empty());

                let names = NameContext::from_statements(ns_name, namespace.statements().iter());
                let outer = std::mem::replace(&mut self.names, names);
                self.walk_statements(namespace.statements().iter());
                self.names = outer;
            }
            Statement::Constant(const_decl) => {
                let doc = self.doc_for(const_decl);
                for item in const_decl.items.iter() {
                    let constant = self.extractor.constant_from_item(item, &self.scope(), doc);
                    self.register(constant);
                }
            }
            Statement::Expression(expr_stmt) => {
                let doc = self.doc_for(statement);
                let define = self.extractor.constant_from_define(
                    expr_stmt.expression,
                    &self.scope(),
                    doc,
                );
                match define {
                    Some(constant) => self.register(constant),
                    None => self.walk_expression(expr_stmt.expression, doc),
                }
            }
            Statement::Return(ret) => {
                if let Some(value) = &ret.value {
                    let doc = self.doc_for(statement);
                    self.walk_expression(value, doc);
                }
            }
            Statement::Function(func) => {
                let name = self.names.qualify_declaration(func.name.value);
                let doc = self.doc_for(func);
                self.collect_parameters(name, &func.parameter_list, doc);
                self.walk_statements(func.body.statements.iter());
            }
            Statement::Class(class) => {
                let parent = class.extends.as_ref().and_then(|ext| {
                    ext.types
                        .first()
                        .map(|ident| self.names.resolve_class(ident.value()))
                });
                self.walk_class_like(class.name.value, parent, class.members.iter());
            }
            Statement::Interface(iface) => {
                self.walk_class_like(iface.name.value, None, iface.members.iter());
            }
            Statement::Trait(trait_def) => {
                self.walk_class_like(trait_def.name.value, None, trait_def.members.iter());
            }
            Statement::Enum(enum_def) => {
                self.walk_class_like(enum_def.name.value, None, enum_def.members.iter());
            }
            Statement::Block(block) => {
                self.walk_statements(block.statements.iter());
            }
            // `if (!defined('X')) { define('X', 1); }` and
            // `if (!function_exists('f')) { function f() {} }`
            Statement::If(if_stmt) => self.walk_if_body(&if_stmt.body),
            _ => {}
        }
    }

    fn walk_if_body<'s>(&mut self, body: &'s IfBody<'s>) {
        match body {
            IfBody::Statement(body) => {
                self.walk_statement(body.statement);
                for else_if in body.else_if_clauses.iter() {
                    self.walk_statement(else_if.statement);
                }
                if let Some(else_clause) = &body.else_clause {
                    self.walk_statement(else_clause.statement);
                }
            }
            IfBody::ColonDelimited(body) => {
                self.walk_statements(body.statements.iter());
                for else_if in body.else_if_clauses.iter() {
                    self.walk_statements(else_if.statements.iter());
                }
                if let Some(else_clause) = &body.else_clause {
                    self.walk_statements(else_clause.statements.iter());
                }
            }
        }
    }

    fn walk_class_like<'s>(
        &mut self,
        short: &str,
        parent: Option<String>,
        members: impl Iterator<Item = &'s ClassLikeMember<'s>>,
    ) {
        let scope = ClassScope {
            fqn: self.names.qualify_declaration(short),
            parent,
        };
        let outer = self.class.replace(scope);

        for member in members {
            match member {
                ClassLikeMember::Constant(constant) => {
                    let doc = self.doc_for(member);
                    for item in constant.items.iter() {
                        let built = self.extractor.class_constant_from_item(
                            constant,
                            item,
                            &self.scope(),
                            doc,
                        );
                        self.register(built);
                    }
                }
                ClassLikeMember::Method(method) => {
                    let class_fqn = self.class.as_ref().map(|c| c.fqn.clone()).unwrap_or_default();
                    let name = format!("{class_fqn}::{}", method.name.value);
                    let doc = self.doc_for(member);
                    self.collect_parameters(name, &method.parameter_list, doc);
                    if let MethodBody::Concrete(block) = &method.body {
                        self.walk_statements(block.statements.iter());
                    }
                }
                _ => {}
            }
        }

        self.class = outer;
    }

    /// Find closures and arrow functions in the usual places: assigned,
    /// returned, passed as an argument.
    fn walk_expression<'s>(&mut self, expr: &'s Expression<'s>, doc: Option<&'x str>) {
        match expr {
            Expression::Closure(closure) => {
                self.collect_parameters("{closure}".to_string(), &closure.parameter_list, doc);
                self.walk_statements(closure.body.statements.iter());
            }
            Expression::ArrowFunction(arrow) => {
                self.collect_parameters("{closure}".to_string(), &arrow.parameter_list, doc);
                self.walk_expression(arrow.expression, None);
            }
            Expression::Assignment(assignment) => self.walk_expression(assignment.rhs, doc),
            Expression::Parenthesized(inner) => self.walk_expression(inner.expression, doc),
            Expression::Call(Call::Function(call)) => {
                for argument in call.argument_list.arguments.iter() {
                    let value = match argument {
                        Argument::Positional(pos) => pos.value,
                        Argument::Named(named) => named.value,
                    };
                    self.walk_expression(value, None);
                }
            }
            _ => {}
        }
    }

    fn collect_parameters(
        &mut self,
        function: String,
        parameter_list: &FunctionLikeParameterList<'_>,
        doc: Option<&'x str>,
    ) {
        let parameters = parameter_list
            .parameters
            .iter()
            .map(|param| self.extractor.parameter_from_node(param, &self.scope(), doc))
            .collect();
        self.out.functions.push(FunctionParameters {
            function,
            parameters,
        });
    }

    /// Record a constant and make its value visible to later declarations.
    fn register(&mut self, constant: Constant) {
        if let Some(value) = &constant.value {
            match &constant.parent_name {
                Some(class) => {
                    self.local
                        .insert_class_constant(class, &constant.name, value.clone())
                }
                None => self.local.insert_global(&constant.name, value.clone()),
            }
        }
        self.out.constants.push(constant);
    }
}

impl Extractor {
    /// Parse PHP source text and build every constant and parameter in it.
    ///
    /// A panic inside the parser is caught and logged; the file then
    /// yields no symbols.
    pub fn extract(&self, content: &str) -> FileSymbols {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let arena = bumpalo::Bump::new();
            let file_id = mago_database::file::FileId::new("input.php");
            let program = mago_syntax::parser::parse_file_content(&arena, file_id, content);

            let names = NameContext::from_statements(None, program.statements.iter());

            let mut walker = FileWalker {
                extractor: self,
                content,
                trivias: program.trivia.as_slice(),
                names,
                class: None,
                local: LocalConstants::new(),
                out: FileSymbols::default(),
            };
            walker.walk_statements(program.statements.iter());
            walker.out
        }));

        match result {
            Ok(symbols) => {
                tracing::trace!(
                    constants = symbols.constants.len(),
                    functions = symbols.functions.len(),
                    "extracted symbols"
                );
                symbols
            }
            Err(_) => {
                tracing::error!("parser panicked during extraction");
                FileSymbols::default()
            }
        }
    }

    /// Every global constant, class constant and `define()` constant in
    /// `content`, in source order.
    pub fn extract_constants(&self, content: &str) -> Vec<Constant> {
        self.extract(content).constants
    }

    /// The parameters of every function, method and closure in `content`.
    pub fn extract_parameters(&self, content: &str) -> Vec<FunctionParameters> {
        self.extract(content).functions
    }
}
