//! The [`Extractor`]: shared state for both construction paths.
//!
//! An `Extractor` bundles the collaborators symbol construction needs
//! (type registry, strict validator, external constant lookup) with the
//! configuration and the optional doc-block cache.  The tree-node
//! factories live in [`crate::parser`], the reflection factories in
//! [`crate::reflection`]; both call [`Extractor::read_symbol_doc`] so the
//! two paths read doc comments identically.
//!
//! An `Extractor` is `Send + Sync` and never mutated by extraction, so
//! one instance can serve many threads.

use std::sync::Arc;

use crate::config::ExtractorConfig;
use crate::docblock::cache::ParseResult;
use crate::docblock::{
    DocBlock, DocBlockCache, DocTarget, MagoTypeValidator, StrictTypeValidator, collect_doc_meta,
    find_typed_tag, reconcile_strict_type,
};
use crate::normalize::{KnownTypes, TypeNormalizer, TypeRegistry};
use crate::types::{DocMeta, SymbolTypes};
use crate::value::{ConstantLookup, NoConstants};

pub struct Extractor {
    config: ExtractorConfig,
    registry: Box<dyn TypeRegistry>,
    validator: Box<dyn StrictTypeValidator>,
    constants: Box<dyn ConstantLookup>,
    cache: Option<DocBlockCache>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl Extractor {
    /// Build an extractor with the builtin collaborators: a registry of
    /// `config.known_types`, the mago type validator and no external
    /// constants.
    pub fn new(config: ExtractorConfig) -> Self {
        let registry = KnownTypes::new(&config.known_types);
        let cache = config.memoize_docblocks.then(DocBlockCache::new);
        Self {
            config,
            registry: Box::new(registry),
            validator: Box::new(MagoTypeValidator),
            constants: Box::new(NoConstants),
            cache,
        }
    }

    pub fn with_registry(mut self, registry: impl TypeRegistry + 'static) -> Self {
        self.registry = Box::new(registry);
        self
    }

    pub fn with_validator(mut self, validator: impl StrictTypeValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_constant_lookup(mut self, lookup: impl ConstantLookup + 'static) -> Self {
        self.constants = Box::new(lookup);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub(crate) fn registry(&self) -> &dyn TypeRegistry {
        self.registry.as_ref()
    }

    pub(crate) fn constant_lookup(&self) -> &dyn ConstantLookup {
        self.constants.as_ref()
    }

    /// The doc-block cache, when `memoize_docblocks` is on.
    pub fn cache(&self) -> Option<&DocBlockCache> {
        self.cache.as_ref()
    }

    /// Normalize a type string against this extractor's registry.
    pub fn normalize(&self, raw: &str) -> String {
        TypeNormalizer::new(self.registry()).normalize(raw)
    }

    fn parse_doc(&self, text: &str) -> ParseResult {
        match &self.cache {
            Some(cache) => cache.parse(text),
            None => Arc::new(DocBlock::parse(text)),
        }
    }

    /// Fill the doc-derived fields of `types` from `doc_text`.
    ///
    /// A malformed comment records a diagnostic and leaves every
    /// doc-derived field unset; the declaration and literal fields are
    /// never touched.  Returns the metadata tags of the comment (empty
    /// when it was malformed).
    pub(crate) fn read_symbol_doc(
        &self,
        doc_text: &str,
        target: DocTarget,
        symbol_name: &str,
        types: &mut SymbolTypes,
    ) -> DocMeta {
        let parsed = self.parse_doc(doc_text);
        let block = match parsed.as_ref() {
            Ok(block) => block,
            Err(err) => {
                tracing::debug!(symbol = symbol_name, %err, "doc comment rejected");
                types.parse_errors.push(format!("{symbol_name}: {err}"));
                return DocMeta::default();
            }
        };

        if let Some(tag) = find_typed_tag(block, target.tag_name(), target, symbol_name) {
            let primary = tag.union_type();
            if let Some(primary) = &primary
                && self.config.validate_primary_doc_type
            {
                match self.validator.validate(primary) {
                    Ok(strict) => types.type_from_doc_strict = Some(self.normalize(&strict)),
                    Err(err) => {
                        tracing::debug!(symbol = symbol_name, %err, "primary doc type not strict");
                    }
                }
            }
            types.type_from_doc_primary = primary.map(|t| self.normalize(&t));
            types.free_text_comment = tag.description;
        }

        if self.config.strict_dialects
            && let Some(strict) = reconcile_strict_type(
                block,
                target,
                symbol_name,
                self.validator.as_ref(),
                &mut types.parse_errors,
            )
        {
            types.type_from_doc_strict = Some(self.normalize(&strict));
        }

        if let (Some(strict), Some(declared)) =
            (&types.type_from_doc_strict, &types.raw_type_from_declaration)
            && self.normalize(strict) != self.normalize(declared)
        {
            tracing::debug!(
                symbol = symbol_name,
                strict = %strict,
                declared = %declared,
                "strict doc type overrides declaration"
            );
        }

        collect_doc_meta(block)
    }
}
