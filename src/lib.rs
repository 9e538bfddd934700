//! Type extraction and reconciliation for PHP constants and parameters.
//!
//! A PHP symbol's type can be stated in up to four places at once: the
//! literal value, the declaration's own type hint (or the reflected type
//! of a loaded symbol), the `@param` / `@var` doc tag, and the stricter
//! `@psalm-*` / `@phpstan-*` doc tags.  This crate reads all of them,
//! normalizes each into one type grammar and resolves them with a fixed
//! precedence:
//!
//! 1. the strict doc type (validated by a real type parser),
//! 2. the declared or reflected type,
//! 3. the primary doc type.
//!
//! Broken doc comments never abort extraction; they leave a diagnostic on
//! the affected symbol and the remaining evidence still counts.
//!
//! ```no_run
//! use phpantom_types::{Extractor, ExtractorConfig};
//!
//! let extractor = Extractor::new(ExtractorConfig::default());
//! let constants = extractor.extract_constants("<?php const FOO = 3.14;");
//! assert_eq!(constants[0].get_type().as_deref(), Some("float"));
//! ```

pub mod config;
pub mod docblock;
mod extractor;
pub mod names;
pub mod normalize;
pub mod parser;
pub mod reflection;
pub mod types;
pub mod util;
pub mod value;

pub use config::{ConfigError, ExtractorConfig};
pub use extractor::Extractor;
pub use normalize::{KnownTypes, NoKnownTypes, TypeNormalizer, TypeRegistry, normalize_type};
pub use parser::FileSymbols;
pub use reflection::{
    ConstantHandle, ParameterHandle, ReflectedConstant, ReflectedParameter, ReflectedType,
};
pub use types::{
    ArrayKey, Constant, Diagnostics, DocMeta, FunctionParameters, Parameter, PhpValue, SymbolTypes,
};
pub use value::{ConstantLookup, LocalConstants, NoConstants, ValueExtractor};
