//! PHPDoc block parsing.
//!
//! This module turns doc comments (`/** ... */`) into the type evidence a
//! symbol needs: the primary `@param` / `@var` type with its trailing
//! description, the strict type from `@psalm-*` / `@phpstan-*` tags, the
//! `{@inheritDoc}` marker and a little constant metadata.
//!
//! # Submodules
//!
//! - [`block`]: structural parsing into a summary and ordered tags.
//! - [`tags`]: typed-tag splitting, symbol matching, metadata.
//! - [`strict`]: Psalm/PHPStan dialect reconciliation and validation.
//! - [`types`]: type-token splitting and union handling.
//! - [`cache`]: memoized parsing keyed by content hash.

pub mod block;
pub mod cache;
pub mod strict;
pub mod tags;
pub mod types;

pub use block::{DocBlock, DocParseError, Tag};
pub use cache::DocBlockCache;
pub use strict::{MagoTypeValidator, StrictTypeError, StrictTypeValidator, reconcile_strict_type};
pub use tags::{
    DocTarget, TypedTag, collect_doc_meta, find_typed_tag, is_inherit_doc, param_lines_for,
};
pub use types::{join_alternatives, split_type_token, union_alternatives};
