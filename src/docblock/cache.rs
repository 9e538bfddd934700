//! Memoized doc-block parsing.
//!
//! Vendor code repeats the same doc comments a lot (`@param string $key`
//! on every accessor, copied interface docs on implementations).  The
//! cache keys parse results by an xxh3 hash of the comment text and can
//! be shared between threads.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use xxhash_rust::xxh3::xxh3_64;

use super::block::{DocBlock, DocParseError};

pub type ParseResult = Arc<Result<DocBlock, DocParseError>>;

#[derive(Debug, Default)]
pub struct DocBlockCache {
    entries: Mutex<HashMap<u64, Vec<(Box<str>, ParseResult)>>>,
}

impl DocBlockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, reusing an earlier result for identical text.
    pub fn parse(&self, text: &str) -> ParseResult {
        let key = xxh3_64(text.as_bytes());

        if let Some(bucket) = self.entries.lock().get(&key)
            && let Some((_, hit)) = bucket.iter().find(|(t, _)| &**t == text)
        {
            tracing::trace!(key, "doc block cache hit");
            return Arc::clone(hit);
        }

        // Parse outside the lock; a racing thread may parse the same text,
        // in which case the first stored result is kept.
        let parsed: ParseResult = Arc::new(DocBlock::parse(text));

        let mut entries = self.entries.lock();
        let bucket = entries.entry(key).or_default();
        if let Some((_, existing)) = bucket.iter().find(|(t, _)| &**t == text) {
            return Arc::clone(existing);
        }
        bucket.push((text.into(), Arc::clone(&parsed)));
        parsed
    }

    /// Number of distinct comment texts cached.
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
