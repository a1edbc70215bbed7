//! Whitespace-tokenized document splitter
//!
//! Chunks carry a soft cap of 512 approximate tokens, one token per four
//! characters. Chunks of a document preserve textual order and their
//! indices are dense.

use super::models::{Chunk, Document};

/// Soft cap per chunk, in approximate tokens
const MAX_CHUNK_TOKENS: usize = 512;

/// Approximate characters per token
const CHARS_PER_TOKEN: usize = 4;

/// Estimate token count for text
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + CHARS_PER_TOKEN - 1) / CHARS_PER_TOKEN
}

/// Split a document into chunks on whitespace boundaries
pub fn split_document(document: &Document) -> Vec<Chunk> {
    let max_chars = MAX_CHUNK_TOKENS * CHARS_PER_TOKEN;

    let mut chunks = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, chunks: &mut Vec<Chunk>| {
        if !current.is_empty() {
            chunks.push(Chunk::new(
                &document.id,
                chunks.len(),
                std::mem::take(current),
                document.tags.clone(),
            ));
        }
    };

    for word in document.text.split_whitespace() {
        // Soft cap: a chunk may finish the word that crosses the boundary,
        // but starts a new chunk once full.
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            flush(&mut current, &mut chunks);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    flush(&mut current, &mut chunks);

    chunks
}
