//! Data types for chunks, indexed records, retrieval results, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How many characters of a retrieved chunk survive into a [`ContextSnippet`].
pub const SNIPPET_CHARS: usize = 200;

/// A bounded-length window of a document, produced by a chunker.
///
/// All counts are in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Ordinal position within the document (0-based, document order).
    pub index: usize,
    /// The text content of the chunk.
    pub text: String,
    /// Number of leading characters shared with the end of the previous chunk.
    /// Zero for the first chunk.
    pub overlap_with_previous: usize,
}

/// A `(id, text, vector, metadata)` tuple as held by a vector index.
///
/// Owned exclusively by the index after upsert; the pipeline does not
/// retain a separate copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedRecord {
    /// Identifier, unique within one collection generation.
    pub id: String,
    /// The chunk text stored alongside the vector.
    pub text: String,
    /// The embedding vector for `text`.
    pub embedding: Vec<f32>,
    /// Key-value metadata stored with the record.
    pub metadata: HashMap<String, String>,
}

/// A single retrieval result: chunk text with its distance to the query.
///
/// Sequences of retrieved chunks are ordered by ascending distance
/// (most similar first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// The stored chunk text.
    pub text: String,
    /// Distance between the query vector and this record's vector.
    pub distance: f32,
    /// Metadata stored with the record.
    pub metadata: HashMap<String, String>,
}

/// Token usage reported by the generation capability.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens consumed by the request.
    pub input_tokens: u32,
    /// Tokens produced in the response.
    pub output_tokens: u32,
}

/// A truncated context excerpt attached to an [`Answer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSnippet {
    /// First [`SNIPPET_CHARS`] characters of the retrieved chunk, with a
    /// trailing ellipsis when truncated.
    pub text: String,
    /// Relevance score in `[0, 1]`, derived via [`relevance_score`].
    pub relevance_score: f32,
}

/// The result of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated (or canned) answer text.
    pub answer: String,
    /// Identifier of the model that produced the answer.
    pub model: String,
    /// Number of retrieved chunks supplied to the generation call.
    pub context_chunks_used: usize,
    /// Truncated context excerpts in retrieval order.
    pub context: Vec<ContextSnippet>,
    /// Token usage for the generation call; zero when no call was made.
    pub usage: TokenUsage,
}

/// The result of indexing one document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexSummary {
    /// Number of chunks produced by the chunker.
    pub chunks_created: usize,
    /// Number of records now held by the vector index.
    pub documents_indexed: usize,
}

/// Convert a retrieval distance into a relevance score.
///
/// `score = max(0, 1 - distance)`, clamped so that distances greater than 1
/// never go negative. This assumes a cosine-like metric with distances
/// roughly bounded in `[0, 2]`; with squared Euclidean or another unbounded
/// metric the scores will not meaningfully range over `[0, 1]`.
pub fn relevance_score(distance: f32) -> f32 {
    (1.0 - distance).max(0.0)
}

/// Truncate chunk text to its first [`SNIPPET_CHARS`] characters, appending
/// an ellipsis when anything was cut. Operates on character boundaries.
pub(crate) fn snippet_text(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(SNIPPET_CHARS) {
        Some((byte_end, _)) => format!("{}...", &text[..byte_end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped_at_zero() {
        assert_eq!(relevance_score(1.7), 0.0);
        assert_eq!(relevance_score(2.0), 0.0);
    }

    #[test]
    fn score_decreases_with_distance() {
        assert!(relevance_score(0.1) > relevance_score(0.5));
        assert_eq!(relevance_score(0.0), 1.0);
    }

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(snippet_text("short"), "short");
    }

    #[test]
    fn long_text_gains_ellipsis() {
        let long = "x".repeat(SNIPPET_CHARS + 50);
        let snippet = snippet_text(&long);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let long = "é".repeat(SNIPPET_CHARS + 1);
        let snippet = snippet_text(&long);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), SNIPPET_CHARS + 3);
    }
}
