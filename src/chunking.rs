//! Sentence-aware document chunking.
//!
//! This module provides the [`Chunker`] trait and [`SentenceChunker`], which
//! splits cleaned document text into overlapping bounded-length passages
//! whose boundaries align with sentence boundaries where possible.

use crate::document::Chunk;

/// A strategy for splitting document text into chunks.
///
/// Implementations are pure: the same input always produces the same chunks,
/// in document order, covering every character of the cleaned text.
pub trait Chunker: Send + Sync {
    /// Split raw document text into chunks.
    ///
    /// Returns an empty `Vec` if the cleaned text is empty.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Splits text at sentence boundaries into chunks of bounded character
/// length, seeding each chunk with the tail of its predecessor.
///
/// A chunk is closed when appending the next sentence would push it past
/// `max_chunk_size`; the next chunk then starts with the trailing
/// `overlap_size` characters of the closed chunk followed by the sentence
/// that triggered the overflow. A single sentence longer than
/// `max_chunk_size` is never split further — it becomes its own oversized
/// chunk rather than breaking a semantic unit.
///
/// # Example
///
/// ```rust,ignore
/// use paper_qa::SentenceChunker;
///
/// let chunker = SentenceChunker::new(1000, 200);
/// let chunks = chunker.chunk(&document_text);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_chunk_size: usize,
    overlap_size: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// `overlap_size` is clamped to `max_chunk_size - 1`; an overlap as large
    /// as the chunk itself would make every chunk start with its entire
    /// predecessor.
    ///
    /// # Arguments
    ///
    /// * `max_chunk_size` — maximum number of characters per chunk
    /// * `overlap_size` — characters carried over between consecutive chunks
    pub fn new(max_chunk_size: usize, overlap_size: usize) -> Self {
        let overlap_size = overlap_size.min(max_chunk_size.saturating_sub(1));
        Self { max_chunk_size, overlap_size }
    }
}

/// Normalize raw text: drop page-number artifact lines (lines consisting
/// solely of digits), then collapse every whitespace run to a single space.
pub(crate) fn normalize_text(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit())
        })
        .collect();

    kept.join("\n").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split normalized text into sentence-like units.
///
/// A boundary is a `.`, `!`, or `?` followed by whitespace; the whitespace
/// separator is consumed. The final unit keeps whatever trails the last
/// boundary.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(sep_idx, sep)) = chars.peek() {
                if sep.is_whitespace() {
                    sentences.push(&text[start..sep_idx]);
                    chars.next();
                    start = sep_idx + sep.len_utf8();
                }
            }
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Return the last `n` characters of `s` (the whole string if shorter).
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let total = char_len(s);
    if n >= total {
        return s;
    }
    match s.char_indices().nth(total - n) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;
        // Characters at the start of `current` that were seeded from the
        // previous chunk's tail.
        let mut seeded = 0usize;

        for sentence in split_sentences(&normalized) {
            let sentence_len = char_len(sentence);

            if current_len + sentence_len > self.max_chunk_size && !current.is_empty() {
                let closed = current.trim().to_string();
                let seed = tail_chars(&closed, self.overlap_size).trim_start();
                let seed_len = char_len(seed);

                let mut next = String::with_capacity(seed.len() + sentence.len() + 1);
                next.push_str(seed);
                if !next.is_empty() {
                    next.push(' ');
                }
                next.push_str(sentence);

                chunks.push(Chunk {
                    index: chunks.len(),
                    text: closed,
                    overlap_with_previous: seeded,
                });

                current_len = char_len(&next);
                current = next;
                seeded = seed_len;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(sentence);
                current_len += sentence_len;
            }
        }

        if !current.is_empty() {
            chunks.push(Chunk {
                index: chunks.len(),
                text: current.trim().to_string(),
                overlap_with_previous: seeded,
            });
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = SentenceChunker::new(100, 20);
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("  \n\t ").is_empty());
    }

    #[test]
    fn short_text_becomes_one_chunk() {
        let chunker = SentenceChunker::new(100, 20);
        let chunks = chunker.chunk("One sentence. And another one.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "One sentence. And another one.");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].overlap_with_previous, 0);
    }

    #[test]
    fn whitespace_runs_collapse_to_single_spaces() {
        let chunker = SentenceChunker::new(100, 20);
        let chunks = chunker.chunk("First  line.\n\nSecond\tline.");
        assert_eq!(chunks[0].text, "First line. Second line.");
    }

    #[test]
    fn page_number_lines_are_stripped() {
        let chunker = SentenceChunker::new(100, 20);
        let chunks = chunker.chunk("End of page one.\n7\nStart of page two.");
        assert_eq!(chunks[0].text, "End of page one. Start of page two.");
    }

    #[test]
    fn numbers_inside_sentences_survive() {
        let chunker = SentenceChunker::new(100, 20);
        let chunks = chunker.chunk("The model uses 8 attention heads.");
        assert_eq!(chunks[0].text, "The model uses 8 attention heads.");
    }

    #[test]
    fn overflow_closes_chunk_and_seeds_overlap() {
        let chunker = SentenceChunker::new(30, 10);
        let chunks = chunker.chunk("Alpha beta gamma delta one. Epsilon zeta eta theta two.");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "Alpha beta gamma delta one.");
        let seed = tail_chars(&chunks[0].text, 10).trim_start();
        assert!(chunks[1].text.starts_with(seed));
        assert_eq!(chunks[1].overlap_with_previous, seed.chars().count());
    }

    #[test]
    fn oversized_sentence_is_kept_whole() {
        let chunker = SentenceChunker::new(20, 5);
        let long = "This single sentence is far longer than the limit allows.";
        let text = format!("Tiny one. {long} Tail.");
        let chunks = chunker.chunk(&text);
        assert!(chunks.iter().any(|c| c.text.contains(long)));
    }

    #[test]
    fn sentence_boundaries_keep_punctuation() {
        let sentences = split_sentences("Really? Yes! Good. Done");
        assert_eq!(sentences, vec!["Really?", "Yes!", "Good.", "Done"]);
    }

    #[test]
    fn decimal_points_do_not_split() {
        // No whitespace after the dot, so "3.5" stays intact.
        let sentences = split_sentences("Version 3.5 shipped. Next");
        assert_eq!(sentences, vec!["Version 3.5 shipped.", "Next"]);
    }

    #[test]
    fn overlap_is_clamped_below_chunk_size() {
        let chunker = SentenceChunker::new(10, 50);
        assert_eq!(chunker.overlap_size, 9);
    }

    #[test]
    fn chunking_is_deterministic() {
        let chunker = SentenceChunker::new(40, 10);
        let text = "One two three four. Five six seven eight. Nine ten eleven twelve.";
        assert_eq!(chunker.chunk(text), chunker.chunk(text));
    }
}
