//! Recursive boundary-aware text splitting.
//!
//! [`TextSplitter`] splits extracted document text into chunks of at most
//! `chunk_size` characters, preferring to break on paragraph boundaries,
//! then line breaks, then sentence-ending punctuation, then spaces. A
//! trailing portion of each chunk (whole segments totalling at most
//! `chunk_overlap` characters) is repeated at the start of the next chunk
//! to preserve context across boundaries.
//!
//! All sizes are measured in characters, not bytes; splitting never lands
//! inside a UTF-8 sequence.

/// Separator hierarchy, most preferred first.
const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// Splits text into size-bounded chunks along natural boundaries.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a new `TextSplitter`.
    ///
    /// `chunk_overlap` must be less than `chunk_size`; [`crate::RagConfig`]
    /// validates this before construction.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split `text` into chunks of at most `chunk_size` characters.
    ///
    /// Chunks are trimmed and whitespace-only chunks dropped; output order
    /// follows text order.
    pub fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        split_recursive(trimmed, self.chunk_size, self.chunk_overlap, &SEPARATORS)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` with the first applicable separator, re-splitting oversize
/// segments with the remaining separators, then merge segments back into
/// size-bounded chunks with overlap carry.
fn split_recursive(text: &str, size: usize, overlap: usize, seps: &[&str]) -> Vec<String> {
    if char_len(text) <= size {
        return vec![text.to_string()];
    }

    let Some((sep, rest_seps)) = seps.split_first() else {
        return split_by_size(text, size, overlap);
    };

    let segments = split_keeping_separator(text, sep);
    if segments.len() <= 1 {
        // Separator absent; try the next one.
        return split_recursive(text, size, overlap, rest_seps);
    }

    let mut pieces = Vec::new();
    for segment in segments {
        if char_len(segment) > size {
            pieces.extend(split_recursive(segment, size, overlap, rest_seps));
        } else {
            pieces.push(segment.to_string());
        }
    }

    merge_with_overlap(pieces, size, overlap)
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Merge pieces (each at most `size` characters) into chunks of at most
/// `size` characters. When a chunk fills up, the trailing whole pieces
/// totalling at most `overlap` characters seed the next chunk.
fn merge_with_overlap(pieces: Vec<String>, size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: Vec<String> = Vec::new();
    let mut window_len = 0usize;
    // Whether the window holds pieces not yet emitted in any chunk.
    let mut fresh = false;

    for piece in pieces {
        let piece_len = char_len(&piece);

        if window_len > 0 && window_len + piece_len > size {
            if fresh {
                chunks.push(window.concat());
            }

            let mut kept: Vec<String> = Vec::new();
            let mut kept_len = 0usize;
            for prev in window.iter().rev() {
                let prev_len = char_len(prev);
                if kept_len + prev_len > overlap {
                    break;
                }
                kept_len += prev_len;
                kept.push(prev.clone());
            }
            kept.reverse();
            window = kept;
            window_len = kept_len;
            fresh = false;

            // The carried overlap plus a large piece may still exceed size.
            while window_len + piece_len > size && !window.is_empty() {
                let dropped = window.remove(0);
                window_len -= char_len(&dropped);
            }
        }

        window_len += piece_len;
        window.push(piece);
        fresh = true;
    }

    if fresh && !window.is_empty() {
        chunks.push(window.concat());
    }

    chunks
}

/// Plain character windows with overlap; the fallback when no separator
/// applies. Boundary indices always land between characters.
fn split_by_size(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let indices: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let total = indices.len();
    if total == 0 {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let end = (start + size).min(total);
        let byte_start = indices[start];
        let byte_end = if end == total { text.len() } else { indices[end] };
        chunks.push(text[byte_start..byte_end].to_string());
        if end == total {
            break;
        }
        start += step;
    }

    chunks
}
