//! Fixed-size overlapping text windows for retrieval granularity.

/// A contiguous text segment with its sequence position within the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub position: usize,
}

/// Splits text into chunks of at most `chunk_size` characters, consecutive
/// chunks sharing `overlap` characters at the boundary. Lengths are counted
/// in `char`s so multi-byte text never splits inside a code point.
///
/// Callers must ensure `overlap < chunk_size`; `Config::validate` enforces
/// this before any indexing starts.
pub fn split_with_overlap(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    assert!(chunk_size > 0, "chunk_size must be positive");
    assert!(overlap < chunk_size, "overlap must be smaller than chunk_size");

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut position = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(Chunk {
            content: chars[start..end].iter().collect(),
            position,
        });
        position += 1;
        start += stride;
    }

    chunks
}
