//! Splitting drafts into block-sized pieces.

/// Split `text` into consecutive pieces of at most `max_units` UTF-16 code
/// units each.
///
/// Notion measures rich-text length in UTF-16 units, so a character outside
/// the Basic Multilingual Plane (most emoji) counts as two. Pieces are cut on
/// character boundaries only. Concatenating the result gives back `text`; an
/// empty input gives no pieces. A `max_units` of zero is treated as one, and a
/// single character wider than `max_units` becomes a piece of its own.
pub fn split_chunks(text: &str, max_units: usize) -> Vec<String> {
    let max_units = max_units.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut units = 0;

    for (idx, c) in text.char_indices() {
        let width = c.len_utf16();
        if units + width > max_units && idx > start {
            chunks.push(text[start..idx].to_string());
            start = idx;
            units = 0;
        }
        units += width;
    }

    if start < text.len() {
        chunks.push(text[start..].to_string());
    }

    chunks
}
