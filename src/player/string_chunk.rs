use crate::director::lingo::datum::{StringChunkExpr, StringChunkKind};

/// Splits `text` into its chunk units. Lines break on CR, LF or CRLF;
/// words on runs of whitespace; items on the movie's item delimiter.
pub fn split_chunks(text: &str, kind: StringChunkKind, item_delimiter: char) -> Vec<String> {
    match kind {
        StringChunkKind::Char => text.chars().map(|c| c.to_string()).collect(),
        StringChunkKind::Word => text.split_whitespace().map(|w| w.to_string()).collect(),
        StringChunkKind::Item => text.split(item_delimiter).map(|i| i.to_string()).collect(),
        StringChunkKind::Line => split_lines(text),
    }
}

pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    lines.push(current);
    lines
}

/// Number of chunk units in `text`. Items count one more than their
/// delimiters; an empty string still has one item and one line but zero
/// words and chars.
pub fn chunk_count(text: &str, kind: StringChunkKind, item_delimiter: char) -> usize {
    match kind {
        StringChunkKind::Char => text.chars().count(),
        StringChunkKind::Word => text.split_whitespace().count(),
        StringChunkKind::Item => text.chars().filter(|c| *c == item_delimiter).count() + 1,
        StringChunkKind::Line => split_lines(text).len(),
    }
}

pub fn join_delimiter(kind: StringChunkKind, item_delimiter: char) -> String {
    match kind {
        StringChunkKind::Char => String::new(),
        StringChunkKind::Word => " ".to_string(),
        StringChunkKind::Item => item_delimiter.to_string(),
        StringChunkKind::Line => "\n".to_string(),
    }
}

/// Normalizes a 1-based inclusive chunk range against `count` units:
/// a last index below the first selects the single `first` unit, and the
/// range is clamped into the available units. Returns `None` when the
/// range lies wholly outside the string.
fn resolve_range(start: i32, end: i32, count: usize) -> Option<(usize, usize)> {
    let start = start.max(1) as usize;
    let end = if end < start as i32 { start } else { end as usize };
    if start > count || count == 0 {
        return None;
    }
    Some((start - 1, end.min(count)))
}

/// Extracts the units a chunk expression selects, joined back with the
/// kind's delimiter. Out-of-range requests yield the empty string.
pub fn resolve_chunk_expr(text: &str, expr: &StringChunkExpr) -> String {
    let chunks = split_chunks(text, expr.kind, expr.item_delimiter);
    match resolve_range(expr.start, expr.end, chunks.len()) {
        Some((start, end)) => chunks[start..end].join(&join_delimiter(expr.kind, expr.item_delimiter)),
        None => String::new(),
    }
}

/// Rebuilds `text` with the selected units replaced by `replacement`.
/// Writing past the end appends; the string grows as needed.
pub fn string_with_chunk_replaced(
    text: &str,
    expr: &StringChunkExpr,
    replacement: &str,
) -> String {
    let mut chunks = split_chunks(text, expr.kind, expr.item_delimiter);
    let delim = join_delimiter(expr.kind, expr.item_delimiter);
    let start = expr.start.max(1) as usize;
    let end = if expr.end < start as i32 {
        start
    } else {
        expr.end as usize
    };

    // Pad with empty units up to the write position.
    while chunks.len() < start {
        chunks.push(String::new());
    }
    let end = end.min(chunks.len());
    chunks.splice(start - 1..end, [replacement.to_string()]);
    chunks.join(&delim)
}

pub fn string_with_chunk_deleted(text: &str, expr: &StringChunkExpr) -> String {
    let mut chunks = split_chunks(text, expr.kind, expr.item_delimiter);
    let delim = join_delimiter(expr.kind, expr.item_delimiter);
    match resolve_range(expr.start, expr.end, chunks.len()) {
        Some((start, end)) => {
            chunks.drain(start..end);
            chunks.join(&delim)
        }
        None => text.to_string(),
    }
}
