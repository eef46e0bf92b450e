/// Shortens `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Collapses a multi-line string to its first line, for log fields.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
