//! String helpers

/// Cut `s` to at most `max_chars` characters, appending `…` when shortened.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}…", &s[..byte_idx]),
        None => s.to_string(),
    }
}
