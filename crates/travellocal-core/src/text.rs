//! Cleanup for text fields coming off the wire.

/// Trimmed text, or `None` when missing or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    let trimmed = value?.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// The first `max_chars` characters of `value` after trimming.
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}
