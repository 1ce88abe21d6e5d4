/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// A value counts as present only if something is left after cleaning.
pub fn non_blank(raw: &str) -> Option<String> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
