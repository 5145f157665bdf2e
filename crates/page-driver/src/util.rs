//! Small helpers shared by script-building callers.

/// Encode `value` as a JavaScript string literal, safe to splice into an
/// expression handed to [`crate::PageDriver::evaluate`].
pub fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

/// Clamp diagnostic body text to something log-friendly.
pub(crate) fn truncate_excerpt(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut cut = max;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &body[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(js_string("a\nb"), "\"a\\nb\"");
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate_excerpt("short", 10), "short");
        let long = "ä".repeat(300);
        let cut = truncate_excerpt(&long, 5);
        assert!(cut.ends_with('…'));
        assert!(cut.len() <= 5 + '…'.len_utf8());
    }
}
