//! Small string helpers shared across parsers and logging.

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` characters and suffixed with the number of
/// bytes dropped.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Capitalize the first character of a string and lowercase the rest.
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + &c.as_str().to_lowercase(),
    }
}

/// Title-case every word, collapsing whitespace: `"frozen  FOODS"` → `"Frozen Foods"`.
pub fn title_case(s: &str) -> String {
    s.split_whitespace().map(upcase).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let result = truncate_for_log("₦₦₦₦", 2);
        assert_eq!(result, "₦₦…(+6 bytes)");
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("hello"), "Hello");
        assert_eq!(upcase("wORLD"), "World");
        assert_eq!(upcase(""), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("rice"), "Rice");
        assert_eq!(title_case("  frozen  FOODS "), "Frozen Foods");
        assert_eq!(title_case(""), "");
    }
}
