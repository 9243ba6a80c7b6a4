//! Conversions between stored columns and the flat text fields of an edit dialog.
//!
//! Editors work with plain strings: array columns are shown comma separated (or one entry per
//! line for project results) and absent optional columns are shown as empty strings. Converting
//! back is the inverse for any value that was produced by these helpers, which keeps an
//! unchanged save idempotent.

/// `""` becomes `None`, anything else is kept verbatim.
pub fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

pub fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Render an array column for editing as `"a, b, c"`.
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

/// Split comma separated input, trimming each entry and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render an array column for editing with one entry per line.
pub fn join_lines(items: &[String]) -> String {
    items.join("\n")
}

/// Split on newlines, dropping blank lines. Lines are otherwise kept as typed.
pub fn split_lines(value: &str) -> Vec<String> {
    value
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings_become_null() {
        assert_eq!(none_if_empty(""), None);
        assert_eq!(none_if_empty("Fintech"), Some("Fintech".to_string()));
        assert_eq!(or_empty(&None), "");
        assert_eq!(or_empty(&Some("x".to_string())), "x");
    }

    #[test]
    fn test_comma_lists() {
        assert_eq!(split_list("React,  TypeScript , Tailwind"), vec!["React", "TypeScript", "Tailwind"]);
        assert_eq!(split_list(""), Vec::<String>::new());
        assert_eq!(split_list("Rust, , "), vec!["Rust"]);

        let stack = vec!["Postgres".to_string(), "Redis".to_string()];
        assert_eq!(split_list(&join_list(&stack)), stack);
    }

    #[test]
    fn test_result_lines() {
        assert_eq!(
            split_lines("Cut load time by 40%\n\n   \nDoubled conversions\r\n"),
            vec!["Cut load time by 40%", "Doubled conversions"]
        );

        let results = vec!["One".to_string(), "Two".to_string()];
        assert_eq!(split_lines(&join_lines(&results)), results);
    }
}
