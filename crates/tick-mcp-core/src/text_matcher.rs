use crate::model::Task;

/// Case-insensitive substring matcher for task text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Normalize a query string into a matcher. Returns `None` for blank inputs.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: trimmed.to_lowercase(),
        })
    }

    /// The normalized search term.
    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Match the title first, then fall back to the content.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.title)
            || task
                .content
                .as_deref()
                .is_some_and(|content| self.matches_field(content))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, content: Option<&str>) -> Task {
        Task {
            id: "t".into(),
            project_id: "p".into(),
            title: title.into(),
            content: content.map(Into::into),
            ..Task::default()
        }
    }

    #[test]
    fn matcher_skips_blank_queries() {
        assert!(TextMatcher::new("").is_none());
        assert!(TextMatcher::new("   ").is_none());
        assert!(TextMatcher::new("\n").is_none());
    }

    #[test]
    fn matcher_checks_title_then_content() {
        let matcher = TextMatcher::new("milk").unwrap_or_else(|| panic!("matcher must exist"));
        assert!(matcher.matches(&task("Buy MILK", None)));
        assert!(matcher.matches(&task("Groceries", Some("eggs, milk, bread"))));
        assert!(!matcher.matches(&task("Groceries", None)));
    }

    #[test]
    fn matcher_lowercases_non_ascii_text() {
        let matcher = TextMatcher::new("ÜBER").unwrap_or_else(|| panic!("matcher must exist"));
        assert_eq!(matcher.needle(), "über");
        assert!(matcher.matches(&task("Über den Wolken", None)));
    }
}
