use chrono_tz::Tz;
use thiserror::Error;
use tick_mcp_core::{
    DateFilter, DateFilterError, Priority, ProjectRef, TaskFilter, TextMatcher, parse_timezone,
};
use time::OffsetDateTime;

/// Error type returned while constructing task filters from user-facing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterBuildError {
    #[error("invalid priority: {token} (expected none, low, medium, high or 0/1/3/5)")]
    InvalidPriority { token: String },
    #[error(transparent)]
    Date(#[from] DateFilterError),
}

/// Result alias for filter construction helpers.
pub type FilterBuildResult<T> = Result<T, FilterBuildError>;

/// Builder that accepts user-facing strings and normalizes them into [`TaskFilter`] values.
///
/// Blank strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct TaskFilterBuilder {
    task_id: Option<String>,
    project: Option<ProjectRef>,
    priority: Option<Priority>,
    date_token: Option<String>,
    custom_days: Option<i64>,
    text: Option<String>,
    timezone: Option<String>,
}

impl TaskFilterBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one task id; every other criterion is then ignored.
    #[must_use]
    pub fn with_task_id(mut self, task_id: Option<String>) -> Self {
        self.task_id = non_blank(task_id);
        self
    }

    /// Restrict to a project id or `inbox`.
    #[must_use]
    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project = project_id.as_deref().and_then(ProjectRef::parse);
        self
    }

    /// Configure the priority from a name or provider level.
    ///
    /// # Errors
    /// Returns an error if the token is not a known priority.
    pub fn with_priority(mut self, priority: Option<String>) -> FilterBuildResult<Self> {
        self.priority = non_blank(priority)
            .map(|token| parse_priority_token(&token))
            .transpose()?;
        Ok(self)
    }

    /// Configure the due-date window token; `custom_days` is only read for `custom`.
    #[must_use]
    pub fn with_date_filter(mut self, token: Option<String>, custom_days: Option<i64>) -> Self {
        self.date_token = non_blank(token);
        self.custom_days = custom_days;
        self
    }

    /// Configure the optional search text (whitespace-only inputs become `None`).
    #[must_use]
    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = non_blank(text);
        self
    }

    /// Override the zone the date window is resolved in.
    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<String>) -> Self {
        self.timezone = non_blank(timezone);
        self
    }

    /// Build the final [`TaskFilter`], resolving the date window at `reference`.
    ///
    /// # Errors
    /// Returns an error for unknown date tokens, missing or non-positive custom days,
    /// or unknown timezones.
    pub fn build(self, reference: OffsetDateTime, default_tz: Tz) -> FilterBuildResult<TaskFilter> {
        let tz = match self.timezone.as_deref() {
            Some(name) => parse_timezone(name)?,
            None => default_tz,
        };
        let due = self
            .date_token
            .as_deref()
            .map(|token| DateFilter::from_token(token, self.custom_days)?.resolve(reference, tz))
            .transpose()?;

        Ok(TaskFilter {
            task_id: self.task_id,
            project: self.project,
            priority: self.priority,
            due,
            text: self.text.as_deref().and_then(TextMatcher::new),
        })
    }
}

/// Convert a user-facing token into a [`Priority`].
///
/// # Errors
/// Returns an error if the token does not name a priority.
pub fn parse_priority_token(token: &str) -> FilterBuildResult<Priority> {
    let normalized = token.trim().to_ascii_lowercase().replace(['-', ' '], "_");
    normalized
        .parse()
        .map_err(|_| FilterBuildError::InvalidPriority {
            token: token.to_string(),
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests {
    use std::fmt::Display;

    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-10 09:00 UTC);

    fn ok<T, E: Display>(result: Result<T, E>, context: &str) -> T {
        result.unwrap_or_else(|err| panic!("{context}: {err}"))
    }

    #[test]
    fn test_parse_priority_tokens() {
        assert_eq!(ok(parse_priority_token(" HIGH "), "high"), Priority::High);
        assert_eq!(ok(parse_priority_token("3"), "level"), Priority::Medium);
        assert!(matches!(
            parse_priority_token("urgent"),
            Err(FilterBuildError::InvalidPriority { token }) if token == "urgent"
        ));
    }

    #[test]
    fn empty_builder_is_identity() {
        let filter = ok(TaskFilterBuilder::new().build(NOW, Tz::UTC), "build");
        assert!(filter.is_empty());
    }

    #[test]
    fn blank_inputs_are_ignored() {
        let filter = ok(
            TaskFilterBuilder::new()
                .with_task_id(Some(" ".into()))
                .with_project(Some(String::new()))
                .with_priority(Some("  ".into()))
                .map(|builder| builder.with_text(Some("\t".into())).with_date_filter(Some(String::new()), None))
                .and_then(|builder| builder.build(NOW, Tz::UTC)),
            "build",
        );
        assert!(filter.is_empty());
    }

    #[test]
    fn custom_window_requires_positive_days() {
        let missing = TaskFilterBuilder::new()
            .with_date_filter(Some("custom".into()), None)
            .build(NOW, Tz::UTC);
        assert_eq!(
            missing.err(),
            Some(FilterBuildError::Date(DateFilterError::MissingCustomDays))
        );

        let zero = TaskFilterBuilder::new()
            .with_date_filter(Some("custom".into()), Some(0))
            .build(NOW, Tz::UTC);
        assert!(matches!(
            zero,
            Err(FilterBuildError::Date(DateFilterError::NonPositiveDays { days: 0 }))
        ));
    }

    #[test]
    fn timezone_override_moves_the_window() {
        let filter = ok(
            TaskFilterBuilder::new()
                .with_date_filter(Some("Today".into()), None)
                .with_timezone(Some("Asia/Tokyo".into()))
                .build(NOW, Tz::UTC),
            "build",
        );
        let window = filter.due.unwrap_or_else(|| panic!("window"));
        assert_eq!(window.start, Some(datetime!(2025-03-10 00:00 +09:00)));
        assert_eq!(window.end, datetime!(2025-03-11 00:00 +09:00));
    }

    #[test]
    fn unknown_timezone_is_a_filter_error() {
        let result = TaskFilterBuilder::new()
            .with_timezone(Some("Nowhere/City".into()))
            .build(NOW, Tz::UTC);
        assert!(matches!(
            result,
            Err(FilterBuildError::Date(DateFilterError::UnknownTimezone { .. }))
        ));
    }

    #[test]
    fn inbox_project_is_recognized() {
        let filter = ok(
            TaskFilterBuilder::new()
                .with_project(Some("INBOX".into()))
                .build(NOW, Tz::UTC),
            "build",
        );
        assert_eq!(filter.project, Some(ProjectRef::Inbox));
    }
}
