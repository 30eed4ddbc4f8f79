//! Single-or-list normalization and per-item validation for batch tools.

use std::borrow::Cow;

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::ValidationError;
use crate::mutation::Mutation;

/// Accepts either one item or a list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A list of items, processed in order.
    Many(Vec<T>),
    /// A single item, treated as a list of one.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flatten into an ordered list.
    #[must_use]
    pub fn normalize(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        Self::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Many(items)
    }
}

/// One batch item, decoded on its own so a wrong-typed field fails only that item.
///
/// The schema is the item's own; the wrapper is invisible on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItem<T> {
    /// The item matched its input type.
    Parsed(T),
    /// The item did not decode.
    Malformed {
        /// The item as sent.
        raw: Value,
        /// Decoder message.
        reason: String,
    },
}

impl<T: DeserializeOwned> BatchItem<T> {
    /// Decode one raw item.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        match T::deserialize(&raw) {
            Ok(item) => Self::Parsed(item),
            Err(err) => Self::Malformed {
                raw,
                reason: err.to_string(),
            },
        }
    }
}

impl<T> From<T> for BatchItem<T> {
    fn from(item: T) -> Self {
        Self::Parsed(item)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for BatchItem<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

impl<T: Serialize> Serialize for BatchItem<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(item) => item.serialize(serializer),
            Self::Malformed { raw, .. } => raw.serialize(serializer),
        }
    }
}

impl<T: JsonSchema> JsonSchema for BatchItem<T> {
    fn inline_schema() -> bool {
        T::inline_schema()
    }

    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}

/// Inputs that can name themselves in a per-item report.
pub trait BatchInput {
    /// Best-effort identifier, e.g. the task id or title, if present.
    fn identifier(&self) -> Option<String>;
}

/// One item after validation, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// Zero-based position in the normalized input.
    pub index: usize,
    /// Name used in the report when the store returns none.
    pub identifier: Option<String>,
    /// Validated operation, or why the item was rejected.
    pub mutation: Result<Mutation, ValidationError>,
}

/// Validate every item independently, keeping input order.
///
/// A malformed item yields an `Err` entry without affecting its neighbours.
#[must_use]
pub fn prepare<T, F>(items: Vec<BatchItem<T>>, mut validate: F) -> Vec<Prepared>
where
    T: BatchInput,
    F: FnMut(T) -> Result<Mutation, ValidationError>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            BatchItem::Parsed(item) => {
                let identifier = item.identifier();
                Prepared {
                    index,
                    identifier,
                    mutation: validate(item),
                }
            }
            BatchItem::Malformed { reason, .. } => Prepared {
                index,
                identifier: None,
                mutation: Err(ValidationError::Malformed(reason)),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{TaskRefInput, project_deletion};
    use crate::model::ProjectRef;
    use crate::mutation::TaskRef;

    fn complete(item: TaskRefInput) -> Result<Mutation, ValidationError> {
        item.into_task_ref().map(Mutation::CompleteTask)
    }

    fn parsed<T>(items: Vec<T>) -> Vec<BatchItem<T>> {
        items.into_iter().map(BatchItem::from).collect()
    }

    #[test]
    fn single_object_equals_list_of_one() {
        let single: OneOrMany<TaskRefInput> =
            serde_json::from_str(r#"{"project_id": "inbox", "task_id": "abc"}"#)
                .unwrap_or_else(|err| panic!("single: {err}"));
        let list: OneOrMany<TaskRefInput> =
            serde_json::from_str(r#"[{"project_id": "inbox", "task_id": "abc"}]"#)
                .unwrap_or_else(|err| panic!("list: {err}"));
        assert_eq!(single.normalize(), list.normalize());
    }

    #[test]
    fn bare_strings_normalize_too() {
        let single: OneOrMany<String> =
            serde_json::from_str(r#""work""#).unwrap_or_else(|err| panic!("single: {err}"));
        assert_eq!(single.normalize(), vec!["work".to_owned()]);
    }

    #[test]
    fn empty_list_prepares_nothing() {
        let items: OneOrMany<BatchItem<TaskRefInput>> =
            serde_json::from_str("[]").unwrap_or_else(|err| panic!("empty: {err}"));
        assert!(prepare(items.normalize(), complete).is_empty());
    }

    #[test]
    fn malformed_item_fails_alone_in_place() {
        let items = vec![
            TaskRefInput {
                project_id: Some("inbox".into()),
                task_id: Some("a".into()),
            },
            TaskRefInput {
                project_id: Some("work".into()),
                task_id: None,
            },
            TaskRefInput {
                project_id: Some("work".into()),
                task_id: Some("c".into()),
            },
        ];
        let prepared = prepare(parsed(items), complete);
        assert_eq!(
            prepared.iter().map(|item| item.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(
            prepared[0].mutation,
            Ok(Mutation::CompleteTask(TaskRef {
                project: ProjectRef::Inbox,
                task_id: "a".into(),
            }))
        );
        assert_eq!(prepared[1].mutation, Err(ValidationError::MissingField("task_id")));
        assert_eq!(prepared[1].identifier, None);
        assert_eq!(prepared[2].identifier.as_deref(), Some("c"));
    }

    #[test]
    fn duplicate_items_are_kept_independently() {
        let prepared = prepare(
            parsed(vec!["work".to_owned(), "work".to_owned()]),
            project_deletion,
        );
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].mutation, prepared[1].mutation);
    }

    #[test]
    fn wrong_typed_field_fails_only_its_item() {
        let items: OneOrMany<BatchItem<TaskRefInput>> = serde_json::from_str(
            r#"[{"project_id": "work", "task_id": "a"}, {"project_id": "work", "task_id": 42}]"#,
        )
        .unwrap_or_else(|err| panic!("lenient list: {err}"));
        let prepared = prepare(items.normalize(), complete);

        assert_eq!(prepared.len(), 2);
        assert!(prepared[0].mutation.is_ok());
        assert!(matches!(
            &prepared[1].mutation,
            Err(ValidationError::Malformed(reason)) if reason.contains("integer")
        ));
        assert_eq!(prepared[1].index, 1);
    }

    #[test]
    fn single_non_object_is_one_malformed_item() {
        let items: OneOrMany<BatchItem<TaskRefInput>> =
            serde_json::from_str("17").unwrap_or_else(|err| panic!("lenient single: {err}"));
        let prepared = prepare(items.normalize(), complete);
        assert_eq!(prepared.len(), 1);
        assert!(matches!(prepared[0].mutation, Err(ValidationError::Malformed(_))));
    }

    #[test]
    fn malformed_items_serialize_as_sent() {
        let item: BatchItem<TaskRefInput> = BatchItem::from_value(serde_json::json!({"task_id": 42}));
        assert_eq!(
            serde_json::to_value(&item).unwrap_or_else(|err| panic!("serialize: {err}")),
            serde_json::json!({"task_id": 42})
        );
    }
}
