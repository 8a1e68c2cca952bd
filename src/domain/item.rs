//! Items that can appear in a paged list
//!
//! Every list view of the console deals with a different record type. The
//! pagination machinery only needs two things from them: a stable identifier for
//! deduplication and the timestamp fields used to derive the next cursor.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::cursor::TimestampFields;

/// A record that can be paged through
pub trait PageItem {
    /// Stable identifier, or `None` when the record has none
    ///
    /// Records without an identifier are never deduplicated.
    fn item_id(&self) -> Option<String>;

    /// Timestamp-like fields used to derive the next cursor
    fn timestamp_fields(&self) -> TimestampFields<'_>;
}

/// Identifier keys probed on untyped JSON records, in order
const ID_KEYS: [&str; 7] = [
    "id",
    "categoryId",
    "fileId",
    "documentId",
    "faqId",
    "termId",
    "historyId",
];

impl PageItem for Value {
    fn item_id(&self) -> Option<String> {
        ID_KEYS
            .iter()
            .filter_map(|key| self.get(key))
            .find_map(json_id)
    }

    fn timestamp_fields(&self) -> TimestampFields<'_> {
        let field = |key: &str| self.get(key).and_then(Value::as_str);
        TimestampFields {
            timestamp: field("timestamp"),
            last_modified_date: field("lastModifiedDate"),
            updated_at: field("updatedAt"),
            created_at: field("createdAt"),
        }
    }
}

/// Read a JSON identifier; `null`, `false`, `0` and `""` count as absent
fn json_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some(String::from("true")),
        _ => None,
    }
}

/// Accepts identifiers sent either as strings or as numbers
fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(json_id))
}

macro_rules! page_item {
    ($ty:ty, $id:ident) => {
        impl PageItem for $ty {
            fn item_id(&self) -> Option<String> {
                self.$id.clone()
            }

            fn timestamp_fields(&self) -> TimestampFields<'_> {
                TimestampFields {
                    timestamp: self.timestamp.as_deref(),
                    last_modified_date: self.last_modified_date.as_deref(),
                    updated_at: self.updated_at.as_deref(),
                    created_at: self.created_at.as_deref(),
                }
            }
        }
    };
}

/// A dictionary term category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryCategory {
    #[serde(default, deserialize_with = "opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub term_count: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A FAQ category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqCategory {
    #[serde(default, deserialize_with = "opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub faq_count: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// An internal document category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCategory {
    #[serde(default, deserialize_with = "opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A file filed under a document category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFile {
    #[serde(default, deserialize_with = "opt_id")]
    pub file_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// One entry of the usage history log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "opt_id")]
    pub history_id: Option<String>,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "opt_id")]
    pub department_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

page_item!(DictionaryCategory, category_id);
page_item!(FaqCategory, category_id);
page_item!(DocumentCategory, category_id);
page_item!(CategoryFile, file_id);
page_item!(HistoryEntry, history_id);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(json!({ "id": 1 }), Some("1"))]
    #[case(json!({ "id": "abc" }), Some("abc"))]
    #[case(json!({ "categoryId": 42 }), Some("42"))]
    #[case(json!({ "historyId": "h-9" }), Some("h-9"))]
    #[case(json!({ "id": null, "fileId": 5 }), Some("5"))]
    #[case(json!({ "id": "" }), None)]
    #[case(json!({ "id": 0 }), None)]
    #[case(json!({ "name": "untitled" }), None)]
    fn test_json_item_id(#[case] item: Value, #[case] expected: Option<&str>) {
        assert_eq!(item.item_id(), expected.map(String::from));
    }

    #[test]
    fn test_typed_category_from_envelope_shape() -> serde_json::Result<()> {
        let category: DictionaryCategory = serde_json::from_value(json!({
            "categoryId": 12,
            "name": "Networking",
            "termCount": 30,
            "lastModifiedDate": "2025-03-01T12:00:00Z",
        }))?;

        assert_eq!(category.item_id(), Some(String::from("12")));
        assert_eq!(category.name, "Networking");
        assert_eq!(
            category.timestamp_fields().first_present(),
            Some("2025-03-01T12:00:00Z")
        );
        Ok(())
    }

    #[test]
    fn test_typed_file_without_id() -> serde_json::Result<()> {
        let file: CategoryFile = serde_json::from_value(json!({
            "fileName": "handbook.pdf",
            "createdAt": "2025-03-01T12:00:00Z",
        }))?;

        assert_eq!(file.item_id(), None);
        assert_eq!(file.file_name, "handbook.pdf");
        Ok(())
    }

    #[test]
    fn test_history_entry_string_department() -> serde_json::Result<()> {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "historyId": "77",
            "action": "UPLOAD",
            "departmentId": 3,
            "timestamp": "2025-03-01T12:00:00Z",
        }))?;

        assert_eq!(entry.item_id(), Some(String::from("77")));
        assert_eq!(entry.department_id, Some(String::from("3")));
        Ok(())
    }
}
