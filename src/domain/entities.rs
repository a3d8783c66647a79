//! Domain entities: persisted and exported data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nested, self-contained copy of one node and its subtree.
///
/// This is the shape stored in hierarchies and written by the export; it
/// never shares anything with the live forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordItem {
    /// Node key, absent in exported documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub items: Vec<WordItem>,
}

impl WordItem {
    /// Copy of this item with the id removed recursively.
    pub fn stripped(&self) -> Self {
        Self {
            id: None,
            name: self.name.clone(),
            items: self.items.iter().map(Self::stripped).collect(),
        }
    }
}

/// A named, timestamped snapshot of a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<WordItem>,
}

impl Hierarchy {
    /// Number of words in the stored snapshot.
    pub fn word_count(&self) -> usize {
        fn count(items: &[WordItem]) -> usize {
            items.iter().map(|item| 1 + count(&item.items)).sum()
        }
        count(&self.items)
    }
}

/// Export document: `{ "data": [ { "name", "items" } ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub data: Vec<WordItem>,
}

impl ExportDocument {
    /// Build an export from a snapshot, dropping every node id.
    pub fn from_snapshot(items: &[WordItem]) -> Self {
        Self {
            data: items.iter().map(WordItem::stripped).collect(),
        }
    }
}

/// Everything the editor keeps between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Hierarchy the live forest belongs to, if it was saved or opened
    pub current: Option<Uuid>,
    /// The live forest
    pub items: Vec<WordItem>,
    /// Saved hierarchies, newest first
    pub hierarchies: Vec<Hierarchy>,
}

/// Abbreviated key used when printing and resolving node or hierarchy ids.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_items_with_ids_when_exporting_then_ids_are_stripped() {
        let items = vec![WordItem {
            id: Some(Uuid::new_v4()),
            name: "animal".into(),
            items: vec![WordItem {
                id: Some(Uuid::new_v4()),
                name: "dog".into(),
                items: vec![],
            }],
        }];

        let doc = ExportDocument::from_snapshot(&items);
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "data": [ { "name": "animal", "items": [ { "name": "dog", "items": [] } ] } ]
            })
        );
    }

    #[test]
    fn given_nested_items_when_counting_words_then_counts_every_level() {
        let now = Utc::now();
        let hierarchy = Hierarchy {
            id: Uuid::new_v4(),
            name: "Hierarchy 1".into(),
            created_at: now,
            updated_at: now,
            items: vec![WordItem {
                id: None,
                name: "animal".into(),
                items: vec![WordItem {
                    id: None,
                    name: "dog".into(),
                    items: vec![],
                }],
            }],
        };
        assert_eq!(hierarchy.word_count(), 2);
    }

    #[test]
    fn given_json_without_items_when_parsing_then_defaults_to_empty_children() {
        let item: WordItem = serde_json::from_str(r#"{ "name": "leaf" }"#).unwrap();
        assert_eq!(item.id, None);
        assert!(item.items.is_empty());
    }
}
