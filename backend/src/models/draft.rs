//! Draft model for the editor's single durable slot.

use serde::{Deserialize, Serialize};

use super::{Category, TagSet};

/// Unsaved editor state mirrored to durable storage.
///
/// Every field defaults when missing so that partially written payloads still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    pub tags: TagSet,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let draft: Draft = serde_json::from_str(r#"{"title": "Half written"}"#).unwrap();
        assert_eq!(draft.title, "Half written");
        assert_eq!(draft.category, Category::Unset);
        assert!(draft.tags.as_slice().is_empty());
        assert!(draft.content.is_empty());
    }
}
