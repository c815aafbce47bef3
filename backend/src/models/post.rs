//! Post model matching the frontend Post interface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Editorial category of a post.
///
/// `Unset` serializes as the empty string, which is what the editor holds
/// before a category has been picked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "")]
    Unset,
    Tech,
    Lifestyle,
    Travel,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Unset => "",
            Category::Tech => "Tech",
            Category::Lifestyle => "Lifestyle",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }

    pub fn is_set(&self) -> bool {
        *self != Category::Unset
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Category::Unset),
            "Tech" => Ok(Category::Tech),
            "Lifestyle" => Ok(Category::Lifestyle),
            "Travel" => Ok(Category::Travel),
            "Other" => Ok(Category::Other),
            other => Err(format!("Unknown category '{}'", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered tag set: insertion order is kept and duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, trimming whitespace. Returns false when the tag was empty
    /// or already present.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Remove a tag. Returns false when it was not present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        let mut set = TagSet::new();
        for tag in &tags {
            set.insert(tag);
        }
        set
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}

/// A published blog post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    pub tags: TagSet,
    /// Rich-text content serialized as HTML markup
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// Fields of a post about to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub category: Category,
    pub tags: TagSet,
    pub content: String,
    pub image_url: Option<String>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
