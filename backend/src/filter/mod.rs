//! Post filtering by search text and category.
//!
//! Plain case-insensitive substring matching over title and excerpt; no
//! tokenizing or ranking. Input order is always preserved.

use std::str::FromStr;

use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Category, Post};

/// Sentinel category option meaning "no category restriction".
pub const ALL_CATEGORIES: &str = "All";

/// Category half of the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl FromStr for CategoryFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == ALL_CATEGORIES {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>()
            .map(CategoryFilter::Only)
            .map_err(AppError::Validation)
    }
}

/// Search text plus selected category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub category: CategoryFilter,
}

/// Query parameters accepted by the post listing.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl TryFrom<FilterQuery> for FilterCriteria {
    type Error = AppError;

    fn try_from(query: FilterQuery) -> Result<Self, Self::Error> {
        let category = match query.category.as_deref() {
            Some(raw) => raw.parse()?,
            None => CategoryFilter::All,
        };
        Ok(FilterCriteria {
            search: query.search.unwrap_or_default(),
            category,
        })
    }
}

impl FilterCriteria {
    /// Whether a single post passes both predicates.
    pub fn matches(&self, post: &Post) -> bool {
        self.matches_search(post) && self.matches_category(post)
    }

    fn matches_search(&self, post: &Post) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        post.title.to_lowercase().contains(&needle) || post.excerpt.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, post: &Post) -> bool {
        match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => post.category == category,
        }
    }
}

/// Keep the posts matching the criteria, in their original order.
pub fn filter_posts<'a>(posts: &'a [Post], criteria: &FilterCriteria) -> Vec<&'a Post> {
    posts.iter().filter(|post| criteria.matches(post)).collect()
}

/// `"All"` followed by each distinct non-empty category in first-seen order.
pub fn category_options(posts: &[Post]) -> Vec<String> {
    let mut seen: Vec<Category> = Vec::new();
    for post in posts {
        if post.category.is_set() && !seen.contains(&post.category) {
            seen.push(post.category);
        }
    }

    std::iter::once(ALL_CATEGORIES.to_string())
        .chain(seen.iter().map(|c| c.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagSet;

    fn post(id: &str, title: &str, excerpt: &str, category: Category) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            excerpt: excerpt.to_string(),
            category,
            tags: TagSet::new(),
            content: String::new(),
            image_url: None,
            created_at: "2025-01-01T00:00:00.000000Z".to_string(),
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post("1", "Intro to Networking", "basics", Category::Tech),
            post("2", "Travel log", "Japan", Category::Travel),
            post("3", "Home network lab", "VLANs on a budget", Category::Tech),
            post("4", "Slow mornings", "coffee and NETWORKS of friends", Category::Lifestyle),
            post("5", "Untitled", "", Category::Unset),
        ]
    }

    fn ids(posts: &[&Post]) -> Vec<String> {
        posts.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let posts = sample();
        let filtered = filter_posts(&posts, &FilterCriteria::default());
        assert_eq!(ids(&filtered), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_search_scenario() {
        let posts = vec![
            post("1", "Intro to Networking", "basics", Category::Tech),
            post("2", "Travel log", "Japan", Category::Travel),
        ];
        let criteria = FilterCriteria {
            search: "network".to_string(),
            category: CategoryFilter::All,
        };
        assert_eq!(ids(&filter_posts(&posts, &criteria)), vec!["1"]);
    }

    #[test]
    fn test_search_covers_excerpt_case_insensitively() {
        let posts = sample();
        let criteria = FilterCriteria {
            search: "NeTwOrK".to_string(),
            category: CategoryFilter::All,
        };
        assert_eq!(ids(&filter_posts(&posts, &criteria)), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_search_and_category_combine() {
        let posts = sample();
        let criteria = FilterCriteria {
            search: "network".to_string(),
            category: CategoryFilter::Only(Category::Tech),
        };
        assert_eq!(ids(&filter_posts(&posts, &criteria)), vec!["1", "3"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let posts = sample();
        let criteria = FilterCriteria {
            search: "kubernetes".to_string(),
            category: CategoryFilter::All,
        };
        assert!(filter_posts(&posts, &criteria).is_empty());

        let criteria = FilterCriteria {
            search: String::new(),
            category: CategoryFilter::Only(Category::Other),
        };
        assert!(filter_posts(&posts, &criteria).is_empty());
    }

    #[test]
    fn test_output_is_exact_matching_subsequence() {
        let posts = sample();
        let searches = ["", "a", "net", "JAPAN", "zzz"];
        let categories = [
            CategoryFilter::All,
            CategoryFilter::Only(Category::Tech),
            CategoryFilter::Only(Category::Travel),
            CategoryFilter::Only(Category::Unset),
        ];

        for search in searches {
            for category in categories {
                let criteria = FilterCriteria {
                    search: search.to_string(),
                    category,
                };
                let expected: Vec<&Post> = posts.iter().filter(|p| criteria.matches(p)).collect();
                let filtered = filter_posts(&posts, &criteria);
                assert_eq!(filtered, expected);
                assert!(filtered.iter().all(|p| criteria.matches(p)));
            }
        }
    }

    #[test]
    fn test_category_options_scenario() {
        let posts = vec![
            post("1", "a", "", Category::Tech),
            post("2", "b", "", Category::Travel),
            post("3", "c", "", Category::Tech),
        ];
        assert_eq!(category_options(&posts), vec!["All", "Tech", "Travel"]);
    }

    #[test]
    fn test_category_options_skip_unset() {
        assert_eq!(category_options(&sample()), vec!["All", "Tech", "Travel", "Lifestyle"]);
        assert_eq!(category_options(&[]), vec!["All"]);
    }

    #[test]
    fn test_query_parsing() {
        let criteria = FilterCriteria::try_from(FilterQuery {
            search: Some("rust".to_string()),
            category: Some("All".to_string()),
        })
        .unwrap();
        assert_eq!(criteria.category, CategoryFilter::All);
        assert_eq!(criteria.search, "rust");

        let criteria = FilterCriteria::try_from(FilterQuery {
            search: None,
            category: Some("Travel".to_string()),
        })
        .unwrap();
        assert_eq!(criteria.category, CategoryFilter::Only(Category::Travel));

        let err = FilterCriteria::try_from(FilterQuery {
            search: None,
            category: Some("Food".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
