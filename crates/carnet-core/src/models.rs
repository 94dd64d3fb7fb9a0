//! Core data models for carnet.
//!
//! These types are shared across all carnet crates and represent the
//! persisted domain entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-defined category that notes can be filed under.
///
/// Category names are globally unique (case-sensitive as stored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Optional display color in `#RRGGBB` form.
    pub color: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

/// A note with its associated categories.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub archived: bool,
    pub created_at_utc: DateTime<Utc>,
    /// Re-stamped on content updates and archive toggles; category
    /// membership changes leave it alone. Always >= `created_at_utc`.
    pub updated_at_utc: DateTime<Utc>,
    /// Associated categories in join order (no storage-level ordering).
    pub categories: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_serializes_categories() {
        let now = Utc::now();
        let note = Note {
            id: Uuid::nil(),
            title: "T".to_string(),
            content: "C".to_string(),
            archived: false,
            created_at_utc: now,
            updated_at_utc: now,
            categories: vec![Category {
                id: Uuid::nil(),
                name: "Work".to_string(),
                color: Some("#FF5733".to_string()),
                created_at_utc: now,
            }],
        };

        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["categories"][0]["name"], "Work");
        assert_eq!(json["categories"][0]["color"], "#FF5733");
    }

    #[test]
    fn test_category_color_optional() {
        let cat = Category {
            id: Uuid::nil(),
            name: "Personal".to_string(),
            color: None,
            created_at_utc: Utc::now(),
        };
        let json = serde_json::to_value(&cat).unwrap();
        assert!(json["color"].is_null());
    }
}
