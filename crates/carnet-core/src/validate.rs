//! Input validation rules for notes and categories.
//!
//! Validation runs in the service layer before any store access; a failed
//! rule surfaces as `Error::InvalidInput` and never reaches the database.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum length of a note title.
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of a category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^#[0-9A-Fa-f]{6}$").expect("valid color pattern"))
}

/// Validate a note title: non-empty, at most 255 characters.
pub fn validate_note_title(title: &str) -> std::result::Result<(), String> {
    if title.is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("Title must be {} characters or less", MAX_TITLE_LEN));
    }
    Ok(())
}

/// Validate note content: non-empty, unbounded length.
pub fn validate_note_content(content: &str) -> std::result::Result<(), String> {
    if content.is_empty() {
        return Err("Content cannot be empty".to_string());
    }
    Ok(())
}

/// Validate a category name: non-empty, at most 100 characters.
pub fn validate_category_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(format!(
            "Category name must be {} characters or less",
            MAX_CATEGORY_NAME_LEN
        ));
    }
    Ok(())
}

/// Validate a category color: must match `#RRGGBB` when present.
pub fn validate_category_color(color: &str) -> std::result::Result<(), String> {
    if !color_pattern().is_match(color) {
        return Err(format!(
            "Color '{}' must match the pattern #RRGGBB",
            color
        ));
    }
    Ok(())
}
