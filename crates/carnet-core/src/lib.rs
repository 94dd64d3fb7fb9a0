//! # carnet-core
//!
//! Core types, traits, and abstractions for the carnet notes backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the carnet database and API crates depend on.

pub mod error;
pub mod models;
pub mod traits;
pub mod uuid_utils;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::new_v7;
pub use validate::{
    validate_category_color, validate_category_name, validate_note_content, validate_note_title,
};
