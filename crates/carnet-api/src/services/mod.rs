//! Service layer for business logic.
//!
//! Services validate input, apply business rules, and translate the
//! repository layer's absent-value sentinels into structured failures
//! before anything reaches the API boundary.

pub mod category_service;
pub mod note_service;

pub use category_service::{
    CategoryResponse, CategoryService, CreateCategoryDto, UpdateCategoryDto,
};
pub use note_service::{CreateNoteDto, NoteResponse, NoteService, UpdateNoteDto};
