//! Library surface of carnet-api: the service layer and its DTOs.
//!
//! The HTTP binary lives in `main.rs`; everything reusable (services,
//! request/response shapes) is exposed here.

pub mod services;
