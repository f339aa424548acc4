//! Core business logic for circle.

pub mod services;

pub use services::*;
