//! Common utilities and shared types for circle.
//!
//! This crate provides foundational components used across all circle crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error type and error envelope via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Shared page/limit handling via [`Pagination`] and [`Page`]
//!
//! # Example
//!
//! ```no_run
//! use circle_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::{IdGenerator, validate_id};
pub use pagination::{NameFilter, Page, PageQuery, Pagination};
