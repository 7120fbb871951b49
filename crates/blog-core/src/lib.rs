//! Blog Core Library
//!
//! Domain types, store traits, and errors shared across the blog backend.

pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::{ArticleStore, BlogStore, UserStore};
pub use types::*;
