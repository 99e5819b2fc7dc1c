//! Trait definitions for Xplenty operations.
//!
//! Each resource type implements the traits its endpoints support.

mod create;
mod delete;
mod get;
mod list;

pub use create::Create;
pub use delete::Delete;
pub use get::Get;
pub use list::{List, DEFAULT_PAGE_SIZE};
