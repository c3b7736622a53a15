//! Persistent watchlist storage.
//!
//! This module provides:
//! - Strongly typed watchlist records
//! - Atomic load/save of JSON documents

mod document;
mod models;

pub use document::{Document, JsonStore};
pub use models::{DiffKind, FileState, Watchlist};
