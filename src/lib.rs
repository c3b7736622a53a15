//! docwatch library
//!
//! Tracks which files matched by include/exclude glob patterns were added,
//! removed or changed between scans, for downstream document indexing.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod observability;
pub mod pattern;
pub mod storage;
pub mod watchlist;

pub use config::Config;
pub use error::{Error, Result};
pub use storage::{DiffKind, FileState, Watchlist};
pub use watchlist::WatchlistManager;
