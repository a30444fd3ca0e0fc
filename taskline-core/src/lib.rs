//! Core library for Taskline.
//!
//! This crate provides the domain models, database operations and view
//! engines for Taskline, independent of any transport layer (HTTP, MCP,
//! etc.). The view engines (working-day dates, sorting/filtering, Gantt
//! layout, groupings, CSV export) are pure functions over loaded state.
//!
//! # Usage
//!
//! ```no_run
//! use taskline_core::db::Database;
//! use taskline_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let tasks = db.list_tasks()?;
//! # Ok::<(), taskline_core::StoreError>(())
//! ```

pub mod dates;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod views;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::StoreError;
