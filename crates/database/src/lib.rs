//! # Todo Database Crate
//!
//! This crate is the application's storage gateway to the MySQL database.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all database-specific logic. It provides
//!   a small, abstract API to the rest of the application and hides the
//!   underlying SQL.
//! - **Owned Pool:** The connection pool is created once at startup by [`connect`],
//!   handed to the repository, and closed explicitly with [`close`]. There is no
//!   global handle.
//! - **Single Statements:** Every repository operation is an autocommit statement
//!   (or a statement plus a read-back). No explicit transactions are used.
//!
//! ## Public API
//!
//! - `connect` / `close`: Open and shut down the bounded connection pool.
//! - `ensure_schema`: Idempotent `CREATE TABLE IF NOT EXISTS` for the `todos` table.
//! - `TodoRepository`: The data access contract used by the web layer.
//! - `MySqlTodoRepository`: The production implementation.
//! - `InMemoryTodoRepository`: A test double (feature `test-utils`).
//! - `DbError`: The error type returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{close, connect, ensure_schema};
pub use error::DbError;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryTodoRepository;
pub use repository::{MySqlTodoRepository, TodoRepository};
