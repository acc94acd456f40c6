//! Relational destination support via DuckDB
//!
//! DuckDB writes to its own file format directly and to MySQL or
//! PostgreSQL through its extensions.

mod engine;

pub use engine::DatabaseEngine;
