//! Translatable queries and their consumers.
//!
//! - [`ast`] - [`Query<T>`], [`QueryAst`], [`QueryOp`] and the behavior flags
//! - [`compiler`] - [`SqlCompiler`] for PostgreSQL, SQLite, and MySQL
//! - [`memory`] - [`MemoryQueryProvider`], the in-memory reference backend
//! - [`projection`] - the [`ProjectionProvider`] seam for external mappers

pub mod ast;
pub mod compiler;
pub mod memory;
pub mod projection;
pub(crate) mod sequence;

pub use ast::{CacheHint, Query, QueryAst, QueryOp, TrackingMode};
pub use compiler::SqlCompiler;
pub use memory::{MemoryQueryProvider, QueryProvider};
pub use projection::{ProjectionConfig, ProjectionProvider};
