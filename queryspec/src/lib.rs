//! # queryspec
//!
//! Declarative query specifications for Rust.
//!
//! This is the meta-crate that re-exports the queryspec sub-crates for
//! convenient access. Depend on `queryspec` to get everything, or on the
//! individual crates for finer-grained control.
//!
//! # Examples
//!
//! ```
//! use queryspec::prelude::*;
//!
//! #[derive(Clone, Record)]
//! #[record(entity = "products", crate = "queryspec::db")]
//! struct Product {
//!     name: String,
//!     price: f64,
//! }
//!
//! let products = vec![
//!     Product { name: "lamp".into(), price: 40.0 },
//!     Product { name: "desk".into(), price: 250.0 },
//!     Product { name: "lantern".into(), price: 60.0 },
//! ];
//!
//! let mut spec = Specification::<Product>::new();
//! spec.query()
//!     .search(Lambda::member("name"), "la%")
//!     .order_by_descending(Lambda::member("price"));
//!
//! let found = SpecificationEvaluator::new().evaluate(products, &spec).unwrap();
//! assert_eq!(found[0].name, "lantern");
//! assert_eq!(found.len(), 2);
//! ```

/// Error types, settings, and logging setup.
pub use queryspec_core as core;

/// Specifications, expressions, queries, and the evaluator pipeline.
pub use queryspec_db as db;

/// Derive macros for records.
#[cfg(feature = "macros")]
pub use queryspec_macros as macros;

/// The most commonly used items.
pub mod prelude {
    pub use queryspec_core::{CacheExpirationMode, Settings, SpecError, SpecResult, SqlBackend, SETTINGS};
    pub use queryspec_db::evaluator::SpecificationEvaluator;
    pub use queryspec_db::expr::{Expr, Lambda, SetPropertyCalls};
    pub use queryspec_db::query::{MemoryQueryProvider, Query, QueryProvider, SqlCompiler};
    pub use queryspec_db::record::{Record, Row};
    pub use queryspec_db::specification::{
        PaginationFilter, ProjectedSpecification, Specification, UpdateSpecification,
    };
    pub use queryspec_db::value::{FromValue, Value};

    #[cfg(feature = "macros")]
    pub use queryspec_macros::Record;
}
