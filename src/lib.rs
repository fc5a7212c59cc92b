//! Incremental transitive-closure cache for small, frequently queried relations.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod bench_utils;
pub mod bootstrap;
mod cache;
pub mod closure;
mod components;
pub mod config;
pub mod errors;
pub mod finder;
pub mod node;
mod query;
mod relation_node;
pub mod safety;
#[cfg(feature = "sqlite-store")]
pub mod schema;
#[cfg(feature = "sqlite-store")]
pub mod store;
pub mod walker;

pub use crate::bootstrap::{BulkCacheBuilder, SeedReport};
pub use crate::closure::{CacheStats, ClosureCache};
pub use crate::components::AliasState;
pub use crate::config::CacheConfig;
pub use crate::errors::ClosureGraphError;
pub use crate::finder::{FactSet, Finder, TripleIter};
pub use crate::node::{Node, Triple, TriplePattern};
pub use crate::safety::{SafetyError, SafetyReport, run_safety_checks, run_strict_safety_checks};
#[cfg(feature = "sqlite-store")]
pub use crate::store::SqliteFactStore;
pub use crate::walker::{ClosedWalker, FullGraphWalker, GraphWalker, WalkDirection};
