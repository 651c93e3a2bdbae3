pub mod backend;
pub mod fixtures;
pub mod queries;
pub mod schema;
pub mod store_impl;

pub use backend::DuckDbBackend;
pub use fixtures::NewIdea;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `civicstats_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
