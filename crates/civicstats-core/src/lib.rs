pub mod analytics;
pub mod bucket;
pub mod config;
pub mod cumulative;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;
