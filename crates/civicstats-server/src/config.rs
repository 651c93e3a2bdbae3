/// Re-export `Config` from `civicstats-core` for use within this crate.
///
/// All environment-variable parsing lives in `civicstats-core` so it can be
/// shared with integration tests without depending on the full server.
pub use civicstats_core::config::Config;
