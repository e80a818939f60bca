// =============================================================================
// IDX Stock Analysis: library root
// =============================================================================
//
// The indicator and ratio engines are pure and usable on their own; the
// remaining modules wire them to upstream providers and the HTTP API served
// by the `idx-analysis` binary.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod fundamentals;
pub mod indicators;
pub mod providers;
pub mod types;
