//! Cross-module tests for the combat engine.
//!
//! - `determinism.rs`: seeded replays produce identical fights
//! - `integration.rs`: full turn protocol scenarios with scripted draws
//! - `helpers.rs`: fixtures and runners shared by both

mod helpers;
mod integration;

pub use helpers::*;
