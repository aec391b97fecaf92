//! # Luck
//!
//! Deterministic randomness and critical-hit resolution for turn-based combat.
//!
//! Every randomized decision in the combat engine goes through a
//! [`RollSource`], which hands out uniform draws in `[0, 1)`. Engines never
//! reach for a global generator: a roll source is created once at the
//! outermost entry point and threaded through every call that needs it.
//!
//! - **Seeded replay**: [`SeededRolls`] wraps a ChaCha8 stream, so the same
//!   seed and the same call sequence always produce the same draws
//! - **Scripted draws**: [`ScriptedRolls`] replays a fixed list of values for
//!   tests that need an exact outcome
//! - **Critical hits**: [`crit::resolve`] turns a base damage value and a
//!   [`CritConfig`] into a final damage value
//!
//! ## Quick Start
//!
//! ```
//! use luck::{CritConfig, CritMode, ScriptedRolls};
//!
//! let config = CritConfig::new(0.5, 2.0, CritMode::Multiply);
//! let mut rolls = ScriptedRolls::new(vec![0.3]);
//!
//! let outcome = luck::resolve(20, &config, &mut rolls).unwrap();
//! assert_eq!(outcome.damage, 40);
//! assert!(outcome.critical);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crit;
pub mod rolls;

// Re-exports for convenience
pub use crit::{resolve, resolve_observed, CritConfig, CritError, CritMode, CritOutcome};
pub use rolls::{RollSource, ScriptedRolls, SeededRolls};
