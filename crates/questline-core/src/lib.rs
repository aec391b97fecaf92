//! # Questline Core
//!
//! Turn-based combat resolution engine for the Questline text RPG.
//!
//! A player [`Character`] fights a generated [`Enemy`] one turn at a time:
//! randomized damage, critical hits, sub-class procs, mana-gated abilities
//! and item use resolve into victory (experience, level-ups, loot) or
//! defeat (HP rolled back to its value at the start of the fight).
//!
//! ## Architecture
//!
//! Data flows one way per turn:
//!
//! ```text
//! ActionSource -> ActionSelector -> Character::attack / ability_special
//!     -> luck::resolve -> Enemy::receive_damage_with_defense
//!     -> CombatSession checks termination -> ProgressionEngine (on victory)
//! ```
//!
//! - **Combatants** ([`combatant`]): shared HP capability plus Character and
//!   Enemy variants
//! - **Action selection** ([`action`]): intent to action, with fallbacks
//! - **Combat loop** ([`session`]): explicit phase state machine
//! - **Progression** ([`progression`]): experience, levels, sub-class unlock
//! - **Missions** ([`mission`]): enemy generation and the mission runner
//!
//! Randomness comes from an injected [`luck::RollSource`]; presentation
//! goes through optional [`event::Hooks`]. Neither is global.
//!
//! ## Usage
//!
//! ```
//! use luck::SeededRolls;
//! use questline_core::{
//!     AutoPilot, Character, CharacterClass, Difficulty, Mission, MissionRunner, RulesConfig,
//! };
//!
//! let rules = RulesConfig::default();
//! let mut rolls = SeededRolls::new(42);
//! let mut pilot = AutoPilot::default();
//! let mut hero = Character::new("Ayla", CharacterClass::Warrior);
//!
//! let mission = Mission::generate("Goblin Cave", Difficulty::Easy, &mut rolls);
//! let report = MissionRunner::new(&rules, &mut pilot, &mut rolls)
//!     .run(&mission, &mut hero)
//!     .unwrap();
//! assert!(report.turns >= 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use luck;

pub mod action;
pub mod combatant;
pub mod config;
pub mod error;
pub mod event;
pub mod item;
pub mod mission;
pub mod persist;
pub mod progression;
pub mod session;

pub use action::{ActionSelector, ActionSource, AutoPilot, CharacterView, Intent, ScriptedActions};
pub use combatant::{Character, CharacterClass, Combatant, Difficulty, Enemy, EnemyKind, SubClass};
pub use config::RulesConfig;
pub use error::{Error, Result};
pub use event::{CombatEvent, CombatObserver, EventLog, Hooks, LogSink};
pub use item::Item;
pub use mission::{Mission, MissionReport, MissionRunner, Reward};
pub use persist::CharacterRecord;
pub use progression::{NoChoice, ProgressionEngine, SubclassChooser};
pub use session::{CombatOutcome, CombatPhase, CombatSession};

#[cfg(test)]
mod tests;
