//! Combatants: the player [`Character`] and generated [`Enemy`] encounters.
//!
//! Both variants implement the [`Combatant`] capability trait, which owns
//! the HP bookkeeping. Variant-specific behavior (abilities, regeneration,
//! progression state) lives on the concrete types.
//!
//! # Example
//!
//! ```
//! use questline_core::combatant::{Combatant, Enemy, EnemyKind};
//!
//! let mut orc = Enemy::new(EnemyKind::Orc);
//! // Defense 5 leaves 7 of 12 incoming damage.
//! assert_eq!(orc.receive_damage_with_defense(12), 7);
//! // Overkill is clamped at 0 HP.
//! orc.receive_damage(10_000);
//! assert_eq!(orc.hp(), 0);
//! assert!(!orc.is_alive());
//! ```

pub mod character;
pub mod components;
pub mod enemy;

pub use character::{Character, CharacterClass, Strike, SubClass};
pub use components::{Modifiers, Pool, StatusEffects, StatusFlags, StatusTick};
pub use enemy::{Difficulty, Enemy, EnemyKind};

/// Capabilities shared by everything that can deal or receive damage.
///
/// Implementors provide access to their HP [`Pool`], defense and status
/// counters; the default methods keep `0 <= hp <= max_hp` after every call.
pub trait Combatant {
    /// Display name.
    fn name(&self) -> &str;

    /// HP pool.
    fn health(&self) -> &Pool;

    /// Mutable HP pool.
    fn health_mut(&mut self) -> &mut Pool;

    /// Flat damage reduction.
    fn defense(&self) -> i32;

    /// Active status effects.
    fn status(&self) -> &StatusEffects;

    /// Mutable status effects.
    fn status_mut(&mut self) -> &mut StatusEffects;

    /// Current HP.
    fn hp(&self) -> i32 {
        self.health().current()
    }

    /// Maximum HP.
    fn max_hp(&self) -> i32 {
        self.health().max()
    }

    /// `true` while HP is above 0.
    fn is_alive(&self) -> bool {
        !self.health().is_empty()
    }

    /// Restores up to `amount` HP and returns the amount restored.
    fn heal(&mut self, amount: i32) -> i32 {
        self.health_mut().restore(amount)
    }

    /// Applies already-reduced damage and returns the HP actually lost.
    fn receive_damage(&mut self, incoming: i32) -> i32 {
        self.health_mut().take(incoming)
    }

    /// Subtracts this combatant's defense from `incoming` (minimum 1) and
    /// applies the rest. Returns the HP actually lost.
    fn receive_damage_with_defense(&mut self, incoming: i32) -> i32 {
        let reduced = mitigate(incoming, self.defense());
        self.receive_damage(reduced)
    }
}

/// `max(1, incoming - defense)`.
#[must_use]
pub fn mitigate(incoming: i32, defense: i32) -> i32 {
    incoming.saturating_sub(defense).max(1)
}
