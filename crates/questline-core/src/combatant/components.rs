//! State components shared by every combatant.
//!
//! - [`Pool`]: a clamped `current / max` resource (HP, mana)
//! - [`StatusEffects`]: turn counters for stun, bleed and burn
//! - [`StatusFlags`]: compact view of which effects are active
//! - [`Modifiers`]: derived combat chances and multipliers

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;

// =============================================================================
// Pool
// =============================================================================

/// A resource with a current value clamped to `[0, max]`.
///
/// Every mutation re-establishes `0 <= current <= max`, whatever the input
/// magnitude.
///
/// # Example
///
/// ```
/// use questline_core::combatant::Pool;
///
/// let mut hp = Pool::full(100);
/// assert_eq!(hp.take(250), 100);
/// assert_eq!(hp.current(), 0);
/// assert_eq!(hp.restore(30), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pool {
    current: i32,
    max: i32,
}

impl Pool {
    /// Creates a full pool. Negative maxima are raised to 0.
    #[must_use]
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    /// Creates a pool with an explicit current value, clamped to `[0, max]`.
    #[must_use]
    pub fn new(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    /// Current value.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    /// Maximum value.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// `true` when the pool is at 0.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// `true` when the pool is at its maximum.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// Removes up to `amount` and returns how much was actually removed.
    ///
    /// Negative amounts are treated as 0.
    pub fn take(&mut self, amount: i32) -> i32 {
        let removed = amount.max(0).min(self.current);
        self.current -= removed;
        removed
    }

    /// Adds up to `amount` and returns how much was actually added.
    ///
    /// Negative amounts are treated as 0.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let added = amount.max(0).min(self.max - self.current);
        self.current += added;
        added
    }

    /// Removes exactly `amount` if available. Returns `false` (no change) otherwise.
    pub fn spend(&mut self, amount: i32) -> bool {
        if amount < 0 || self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Sets the current value, clamped to `[0, max]`.
    pub fn set_current(&mut self, current: i32) {
        self.current = current.clamp(0, self.max);
    }

    /// Sets the maximum (floored at 0) and clamps the current value to it.
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(0);
        self.current = self.current.min(self.max);
    }

    /// Raises or lowers the maximum by `delta`.
    pub fn adjust_max(&mut self, delta: i32) {
        self.set_max(self.max.saturating_add(delta));
    }

    /// Sets the current value to the maximum.
    pub fn fill(&mut self) {
        self.current = self.max;
    }
}

// =============================================================================
// Status
// =============================================================================

bitflags! {
    /// Which status effects are active on a combatant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Skips the next action.
        const STUNNED = 0b0000_0001;
        /// Takes bleed damage each turn.
        const BLEEDING = 0b0000_0010;
        /// Takes burn damage each turn.
        const BURNING = 0b0000_0100;
    }
}

/// Damage dealt by one damage-over-time effect in one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTick {
    /// The effect that ticked.
    pub effect: StatusFlags,
    /// Damage to apply (defense does not reduce it).
    pub damage: i32,
}

/// Turn counters for transient status effects.
///
/// Effects live only for the duration of one combat; they are never
/// persisted. Applying an effect that is already active resets its counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusEffects {
    stunned: u32,
    bleeding: u32,
    burning: u32,
}

impl StatusEffects {
    /// Active effects.
    #[must_use]
    pub fn flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::STUNNED, self.stunned > 0);
        flags.set(StatusFlags::BLEEDING, self.bleeding > 0);
        flags.set(StatusFlags::BURNING, self.burning > 0);
        flags
    }

    /// Remaining turns for one effect.
    #[must_use]
    pub fn turns(&self, effect: StatusFlags) -> u32 {
        if effect == StatusFlags::STUNNED {
            self.stunned
        } else if effect == StatusFlags::BLEEDING {
            self.bleeding
        } else if effect == StatusFlags::BURNING {
            self.burning
        } else {
            0
        }
    }

    /// Sets each effect in `effects` to last `turns` turns.
    pub fn apply(&mut self, effects: StatusFlags, turns: u32) {
        if effects.contains(StatusFlags::STUNNED) {
            self.stunned = turns;
        }
        if effects.contains(StatusFlags::BLEEDING) {
            self.bleeding = turns;
        }
        if effects.contains(StatusFlags::BURNING) {
            self.burning = turns;
        }
    }

    /// Consumes one stunned turn. Returns `true` if the action must be skipped.
    pub fn consume_stun(&mut self) -> bool {
        if self.stunned == 0 {
            return false;
        }
        self.stunned -= 1;
        true
    }

    /// Advances damage-over-time effects by one turn.
    ///
    /// Returns one tick per active effect (bleed before burn) and decrements
    /// each counter.
    pub fn tick_damage(&mut self, rules: &RulesConfig) -> Vec<StatusTick> {
        let mut ticks = Vec::new();
        if self.bleeding > 0 {
            self.bleeding -= 1;
            ticks.push(StatusTick {
                effect: StatusFlags::BLEEDING,
                damage: rules.bleed_damage,
            });
        }
        if self.burning > 0 {
            self.burning -= 1;
            ticks.push(StatusTick {
                effect: StatusFlags::BURNING,
                damage: rules.burn_damage,
            });
        }
        ticks
    }

    /// Removes every effect.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// Modifiers
// =============================================================================

/// Derived combat modifiers of a character.
///
/// Chances are probabilities in `[0, 1]`; `damage_buff` multiplies damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Critical-hit chance.
    pub crit_chance: f64,
    /// Stun proc chance.
    pub stun_chance: f64,
    /// Bleed proc chance.
    pub bleed_chance: f64,
    /// Burn proc chance.
    pub burn_chance: f64,
    /// Damage multiplier.
    pub damage_buff: f64,
    /// HP the caster recovers on a successful special ability.
    pub heal_base: i32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            crit_chance: 0.05,
            stun_chance: 0.0,
            bleed_chance: 0.0,
            burn_chance: 0.0,
            damage_buff: 1.0,
            heal_base: 0,
        }
    }
}

impl Modifiers {
    /// Returns the name of the first chance outside `[0, 1]`, if any.
    #[must_use]
    pub fn invalid_chance(&self) -> Option<(&'static str, f64)> {
        [
            ("critChance", self.crit_chance),
            ("stunChance", self.stun_chance),
            ("bleedChance", self.bleed_chance),
            ("burnChance", self.burn_chance),
        ]
        .into_iter()
        .find(|(_, value)| !(0.0..=1.0).contains(value))
    }
}

pub(crate) fn add_chance(chance: f64, delta: f64) -> f64 {
    (chance + delta).clamp(0.0, 1.0)
}
