//! Tunable combat rules.
//!
//! Every constant the engine uses lives in [`RulesConfig`]. The defaults
//! reproduce the standard game; a JSON file can override any subset of
//! fields since missing fields fall back to their defaults.

use luck::CritConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A `[low, high)` range for damage variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    /// Inclusive lower bound.
    pub low: f64,
    /// Exclusive upper bound.
    pub high: f64,
}

impl Spread {
    /// Creates a new spread.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Growth applied on each level-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingRules {
    /// Experience threshold multiplier per level (result truncated).
    pub xp_growth: f64,
    /// Maximum HP gained per level.
    pub max_hp_per_level: i32,
    /// Base damage gained per level.
    pub damage_per_level: i32,
    /// Defense gained per level.
    pub defense_per_level: i32,
    /// Level at which the sub-class choice unlocks.
    pub subclass_level: u32,
}

impl Default for LevelingRules {
    fn default() -> Self {
        Self {
            xp_growth: 1.5,
            max_hp_per_level: 20,
            damage_per_level: 2,
            defense_per_level: 1,
            subclass_level: 4,
        }
    }
}

/// Combat rules shared by every session.
///
/// # Example
///
/// ```
/// use questline_core::config::RulesConfig;
///
/// let rules = RulesConfig::from_json(r#"{ "ability_mana_cost": 30 }"#).unwrap();
/// assert_eq!(rules.ability_mana_cost, 30);
/// assert_eq!(rules.healing_potion_amount, 30); // untouched default
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Variance applied to basic attacks.
    pub attack_spread: Spread,
    /// Critical multiplier for basic attacks.
    pub attack_crit_multiplier: f64,
    /// Variance applied to the special ability.
    pub ability_spread: Spread,
    /// Critical multiplier for the special ability.
    pub ability_crit_multiplier: f64,
    /// Mana spent by the special ability.
    pub ability_mana_cost: i32,
    /// Optional second, action-level critical roll applied by the combat loop.
    ///
    /// `None` leaves the combatant-level roll as the only critical check.
    pub action_crit: Option<CritConfig>,
    /// HP restored by a healing potion.
    pub healing_potion_amount: i32,
    /// Mana restored by a mana potion.
    pub mana_potion_amount: i32,
    /// Turns a stun lasts.
    pub stun_turns: u32,
    /// Turns a bleed lasts.
    pub bleed_turns: u32,
    /// Turns a burn lasts.
    pub burn_turns: u32,
    /// Damage dealt by bleed each turn.
    pub bleed_damage: i32,
    /// Damage dealt by burn each turn.
    pub burn_damage: i32,
    /// Level-up growth.
    pub leveling: LevelingRules,
    /// Turn limit after which a combat is scored as a defeat.
    pub max_turns: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            attack_spread: Spread::new(0.8, 1.2),
            attack_crit_multiplier: 1.8,
            ability_spread: Spread::new(1.3, 1.7),
            ability_crit_multiplier: 2.0,
            ability_mana_cost: 20,
            action_crit: None,
            healing_potion_amount: 30,
            mana_potion_amount: 25,
            stun_turns: 1,
            bleed_turns: 2,
            burn_turns: 2,
            bleed_damage: 4,
            burn_damage: 6,
            leveling: LevelingRules::default(),
            max_turns: 500,
        }
    }
}

impl RulesConfig {
    /// Parses and validates rules from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON and
    /// [`Error::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Serializes the rules as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        for (name, spread) in [("attack_spread", self.attack_spread), ("ability_spread", self.ability_spread)] {
            if !(spread.low >= 0.0 && spread.low <= spread.high) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must satisfy 0 <= low <= high, got [{}, {})",
                    spread.low, spread.high
                )));
            }
        }
        for (name, multiplier) in [
            ("attack_crit_multiplier", self.attack_crit_multiplier),
            ("ability_crit_multiplier", self.ability_crit_multiplier),
        ] {
            if multiplier.is_nan() || multiplier < 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be >= 0, got {multiplier}")));
            }
        }
        if let Some(action_crit) = &self.action_crit {
            action_crit
                .validate()
                .map_err(|e| Error::InvalidConfig(format!("action_crit: {e}")))?;
        }
        let amounts = [
            ("ability_mana_cost", self.ability_mana_cost),
            ("healing_potion_amount", self.healing_potion_amount),
            ("mana_potion_amount", self.mana_potion_amount),
            ("bleed_damage", self.bleed_damage),
            ("burn_damage", self.burn_damage),
        ];
        for (name, amount) in amounts {
            if amount < 0 {
                return Err(Error::InvalidConfig(format!("{name} must be >= 0, got {amount}")));
            }
        }
        if self.leveling.xp_growth.is_nan() || self.leveling.xp_growth < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "leveling.xp_growth must be >= 1, got {}",
                self.leveling.xp_growth
            )));
        }
        if self.max_turns == 0 {
            return Err(Error::InvalidConfig("max_turns must be > 0".to_string()));
        }
        Ok(())
    }
}
