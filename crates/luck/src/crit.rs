//! Critical-hit resolution.
//!
//! A critical check draws exactly one value from the roll source. The hit is
//! critical iff the draw is strictly below the configured chance, so a chance
//! of `0.0` never crits and `1.0` always does.
//!
//! Invalid arguments are rejected, never clamped: they indicate a broken
//! configuration, not a game condition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rolls::RollSource;

/// Errors raised for invalid critical-hit arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CritError {
    /// Chance outside `[0, 1]` (or NaN).
    #[error("invalid argument: critical chance {0} is outside [0, 1]")]
    ChanceOutOfRange(f64),

    /// Negative base damage.
    #[error("invalid argument: base damage {0} is negative")]
    NegativeBaseDamage(i32),

    /// Negative (or NaN) multiplier.
    #[error("invalid argument: critical multiplier {0} is negative")]
    NegativeMultiplier(f64),

    /// Mode name that is neither `multiply` nor `add`.
    #[error("invalid argument: unknown critical mode `{0}`")]
    UnknownMode(String),
}

/// How a critical hit amplifies damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CritMode {
    /// `floor(base * multiplier)`
    #[default]
    Multiply,
    /// `base + floor(multiplier)`
    Add,
}

impl fmt::Display for CritMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Multiply => write!(f, "multiply"),
            Self::Add => write!(f, "add"),
        }
    }
}

impl FromStr for CritMode {
    type Err = CritError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiply" => Ok(Self::Multiply),
            "add" => Ok(Self::Add),
            other => Err(CritError::UnknownMode(other.to_string())),
        }
    }
}

/// Critical-hit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CritConfig {
    /// Probability of a critical hit, in `[0, 1]`.
    pub chance: f64,
    /// Multiplier (or flat bonus in [`CritMode::Add`]).
    pub multiplier: f64,
    /// Amplification mode.
    #[serde(default)]
    pub mode: CritMode,
}

impl CritConfig {
    /// Creates a new config.
    #[must_use]
    pub const fn new(chance: f64, multiplier: f64, mode: CritMode) -> Self {
        Self {
            chance,
            multiplier,
            mode,
        }
    }

    /// Checks the config without rolling.
    ///
    /// # Errors
    ///
    /// Returns [`CritError`] if the chance is outside `[0, 1]` or the
    /// multiplier is negative.
    pub fn validate(&self) -> Result<(), CritError> {
        if !(0.0..=1.0).contains(&self.chance) {
            return Err(CritError::ChanceOutOfRange(self.chance));
        }
        if self.multiplier.is_nan() || self.multiplier < 0.0 {
            return Err(CritError::NegativeMultiplier(self.multiplier));
        }
        Ok(())
    }

    /// Damage after amplification, ignoring the roll.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn amplify(&self, base: i32) -> i32 {
        match self.mode {
            CritMode::Multiply => (f64::from(base) * self.multiplier).floor() as i32,
            CritMode::Add => base.saturating_add(self.multiplier.floor() as i32),
        }
    }
}

impl Default for CritConfig {
    fn default() -> Self {
        Self::new(0.20, 1.8, CritMode::Multiply)
    }
}

/// Result of a critical check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritOutcome {
    /// Damage before the check.
    pub base: i32,
    /// Damage after the check. Equals `base` when not critical.
    pub damage: i32,
    /// Whether the hit was critical.
    pub critical: bool,
}

impl CritOutcome {
    /// `(final_damage, was_critical)`
    #[must_use]
    pub const fn into_parts(self) -> (i32, bool) {
        (self.damage, self.critical)
    }
}

/// Resolves a critical check for `base` damage.
///
/// Draws exactly one value from `rolls`, and only after the arguments have
/// been validated.
///
/// # Errors
///
/// Returns [`CritError`] if `base` is negative, the chance is outside
/// `[0, 1]`, or the multiplier is negative.
///
/// # Example
///
/// ```
/// use luck::{resolve, CritConfig, CritMode, ScriptedRolls};
///
/// let config = CritConfig::new(0.5, 2.0, CritMode::Multiply);
///
/// let hit = resolve(20, &config, &mut ScriptedRolls::constant(0.3)).unwrap();
/// assert_eq!(hit.into_parts(), (40, true));
///
/// let miss = resolve(20, &config, &mut ScriptedRolls::constant(0.7)).unwrap();
/// assert_eq!(miss.into_parts(), (20, false));
/// ```
pub fn resolve<R: RollSource + ?Sized>(
    base: i32,
    config: &CritConfig,
    rolls: &mut R,
) -> Result<CritOutcome, CritError> {
    if base < 0 {
        return Err(CritError::NegativeBaseDamage(base));
    }
    config.validate()?;

    if !rolls.chance(config.chance) {
        return Ok(CritOutcome {
            base,
            damage: base,
            critical: false,
        });
    }

    let damage = config.amplify(base).max(0);
    tracing::trace!(base, damage, mode = %config.mode, "critical hit");
    Ok(CritOutcome {
        base,
        damage,
        critical: true,
    })
}

/// Like [`resolve`], but calls `hook` when the hit is critical.
///
/// The hook is a presentation concern (flashes, sounds, log lines); it never
/// influences the returned outcome.
///
/// # Errors
///
/// Same as [`resolve`].
pub fn resolve_observed<R: RollSource + ?Sized>(
    base: i32,
    config: &CritConfig,
    rolls: &mut R,
    hook: &mut dyn FnMut(&CritOutcome),
) -> Result<CritOutcome, CritError> {
    let outcome = resolve(base, config, rolls)?;
    if outcome.critical {
        hook(&outcome);
    }
    Ok(outcome)
}
