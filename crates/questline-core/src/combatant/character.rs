//! The player character: stats, class, sub-class and the attack/ability/item
//! operations.
//!
//! Damage operations draw from an injected [`RollSource`] in a fixed order so
//! that a seeded source replays a fight exactly:
//!
//! | operation | draws |
//! |---|---|
//! | [`Character::attack`] | variance, crit, then procs (only with a target) |
//! | [`Character::apply_procs`] | Hunter: stun, bleed. Pyromancer: burn. Others: none |
//! | [`Character::ability_special`] | variance, crit (none when mana is short) |

use std::fmt;
use std::str::FromStr;

use luck::{CritConfig, CritMode, RollSource};
use serde::{Deserialize, Serialize};

use super::components::add_chance;
use super::{mitigate, Combatant, Modifiers, Pool, StatusEffects, StatusFlags};
use crate::config::{RulesConfig, Spread};
use crate::error::{Error, Result};
use crate::item::{Item, ItemEffect};

/// Starting HP.
pub const DEFAULT_HP: i32 = 100;
/// Starting mana.
pub const DEFAULT_MANA: i32 = 50;
/// Starting base damage.
pub const DEFAULT_BASE_DAMAGE: i32 = 10;
/// Starting defense.
pub const DEFAULT_DEFENSE: i32 = 5;
/// Experience needed for level 2.
pub const DEFAULT_XP_TO_NEXT: u32 = 100;

// =============================================================================
// Classes
// =============================================================================

/// Class chosen at creation. Never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    /// Melee fighter.
    Warrior,
    /// Ranged fighter.
    Archer,
    /// Spellcaster.
    Mage,
}

impl CharacterClass {
    /// All classes.
    pub const ALL: [Self; 3] = [Self::Warrior, Self::Archer, Self::Mage];

    /// The two sub-classes this class can specialize into.
    #[must_use]
    pub const fn subclasses(self) -> [SubClass; 2] {
        match self {
            Self::Warrior => [SubClass::Berserker, SubClass::Paladin],
            Self::Archer => [SubClass::Hunter, SubClass::Ranger],
            Self::Mage => [SubClass::Pyromancer, SubClass::Cleric],
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warrior => write!(f, "Warrior"),
            Self::Archer => write!(f, "Archer"),
            Self::Mage => write!(f, "Mage"),
        }
    }
}

impl FromStr for CharacterClass {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warrior" => Ok(Self::Warrior),
            "archer" => Ok(Self::Archer),
            "mage" => Ok(Self::Mage),
            _ => Err(Error::UnknownClass(s.to_string())),
        }
    }
}

/// Permanent specialization unlocked at the sub-class level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubClass {
    /// Warrior: +10 damage, -20 max HP, +0.10 crit.
    Berserker,
    /// Warrior: +30 max HP, +5 defense, -5 damage (not below 0).
    Paladin,
    /// Archer: +0.30 bleed, +0.15 stun.
    Hunter,
    /// Archer: +0.20 damage buff, +0.10 crit.
    Ranger,
    /// Mage: +8 damage, +0.30 burn.
    Pyromancer,
    /// Mage: +20 max mana, +20 ability heal.
    Cleric,
}

impl SubClass {
    /// The class this sub-class belongs to.
    #[must_use]
    pub const fn class(self) -> CharacterClass {
        match self {
            Self::Berserker | Self::Paladin => CharacterClass::Warrior,
            Self::Hunter | Self::Ranger => CharacterClass::Archer,
            Self::Pyromancer | Self::Cleric => CharacterClass::Mage,
        }
    }

    /// Applies this sub-class's stat deltas. Chances stay within `[0, 1]`.
    fn apply(self, character: &mut Character) {
        let modifiers = &mut character.modifiers;
        match self {
            Self::Berserker => {
                character.base_damage += 10;
                character.health.adjust_max(-20);
                modifiers.crit_chance = add_chance(modifiers.crit_chance, 0.10);
            }
            Self::Paladin => {
                character.health.adjust_max(30);
                character.defense += 5;
                character.base_damage = (character.base_damage - 5).max(0);
            }
            Self::Hunter => {
                modifiers.bleed_chance = add_chance(modifiers.bleed_chance, 0.30);
                modifiers.stun_chance = add_chance(modifiers.stun_chance, 0.15);
            }
            Self::Ranger => {
                modifiers.damage_buff += 0.20;
                modifiers.crit_chance = add_chance(modifiers.crit_chance, 0.10);
            }
            Self::Pyromancer => {
                character.base_damage += 8;
                modifiers.burn_chance = add_chance(modifiers.burn_chance, 0.30);
            }
            Self::Cleric => {
                character.mana.adjust_max(20);
                modifiers.heal_base += 20;
            }
        }
    }
}

impl fmt::Display for SubClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Berserker => write!(f, "Berserker"),
            Self::Paladin => write!(f, "Paladin"),
            Self::Hunter => write!(f, "Hunter"),
            Self::Ranger => write!(f, "Ranger"),
            Self::Pyromancer => write!(f, "Pyromancer"),
            Self::Cleric => write!(f, "Cleric"),
        }
    }
}

// =============================================================================
// Strike
// =============================================================================

/// Result of an attack or special ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Strike {
    /// Damage to deliver. 0 only when an ability could not be cast.
    pub damage: i32,
    /// Damage before the critical check.
    pub base: i32,
    /// Whether the critical check fired.
    pub critical: bool,
    /// Status effects applied to the target.
    pub procs: StatusFlags,
    /// HP the caster recovered.
    pub self_heal: i32,
}

impl Strike {
    /// `true` when an ability could not be cast for lack of mana.
    #[must_use]
    pub const fn fizzled(&self) -> bool {
        self.damage == 0
    }
}

// =============================================================================
// Character
// =============================================================================

/// The player character.
///
/// HP and mana are clamped pools; level, experience and sub-class change
/// only through progression. Damage stats and modifiers are public since
/// they are plain numbers with no invariant beyond chance bounds, which
/// [`crate::persist::CharacterRecord`] validates on load.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    name: String,
    class: CharacterClass,
    pub(crate) subclass: Option<SubClass>,
    pub(crate) level: u32,
    pub(crate) xp: u32,
    pub(crate) xp_to_next: u32,
    pub(crate) health: Pool,
    pub(crate) mana: Pool,
    pub(crate) inventory: Vec<Item>,
    /// Base attack damage before variance.
    pub base_damage: i32,
    /// Flat damage reduction against enemy attacks.
    pub defense: i32,
    /// Crit, proc, buff and heal modifiers.
    pub modifiers: Modifiers,
    status: StatusEffects,
}

impl Character {
    /// Creates a level 1 character with default stats.
    #[must_use]
    pub fn new(name: impl Into<String>, class: CharacterClass) -> Self {
        Self {
            name: name.into(),
            class,
            subclass: None,
            level: 1,
            xp: 0,
            xp_to_next: DEFAULT_XP_TO_NEXT,
            health: Pool::full(DEFAULT_HP),
            mana: Pool::full(DEFAULT_MANA),
            inventory: Vec::new(),
            base_damage: DEFAULT_BASE_DAMAGE,
            defense: DEFAULT_DEFENSE,
            modifiers: Modifiers::default(),
            status: StatusEffects::default(),
        }
    }

    /// Replaces the HP pool (clamped).
    #[must_use]
    pub fn with_health(mut self, current: i32, max: i32) -> Self {
        self.health = Pool::new(current, max);
        self
    }

    /// Replaces the mana pool (clamped).
    #[must_use]
    pub fn with_mana(mut self, current: i32, max: i32) -> Self {
        self.mana = Pool::new(current, max);
        self
    }

    /// Appends items to the inventory.
    #[must_use]
    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.inventory.extend(items);
        self
    }

    /// Class chosen at creation.
    #[must_use]
    pub const fn class(&self) -> CharacterClass {
        self.class
    }

    /// Chosen sub-class, if any.
    #[must_use]
    pub const fn subclass(&self) -> Option<SubClass> {
        self.subclass
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated towards the next level.
    #[must_use]
    pub const fn xp(&self) -> u32 {
        self.xp
    }

    /// Experience required for the next level.
    #[must_use]
    pub const fn xp_to_next(&self) -> u32 {
        self.xp_to_next
    }

    /// Mana pool.
    #[must_use]
    pub const fn mana(&self) -> &Pool {
        &self.mana
    }

    /// Inventory in acquisition order.
    #[must_use]
    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    /// Appends an item to the inventory.
    pub fn add_item(&mut self, item: Item) {
        self.inventory.push(item);
    }

    /// Sets current HP directly (clamped). Used to roll back a lost fight.
    pub fn set_hp(&mut self, hp: i32) {
        self.health.set_current(hp);
    }

    /// Chooses a sub-class and applies its stat deltas.
    ///
    /// # Errors
    ///
    /// - [`Error::SubclassLocked`] below the unlock level
    /// - [`Error::SubclassAlreadyChosen`] if one is already set
    /// - [`Error::SubclassMismatch`] if `subclass` belongs to another class
    pub fn choose_subclass(&mut self, subclass: SubClass, rules: &RulesConfig) -> Result<()> {
        let required = rules.leveling.subclass_level;
        if self.level < required {
            return Err(Error::SubclassLocked {
                level: self.level,
                required,
            });
        }
        if let Some(existing) = self.subclass {
            return Err(Error::SubclassAlreadyChosen(existing));
        }
        if subclass.class() != self.class {
            return Err(Error::SubclassMismatch {
                class: self.class,
                subclass,
            });
        }
        subclass.apply(self);
        self.subclass = Some(subclass);
        tracing::info!(name = %self.name, %subclass, "sub-class chosen");
        Ok(())
    }

    /// Basic attack.
    ///
    /// Damage is `floor(base_damage * variance)`, scaled by the damage buff
    /// and passed through this character's critical check. With a target,
    /// the target's defense is subtracted (minimum 1) and sub-class procs
    /// are rolled against it; the target's HP is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Crit`] if the crit chance is out of range or the
    /// base damage is negative.
    pub fn attack(
        &self,
        target: Option<&mut dyn Combatant>,
        rules: &RulesConfig,
        rolls: &mut dyn RollSource,
    ) -> Result<Strike> {
        let variance = roll_variance(rules.attack_spread, rolls);
        let raw = scale(scale(self.base_damage, variance), self.modifiers.damage_buff);
        let crit = CritConfig::new(
            self.modifiers.crit_chance,
            rules.attack_crit_multiplier,
            CritMode::Multiply,
        );
        let outcome = luck::resolve(raw, &crit, rolls)?;

        let (damage, procs) = match target {
            Some(target) => {
                let damage = mitigate(outcome.damage, target.defense());
                (damage, self.apply_procs(target, rules, rolls))
            }
            None => (outcome.damage.max(1), StatusFlags::empty()),
        };

        Ok(Strike {
            damage,
            base: outcome.base,
            critical: outcome.critical,
            procs,
            self_heal: 0,
        })
    }

    /// Rolls sub-class procs against `target` and applies the ones that land.
    ///
    /// Hunters roll stun then bleed; Pyromancers roll burn. Other characters
    /// draw nothing.
    pub fn apply_procs(
        &self,
        target: &mut dyn Combatant,
        rules: &RulesConfig,
        rolls: &mut dyn RollSource,
    ) -> StatusFlags {
        let mut landed = StatusFlags::empty();
        match self.subclass {
            Some(SubClass::Hunter) => {
                if rolls.chance(self.modifiers.stun_chance) {
                    target.status_mut().apply(StatusFlags::STUNNED, rules.stun_turns);
                    landed |= StatusFlags::STUNNED;
                }
                if rolls.chance(self.modifiers.bleed_chance) {
                    target.status_mut().apply(StatusFlags::BLEEDING, rules.bleed_turns);
                    landed |= StatusFlags::BLEEDING;
                }
            }
            Some(SubClass::Pyromancer) => {
                if rolls.chance(self.modifiers.burn_chance) {
                    target.status_mut().apply(StatusFlags::BURNING, rules.burn_turns);
                    landed |= StatusFlags::BURNING;
                }
            }
            _ => {}
        }
        if !landed.is_empty() {
            tracing::trace!(victim = target.name(), ?landed, "procs applied");
        }
        landed
    }

    /// Special ability.
    ///
    /// Without enough mana nothing is spent, nothing is drawn and the
    /// returned strike has 0 damage. Otherwise the mana cost is paid and
    /// damage is `floor(base_damage * variance * buff)`, critical-checked,
    /// at least 1. The caster heals by its `heal_base` on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a negative mana cost, and
    /// [`Error::Crit`] if the crit chance is out of range or the base damage
    /// is negative. No mana is spent in either case.
    pub fn ability_special(&mut self, rules: &RulesConfig, rolls: &mut dyn RollSource) -> Result<Strike> {
        if rules.ability_mana_cost < 0 {
            return Err(Error::InvalidConfig(format!(
                "ability_mana_cost must be >= 0, got {}",
                rules.ability_mana_cost
            )));
        }
        if !self.can_cast(rules) {
            tracing::debug!(name = %self.name, mana = self.mana.current(), "not enough mana");
            return Ok(Strike::default());
        }

        let variance = roll_variance(rules.ability_spread, rolls);
        let raw = scale(self.base_damage, variance * self.modifiers.damage_buff);
        let crit = CritConfig::new(
            self.modifiers.crit_chance,
            rules.ability_crit_multiplier,
            CritMode::Multiply,
        );
        let outcome = luck::resolve(raw, &crit, rolls)?;

        let paid = self.mana.spend(rules.ability_mana_cost);
        debug_assert!(paid, "mana checked by can_cast");
        let self_heal = self.heal(self.modifiers.heal_base);

        Ok(Strike {
            damage: outcome.damage.max(1),
            base: outcome.base,
            critical: outcome.critical,
            procs: StatusFlags::empty(),
            self_heal,
        })
    }

    /// `true` if the special ability is affordable.
    #[must_use]
    pub fn can_cast(&self, rules: &RulesConfig) -> bool {
        self.mana.current() >= rules.ability_mana_cost
    }

    /// Consumes one matching item and applies its effect.
    ///
    /// Returns `false`, changing nothing, if the item is not held or has no
    /// combat effect.
    pub fn use_item(&mut self, item: &Item, rules: &RulesConfig) -> bool {
        let Some(index) = self.inventory.iter().position(|held| held == item) else {
            return false;
        };
        match item.effect(rules) {
            ItemEffect::RestoreHealth(amount) => {
                self.heal(amount);
            }
            ItemEffect::RestoreMana(amount) => {
                self.mana.restore(amount);
            }
            ItemEffect::Inert => return false,
        }
        self.inventory.remove(index);
        true
    }
}

impl Combatant for Character {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> &Pool {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Pool {
        &mut self.health
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn status(&self) -> &StatusEffects {
        &self.status
    }

    fn status_mut(&mut self) -> &mut StatusEffects {
        &mut self.status
    }
}

fn roll_variance(spread: Spread, rolls: &mut dyn RollSource) -> f64 {
    rolls.uniform(spread.low, spread.high)
}

#[allow(clippy::cast_possible_truncation)]
fn scale(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor).floor() as i32
}
