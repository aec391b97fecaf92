//! Experience, leveling and loot.
//!
//! Each level-up subtracts the threshold from accumulated experience,
//! grows the threshold by the configured factor (truncated, always
//! strictly increasing), raises max HP, fully heals, and raises base
//! damage and defense. Several thresholds crossed in one grant are all
//! applied in the same call.
//!
//! The sub-class choice is offered exactly once: when a character without
//! a sub-class first reaches the unlock level.

use crate::combatant::{Character, Combatant, SubClass};
use crate::config::RulesConfig;
use crate::event::{CombatEvent, Hooks};
use crate::mission::Reward;

/// Picks a sub-class when one becomes available.
///
/// Returning `None` leaves the character without a sub-class; it can still
/// be chosen later with [`Character::choose_subclass`].
pub trait SubclassChooser {
    /// Chooses among `options` for `character`.
    fn choose(&mut self, character: &Character, options: [SubClass; 2]) -> Option<SubClass>;
}

impl<F> SubclassChooser for F
where
    F: FnMut(&Character, [SubClass; 2]) -> Option<SubClass>,
{
    fn choose(&mut self, character: &Character, options: [SubClass; 2]) -> Option<SubClass> {
        self(character, options)
    }
}

/// Chooser that always declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChoice;

impl SubclassChooser for NoChoice {
    fn choose(&mut self, _character: &Character, _options: [SubClass; 2]) -> Option<SubClass> {
        None
    }
}

/// What a grant of experience changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelUpReport {
    /// `true` if at least one level was gained.
    pub leveled_up: bool,
    /// Number of levels gained.
    pub levels_gained: u32,
    /// Sub-class chosen during this grant, if any.
    pub subclass: Option<SubClass>,
}

/// Applies progression rules to a character.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionEngine<'r> {
    rules: &'r RulesConfig,
}

impl<'r> ProgressionEngine<'r> {
    /// Creates an engine using `rules`.
    #[must_use]
    pub const fn new(rules: &'r RulesConfig) -> Self {
        Self { rules }
    }

    /// Adds experience and applies every level-up it pays for.
    ///
    /// A chooser pick the character cannot take counts as a decline: it is
    /// logged and [`Character::choose_subclass`] stays available.
    ///
    /// # Example
    ///
    /// ```
    /// use questline_core::combatant::{Character, CharacterClass, Combatant};
    /// use questline_core::config::RulesConfig;
    /// use questline_core::event::Hooks;
    /// use questline_core::progression::{NoChoice, ProgressionEngine};
    ///
    /// let rules = RulesConfig::default();
    /// let mut hero = Character::new("Ayla", CharacterClass::Warrior);
    /// // 100 for level 2, 150 for level 3, 5 left over.
    /// let report = ProgressionEngine::new(&rules)
    ///     .grant_experience(&mut hero, 255, &mut NoChoice, &mut Hooks::none());
    /// assert_eq!(report.levels_gained, 2);
    /// assert_eq!(hero.level(), 3);
    /// assert_eq!(hero.xp(), 5);
    /// assert_eq!(hero.xp_to_next(), 225);
    /// assert_eq!(hero.max_hp(), 140);
    /// ```
    pub fn grant_experience(
        &self,
        character: &mut Character,
        amount: u32,
        chooser: &mut dyn SubclassChooser,
        hooks: &mut Hooks<'_>,
    ) -> LevelUpReport {
        let leveling = &self.rules.leveling;
        let mut report = LevelUpReport::default();

        character.xp = character.xp.saturating_add(amount);
        while character.xp >= character.xp_to_next {
            character.xp -= character.xp_to_next;
            character.level += 1;
            character.xp_to_next = next_threshold(character.xp_to_next, leveling.xp_growth);
            character.health.adjust_max(leveling.max_hp_per_level);
            character.health.fill();
            character.base_damage += leveling.damage_per_level;
            character.defense += leveling.defense_per_level;
            report.levels_gained += 1;

            tracing::info!(
                name = character.name(),
                level = character.level,
                max_hp = character.max_hp(),
                "level up"
            );
            hooks.emit(CombatEvent::LeveledUp {
                level: character.level,
            });

            if character.level == leveling.subclass_level && character.subclass.is_none() {
                let options = character.class().subclasses();
                if let Some(subclass) = chooser.choose(character, options) {
                    match character.choose_subclass(subclass, self.rules) {
                        Ok(()) => {
                            report.subclass = Some(subclass);
                            hooks.emit(CombatEvent::SubclassChosen { subclass });
                        }
                        Err(error) => {
                            tracing::warn!(name = character.name(), %subclass, %error, "sub-class pick ignored");
                        }
                    }
                }
            }
        }

        report.leveled_up = report.levels_gained > 0;
        report
    }

    /// Grants the reward's experience, then appends its items.
    pub fn apply_victory(
        &self,
        character: &mut Character,
        reward: &Reward,
        chooser: &mut dyn SubclassChooser,
        hooks: &mut Hooks<'_>,
    ) -> LevelUpReport {
        let report = self.grant_experience(character, reward.xp, chooser, hooks);
        for item in &reward.items {
            character.add_item(item.clone());
        }
        report
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn next_threshold(current: u32, growth: f64) -> u32 {
    let grown = (f64::from(current) * growth) as u32;
    grown.max(current.saturating_add(1))
}
