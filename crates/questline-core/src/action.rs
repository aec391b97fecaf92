//! Action selection: turning a player's intent into the operation the
//! combat loop executes.
//!
//! The selector never mutates anything. It only decides which
//! [`Character`] operation to invoke and reports when it had to substitute
//! a basic attack for an unavailable intent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combatant::{Character, Combatant};
use crate::config::RulesConfig;
use crate::item::Item;

/// What the player asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Basic attack.
    Attack,
    /// Special ability.
    Ability,
    /// Use a specific item.
    UseItem(Item),
}

/// What the combat loop will execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Basic attack.
    Attack,
    /// Special ability (mana is known to be sufficient).
    Ability,
    /// Use an item. The item may still turn out to be absent or inert, in
    /// which case the turn passes without effect.
    UseItem(Item),
}

/// Why an intent was replaced by a basic attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Ability requested without enough mana.
    InsufficientMana,
    /// Item requested with an empty inventory.
    EmptyInventory,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientMana => write!(f, "not enough mana"),
            Self::EmptyInventory => write!(f, "inventory is empty"),
        }
    }
}

/// Outcome of action selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Action to execute.
    pub action: Action,
    /// Set when the intent was substituted.
    pub fallback: Option<Fallback>,
}

impl Selection {
    fn direct(action: Action) -> Self {
        Self { action, fallback: None }
    }

    fn substituted(reason: Fallback) -> Self {
        Self {
            action: Action::Attack,
            fallback: Some(reason),
        }
    }
}

/// Maps intents to actions with the fallback rules.
///
/// | intent | condition | action |
/// |---|---|---|
/// | `Ability` | mana below cost | `Attack` ([`Fallback::InsufficientMana`]) |
/// | `UseItem` | inventory empty | `Attack` ([`Fallback::EmptyInventory`]) |
/// | anything else | | as requested |
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSelector;

impl ActionSelector {
    /// Resolves `intent` against the character's current state.
    ///
    /// # Example
    ///
    /// ```
    /// use questline_core::action::{Action, ActionSelector, Fallback, Intent};
    /// use questline_core::combatant::{Character, CharacterClass};
    /// use questline_core::config::RulesConfig;
    ///
    /// let hero = Character::new("Ayla", CharacterClass::Mage).with_mana(10, 50);
    /// let selection = ActionSelector::select(Intent::Ability, &hero, &RulesConfig::default());
    /// assert_eq!(selection.action, Action::Attack);
    /// assert_eq!(selection.fallback, Some(Fallback::InsufficientMana));
    /// ```
    #[must_use]
    pub fn select(intent: Intent, character: &Character, rules: &RulesConfig) -> Selection {
        match intent {
            Intent::Attack => Selection::direct(Action::Attack),
            Intent::Ability if character.can_cast(rules) => Selection::direct(Action::Ability),
            Intent::Ability => Selection::substituted(Fallback::InsufficientMana),
            Intent::UseItem(_) if character.inventory().is_empty() => {
                Selection::substituted(Fallback::EmptyInventory)
            }
            Intent::UseItem(item) => Selection::direct(Action::UseItem(item)),
        }
    }
}

/// Read-only snapshot handed to an [`ActionSource`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterView<'a> {
    /// Character name.
    pub name: &'a str,
    /// Current HP.
    pub hp: i32,
    /// Maximum HP.
    pub max_hp: i32,
    /// Current mana.
    pub mana: i32,
    /// Maximum mana.
    pub max_mana: i32,
    /// Whether the special ability is affordable.
    pub ability_ready: bool,
    /// Held items.
    pub inventory: &'a [Item],
}

impl<'a> CharacterView<'a> {
    /// Snapshots `character`.
    #[must_use]
    pub fn of(character: &'a Character, rules: &RulesConfig) -> Self {
        Self {
            name: character.name(),
            hp: character.hp(),
            max_hp: character.max_hp(),
            mana: character.mana().current(),
            max_mana: character.mana().max(),
            ability_ready: character.can_cast(rules),
            inventory: character.inventory(),
        }
    }

    /// `true` if the character holds at least one `item`.
    #[must_use]
    pub fn holds(&self, item: &Item) -> bool {
        self.inventory.contains(item)
    }

    /// HP as a fraction of max HP.
    #[must_use]
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.max_hp)
        }
    }
}

/// Supplies the player's intent each turn.
///
/// Called synchronously once per turn; the combat loop waits for the
/// answer. Closures of the right shape implement this trait.
pub trait ActionSource {
    /// Chooses the intent for the coming turn.
    fn choose(&mut self, view: &CharacterView<'_>) -> Intent;
}

impl<F> ActionSource for F
where
    F: FnMut(&CharacterView<'_>) -> Intent,
{
    fn choose(&mut self, view: &CharacterView<'_>) -> Intent {
        self(view)
    }
}

/// Replays a fixed list of intents, cycling. An empty script always attacks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedActions {
    script: Vec<Intent>,
    cursor: usize,
}

impl ScriptedActions {
    /// Creates a source replaying `script`.
    #[must_use]
    pub fn new(script: impl Into<Vec<Intent>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// Source that always chooses `intent`.
    #[must_use]
    pub fn always(intent: Intent) -> Self {
        Self::new(vec![intent])
    }
}

impl ActionSource for ScriptedActions {
    fn choose(&mut self, _view: &CharacterView<'_>) -> Intent {
        if self.script.is_empty() {
            return Intent::Attack;
        }
        let intent = self.script[self.cursor % self.script.len()].clone();
        self.cursor += 1;
        intent
    }
}

/// Simple built-in policy: drink a healing potion when low, cast when
/// affordable, otherwise attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoPilot {
    /// HP ratio below which a held healing potion is used.
    pub potion_threshold: f64,
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self { potion_threshold: 0.4 }
    }
}

impl ActionSource for AutoPilot {
    fn choose(&mut self, view: &CharacterView<'_>) -> Intent {
        if view.hp_ratio() < self.potion_threshold && view.holds(&Item::HealingPotion) {
            Intent::UseItem(Item::HealingPotion)
        } else if view.ability_ready {
            Intent::Ability
        } else {
            Intent::Attack
        }
    }
}
