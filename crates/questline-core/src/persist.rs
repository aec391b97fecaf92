//! Flat character record for storage.
//!
//! Keys are camelCase. Every field is optional on load and falls back to
//! the value a new character starts with; `maxHp` falls back to `hp`.
//! Status effects are never stored.
//!
//! ```
//! use questline_core::combatant::Combatant;
//! use questline_core::persist::CharacterRecord;
//!
//! let record = CharacterRecord::from_json(r#"{ "name": "Ayla", "class": "Mage", "hp": 70 }"#).unwrap();
//! let hero = record.into_character().unwrap();
//! assert_eq!(hero.hp(), 70);
//! assert_eq!(hero.max_hp(), 70);
//! assert_eq!(hero.mana().current(), 50);
//! ```

use serde::{Deserialize, Serialize};

use crate::combatant::character::{DEFAULT_BASE_DAMAGE, DEFAULT_DEFENSE, DEFAULT_HP, DEFAULT_MANA, DEFAULT_XP_TO_NEXT};
use crate::combatant::{Character, CharacterClass, Combatant, Modifiers, Pool, SubClass};
use crate::error::{Error, Result};
use crate::item::Item;

/// Persisted character state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterRecord {
    /// Character name.
    pub name: String,
    /// Class.
    pub class: CharacterClass,
    /// Chosen sub-class.
    pub sub_class: Option<SubClass>,
    /// Current HP.
    pub hp: i32,
    /// Defaults to `hp` when absent.
    pub max_hp: Option<i32>,
    /// Level.
    pub level: u32,
    /// Experience towards the next level.
    pub xp: u32,
    /// Experience threshold.
    pub xp_to_next: u32,
    /// Items by display name.
    pub inventory: Vec<Item>,
    /// Current mana.
    pub mana: i32,
    /// Maximum mana.
    pub max_mana: i32,
    /// Base attack damage.
    pub base_damage: i32,
    /// Defense.
    pub defense: i32,
    /// Critical-hit chance.
    pub crit_chance: f64,
    /// Stun proc chance.
    pub stun_chance: f64,
    /// Bleed proc chance.
    pub bleed_chance: f64,
    /// Damage multiplier.
    pub damage_buff: f64,
    /// Burn proc chance.
    pub burn_chance: f64,
    /// Ability self-heal.
    pub heal_base: i32,
}

impl Default for CharacterRecord {
    fn default() -> Self {
        let modifiers = Modifiers::default();
        Self {
            name: "Adventurer".to_string(),
            class: CharacterClass::Warrior,
            sub_class: None,
            hp: DEFAULT_HP,
            max_hp: None,
            level: 1,
            xp: 0,
            xp_to_next: DEFAULT_XP_TO_NEXT,
            inventory: Vec::new(),
            mana: DEFAULT_MANA,
            max_mana: DEFAULT_MANA,
            base_damage: DEFAULT_BASE_DAMAGE,
            defense: DEFAULT_DEFENSE,
            crit_chance: modifiers.crit_chance,
            stun_chance: modifiers.stun_chance,
            bleed_chance: modifiers.bleed_chance,
            damage_buff: modifiers.damage_buff,
            burn_chance: modifiers.burn_chance,
            heal_base: modifiers.heal_base,
        }
    }
}

impl From<&Character> for CharacterRecord {
    fn from(character: &Character) -> Self {
        let modifiers = character.modifiers;
        Self {
            name: character.name().to_string(),
            class: character.class(),
            sub_class: character.subclass(),
            hp: character.hp(),
            max_hp: Some(character.max_hp()),
            level: character.level(),
            xp: character.xp(),
            xp_to_next: character.xp_to_next(),
            inventory: character.inventory().to_vec(),
            mana: character.mana().current(),
            max_mana: character.mana().max(),
            base_damage: character.base_damage,
            defense: character.defense,
            crit_chance: modifiers.crit_chance,
            stun_chance: modifiers.stun_chance,
            bleed_chance: modifiers.bleed_chance,
            damage_buff: modifiers.damage_buff,
            burn_chance: modifiers.burn_chance,
            heal_base: modifiers.heal_base,
        }
    }
}

impl CharacterRecord {
    /// Parses a record from JSON. Does not validate; see
    /// [`CharacterRecord::into_character`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] for malformed JSON or unknown
    /// class/sub-class names.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the record as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective maximum HP.
    #[must_use]
    pub fn max_hp(&self) -> i32 {
        self.max_hp.unwrap_or(self.hp)
    }

    /// Checks the record for values a character cannot hold.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidRecord(message));
        let max_hp = self.max_hp();

        if self.name.trim().is_empty() {
            return invalid("name is empty".to_string());
        }
        if !(0..=max_hp).contains(&self.hp) {
            return invalid(format!("hp {} outside 0..={max_hp}", self.hp));
        }
        if !(0..=self.max_mana).contains(&self.mana) {
            return invalid(format!("mana {} outside 0..={}", self.mana, self.max_mana));
        }
        if self.level == 0 {
            return invalid("level must be at least 1".to_string());
        }
        if self.xp_to_next == 0 {
            return invalid("xpToNext must be positive".to_string());
        }
        if self.base_damage < 0 || self.heal_base < 0 {
            return invalid("baseDamage and healBase must be non-negative".to_string());
        }
        if self.damage_buff.is_nan() || self.damage_buff < 0.0 {
            return invalid(format!("damageBuff must be non-negative, got {}", self.damage_buff));
        }
        if let Some((name, value)) = self.modifiers().invalid_chance() {
            return invalid(format!("{name} {value} outside [0, 1]"));
        }
        if let Some(subclass) = self.sub_class {
            if subclass.class() != self.class {
                return invalid(format!("{subclass} is not a {} sub-class", self.class));
            }
        }
        Ok(())
    }

    /// Validates the record and rebuilds the character.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if validation fails.
    pub fn into_character(self) -> Result<Character> {
        self.validate()?;
        let modifiers = self.modifiers();
        let max_hp = self.max_hp();

        let mut character = Character::new(self.name, self.class);
        character.subclass = self.sub_class;
        character.level = self.level;
        character.xp = self.xp;
        character.xp_to_next = self.xp_to_next;
        character.health = Pool::new(self.hp, max_hp);
        character.mana = Pool::new(self.mana, self.max_mana);
        character.inventory = self.inventory;
        character.base_damage = self.base_damage;
        character.defense = self.defense;
        character.modifiers = modifiers;
        Ok(character)
    }

    fn modifiers(&self) -> Modifiers {
        Modifiers {
            crit_chance: self.crit_chance,
            stun_chance: self.stun_chance,
            bleed_chance: self.bleed_chance,
            burn_chance: self.burn_chance,
            damage_buff: self.damage_buff,
            heal_base: self.heal_base,
        }
    }
}
