//! Inventory items.
//!
//! Items are a single tagged type carrying a display name and an effect.
//! Names that do not match a known item survive as [`Item::Other`] so that
//! persisted inventories round-trip unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;

/// An inventory item. Serialized as its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Item {
    /// Restores HP.
    HealingPotion,
    /// Restores mana.
    ManaPotion,
    /// Loot with no combat effect.
    Elixir,
    /// Loot with no combat effect.
    Crystal,
    /// Unrecognized item, kept by name.
    Other(String),
}

/// What consuming an item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEffect {
    /// Restores up to this much HP.
    RestoreHealth(i32),
    /// Restores up to this much mana.
    RestoreMana(i32),
    /// Cannot be used.
    Inert,
}

/// Items a mission can award.
pub const LOOT_POOL: [Item; 4] = [Item::HealingPotion, Item::ManaPotion, Item::Elixir, Item::Crystal];

impl Item {
    /// Display name, also used as the persisted identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::HealingPotion => "healing potion",
            Self::ManaPotion => "mana potion",
            Self::Elixir => "elixir",
            Self::Crystal => "crystal",
            Self::Other(name) => name,
        }
    }

    /// Looks an item up by name (case-insensitive). Unknown names become [`Item::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "healing potion" | "potion" => Self::HealingPotion,
            "mana potion" => Self::ManaPotion,
            "elixir" => Self::Elixir,
            "crystal" => Self::Crystal,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Effect of consuming this item under `rules`.
    #[must_use]
    pub fn effect(&self, rules: &RulesConfig) -> ItemEffect {
        match self {
            Self::HealingPotion => ItemEffect::RestoreHealth(rules.healing_potion_amount),
            Self::ManaPotion => ItemEffect::RestoreMana(rules.mana_potion_amount),
            Self::Elixir | Self::Crystal | Self::Other(_) => ItemEffect::Inert,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<Item> for String {
    fn from(item: Item) -> Self {
        match item {
            Item::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}
