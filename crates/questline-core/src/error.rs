//! Error types for the combat engine.
//!
//! Running out of mana, an empty inventory or an unusable item are not
//! errors: they have defined fallbacks and are reported through return
//! values. The variants here cover broken configuration and rule violations.

use thiserror::Error;

use crate::combatant::{CharacterClass, SubClass};

/// Errors produced by the combat engine.
#[derive(Debug, Error)]
pub enum Error {
    /// A critical-hit call received an invalid argument.
    #[error(transparent)]
    Crit(#[from] luck::CritError),

    /// Sub-class requested before reaching the unlock level.
    #[error("level {level} is below the sub-class unlock level {required}")]
    SubclassLocked {
        /// Current level.
        level: u32,
        /// Level required.
        required: u32,
    },

    /// Sub-class requested after one was already chosen.
    #[error("sub-class already chosen: {0}")]
    SubclassAlreadyChosen(SubClass),

    /// Sub-class that belongs to a different class.
    #[error("{subclass} is not a {class} sub-class")]
    SubclassMismatch {
        /// The character's class.
        class: CharacterClass,
        /// The requested sub-class.
        subclass: SubClass,
    },

    /// Rules configuration failed validation.
    #[error("invalid rules configuration: {0}")]
    InvalidConfig(String),

    /// Persisted character record failed validation.
    #[error("invalid character record: {0}")]
    InvalidRecord(String),

    /// Unknown difficulty name.
    #[error("unknown difficulty `{0}`")]
    UnknownDifficulty(String),

    /// Unknown class name.
    #[error("unknown character class `{0}`")]
    UnknownClass(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
