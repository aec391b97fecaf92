//! Enemy variants and the difficulty rosters they are drawn from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Combatant, Pool, StatusEffects};
use crate::error::Error;

/// Fixed stat line of an enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStats {
    /// Starting and maximum HP.
    pub hp: i32,
    /// Raw attack damage.
    pub attack: i32,
    /// Flat damage reduction.
    pub defense: i32,
    /// Experience awarded on defeat.
    pub xp_reward: u32,
    /// HP regenerated before each of its turns, if any.
    pub regen: Option<i32>,
}

/// Enemy kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Weak, fast fodder.
    Goblin,
    /// Pack hunter.
    Wolf,
    /// Heavy hitter.
    Orc,
    /// Regenerating boss.
    Boss,
}

impl EnemyKind {
    /// All kinds in table order.
    pub const ALL: [Self; 4] = [Self::Goblin, Self::Wolf, Self::Orc, Self::Boss];

    /// Stat line for this kind.
    #[must_use]
    pub const fn stats(self) -> EnemyStats {
        match self {
            Self::Goblin => EnemyStats {
                hp: 50,
                attack: 8,
                defense: 2,
                xp_reward: 50,
                regen: None,
            },
            Self::Wolf => EnemyStats {
                hp: 60,
                attack: 10,
                defense: 3,
                xp_reward: 60,
                regen: None,
            },
            Self::Orc => EnemyStats {
                hp: 90,
                attack: 14,
                defense: 5,
                xp_reward: 90,
                regen: None,
            },
            Self::Boss => EnemyStats {
                hp: 160,
                attack: 18,
                defense: 8,
                xp_reward: 200,
                regen: Some(8),
            },
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Goblin => write!(f, "Goblin"),
            Self::Wolf => write!(f, "Wolf"),
            Self::Orc => write!(f, "Orc"),
            Self::Boss => write!(f, "Boss"),
        }
    }
}

/// A generated opponent. Lives for one encounter.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    kind: EnemyKind,
    name: String,
    health: Pool,
    attack: i32,
    defense: i32,
    xp_reward: u32,
    regen: Option<i32>,
    status: StatusEffects,
}

impl Enemy {
    /// Spawns a fresh enemy of `kind` at full HP.
    #[must_use]
    pub fn new(kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            name: kind.to_string(),
            health: Pool::full(stats.hp),
            attack: stats.attack,
            defense: stats.defense,
            xp_reward: stats.xp_reward,
            regen: stats.regen,
            status: StatusEffects::default(),
        }
    }

    /// Enemy kind.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Raw attack damage (before the target's defense).
    #[must_use]
    pub const fn attack(&self) -> i32 {
        self.attack
    }

    /// Experience awarded on defeat.
    #[must_use]
    pub const fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    /// `true` if this enemy heals itself each turn.
    #[must_use]
    pub const fn can_regenerate(&self) -> bool {
        self.regen.is_some()
    }

    /// Applies per-turn regeneration. Returns HP restored (0 without the capability).
    pub fn regenerate(&mut self) -> i32 {
        match self.regen {
            Some(amount) => self.health.restore(amount),
            None => 0,
        }
    }
}

impl Combatant for Enemy {
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

/// Mission difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Goblins and wolves.
    Easy,
    /// Wolves and orcs.
    #[default]
    Medium,
    /// Orcs and the boss.
    Hard,
}

impl Difficulty {
    /// Enemy kinds a mission of this tier draws from.
    #[must_use]
    pub const fn roster(self) -> &'static [EnemyKind] {
        match self {
            Self::Easy => &[EnemyKind::Goblin, EnemyKind::Wolf],
            Self::Medium => &[EnemyKind::Wolf, EnemyKind::Orc],
            Self::Hard => &[EnemyKind::Orc, EnemyKind::Boss],
        }
    }

    /// Parses a tier name, falling back to [`Difficulty::Medium`] when unknown.
    #[must_use]
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(name, "unknown difficulty, using medium");
            Self::Medium
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(Error::UnknownDifficulty(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_table() {
        let orc = Enemy::new(EnemyKind::Orc);
        assert_eq!(orc.hp(), 90);
        assert_eq!(orc.attack(), 14);
        assert_eq!(orc.defense(), 5);
        assert_eq!(orc.xp_reward(), 90);
        assert!(!orc.can_regenerate());
    }

    #[test]
    fn only_boss_regenerates() {
        for kind in EnemyKind::ALL {
            assert_eq!(Enemy::new(kind).can_regenerate(), kind == EnemyKind::Boss);
        }
    }

    #[test]
    fn regeneration_clamps_to_max() {
        let mut boss = Enemy::new(EnemyKind::Boss);
        boss.receive_damage(5);
        assert_eq!(boss.regenerate(), 5);
        assert_eq!(boss.hp(), 160);
        boss.receive_damage(50);
        assert_eq!(boss.regenerate(), 8);
        assert_eq!(boss.hp(), 118);
    }

    #[test]
    fn regenerate_without_capability_is_noop() {
        let mut goblin = Enemy::new(EnemyKind::Goblin);
        goblin.receive_damage(10);
        assert_eq!(goblin.regenerate(), 0);
        assert_eq!(goblin.hp(), 40);
    }

    #[test]
    fn rosters() {
        assert_eq!(Difficulty::Easy.roster(), &[EnemyKind::Goblin, EnemyKind::Wolf]);
        assert_eq!(Difficulty::Hard.roster(), &[EnemyKind::Orc, EnemyKind::Boss]);
    }

    #[test]
    fn difficulty_parsing() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "nightmare".parse::<Difficulty>(),
            Err(Error::UnknownDifficulty(_))
        ));
        assert_eq!(Difficulty::parse_lenient("nightmare"), Difficulty::Medium);
        assert_eq!(Difficulty::parse_lenient("easy"), Difficulty::Easy);
    }
}
