//! Missions: a generated enemy, a reward, and the runner that plays them.

use luck::RollSource;
use serde::{Deserialize, Serialize};

use crate::action::ActionSource;
use crate::combatant::{Character, Combatant, Difficulty, Enemy, EnemyKind, SubClass};
use crate::config::RulesConfig;
use crate::error::Result;
use crate::event::{CombatEvent, Hooks};
use crate::item::{Item, LOOT_POOL};
use crate::progression::{NoChoice, ProgressionEngine, SubclassChooser};
use crate::session::CombatSession;

/// Experience and items granted on victory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    /// Experience points.
    pub xp: u32,
    /// Loot appended to the inventory.
    pub items: Vec<Item>,
}

/// A named encounter. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    name: String,
    difficulty: Difficulty,
    enemy: Enemy,
    reward: Reward,
}

impl Mission {
    /// Builds a mission against a specific enemy. Experience comes from the enemy.
    #[must_use]
    pub fn new(name: impl Into<String>, difficulty: Difficulty, kind: EnemyKind, items: Vec<Item>) -> Self {
        let enemy = Enemy::new(kind);
        let reward = Reward {
            xp: enemy.xp_reward(),
            items,
        };
        Self {
            name: name.into(),
            difficulty,
            enemy,
            reward,
        }
    }

    /// Generates a random mission.
    ///
    /// Draws, in order: the enemy from the difficulty roster, the loot
    /// count (1 or 2), then each loot item from [`LOOT_POOL`].
    pub fn generate(name: impl Into<String>, difficulty: Difficulty, rolls: &mut dyn RollSource) -> Self {
        let roster = difficulty.roster();
        let kind = roster[rolls.pick(roster.len())];
        let count = rolls.range_inclusive(1, 2);
        let items = (0..count)
            .map(|_| LOOT_POOL[rolls.pick(LOOT_POOL.len())].clone())
            .collect();
        Self::new(name, difficulty, kind, items)
    }

    /// Mission name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Difficulty tier.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The enemy as it starts the fight.
    #[must_use]
    pub const fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    /// Reward granted on victory.
    #[must_use]
    pub const fn reward(&self) -> &Reward {
        &self.reward
    }

    /// Plays the mission with no sub-class chooser.
    ///
    /// # Errors
    ///
    /// See [`MissionRunner::run`].
    pub fn run<'a>(
        &self,
        character: &mut Character,
        rules: &'a RulesConfig,
        source: &'a mut dyn ActionSource,
        rolls: &'a mut dyn RollSource,
        hooks: Hooks<'a>,
    ) -> Result<MissionReport> {
        MissionRunner::new(rules, source, rolls)
            .with_hooks(hooks)
            .run(self, character)
    }
}

/// Result of playing a mission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissionReport {
    /// `true` if the enemy was defeated.
    pub victory: bool,
    /// Experience granted (0 on defeat).
    pub xp: u32,
    /// Items granted (empty on defeat).
    pub items: Vec<Item>,
    /// `true` if the character gained a level.
    pub leveled_up: bool,
    /// Levels gained.
    pub levels_gained: u32,
    /// Sub-class chosen during progression.
    pub subclass: Option<SubClass>,
    /// Turn on which the combat ended.
    pub turns: u32,
    /// `true` if the turn limit forced the defeat.
    pub timed_out: bool,
}

/// Plays missions: combat, then progression on victory.
pub struct MissionRunner<'a> {
    rules: &'a RulesConfig,
    source: &'a mut dyn ActionSource,
    rolls: &'a mut dyn RollSource,
    chooser: Option<&'a mut dyn SubclassChooser>,
    hooks: Hooks<'a>,
}

impl<'a> MissionRunner<'a> {
    /// Creates a runner with no chooser and no hooks.
    pub fn new(rules: &'a RulesConfig, source: &'a mut dyn ActionSource, rolls: &'a mut dyn RollSource) -> Self {
        Self {
            rules,
            source,
            rolls,
            chooser: None,
            hooks: Hooks::none(),
        }
    }

    /// Sets the sub-class chooser consulted at the unlock level.
    #[must_use]
    pub fn with_chooser(mut self, chooser: &'a mut dyn SubclassChooser) -> Self {
        self.chooser = Some(chooser);
        self
    }

    /// Attaches an observer and/or log sink.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks<'a>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Generates a mission from this runner's roll source.
    pub fn generate_mission(&mut self, name: impl Into<String>, difficulty: Difficulty) -> Mission {
        Mission::generate(name, difficulty, &mut *self.rolls)
    }

    /// Plays `mission` with `character`.
    ///
    /// On victory the reward is applied; on defeat the character's HP is
    /// rolled back and nothing is granted.
    ///
    /// # Errors
    ///
    /// Propagates damage-resolution errors from combat.
    pub fn run(&mut self, mission: &Mission, character: &mut Character) -> Result<MissionReport> {
        let enemy = mission.enemy().clone();
        tracing::info!(
            mission = mission.name(),
            difficulty = %mission.difficulty(),
            enemy = %enemy.kind(),
            character = character.name(),
            "mission started"
        );
        self.hooks.emit(CombatEvent::MissionStarted {
            mission: mission.name().to_string(),
            character: character.name().to_string(),
            enemy: enemy.kind(),
        });

        let outcome = CombatSession::new(character, enemy, self.rules, &mut *self.source, &mut *self.rolls)
            .with_hooks(self.hooks.reborrow())
            .run()?;

        let mut report = MissionReport {
            victory: outcome.victory,
            turns: outcome.turns,
            timed_out: outcome.timed_out,
            ..MissionReport::default()
        };

        if outcome.victory {
            let reward = mission.reward();
            let engine = ProgressionEngine::new(self.rules);
            let mut fallback = NoChoice;
            let chooser: &mut dyn SubclassChooser = match self.chooser.as_deref_mut() {
                Some(chooser) => chooser,
                None => &mut fallback,
            };
            let levels = engine.apply_victory(character, reward, chooser, &mut self.hooks);

            report.xp = reward.xp;
            report.items = reward.items.clone();
            report.leveled_up = levels.leveled_up;
            report.levels_gained = levels.levels_gained;
            report.subclass = levels.subclass;

            tracing::info!(
                mission = mission.name(),
                turns = outcome.turns,
                xp = reward.xp,
                items = reward.items.len(),
                level = character.level(),
                "mission complete"
            );
            let items: Vec<&str> = reward.items.iter().map(Item::name).collect();
            self.hooks.log(&format!("XP gained: {}, items: {}", reward.xp, items.join(", ")));
        } else {
            tracing::info!(
                mission = mission.name(),
                turns = outcome.turns,
                timed_out = outcome.timed_out,
                "mission failed"
            );
        }

        Ok(report)
    }
}

impl std::fmt::Debug for MissionRunner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionRunner")
            .field("rules", &self.rules)
            .field("chooser", &self.chooser.is_some())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
