//! Combat loop state machine.
//!
//! A [`CombatSession`] drives one encounter between a [`Character`] and an
//! [`Enemy`] through the phases below, one transition per
//! [`CombatSession::advance`] call:
//!
//! ```text
//! AwaitingPlayerAction -> ResolvingPlayerAction -> CheckEnemyAlive
//!        ^                                            |        \
//!        |                                            v         Victory
//!  CheckBothAlive <---------------------- ResolvingEnemyAction
//!        |
//!        +--> Victory | Defeat
//! ```
//!
//! # Turn protocol
//!
//! 1. The action source picks an intent; the selector resolves it.
//! 2. The action runs. Attack and ability damage goes through
//!    [`Combatant::receive_damage_with_defense`] so the enemy's defense is
//!    applied exactly once.
//! 3. An enemy at 0 HP ends the fight immediately: no enemy turn.
//! 4. Enemy turn: damage-over-time ticks (which can kill), regeneration,
//!    stun check (a stunned enemy loses its whole action), then its attack
//!    for `max(1, attack - defense)`.
//! 5. A character at 0 HP loses; otherwise the turn counter advances.
//!
//! On defeat the character's HP is rolled back to its value at the start of
//! the fight. Status effects never outlive the session.
//!
//! # Determinism
//!
//! Every random draw comes from the injected [`RollSource`] in the order the
//! operations above run, so a seeded source replays a fight exactly.

use luck::RollSource;

use crate::action::{Action, ActionSelector, ActionSource, CharacterView, Fallback};
use crate::combatant::{mitigate, Character, Combatant, Enemy, EnemyKind, Strike};
use crate::config::RulesConfig;
use crate::error::Result;
use crate::event::{CombatEvent, Hooks};

/// State of a combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombatPhase {
    /// Waiting for the action source.
    AwaitingPlayerAction,
    /// Executing the selected action.
    ResolvingPlayerAction,
    /// Checking whether the player's action killed the enemy.
    CheckEnemyAlive,
    /// Running the enemy's turn.
    ResolvingEnemyAction,
    /// Checking both combatants after the enemy's turn.
    CheckBothAlive,
    /// The enemy was defeated.
    Victory,
    /// The character was defeated or the turn limit ran out.
    Defeat,
}

impl CombatPhase {
    /// `true` for [`CombatPhase::Victory`] and [`CombatPhase::Defeat`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// Summary of a finished combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatOutcome {
    /// `true` if the enemy was defeated.
    pub victory: bool,
    /// Turn on which the combat ended.
    pub turns: u32,
    /// `true` if the turn limit forced a defeat.
    pub timed_out: bool,
    /// The opponent.
    pub enemy: EnemyKind,
    /// Enemy HP when the combat ended.
    pub enemy_hp: i32,
}

/// One encounter between a character and an enemy.
pub struct CombatSession<'a> {
    character: &'a mut Character,
    enemy: Enemy,
    rules: &'a RulesConfig,
    source: &'a mut dyn ActionSource,
    rolls: &'a mut dyn RollSource,
    hooks: Hooks<'a>,
    phase: CombatPhase,
    turn: u32,
    starting_hp: i32,
    timed_out: bool,
    pending: Option<Action>,
}

impl<'a> CombatSession<'a> {
    /// Creates a session in [`CombatPhase::AwaitingPlayerAction`] at turn 1.
    ///
    /// The character's current HP is recorded for rollback on defeat.
    pub fn new(
        character: &'a mut Character,
        enemy: Enemy,
        rules: &'a RulesConfig,
        source: &'a mut dyn ActionSource,
        rolls: &'a mut dyn RollSource,
    ) -> Self {
        let starting_hp = character.hp();
        Self {
            character,
            enemy,
            rules,
            source,
            rolls,
            hooks: Hooks::none(),
            phase: CombatPhase::AwaitingPlayerAction,
            turn: 1,
            starting_hp,
            timed_out: false,
            pending: None,
        }
    }

    /// Attaches an observer and/or log sink.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Hooks<'a>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CombatPhase {
        self.phase
    }

    /// Current turn number, from 1.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// The opponent.
    #[must_use]
    pub const fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    /// The character.
    #[must_use]
    pub fn character(&self) -> &Character {
        &*self.character
    }

    /// HP recorded at the start of the fight.
    #[must_use]
    pub const fn starting_hp(&self) -> i32 {
        self.starting_hp
    }

    /// Outcome, once a terminal phase is reached.
    #[must_use]
    pub fn outcome(&self) -> Option<CombatOutcome> {
        self.phase.is_terminal().then(|| CombatOutcome {
            victory: self.phase == CombatPhase::Victory,
            turns: self.turn,
            timed_out: self.timed_out,
            enemy: self.enemy.kind(),
            enemy_hp: self.enemy.hp(),
        })
    }

    /// Performs one phase transition and returns the new phase.
    ///
    /// Terminal phases are sticky: advancing them changes nothing.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::Error::Crit`] from damage resolution. The session
    /// is left in the phase it was in.
    pub fn advance(&mut self) -> Result<CombatPhase> {
        let next = match self.phase {
            CombatPhase::AwaitingPlayerAction => {
                self.await_player();
                CombatPhase::ResolvingPlayerAction
            }
            CombatPhase::ResolvingPlayerAction => {
                self.resolve_player()?;
                CombatPhase::CheckEnemyAlive
            }
            CombatPhase::CheckEnemyAlive => {
                if self.enemy.is_alive() {
                    CombatPhase::ResolvingEnemyAction
                } else {
                    self.finish_victory()
                }
            }
            CombatPhase::ResolvingEnemyAction => {
                self.resolve_enemy();
                CombatPhase::CheckBothAlive
            }
            CombatPhase::CheckBothAlive => self.check_both(),
            terminal @ (CombatPhase::Victory | CombatPhase::Defeat) => terminal,
        };
        self.phase = next;
        Ok(next)
    }

    /// Advances until a terminal phase and returns the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] if the rules fail
    /// [`RulesConfig::validate`], before anything is drawn. Otherwise
    /// propagates the first error from [`CombatSession::advance`].
    pub fn run(&mut self) -> Result<CombatOutcome> {
        self.rules.validate()?;
        loop {
            if let Some(outcome) = self.outcome() {
                return Ok(outcome);
            }
            self.advance()?;
        }
    }

    fn await_player(&mut self) {
        self.hooks.emit(CombatEvent::TurnStarted { turn: self.turn });
        tracing::debug!(
            turn = self.turn,
            hp = self.character.hp(),
            mana = self.character.mana().current(),
            enemy_hp = self.enemy.hp(),
            "turn started"
        );

        let view = CharacterView::of(self.character, self.rules);
        let intent = self.source.choose(&view);
        let selection = ActionSelector::select(intent, self.character, self.rules);
        if let Some(reason) = selection.fallback {
            tracing::debug!(turn = self.turn, %reason, "action substituted");
            self.hooks.emit(CombatEvent::ActionSubstituted {
                turn: self.turn,
                reason,
            });
        }
        self.pending = Some(selection.action);
    }

    fn resolve_player(&mut self) -> Result<()> {
        let action = self.pending.take().unwrap_or(Action::Attack);
        match action {
            Action::Attack => self.player_attack(),
            Action::Ability => {
                let strike = self.character.ability_special(self.rules, self.rolls)?;
                if strike.fizzled() {
                    self.hooks.emit(CombatEvent::ActionSubstituted {
                        turn: self.turn,
                        reason: Fallback::InsufficientMana,
                    });
                    return self.player_attack();
                }
                self.announce_crit(&strike);
                let damage = self.action_crit(strike.damage)?;
                let applied = self.enemy.receive_damage_with_defense(damage);
                self.hooks.emit(CombatEvent::AbilityCast {
                    turn: self.turn,
                    damage: applied,
                    self_heal: strike.self_heal,
                });
                Ok(())
            }
            Action::UseItem(item) => {
                let event = if self.character.use_item(&item, self.rules) {
                    CombatEvent::ItemUsed { turn: self.turn, item }
                } else {
                    tracing::debug!(turn = self.turn, %item, "item not usable, turn passes");
                    CombatEvent::ItemFailed { turn: self.turn, item }
                };
                self.hooks.emit(event);
                Ok(())
            }
        }
    }

    fn player_attack(&mut self) -> Result<()> {
        let strike = self.character.attack(None, self.rules, self.rolls)?;
        self.announce_crit(&strike);
        let damage = self.action_crit(strike.damage)?;
        let applied = self.enemy.receive_damage_with_defense(damage);
        self.hooks.emit(CombatEvent::PlayerAttacked {
            turn: self.turn,
            damage: applied,
        });

        if self.enemy.is_alive() {
            let landed = self.character.apply_procs(&mut self.enemy, self.rules, self.rolls);
            if !landed.is_empty() {
                self.hooks.emit(CombatEvent::StatusApplied {
                    turn: self.turn,
                    effects: landed,
                });
            }
        }
        Ok(())
    }

    fn announce_crit(&mut self, strike: &Strike) {
        if strike.critical {
            self.hooks.emit(CombatEvent::CriticalHit {
                turn: self.turn,
                base: strike.base,
                damage: strike.damage,
            });
        }
    }

    /// Optional second, action-level critical roll.
    fn action_crit(&mut self, damage: i32) -> Result<i32> {
        let Some(config) = self.rules.action_crit else {
            return Ok(damage);
        };
        let turn = self.turn;
        let hooks = &mut self.hooks;
        let outcome = luck::resolve_observed(damage, &config, &mut *self.rolls, &mut |crit| {
            hooks.emit(CombatEvent::CriticalHit {
                turn,
                base: crit.base,
                damage: crit.damage,
            });
        })?;
        Ok(outcome.damage)
    }

    fn resolve_enemy(&mut self) {
        let turn = self.turn;

        for tick in self.enemy.status_mut().tick_damage(self.rules) {
            let damage = self.enemy.receive_damage(tick.damage);
            self.hooks.emit(CombatEvent::StatusDamage {
                turn,
                effect: tick.effect,
                damage,
            });
            if !self.enemy.is_alive() {
                return;
            }
        }

        if self.enemy.can_regenerate() {
            let amount = self.enemy.regenerate();
            self.hooks.emit(CombatEvent::EnemyRegenerated { turn, amount });
        }

        if self.enemy.status_mut().consume_stun() {
            self.hooks.emit(CombatEvent::EnemyStunned { turn });
            return;
        }

        let damage = mitigate(self.enemy.attack(), self.character.defense());
        let applied = self.character.receive_damage(damage);
        self.hooks.emit(CombatEvent::EnemyAttacked {
            turn,
            damage: applied,
        });
    }

    fn check_both(&mut self) -> CombatPhase {
        if !self.enemy.is_alive() {
            return self.finish_victory();
        }
        if !self.character.is_alive() {
            return self.finish_defeat();
        }
        if self.turn >= self.rules.max_turns {
            tracing::warn!(turns = self.turn, "turn limit reached, scoring as defeat");
            self.timed_out = true;
            return self.finish_defeat();
        }
        self.turn += 1;
        CombatPhase::AwaitingPlayerAction
    }

    fn finish_victory(&mut self) -> CombatPhase {
        self.clear_statuses();
        tracing::debug!(turns = self.turn, enemy = %self.enemy.kind(), "victory");
        self.hooks.emit(CombatEvent::Victory { turns: self.turn });
        CombatPhase::Victory
    }

    fn finish_defeat(&mut self) -> CombatPhase {
        self.clear_statuses();
        self.character.set_hp(self.starting_hp);
        tracing::debug!(turns = self.turn, hp_restored = self.starting_hp, "defeat");
        self.hooks.emit(CombatEvent::Defeat {
            turns: self.turn,
            hp_restored: self.starting_hp,
        });
        CombatPhase::Defeat
    }

    fn clear_statuses(&mut self) {
        self.character.status_mut().clear();
        self.enemy.status_mut().clear();
    }
}

impl std::fmt::Debug for CombatSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatSession")
            .field("character", &self.character.name())
            .field("enemy", &self.enemy.kind())
            .field("phase", &self.phase)
            .field("turn", &self.turn)
            .field("starting_hp", &self.starting_hp)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
