//! Combat notifications.
//!
//! The engine reports what happened through two optional collaborators:
//!
//! - [`CombatObserver`]: structured [`CombatEvent`]s, for presentation
//!   (critical-hit flashes, sounds, replays)
//! - [`LogSink`]: plain text lines at turn and mission boundaries
//!
//! Neither influences combat results. [`Hooks`] bundles both; with no
//! collaborator attached every notification is a no-op.

use std::fmt;

use crate::action::Fallback;
use crate::combatant::{EnemyKind, StatusFlags, SubClass};
use crate::item::Item;

/// Something that happened during a mission.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// A mission began.
    MissionStarted {
        /// Mission name.
        mission: String,
        /// Character name.
        character: String,
        /// Opponent.
        enemy: EnemyKind,
    },
    /// A new turn began.
    TurnStarted {
        /// Turn number, from 1.
        turn: u32,
    },
    /// The requested action was replaced by a basic attack.
    ActionSubstituted {
        /// Turn number.
        turn: u32,
        /// Reason.
        reason: Fallback,
    },
    /// The character's basic attack landed.
    PlayerAttacked {
        /// Turn number.
        turn: u32,
        /// HP the enemy lost.
        damage: i32,
    },
    /// The character's special ability landed.
    AbilityCast {
        /// Turn number.
        turn: u32,
        /// HP the enemy lost.
        damage: i32,
        /// HP the caster recovered.
        self_heal: i32,
    },
    /// A critical check fired. Cosmetic.
    CriticalHit {
        /// Turn number.
        turn: u32,
        /// Damage before amplification.
        base: i32,
        /// Damage after amplification.
        damage: i32,
    },
    /// An item was consumed.
    ItemUsed {
        /// Turn number.
        turn: u32,
        /// Item consumed.
        item: Item,
    },
    /// An item could not be used; the turn passed.
    ItemFailed {
        /// Turn number.
        turn: u32,
        /// Item requested.
        item: Item,
    },
    /// Procs landed on the enemy.
    StatusApplied {
        /// Turn number.
        turn: u32,
        /// Effects applied.
        effects: StatusFlags,
    },
    /// A damage-over-time effect ticked on the enemy.
    StatusDamage {
        /// Turn number.
        turn: u32,
        /// Effect that ticked.
        effect: StatusFlags,
        /// HP lost.
        damage: i32,
    },
    /// The enemy was stunned and lost its action.
    EnemyStunned {
        /// Turn number.
        turn: u32,
    },
    /// The enemy regenerated.
    EnemyRegenerated {
        /// Turn number.
        turn: u32,
        /// HP restored.
        amount: i32,
    },
    /// The enemy hit the character.
    EnemyAttacked {
        /// Turn number.
        turn: u32,
        /// HP the character lost.
        damage: i32,
    },
    /// The enemy was defeated.
    Victory {
        /// Turns taken.
        turns: u32,
    },
    /// The character was defeated (or the turn limit was reached).
    Defeat {
        /// Turns taken.
        turns: u32,
        /// HP the character was restored to.
        hp_restored: i32,
    },
    /// The character gained a level.
    LeveledUp {
        /// New level.
        level: u32,
    },
    /// A sub-class was chosen.
    SubclassChosen {
        /// The sub-class.
        subclass: SubClass,
    },
}

impl CombatEvent {
    /// `true` for purely cosmetic events that are not written to the log sink.
    ///
    /// A critical hit is already folded into the damage line of its turn.
    #[must_use]
    pub const fn is_cosmetic(&self) -> bool {
        matches!(self, Self::CriticalHit { .. })
    }
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissionStarted {
                mission,
                character,
                enemy,
            } => write!(f, "{character} started mission {mission} against {enemy}"),
            Self::TurnStarted { turn } => write!(f, "Turn {turn} begins"),
            Self::ActionSubstituted { turn, reason } => {
                write!(f, "Turn {turn}: {reason}, attacking instead")
            }
            Self::PlayerAttacked { turn, damage } => write!(f, "Turn {turn}: dealt {damage} damage"),
            Self::AbilityCast {
                turn,
                damage,
                self_heal,
            } => {
                write!(f, "Turn {turn}: special ability dealt {damage} damage")?;
                if *self_heal > 0 {
                    write!(f, " and healed {self_heal}")?;
                }
                Ok(())
            }
            Self::CriticalHit { turn, base, damage } => {
                write!(f, "Turn {turn}: critical hit ({base} -> {damage})")
            }
            Self::ItemUsed { turn, item } => write!(f, "Turn {turn}: used {item}"),
            Self::ItemFailed { turn, item } => write!(f, "Turn {turn}: could not use {item}"),
            Self::StatusApplied { turn, effects } => write!(f, "Turn {turn}: applied {effects:?}"),
            Self::StatusDamage { turn, effect, damage } => {
                write!(f, "Turn {turn}: {effect:?} dealt {damage} damage")
            }
            Self::EnemyStunned { turn } => write!(f, "Turn {turn}: enemy is stunned"),
            Self::EnemyRegenerated { turn, amount } => {
                write!(f, "Turn {turn}: enemy regenerated {amount} HP")
            }
            Self::EnemyAttacked { turn, damage } => write!(f, "Turn {turn}: enemy dealt {damage} damage"),
            Self::Victory { turns } => write!(f, "Victory after {turns} turns"),
            Self::Defeat { turns, hp_restored } => {
                write!(f, "Defeat after {turns} turns, HP restored to {hp_restored}")
            }
            Self::LeveledUp { level } => write!(f, "Reached level {level}"),
            Self::SubclassChosen { subclass } => write!(f, "Became a {subclass}"),
        }
    }
}

/// Receives structured combat events.
pub trait CombatObserver {
    /// Called once per event, in order.
    fn on_event(&mut self, event: &CombatEvent);
}

impl<F> CombatObserver for F
where
    F: FnMut(&CombatEvent),
{
    fn on_event(&mut self, event: &CombatEvent) {
        self(event);
    }
}

/// Observer that records every event.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Drains and returns all recorded events.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl CombatObserver for EventLog {
    fn on_event(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
    }
}

/// Receives plain text log lines.
pub trait LogSink {
    /// Records one line.
    fn log(&mut self, line: &str);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _line: &str) {}
}

/// Forwards lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, line: &str) {
        tracing::info!(target: "questline::log", "{line}");
    }
}

/// Keeps lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Recorded lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl LogSink for MemorySink {
    fn log(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// Optional observer and log sink attached to a combat.
#[derive(Default)]
pub struct Hooks<'a> {
    observer: Option<&'a mut dyn CombatObserver>,
    sink: Option<&'a mut dyn LogSink>,
}

impl<'a> Hooks<'a> {
    /// No collaborators.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Attaches an observer.
    #[must_use]
    pub fn with_observer(mut self, observer: &'a mut dyn CombatObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attaches a log sink.
    #[must_use]
    pub fn with_sink(mut self, sink: &'a mut dyn LogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Borrows the same collaborators for a shorter lifetime.
    pub fn reborrow(&mut self) -> Hooks<'_> {
        Hooks {
            observer: self
                .observer
                .as_mut()
                .map(|observer| &mut **observer as &mut dyn CombatObserver),
            sink: self.sink.as_mut().map(|sink| &mut **sink as &mut dyn LogSink),
        }
    }

    /// Notifies the observer and, for non-cosmetic events, the log sink.
    pub fn emit(&mut self, event: CombatEvent) {
        if let Some(sink) = self.sink.as_deref_mut() {
            if !event.is_cosmetic() {
                sink.log(&event.to_string());
            }
        }
        if let Some(observer) = self.observer.as_deref_mut() {
            observer.on_event(&event);
        }
    }

    /// Writes a free-form line to the log sink.
    pub fn log(&mut self, line: &str) {
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.log(line);
        }
    }
}

impl fmt::Debug for Hooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("observer", &self.observer.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
