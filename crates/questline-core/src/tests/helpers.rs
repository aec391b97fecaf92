//! Test fixtures and runners.

use luck::{RollSource, SeededRolls};

use crate::action::{ActionSource, AutoPilot};
use crate::combatant::{Character, CharacterClass, Difficulty, Enemy, SubClass};
use crate::config::{RulesConfig, Spread};
use crate::event::{CombatEvent, EventLog, Hooks};
use crate::mission::{MissionReport, MissionRunner};
use crate::persist::CharacterRecord;
use crate::session::{CombatOutcome, CombatSession};

// =============================================================================
// Fixtures
// =============================================================================

/// Rules with no damage variance, so damage equals base damage exactly.
pub fn flat_rules() -> RulesConfig {
    RulesConfig {
        attack_spread: Spread::new(1.0, 1.0),
        ability_spread: Spread::new(1.0, 1.0),
        ..RulesConfig::default()
    }
}

/// A level 1 character hitting for exactly `base_damage` under [`flat_rules`].
pub fn hero_with_damage(class: CharacterClass, base_damage: i32) -> Character {
    let mut hero = Character::new("Ayla", class);
    hero.base_damage = base_damage;
    hero
}

/// A character at the sub-class unlock level.
pub fn veteran(class: CharacterClass) -> Character {
    let mut hero = Character::new("Ayla", class);
    hero.level = 4;
    hero.xp_to_next = 337;
    hero
}

// =============================================================================
// Runners
// =============================================================================

/// Runs one combat to completion and returns its outcome and events.
pub fn fight(
    character: &mut Character,
    enemy: Enemy,
    rules: &RulesConfig,
    source: &mut dyn ActionSource,
    rolls: &mut dyn RollSource,
) -> (CombatOutcome, Vec<CombatEvent>) {
    let mut log = EventLog::new();
    let outcome = CombatSession::new(character, enemy, rules, source, rolls)
        .with_hooks(Hooks::none().with_observer(&mut log))
        .run()
        .expect("combat should resolve");
    (outcome, log.take_events())
}

/// Plays `missions` seeded missions with the auto-pilot, always taking the
/// first sub-class offered.
pub fn play_campaign(
    seed: u64,
    class: CharacterClass,
    difficulty: Difficulty,
    missions: usize,
) -> (CharacterRecord, Vec<MissionReport>, Vec<CombatEvent>) {
    let rules = RulesConfig::default();
    let mut rolls = SeededRolls::new(seed);
    let mut pilot = AutoPilot::default();
    let mut chooser = |_: &Character, options: [SubClass; 2]| Some(options[0]);
    let mut log = EventLog::new();
    let mut hero = Character::new("Ayla", class);
    let mut reports = Vec::with_capacity(missions);

    {
        let mut runner = MissionRunner::new(&rules, &mut pilot, &mut rolls)
            .with_chooser(&mut chooser)
            .with_hooks(Hooks::none().with_observer(&mut log));
        for index in 0..missions {
            let mission = runner.generate_mission(format!("Mission {index}"), difficulty);
            reports.push(runner.run(&mission, &mut hero).expect("mission should resolve"));
        }
    }

    (CharacterRecord::from(&hero), reports, log.take_events())
}

/// Counts events matching `predicate`.
pub fn count(events: &[CombatEvent], predicate: impl Fn(&CombatEvent) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}
