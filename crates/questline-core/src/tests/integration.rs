//! Full turn-protocol scenarios.
//!
//! Draws are scripted and damage variance is flattened, so every number
//! below follows directly from the stat tables.

use luck::{CritConfig, CritMode, ScriptedRolls};
use proptest::prelude::*;

use crate::action::{Fallback, Intent, ScriptedActions};
use crate::combatant::{Character, CharacterClass, Combatant, Difficulty, Enemy, EnemyKind, StatusFlags, SubClass};
use crate::event::{CombatEvent, EventLog, Hooks};
use crate::item::Item;
use crate::mission::{Mission, MissionRunner};
use crate::session::{CombatPhase, CombatSession};

use super::helpers::{count, fight, flat_rules, hero_with_damage, veteran};

/// Advances `session` `steps` times.
fn step(session: &mut CombatSession<'_>, steps: usize) -> CombatPhase {
    let mut phase = session.phase();
    for _ in 0..steps {
        phase = session.advance().expect("advance");
    }
    phase
}

// =============================================================================
// Termination
// =============================================================================

#[test]
fn exact_kill_skips_enemy_turn() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 52);
    let mut rolls = ScriptedRolls::constant(0.9);

    let (outcome, events) = fight(
        &mut hero,
        Enemy::new(EnemyKind::Goblin),
        &rules,
        &mut ScriptedActions::always(Intent::Attack),
        &mut rolls,
    );

    assert!(outcome.victory);
    assert_eq!(outcome.turns, 1);
    assert_eq!(outcome.enemy_hp, 0);
    assert_eq!(hero.hp(), 100);
    assert_eq!(
        events,
        vec![
            CombatEvent::TurnStarted { turn: 1 },
            CombatEvent::PlayerAttacked { turn: 1, damage: 50 },
            CombatEvent::Victory { turns: 1 },
        ]
    );
    // Variance and crit only: no enemy draws, no second crit roll.
    assert_eq!(rolls.draws_taken(), 2);
}

#[test]
fn defeat_rolls_hp_back_and_grants_nothing() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 0)
        .with_health(80, 100)
        .with_items([Item::Crystal]);
    let mission = Mission::new("Ambush", Difficulty::Medium, EnemyKind::Orc, vec![Item::Elixir]);
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    let report = MissionRunner::new(&rules, &mut source, &mut rolls)
        .with_hooks(Hooks::none().with_observer(&mut log))
        .run(&mission, &mut hero)
        .unwrap();

    // Orc hits for 9: 80 HP lasts 9 turns.
    assert!(!report.victory);
    assert_eq!(report.turns, 9);
    assert_eq!(report.xp, 0);
    assert!(report.items.is_empty());
    assert_eq!(hero.hp(), 80);
    assert_eq!(hero.xp(), 0);
    assert_eq!(hero.inventory(), &[Item::Crystal]);
    assert!(log.events().contains(&CombatEvent::Defeat {
        turns: 9,
        hp_restored: 80
    }));
}

#[test]
fn status_effects_do_not_outlive_combat() {
    let rules = flat_rules();
    let mut hero = veteran(CharacterClass::Mage);
    hero.choose_subclass(SubClass::Pyromancer, &rules).unwrap();
    hero.modifiers.burn_chance = 1.0;
    let mut rolls = ScriptedRolls::constant(0.5);
    let mut source = ScriptedActions::always(Intent::Attack);

    let mut session = CombatSession::new(
        &mut hero,
        Enemy::new(EnemyKind::Wolf),
        &rules,
        &mut source,
        &mut rolls,
    );
    step(&mut session, 2);
    assert_eq!(session.enemy().status().flags(), StatusFlags::BURNING);
    session.run().unwrap();
    assert!(session.enemy().status().flags().is_empty());
    assert!(session.character().status().flags().is_empty());
}

// =============================================================================
// Action selection in the loop
// =============================================================================

#[test]
fn short_mana_ability_becomes_attack() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Mage, 10).with_mana(10, 50);
    let mut source = ScriptedActions::always(Intent::Ability);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    {
        let mut session = CombatSession::new(
            &mut hero,
            Enemy::new(EnemyKind::Goblin),
            &rules,
            &mut source,
            &mut rolls,
        )
        .with_hooks(Hooks::none().with_observer(&mut log));
        assert_eq!(step(&mut session, 2), CombatPhase::CheckEnemyAlive);
        assert_eq!(session.enemy().hp(), 42);
    }

    assert_eq!(hero.mana().current(), 10);
    assert!(log.events().contains(&CombatEvent::ActionSubstituted {
        turn: 1,
        reason: Fallback::InsufficientMana
    }));
    assert!(log.events().contains(&CombatEvent::PlayerAttacked { turn: 1, damage: 8 }));
}

#[test]
fn ability_spends_mana_and_hits_harder() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Mage, 10);
    let mut source = ScriptedActions::always(Intent::Ability);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut session = CombatSession::new(
        &mut hero,
        Enemy::new(EnemyKind::Goblin),
        &rules,
        &mut source,
        &mut rolls,
    );
    step(&mut session, 2);
    assert_eq!(session.enemy().hp(), 42);
    assert_eq!(session.character().mana().current(), 30);
}

#[test]
fn potion_turn_heals_without_draws() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 10)
        .with_health(50, 100)
        .with_items([Item::HealingPotion]);
    let mut source = ScriptedActions::always(Intent::UseItem(Item::HealingPotion));
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut session = CombatSession::new(
        &mut hero,
        Enemy::new(EnemyKind::Goblin),
        &rules,
        &mut source,
        &mut rolls,
    );
    step(&mut session, 2);
    assert_eq!(session.character().hp(), 80);
    assert!(session.character().inventory().is_empty());
    assert_eq!(session.enemy().hp(), 50);
    drop(session);
    assert_eq!(rolls.draws_taken(), 0);
}

#[test]
fn absent_item_passes_the_turn() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 10)
        .with_health(50, 100)
        .with_items([Item::Crystal]);
    let mut source = ScriptedActions::always(Intent::UseItem(Item::HealingPotion));
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    {
        let mut session = CombatSession::new(
            &mut hero,
            Enemy::new(EnemyKind::Goblin),
            &rules,
            &mut source,
            &mut rolls,
        )
        .with_hooks(Hooks::none().with_observer(&mut log));
        step(&mut session, 2);
        assert_eq!(session.enemy().hp(), 50);
    }

    assert_eq!(hero.hp(), 50);
    assert_eq!(hero.inventory(), &[Item::Crystal]);
    assert!(log.events().contains(&CombatEvent::ItemFailed {
        turn: 1,
        item: Item::HealingPotion
    }));
}

// =============================================================================
// Enemy turn
// =============================================================================

#[test]
fn stun_skips_the_whole_enemy_action() {
    let rules = flat_rules();
    let mut hero = veteran(CharacterClass::Archer);
    hero.choose_subclass(SubClass::Hunter, &rules).unwrap();
    hero.modifiers.stun_chance = 1.0;
    hero.modifiers.bleed_chance = 0.0;
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.5);
    let mut log = EventLog::new();

    {
        let mut session = CombatSession::new(
            &mut hero,
            Enemy::new(EnemyKind::Orc),
            &rules,
            &mut source,
            &mut rolls,
        )
        .with_hooks(Hooks::none().with_observer(&mut log));
        assert_eq!(step(&mut session, 5), CombatPhase::AwaitingPlayerAction);
        assert_eq!(session.turn(), 2);
        assert_eq!(session.enemy().hp(), 85);
    }

    assert_eq!(hero.hp(), 100);
    let events = log.events();
    assert!(events.contains(&CombatEvent::StatusApplied {
        turn: 1,
        effects: StatusFlags::STUNNED
    }));
    assert!(events.contains(&CombatEvent::EnemyStunned { turn: 1 }));
    assert_eq!(count(events, |e| matches!(e, CombatEvent::EnemyAttacked { .. })), 0);
}

#[test]
fn bleed_tick_can_finish_the_enemy() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 0);
    let mut goblin = Enemy::new(EnemyKind::Goblin);
    goblin.receive_damage(46);
    goblin.status_mut().apply(StatusFlags::BLEEDING, 2);

    let (outcome, events) = fight(
        &mut hero,
        goblin,
        &rules,
        &mut ScriptedActions::always(Intent::Attack),
        &mut ScriptedRolls::constant(0.5),
    );

    assert!(outcome.victory);
    assert_eq!(outcome.turns, 1);
    assert_eq!(hero.hp(), 100);
    assert!(events.contains(&CombatEvent::StatusDamage {
        turn: 1,
        effect: StatusFlags::BLEEDING,
        damage: 3
    }));
    assert_eq!(count(&events, |e| matches!(e, CombatEvent::EnemyAttacked { .. })), 0);
}

#[test]
fn boss_regenerates_before_attacking() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 0);
    let mut boss = Enemy::new(EnemyKind::Boss);
    boss.receive_damage(50);
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    {
        let mut session = CombatSession::new(&mut hero, boss, &rules, &mut source, &mut rolls)
            .with_hooks(Hooks::none().with_observer(&mut log));
        assert_eq!(step(&mut session, 4), CombatPhase::CheckBothAlive);
        // 110 - 1 + 8
        assert_eq!(session.enemy().hp(), 117);
    }

    // 18 - 5
    assert_eq!(hero.hp(), 87);
    let events = log.events();
    let regen = events
        .iter()
        .position(|e| *e == CombatEvent::EnemyRegenerated { turn: 1, amount: 8 })
        .expect("regeneration event");
    let attack = events
        .iter()
        .position(|e| matches!(e, CombatEvent::EnemyAttacked { turn: 1, damage: 13 }))
        .expect("attack event");
    assert!(regen < attack);
}

// =============================================================================
// Critical layers
// =============================================================================

#[test]
fn action_level_crit_is_opt_in() {
    let mut rules = flat_rules();
    rules.action_crit = Some(CritConfig::new(1.0, 2.0, CritMode::Multiply));
    let mut hero = hero_with_damage(CharacterClass::Warrior, 20);
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    {
        let mut session = CombatSession::new(
            &mut hero,
            Enemy::new(EnemyKind::Boss),
            &rules,
            &mut source,
            &mut rolls,
        )
        .with_hooks(Hooks::none().with_observer(&mut log));
        step(&mut session, 2);
        // 20 doubled, minus defense 8
        assert_eq!(session.enemy().hp(), 128);
    }

    assert_eq!(rolls.draws_taken(), 3);
    assert!(log.events().contains(&CombatEvent::CriticalHit {
        turn: 1,
        base: 20,
        damage: 40
    }));
}

#[test]
fn combatant_crit_is_reported() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 20);
    // variance, crit (0.01 < 0.05)
    let mut rolls = ScriptedRolls::new(vec![0.5, 0.01]);
    let mut log = EventLog::new();
    {
        let mut source = ScriptedActions::always(Intent::Attack);
        let mut session = CombatSession::new(
            &mut hero,
            Enemy::new(EnemyKind::Boss),
            &rules,
            &mut source,
            &mut rolls,
        )
        .with_hooks(Hooks::none().with_observer(&mut log));
        step(&mut session, 2);
        // floor(20 * 1.8) - 8
        assert_eq!(session.enemy().hp(), 132);
    }
    assert!(log.events().contains(&CombatEvent::CriticalHit {
        turn: 1,
        base: 20,
        damage: 36
    }));
}

// =============================================================================
// Missions and progression
// =============================================================================

#[test]
fn victory_grants_xp_and_loot() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Archer, 52).with_items([Item::ManaPotion]);
    let mission = Mission::new("Cave", Difficulty::Easy, EnemyKind::Goblin, vec![Item::HealingPotion, Item::Crystal]);
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut sink = crate::event::MemorySink::default();

    let report = mission
        .run(&mut hero, &rules, &mut source, &mut rolls, Hooks::none().with_sink(&mut sink))
        .unwrap();

    assert!(report.victory);
    assert_eq!(report.xp, 50);
    assert_eq!(report.items, vec![Item::HealingPotion, Item::Crystal]);
    assert!(!report.leveled_up);
    assert_eq!(hero.xp(), 50);
    assert_eq!(hero.inventory(), &[Item::ManaPotion, Item::HealingPotion, Item::Crystal]);
    let lines = sink.lines();
    assert_eq!(lines.first().map(String::as_str), Some("Ayla started mission Cave against Goblin"));
    assert_eq!(lines.get(1).map(String::as_str), Some("Turn 1 begins"));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("XP gained: 50, items: healing potion, crystal")
    );
}

#[test]
fn reaching_level_four_offers_a_subclass_once() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 52);
    hero.level = 3;
    hero.xp = 200;
    hero.xp_to_next = 225;
    let mission = Mission::new("Hill", Difficulty::Easy, EnemyKind::Goblin, vec![]);
    let mut offers = Vec::new();
    let mut chooser = |_: &Character, options: [SubClass; 2]| {
        offers.push(options);
        Some(SubClass::Berserker)
    };
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);
    let mut log = EventLog::new();

    let report = MissionRunner::new(&rules, &mut source, &mut rolls)
        .with_chooser(&mut chooser)
        .with_hooks(Hooks::none().with_observer(&mut log))
        .run(&mission, &mut hero)
        .unwrap();

    assert!(report.leveled_up);
    assert_eq!(report.subclass, Some(SubClass::Berserker));
    assert_eq!(offers, vec![[SubClass::Berserker, SubClass::Paladin]]);
    assert_eq!(hero.level(), 4);
    assert_eq!(hero.xp(), 25);
    // 52 + 2 per level + 10 from Berserker
    assert_eq!(hero.base_damage, 64);
    assert_eq!(hero.max_hp(), 100);
    assert_eq!(hero.hp(), 100);
    assert!(log.events().contains(&CombatEvent::LeveledUp { level: 4 }));
    assert!(log.events().contains(&CombatEvent::SubclassChosen {
        subclass: SubClass::Berserker
    }));
}

#[test]
fn foreign_subclass_pick_still_pays_loot() {
    let rules = flat_rules();
    let mut hero = hero_with_damage(CharacterClass::Warrior, 52);
    hero.level = 3;
    hero.xp = 200;
    hero.xp_to_next = 225;
    let mission = Mission::new("Hill", Difficulty::Easy, EnemyKind::Goblin, vec![Item::HealingPotion]);
    let mut chooser = |_: &Character, _: [SubClass; 2]| Some(SubClass::Cleric);
    let mut source = ScriptedActions::always(Intent::Attack);
    let mut rolls = ScriptedRolls::constant(0.9);

    let report = MissionRunner::new(&rules, &mut source, &mut rolls)
        .with_chooser(&mut chooser)
        .run(&mission, &mut hero)
        .unwrap();

    assert!(report.victory);
    assert_eq!(report.subclass, None);
    assert_eq!(hero.level(), 4);
    assert_eq!(hero.xp(), 25);
    assert_eq!(hero.subclass(), None);
    assert_eq!(hero.inventory(), &[Item::HealingPotion]);
}

// =============================================================================
// Properties
// =============================================================================

fn inert_item() -> impl Strategy<Value = Item> {
    prop_oneof![
        Just(Item::Elixir),
        Just(Item::Crystal),
        "[a-z]{3,8}".prop_map(|name| Item::Other(format!("old {name}"))),
    ]
}

proptest! {
    #[test]
    fn absent_item_never_mutates(
        hp in 0i32..=100,
        mana in 0i32..=50,
        inventory in proptest::collection::vec(inert_item(), 0..5),
        wanted in prop_oneof![Just(Item::HealingPotion), Just(Item::ManaPotion)],
    ) {
        let rules = flat_rules();
        let mut hero = Character::new("Ayla", CharacterClass::Mage)
            .with_health(hp, 100)
            .with_mana(mana, 50)
            .with_items(inventory);
        let before = hero.clone();
        prop_assert!(!hero.use_item(&wanted, &rules));
        prop_assert_eq!(hero, before);
    }

    #[test]
    fn damage_never_breaks_hp_bounds(base in 0i32..400, draws in proptest::collection::vec(0.0f64..1.0, 1..8)) {
        let rules = flat_rules();
        let mut hero = hero_with_damage(CharacterClass::Warrior, base);
        let mut rolls = ScriptedRolls::new(draws);
        let mut source = ScriptedActions::always(Intent::Attack);
        let mut session = CombatSession::new(&mut hero, Enemy::new(EnemyKind::Boss), &rules, &mut source, &mut rolls);
        for _ in 0..40 {
            let phase = session.advance().unwrap();
            let enemy = session.enemy();
            prop_assert!((0..=enemy.max_hp()).contains(&enemy.hp()));
            let character = session.character();
            prop_assert!((0..=character.max_hp()).contains(&character.hp()));
            if phase.is_terminal() {
                break;
            }
        }
    }
}
