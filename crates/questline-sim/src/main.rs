//! Headless Questline mission runner.
//!
//! Plays a run of generated missions with the built-in [`AutoPilot`] policy
//! and prints the resulting character record as JSON on stdout. Progress is
//! logged through `tracing`; set `RUST_LOG=questline_core=debug` for turn detail.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use luck::SeededRolls;
use questline_core::event::TracingSink;
use questline_core::{
    AutoPilot, Character, CharacterClass, CharacterRecord, Combatant, Difficulty, Hooks, MissionRunner, RulesConfig,
    SubClass,
};

/// Run seeded Questline missions without a front-end
#[derive(Parser)]
#[command(name = "questline-sim")]
#[command(about = "Headless mission runner for Questline", long_about = None)]
#[command(version)]
struct Cli {
    /// Seed for the roll source (random when omitted; the seed is logged)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Mission difficulty: easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    difficulty: String,

    /// Class for a new character: warrior, archer or mage
    #[arg(short, long, default_value = "warrior")]
    class: String,

    /// Name for a new character
    #[arg(short, long, default_value = "Adventurer")]
    name: String,

    /// Number of missions to play
    #[arg(short, long, default_value_t = 1)]
    missions: u32,

    /// Rules override as a JSON file (missing keys keep their defaults)
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Load the character from this record instead of creating one
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Write the final character record to this file
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Stop at the first defeat
    #[arg(long)]
    stop_on_defeat: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let rules = match &cli.rules {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading rules {}", path.display()))?;
            RulesConfig::from_json(&json).with_context(|| format!("parsing rules {}", path.display()))?
        }
        None => RulesConfig::default(),
    };

    let difficulty = Difficulty::parse_lenient(&cli.difficulty);
    let mut hero = load_character(&cli)?;

    let mut rolls = match cli.seed {
        Some(seed) => SeededRolls::new(seed),
        None => SeededRolls::from_entropy(),
    };
    tracing::info!(seed = rolls.seed(), %difficulty, character = hero.name(), "starting run");

    let mut pilot = AutoPilot::default();
    let mut chooser = first_option;
    let mut sink = TracingSink;

    let mut victories = 0u32;
    let mut played = 0u32;
    for index in 1..=cli.missions {
        let mut runner = MissionRunner::new(&rules, &mut pilot, &mut rolls)
            .with_chooser(&mut chooser)
            .with_hooks(Hooks::none().with_sink(&mut sink));
        let mission = runner.generate_mission(format!("Mission {index}"), difficulty);
        let report = runner.run(&mission, &mut hero)?;

        played += 1;
        if report.victory {
            victories += 1;
        } else if cli.stop_on_defeat {
            tracing::warn!(mission = mission.name(), "defeated, stopping");
            break;
        }
    }

    tracing::info!(
        played,
        victories,
        level = hero.level(),
        xp = hero.xp(),
        items = hero.inventory().len(),
        "run finished"
    );

    let record = CharacterRecord::from(&hero);
    let json = record.to_json()?;
    if let Some(path) = &cli.save {
        fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
    }
    println!("{json}");

    Ok(())
}

/// Takes the first offered sub-class.
fn first_option(_: &Character, options: [SubClass; 2]) -> Option<SubClass> {
    Some(options[0])
}

fn load_character(cli: &Cli) -> Result<Character> {
    match &cli.load {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let record = CharacterRecord::from_json(&json)?;
            Ok(record.into_character()?)
        }
        None => {
            let class: CharacterClass = cli.class.parse()?;
            Ok(Character::new(cli.name.clone(), class))
        }
    }
}
