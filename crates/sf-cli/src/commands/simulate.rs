use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use glam::Vec2;
use sf_core::Side;
use sf_simulation::{ImageMapSource, SimEventKind, Simulation};

/// Arguments of `sf simulate`.
pub struct Options {
    pub manifest: PathBuf,
    pub level: usize,
    pub ticks: u64,
    pub dt: f32,
    pub seed: u64,
    pub auto_place: bool,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

pub fn run(options: &Options) -> Result<(), String> {
    let manifest = super::load_manifest(&options.manifest)?;
    let config = super::load_config(options.config.as_deref())?
        .with_seed(options.seed)
        .with_max_events(0);

    let mut sim = Simulation::new(config, manifest.levels, ImageMapSource)
        .map_err(|e| format!("cannot start simulation: {e}"))?;
    if options.level != 0 {
        sim.load_level(options.level).map_err(|e| e.to_string())?;
    }

    let mut spots = placement_spots(&sim);
    let mut cursor = 0;
    for _ in 0..options.ticks {
        if options.auto_place && sim.world().inventory() > 0 && !spots.is_empty() {
            sim.place_attacker(spots[cursor % spots.len()]);
            cursor += 1;
        }
        let was_transitioning = sim.transition().is_some();
        sim.tick(options.dt)
            .map_err(|e| format!("simulation error: {e}"))?;
        if was_transitioning && sim.transition().is_none() {
            spots = placement_spots(&sim);
            cursor = 0;
        }
    }

    // Header
    let level = sim.level();
    println!(
        "  {} level {}/{} '{}' {}",
        "Simulation".bold(),
        sim.current_level() + 1,
        sim.levels().len(),
        level.description,
        format!(
            "({} ticks, dt={}, seed={})",
            options.ticks, options.dt, options.seed
        )
        .dimmed()
    );
    println!(
        "  {:.1}s simulated, {} events logged",
        sim.world().clock().elapsed(),
        sim.events().len()
    );
    println!();

    if options.verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in sim.events().events() {
            let tick_label = format!("[tick {:>5}]", event.tick).dimmed();
            let desc = colorize_event(&event.kind, &event.description);
            println!("  {tick_label} {desc}");
        }
        if sim.events().is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    }

    println!("  {}", "Summary".bold().underline());
    println!();
    println!("{}", summary_table(&sim));
    println!();

    println!("  {}", "Towers".bold().underline());
    println!();
    if sim.world().towers().is_empty() {
        println!("  {}", "(all towers down)".green());
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Tower", "Archetype", "Health", "Position"]);
        for (id, tower) in sim.world().towers().iter() {
            let health = if tower.health <= 3 {
                tower.health.to_string().red().to_string()
            } else {
                tower.health.to_string()
            };
            table.add_row(vec![
                id.to_string(),
                tower.archetype.to_string(),
                health,
                format!("({:.0}, {:.0})", tower.body.position.x, tower.body.position.y),
            ]);
        }
        println!("{table}");
    }
    println!();

    Ok(())
}

fn placement_spots(sim: &Simulation) -> Vec<Vec2> {
    sim.world().tiles().placeable_centers()
}

fn summary_table(sim: &Simulation) -> Table {
    let events = sim.events();
    let world = sim.world();
    let killed = |side: Side| {
        events.count(|k| matches!(k, SimEventKind::MinionKilled { side: s, .. } if *s == side))
    };
    let spawned = |side: Side| {
        events.count(|k| matches!(k, SimEventKind::MinionSpawned { side: s, .. } if *s == side))
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);
    let rows: Vec<(&str, String)> = vec![
        ("Attackers spawned", spawned(Side::Attacker).to_string()),
        ("Attackers lost", killed(Side::Attacker).to_string()),
        ("Defenders spawned", spawned(Side::Defender).to_string()),
        ("Defenders lost", killed(Side::Defender).to_string()),
        (
            "Projectiles launched",
            events.count(|k| matches!(k, SimEventKind::ProjectileLaunched { .. })).to_string(),
        ),
        (
            "Detonations",
            events.count(|k| matches!(k, SimEventKind::Detonation { .. })).to_string(),
        ),
        (
            "Towers destroyed",
            events.count(|k| matches!(k, SimEventKind::TowerDestroyed { .. })).to_string(),
        ),
        (
            "Levels loaded",
            events.count(|k| matches!(k, SimEventKind::LevelLoaded { .. })).to_string(),
        ),
        (
            "Spawns skipped",
            events.count(|k| matches!(k, SimEventKind::SpawnSkipped { .. })).to_string(),
        ),
        ("Attackers alive", world.minion_count(Side::Attacker).to_string()),
        ("Defenders alive", world.defender_count().to_string()),
        ("Inventory", world.inventory().to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn colorize_event(kind: &SimEventKind, description: &str) -> colored::ColoredString {
    match kind {
        SimEventKind::TowerDestroyed { .. } => description.green().bold(),
        SimEventKind::TowerDamaged { .. } => description.green(),
        SimEventKind::MinionKilled {
            side: Side::Attacker,
            ..
        } => description.red(),
        SimEventKind::MinionKilled { .. } => description.yellow(),
        SimEventKind::Detonation { .. } | SimEventKind::TrapTriggered { .. } => {
            description.magenta()
        }
        SimEventKind::LevelRequested { .. } | SimEventKind::LevelLoaded { .. } => {
            description.cyan().bold()
        }
        SimEventKind::SpawnSkipped { .. } => description.yellow().bold(),
        SimEventKind::SoundRequested { .. } => description.dimmed(),
        SimEventKind::MinionSpawned { .. } | SimEventKind::ProjectileLaunched { .. } => {
            description.normal()
        }
    }
}
