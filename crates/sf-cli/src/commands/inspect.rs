use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sf_core::tilemap::decode;
use sf_core::{DecodedMap, Placement, Side, Terrain, TowerArchetype};
use sf_simulation::level::load_pixel_grid;

pub fn run(map: &Path, tile_size: f32) -> Result<(), String> {
    let grid = load_pixel_grid(map).map_err(|e| e.to_string())?;
    let decoded = decode(&grid, tile_size).map_err(|e| e.to_string())?;
    let tiles = &decoded.tiles;

    println!(
        "  {} {} {}",
        "Map".bold(),
        map.display(),
        format!(
            "({}x{} tiles, {:.0}x{:.0} px)",
            tiles.width(),
            tiles.height(),
            tiles.world_size().x,
            tiles.world_size().y
        )
        .dimmed()
    );
    println!();

    for line in ascii_map(&decoded) {
        println!("  {line}");
    }
    println!();

    let mut terrain = Table::new();
    terrain.set_content_arrangement(ContentArrangement::Dynamic);
    terrain.set_header(vec!["Terrain", "Cells"]);
    for (label, kind) in [
        ("ground", Terrain::Ground),
        ("placeable", Terrain::Placeable),
        ("trap trigger", Terrain::TrapTrigger),
        ("void", Terrain::Void),
    ] {
        let cells = tiles.cells().filter(|(_, _, t)| *t == kind).count();
        terrain.add_row(vec![label.to_string(), cells.to_string()]);
    }
    println!("{terrain}");
    println!();

    if decoded.placements.is_empty() {
        println!("  {}", "No placements.".dimmed());
        return Ok(());
    }

    let mut placements = Table::new();
    placements.set_content_arrangement(ContentArrangement::Dynamic);
    placements.set_header(vec!["Placement", "Health", "Position"]);
    for placement in &decoded.placements {
        let (label, health, position) = match placement {
            Placement::Tower {
                archetype,
                health,
                position,
            } => (format!("{archetype} tower"), health.to_string(), *position),
            Placement::Trap { position } => ("trap".to_string(), "-".to_string(), *position),
            Placement::Minion { side, position } => {
                (format!("{side} minion"), "-".to_string(), *position)
            }
        };
        placements.add_row(vec![
            label,
            health,
            format!("({:.0}, {:.0})", position.x, position.y),
        ]);
    }
    println!("{placements}");
    println!();
    println!("  {} placements", decoded.placements.len());

    Ok(())
}

/// One character per cell. Placements override terrain.
fn ascii_map(decoded: &DecodedMap) -> Vec<String> {
    let tiles = &decoded.tiles;
    let mut rows: Vec<Vec<char>> = (0..tiles.height())
        .map(|y| {
            (0..tiles.width())
                .map(|x| match tiles.get(x, y) {
                    Some(Terrain::Ground) => '.',
                    Some(Terrain::Placeable) => '#',
                    Some(Terrain::TrapTrigger) => '^',
                    Some(Terrain::Void) | None => ' ',
                })
                .collect()
        })
        .collect();

    for placement in &decoded.placements {
        let (glyph, position) = match placement {
            Placement::Tower {
                archetype,
                position,
                ..
            } => (
                match archetype {
                    TowerArchetype::Ranged => 'R',
                    TowerArchetype::Area => 'A',
                    TowerArchetype::Spawner => 'S',
                },
                position,
            ),
            Placement::Trap { position } => ('^', position),
            Placement::Minion { side, position } => (
                match side {
                    Side::Attacker => 'a',
                    Side::Defender => 'd',
                },
                position,
            ),
        };
        if let Some((x, y)) = tiles.cell_of(*position) {
            rows[y][x] = glyph;
        }
    }

    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}
