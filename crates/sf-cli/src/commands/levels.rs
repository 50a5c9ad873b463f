use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(manifest: &Path) -> Result<(), String> {
    let manifest = super::load_manifest(manifest)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Map", "Minions", "Description", "Status"]);

    let mut missing = 0;
    for (index, level) in manifest.levels.iter().enumerate() {
        let status = if level.map.is_file() {
            "ok".green().to_string()
        } else {
            missing += 1;
            "missing".red().to_string()
        };
        let description = if level.description.is_empty() {
            "-".to_string()
        } else {
            level.description.clone()
        };
        table.add_row(vec![
            (index + 1).to_string(),
            level.map.display().to_string(),
            level.starting_minions.to_string(),
            description,
            status,
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} levels", manifest.levels.len());

    if missing > 0 {
        return Err(format!("{missing} map file(s) missing"));
    }
    Ok(())
}
