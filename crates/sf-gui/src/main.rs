//! Swarmfall window: macroquad entry point.
//!
//! Usage: `sf-gui [--levels <manifest.json>] [--seed <n>]`

use std::path::PathBuf;

use macroquad::prelude::*;
use sf_simulation::{ImageMapSource, LevelManifest, SimConfig, Simulation};
use tracing_subscriber::EnvFilter;

use sf_gui::input::{handle_pointer, level_key, quit_pressed};
use sf_gui::scene::{draw_entities, draw_hud, draw_tiles};
use sf_gui::theme::{LETTERBOX, Viewport};

/// Longest frame the simulation is stepped by; slower frames run in slow motion.
const MAX_FRAME: f32 = 0.1;

fn window_conf() -> Conf {
    Conf {
        window_title: "Swarmfall".to_owned(),
        window_width: 1280,
        window_height: 720,
        window_resizable: true,
        ..Default::default()
    }
}

/// Value following `flag` on the command line.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}

fn start(args: &[String]) -> Result<Simulation, String> {
    let manifest = arg_value(args, "--levels")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("levels/levels.json"));
    let seed = match arg_value(args, "--seed") {
        Some(raw) => raw.parse().map_err(|e| format!("bad seed '{raw}': {e}"))?,
        None => SimConfig::default().seed,
    };
    let levels = LevelManifest::load(&manifest).map_err(|e| e.to_string())?;
    Simulation::new(SimConfig::default().with_seed(seed), levels.levels, ImageMapSource)
        .map_err(|e| e.to_string())
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut sim = match start(&args) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::error!(error = %e, "cannot start");
            return;
        }
    };

    loop {
        if quit_pressed() {
            break;
        }

        let size = sim.world().tiles().world_size();
        let viewport = Viewport::fit(size.x, size.y);

        if let Some(request) = level_key()
            && let Err(e) = sim.jump(request)
        {
            tracing::warn!(error = %e, %request, "level change failed");
        }
        handle_pointer(&mut sim, &viewport);

        if let Err(e) = sim.tick(get_frame_time().min(MAX_FRAME)) {
            tracing::error!(error = %e, "simulation stopped");
            break;
        }

        clear_background(LETTERBOX);
        viewport.apply();
        let (world_w, world_h) = viewport.world_size();
        draw_tiles(&sim);
        draw_entities(&sim);
        draw_hud(&sim, world_w, world_h);

        next_frame().await;
    }
}
