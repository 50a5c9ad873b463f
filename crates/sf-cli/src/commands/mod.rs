pub mod inspect;
pub mod levels;
pub mod simulate;

use std::path::Path;

use sf_simulation::{LevelManifest, SimConfig};
use tracing::debug;

/// Read a manifest, turning errors into CLI messages.
fn load_manifest(path: &Path) -> Result<LevelManifest, String> {
    let manifest = LevelManifest::load(path).map_err(|e| e.to_string())?;
    debug!(path = %path.display(), levels = manifest.levels.len(), "manifest loaded");
    Ok(manifest)
}

/// Defaults, optionally overridden by a JSON file.
fn load_config(path: Option<&Path>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    let config = SimConfig::from_json(&text).map_err(|e| e.to_string())?;
    debug!(path = %path.display(), seed = config.seed, "config loaded");
    Ok(config)
}
