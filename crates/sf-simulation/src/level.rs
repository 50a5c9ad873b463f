use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sf_core::{PixelGrid, Rgba};

use crate::error::{SimError, SimResult};

/// One entry of the level table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    /// Map image, relative to the manifest until the manifest is loaded.
    pub map: PathBuf,
    /// Line shown to the player while the level runs.
    #[serde(default)]
    pub description: String,
    /// Attackers granted when the level starts.
    #[serde(default)]
    pub starting_minions: u32,
}

/// The ordered level table, read from JSON.
///
/// ```json
/// { "levels": [ { "map": "maps/01.png", "description": "Hello", "starting_minions": 20 } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelManifest {
    /// Levels in play order.
    pub levels: Vec<LevelSpec>,
}

impl LevelManifest {
    /// Read a manifest file. Map paths are resolved against its directory.
    pub fn load(path: &Path) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SimError::Manifest(format!("{}: {e}", path.display())))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&text, base)
    }

    /// Parse a manifest, resolving relative map paths against `base`.
    pub fn from_json(text: &str, base: &Path) -> SimResult<Self> {
        let mut manifest: Self =
            serde_json::from_str(text).map_err(|e| SimError::Manifest(e.to_string()))?;
        if manifest.levels.is_empty() {
            return Err(SimError::NoLevels);
        }
        for level in &mut manifest.levels {
            if level.map.is_relative() {
                level.map = base.join(&level.map);
            }
        }
        Ok(manifest)
    }
}

/// Where level maps come from.
pub trait MapSource {
    /// Produce the pixel grid for `level`.
    fn load_map(&self, level: &LevelSpec) -> SimResult<PixelGrid>;
}

/// Reads map images from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageMapSource;

impl MapSource for ImageMapSource {
    fn load_map(&self, level: &LevelSpec) -> SimResult<PixelGrid> {
        load_pixel_grid(&level.map)
    }
}

impl<F> MapSource for F
where
    F: Fn(&LevelSpec) -> SimResult<PixelGrid>,
{
    fn load_map(&self, level: &LevelSpec) -> SimResult<PixelGrid> {
        self(level)
    }
}

/// Decode an image file into RGBA pixels.
pub fn load_pixel_grid(path: &Path) -> SimResult<PixelGrid> {
    let map_error = |reason: String| SimError::MapLoad {
        path: path.to_path_buf(),
        reason,
    };
    let image = image::open(path)
        .map_err(|e| map_error(e.to_string()))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let pixels = image
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            Rgba::new(r, g, b, a)
        })
        .collect();
    Ok(PixelGrid::new(width as usize, height as usize, pixels)?)
}
