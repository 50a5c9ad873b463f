use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::entity::{Side, TowerArchetype};
use crate::error::{CoreError, CoreResult};

/// Colour markers understood by [`decode`].
pub mod marker {
    use crate::color::Rgba;

    /// Walkable ground.
    pub const GROUND: Rgba = Rgba::from_hex(0xFFFFFFFF);
    /// Ground where the player may place minions.
    pub const PLACEABLE: Rgba = Rgba::from_hex(0x3294C4FF);
    /// A trap on walkable ground.
    pub const TRAP: Rgba = Rgba::from_hex(0xC49632FF);
    /// A defender minion standing on walkable ground.
    pub const DEFENDER: Rgba = Rgba::from_hex(0xA4243BFF);
}

/// Terrain classification of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    /// Outside the playfield.
    #[default]
    Void,
    /// Walkable ground.
    Ground,
    /// Ground that accepts player placements.
    Placeable,
    /// Ground that held a trap when the map was loaded.
    TrapTrigger,
}

impl Terrain {
    /// Return `true` for every playfield cell.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Self::Void)
    }

    /// Return `true` if the player may place minions here.
    pub fn is_placeable(self) -> bool {
        matches!(self, Self::Placeable)
    }
}

/// Terrain grid in cells of `tile_size` world pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tile_size: f32,
    cells: Vec<Terrain>,
}

impl TileMap {
    /// Create a map filled with `fill`.
    pub fn filled(width: usize, height: usize, tile_size: f32, fill: Terrain) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: vec![fill; width * height],
        }
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Edge length of one cell in world pixels.
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Size of the whole map in world pixels.
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }

    /// Terrain of cell `(x, y)`, or `None` outside the map.
    pub fn get(&self, x: usize, y: usize) -> Option<Terrain> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Overwrite cell `(x, y)`. Out-of-range cells are ignored.
    pub fn set(&mut self, x: usize, y: usize, terrain: Terrain) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = terrain;
        }
    }

    /// The cell containing world position `pos`, or `None` outside the map.
    pub fn cell_of(&self, pos: Vec2) -> Option<(usize, usize)> {
        let cx = (pos.x / self.tile_size).floor();
        let cy = (pos.y / self.tile_size).floor();
        if cx < 0.0 || cy < 0.0 || !cx.is_finite() || !cy.is_finite() {
            return None;
        }
        let (x, y) = (cx as usize, cy as usize);
        (x < self.width && y < self.height).then_some((x, y))
    }

    /// Terrain under world position `pos`.
    pub fn terrain_at(&self, pos: Vec2) -> Option<Terrain> {
        self.cell_of(pos).and_then(|(x, y)| self.get(x, y))
    }

    /// World position of the centre of cell `(x, y)`.
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new((x as f32 + 0.5) * self.tile_size, (y as f32 + 0.5) * self.tile_size)
    }

    /// Iterate over `(x, y, terrain)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Terrain)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, t)| (i % self.width, i / self.width, *t))
    }

    /// Centres of every placeable cell.
    pub fn placeable_centers(&self) -> Vec<Vec2> {
        self.cells()
            .filter(|(_, _, t)| t.is_placeable())
            .map(|(x, y, _)| self.cell_center(x, y))
            .collect()
    }
}

/// Raw RGBA pixels of a map image, one pixel per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelGrid {
    /// Wrap row-major pixels. Fails if the pixel count does not match.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgba>) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidMap(format!(
                "map must not be empty ({width}x{height})"
            )));
        }
        if pixels.len() != width * height {
            return Err(CoreError::InvalidMap(format!(
                "expected {} pixels for {width}x{height}, got {}",
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A grid filled with one colour.
    pub fn filled(width: usize, height: usize, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Overwrite pixel `(x, y)`. Out-of-range pixels are ignored.
    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }
}

/// An entity the map asks to be spawned when the level loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// A tower with its starting health.
    Tower {
        /// Archetype encoded by the marker channel.
        archetype: TowerArchetype,
        /// Starting health (channel value times ten).
        health: i32,
        /// Cell centre in world pixels.
        position: Vec2,
    },
    /// A trap.
    Trap {
        /// Cell centre in world pixels.
        position: Vec2,
    },
    /// A pre-placed minion.
    Minion {
        /// Side of the minion.
        side: Side,
        /// Cell centre in world pixels.
        position: Vec2,
    },
}

/// Result of decoding a map image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMap {
    /// Terrain of every cell.
    pub tiles: TileMap,
    /// Entities to spawn, in row-major cell order.
    pub placements: Vec<Placement>,
}

/// Decode a colour-coded map image.
///
/// Every non-ground pixel is either a terrain class or a placement
/// directive. A pixel whose only non-zero colour channel is red, green, or
/// blue places a ranged, area, or spawner tower whose health is that channel
/// times ten. Marker cells become ground.
pub fn decode(grid: &PixelGrid, tile_size: f32) -> CoreResult<DecodedMap> {
    if tile_size.is_nan() || tile_size <= 0.0 {
        return Err(CoreError::InvalidMap(format!("tile size must be positive, got {tile_size}")));
    }

    let mut tiles = TileMap::filled(grid.width, grid.height, tile_size, Terrain::Void);
    let mut placements = Vec::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let color = grid.pixels[y * grid.width + x];
            let position = tiles.cell_center(x, y);

            let terrain = if color == marker::GROUND {
                Terrain::Ground
            } else if color == marker::PLACEABLE {
                Terrain::Placeable
            } else if color == marker::TRAP {
                placements.push(Placement::Trap { position });
                Terrain::TrapTrigger
            } else if color == marker::DEFENDER {
                placements.push(Placement::Minion {
                    side: Side::Defender,
                    position,
                });
                Terrain::Ground
            } else if let Some((archetype, channel)) = tower_marker(color) {
                placements.push(Placement::Tower {
                    archetype,
                    health: channel as i32 * 10,
                    position,
                });
                Terrain::Ground
            } else {
                Terrain::Void
            };
            tiles.set(x, y, terrain);
        }
    }

    Ok(DecodedMap { tiles, placements })
}

fn tower_marker(color: Rgba) -> Option<(TowerArchetype, u8)> {
    match (color.r, color.g, color.b) {
        (r, 0, 0) if r > 0 => Some((TowerArchetype::Ranged, r)),
        (0, g, 0) if g > 0 => Some((TowerArchetype::Area, g)),
        (0, 0, b) if b > 0 => Some((TowerArchetype::Spawner, b)),
        _ => None,
    }
}
