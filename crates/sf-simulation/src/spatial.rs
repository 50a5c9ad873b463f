use glam::Vec2;
use sf_core::{EntityId, EntityPool, Side, TileMap};

use crate::minion::Minion;

/// Which minions a spatial query should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideFilter {
    /// Attackers only.
    AttackerOnly,
    /// Defenders only.
    DefenderOnly,
    /// Minions of either side.
    Both,
}

impl SideFilter {
    /// Return `true` if a minion of `side` passes the filter.
    pub fn accepts(self, side: Side) -> bool {
        match self {
            Self::AttackerOnly => side == Side::Attacker,
            Self::DefenderOnly => side == Side::Defender,
            Self::Both => true,
        }
    }
}

impl From<Side> for SideFilter {
    fn from(side: Side) -> Self {
        match side {
            Side::Attacker => Self::AttackerOnly,
            Side::Defender => Self::DefenderOnly,
        }
    }
}

/// Uniform grid of minion ids, one bucket per map tile.
///
/// The index is rebuilt from the minion pool once per frame. Positions
/// outside the map are clamped into the nearest border bucket, so every live
/// minion is indexed somewhere and radius queries stay exact for minions
/// that have not moved since the rebuild.
#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    columns: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<Vec<EntityId>>,
}

impl SpatialIndex {
    /// Create an empty index of `columns` by `rows` buckets.
    pub fn new(columns: usize, rows: usize, cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            columns,
            rows,
            cell_size,
            cells: vec![Vec::new(); columns * rows],
        }
    }

    /// An index with one bucket per tile of `tiles`.
    pub fn for_map(tiles: &TileMap) -> Self {
        Self::new(tiles.width(), tiles.height(), tiles.tile_size())
    }

    /// Buckets per row.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Bucket rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Bucket edge length in world pixels.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The bucket `position` falls into, clamped to the grid.
    ///
    /// `None` only for an index with no buckets.
    pub fn cell_of(&self, position: Vec2) -> Option<(usize, usize)> {
        if self.cells.is_empty() {
            return None;
        }
        Some((
            clamp_axis(position.x / self.cell_size, self.columns),
            clamp_axis(position.y / self.cell_size, self.rows),
        ))
    }

    /// Ids bucketed in cell `(x, y)` at the last rebuild.
    pub fn occupants(&self, x: usize, y: usize) -> &[EntityId] {
        if x >= self.columns || y >= self.rows {
            return &[];
        }
        &self.cells[y * self.columns + x]
    }

    /// Re-bucket every live minion by its current position.
    pub fn rebuild(&mut self, minions: &EntityPool<Minion>) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (id, minion) in minions.iter() {
            if let Some((x, y)) = self.cell_of(minion.body.position) {
                self.cells[y * self.columns + x].push(id);
            }
        }
    }

    /// Live minions passing `filter` within `radius` of `center`.
    ///
    /// Distance is measured from each minion's current position; the bound
    /// is inclusive. Results come in bucket order, row by row.
    pub fn query(
        &self,
        minions: &EntityPool<Minion>,
        center: Vec2,
        radius: f32,
        filter: SideFilter,
    ) -> Vec<EntityId> {
        let mut found = Vec::new();
        self.visit(minions, center, radius, filter, |id| {
            found.push(id);
            true
        });
        found
    }

    /// Return `true` if at least one minion matches.
    pub fn any_within(
        &self,
        minions: &EntityPool<Minion>,
        center: Vec2,
        radius: f32,
        filter: SideFilter,
    ) -> bool {
        let mut hit = false;
        self.visit(minions, center, radius, filter, |_| {
            hit = true;
            false
        });
        hit
    }

    /// Calls `visit` for each match until it returns `false`.
    fn visit(
        &self,
        minions: &EntityPool<Minion>,
        center: Vec2,
        radius: f32,
        filter: SideFilter,
        mut visit: impl FnMut(EntityId) -> bool,
    ) {
        let radius = radius.max(0.0);
        let reach = radius * radius;
        let (Some((x0, y0)), Some((x1, y1))) = (
            self.cell_of(center - Vec2::splat(radius)),
            self.cell_of(center + Vec2::splat(radius)),
        ) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                for &id in &self.cells[y * self.columns + x] {
                    let Ok(minion) = minions.get(id) else {
                        continue;
                    };
                    if filter.accepts(minion.side)
                        && minion.body.position.distance_squared(center) <= reach
                        && !visit(id)
                    {
                        return;
                    }
                }
            }
        }
    }
}

fn clamp_axis(scaled: f32, count: usize) -> usize {
    let cell = scaled.floor();
    if cell.is_nan() || cell <= 0.0 {
        0
    } else {
        (cell as usize).min(count.saturating_sub(1))
    }
}
