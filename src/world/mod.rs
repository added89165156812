//! World grid: tile-indexed terrain, crops, fences and items lying on the ground.
//!
//! The grid is a dense row-major `Vec<Tile>`; every in-bounds position has
//! exactly one tile. Crop and fence live in the same `TileContent` slot so a
//! tile can never hold both.

pub mod crops;
pub mod weather;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::shared::*;

pub use crops::CropState;
pub use weather::WeatherState;

// ─────────────────────────────────────────────────────────────────────────────
// Tiles
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Grass,
    Soil,
    Path,
    Water,
    Stone,
}

impl Terrain {
    pub fn is_plantable(self) -> bool {
        matches!(self, Terrain::Grass | Terrain::Soil)
    }

    pub fn is_solid(self) -> bool {
        matches!(self, Terrain::Water | Terrain::Stone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum TileContent {
    #[default]
    Empty,
    Crop(CropState),
    Fence { open: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub pos: TilePos,
    pub terrain: Terrain,
    pub content: TileContent,
}

impl Tile {
    pub fn is_empty(&self) -> bool {
        matches!(self.content, TileContent::Empty)
    }
}

/// A stack lying on a tile, left by a drop or an overflowing harvest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub pos: TilePos,
    pub stack: ItemStack,
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    #[serde(default)]
    ground_items: Vec<GroundItem>,
}

impl WorldGrid {
    /// A blank grass field.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile {
                    pos: TilePos::new(x, y),
                    terrain: Terrain::Grass,
                    content: TileContent::Empty,
                });
            }
        }
        Self {
            width,
            height,
            tiles,
            ground_items: Vec::new(),
        }
    }

    /// The starter farm: a tilled plot, a path, a pond, a stone outcrop and a
    /// fenced pen. Features that do not fit a small world are clipped.
    pub fn generate(config: &GameConfig) -> Self {
        let mut grid = Self::new(config.world_width, config.world_height);

        grid.fill(TilePos::new(0, 2), TilePos::new(grid.width, 3), Terrain::Path);
        grid.fill(TilePos::new(4, 4), TilePos::new(12, 10), Terrain::Soil);
        grid.fill(TilePos::new(20, 6), TilePos::new(26, 11), Terrain::Water);
        grid.fill(TilePos::new(50, 30), TilePos::new(53, 33), Terrain::Stone);

        // 5x5 ring of closed fences; the middle of the south side is an open gate
        let (px, py) = (40, 10);
        for i in 0..5 {
            for pos in [
                TilePos::new(px + i, py),
                TilePos::new(px + i, py + 4),
                TilePos::new(px, py + i),
                TilePos::new(px + 4, py + i),
            ] {
                let _ = grid.set_fence(pos, false);
            }
        }
        let _ = grid.set_fence(TilePos::new(px + 2, py), true);

        grid
    }

    /// Set terrain over `[min, max)`, skipping out-of-bounds tiles.
    fn fill(&mut self, min: TilePos, max: TilePos, terrain: Terrain) {
        for y in min.y..max.y {
            for x in min.x..max.x {
                if let Ok(tile) = self.tile_mut(TilePos::new(x, y)) {
                    tile.terrain = terrain;
                }
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: TilePos) -> GameResult<usize> {
        if !self.in_bounds(pos) {
            return Err(GameError::OutOfBounds {
                pos,
                width: self.width,
                height: self.height,
            });
        }
        Ok((pos.y * self.width + pos.x) as usize)
    }

    pub fn tile_at(&self, pos: TilePos) -> GameResult<&Tile> {
        let idx = self.index(pos)?;
        Ok(&self.tiles[idx])
    }

    fn tile_mut(&mut self, pos: TilePos) -> GameResult<&mut Tile> {
        let idx = self.index(pos)?;
        Ok(&mut self.tiles[idx])
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// True when the tile vector matches the declared extent. Used to reject
    /// hand-edited or truncated saves.
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.tiles.len() == (self.width * self.height) as usize
            && self
                .tiles
                .iter()
                .enumerate()
                .all(|(i, t)| self.index(t.pos).ok() == Some(i))
            && self.tiles.iter().all(|t| match t.content {
                TileContent::Crop(crop) => crop.is_valid(),
                _ => true,
            })
    }

    pub fn set_terrain(&mut self, pos: TilePos, terrain: Terrain) -> GameResult<()> {
        let tile = self.tile_mut(pos)?;
        if matches!(tile.content, TileContent::Crop(_)) && !terrain.is_plantable() {
            return Err(GameError::InvalidTile {
                pos,
                reason: "a crop is growing here",
            });
        }
        tile.terrain = terrain;
        Ok(())
    }

    // ── Fences ──────────────────────────────────────────────────────────────

    /// Place (or re-set) a fence. Crops and water refuse fences.
    pub fn set_fence(&mut self, pos: TilePos, open: bool) -> GameResult<()> {
        let tile = self.tile_mut(pos)?;
        if matches!(tile.content, TileContent::Crop(_)) {
            return Err(GameError::InvalidTile {
                pos,
                reason: "a crop is growing here",
            });
        }
        if tile.terrain == Terrain::Water {
            return Err(GameError::InvalidTile {
                pos,
                reason: "cannot fence water",
            });
        }
        tile.content = TileContent::Fence { open };
        Ok(())
    }

    pub fn has_fence_at(&self, pos: TilePos) -> bool {
        self.fence_open_at(pos).is_some()
    }

    /// `Some(open)` if a fence stands at `pos`.
    pub fn fence_open_at(&self, pos: TilePos) -> Option<bool> {
        match self.tile_at(pos).ok()?.content {
            TileContent::Fence { open } => Some(open),
            _ => None,
        }
    }

    /// Flip a fence and return its new state; `None` when there is no fence.
    pub fn toggle_fence(&mut self, pos: TilePos) -> GameResult<Option<bool>> {
        let tile = self.tile_mut(pos)?;
        match &mut tile.content {
            TileContent::Fence { open } => {
                *open = !*open;
                Ok(Some(*open))
            }
            _ => Ok(None),
        }
    }

    // ── Crops ───────────────────────────────────────────────────────────────

    pub fn plant(&mut self, pos: TilePos, crop: CropKind, now: f64) -> GameResult<()> {
        let tile = self.tile_mut(pos)?;
        if !tile.is_empty() {
            return Err(GameError::InvalidTile {
                pos,
                reason: "tile is occupied",
            });
        }
        if !tile.terrain.is_plantable() {
            return Err(GameError::InvalidTile {
                pos,
                reason: "terrain cannot hold crops",
            });
        }
        tile.content = TileContent::Crop(CropState::new(crop, now));
        Ok(())
    }

    pub fn crop_at(&self, pos: TilePos) -> Option<&CropState> {
        match &self.tile_at(pos).ok()?.content {
            TileContent::Crop(crop) => Some(crop),
            _ => None,
        }
    }

    /// Grow every planted tile by `dt` seconds. Returns `(pos, new_stage)` for
    /// each crop that changed stage.
    pub fn advance_crop_growth(&mut self, dt: f32, rate: f32) -> Vec<(TilePos, u8)> {
        let mut advanced = Vec::new();
        for tile in self.tiles.iter_mut() {
            if let TileContent::Crop(crop) = &mut tile.content {
                if crop.grow(dt, rate) {
                    advanced.push((tile.pos, crop.stage));
                }
            }
        }
        advanced
    }

    /// Remove a mature crop and return its produce. The tile becomes empty.
    pub fn harvest(&mut self, pos: TilePos) -> GameResult<ItemStack> {
        let tile = self.tile_mut(pos)?;
        let crop = match tile.content {
            TileContent::Crop(crop) if crop.is_harvestable() => crop,
            _ => return Err(GameError::NotHarvestable(pos)),
        };
        tile.content = TileContent::Empty;
        Ok(ItemStack::new(
            ItemKind::Produce(crop.kind),
            crop.kind.yield_quantity(),
        ))
    }

    // ── Ground items ────────────────────────────────────────────────────────

    /// Leave a stack on a tile, merging into a compatible stack already there.
    pub fn drop_item(&mut self, pos: TilePos, stack: ItemStack) -> GameResult<()> {
        self.index(pos)?;
        if let Some(existing) = self
            .ground_items
            .iter_mut()
            .find(|g| g.pos == pos && g.stack.stacks_with(&stack))
        {
            existing.stack.quantity = existing.stack.quantity.saturating_add(stack.quantity);
        } else {
            self.ground_items.push(GroundItem { pos, stack });
        }
        Ok(())
    }

    pub fn ground_items_at(&self, pos: TilePos) -> impl Iterator<Item = &ItemStack> + '_ {
        self.ground_items
            .iter()
            .filter(move |g| g.pos == pos)
            .map(|g| &g.stack)
    }

    pub fn ground_items(&self) -> &[GroundItem] {
        &self.ground_items
    }

    /// Remove and return every stack on a tile.
    pub fn take_ground_items(&mut self, pos: TilePos) -> Vec<ItemStack> {
        let mut taken = Vec::new();
        self.ground_items.retain(|g| {
            if g.pos == pos {
                taken.push(g.stack);
                false
            } else {
                true
            }
        });
        taken
    }

    // ── Movement & view ─────────────────────────────────────────────────────

    /// In bounds, not water or stone, and not behind a closed fence.
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        match self.tile_at(pos) {
            Ok(tile) => {
                !tile.terrain.is_solid()
                    && !matches!(tile.content, TileContent::Fence { open: false })
            }
            Err(_) => false,
        }
    }

    /// Tiles within `radius` (Chebyshev) of `center`, row-major.
    pub fn tiles_in_view(&self, center: TilePos, radius: i32) -> Vec<Tile> {
        let radius = radius.max(0);
        let min_x = (center.x - radius).max(0);
        let max_x = (center.x + radius).min(self.width - 1);
        let min_y = (center.y - radius).max(0);
        let max_y = (center.y + radius).min(self.height - 1);
        let mut view = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if let Ok(tile) = self.tile_at(TilePos::new(x, y)) {
                    view.push(*tile);
                }
            }
        }
        view
    }

    pub fn ground_items_in_view(&self, center: TilePos, radius: i32) -> Vec<GroundItem> {
        self.ground_items
            .iter()
            .filter(|g| g.pos.chebyshev_distance(center) <= radius)
            .copied()
            .collect()
    }
}
