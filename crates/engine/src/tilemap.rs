use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{GridPos, Rect, Vec2};

pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Center cell plus its eight neighbours.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    #[serde(rename = "decor")]
    Decoration,
    #[serde(rename = "grass")]
    Grass,
    #[serde(rename = "stone")]
    Stone,
    #[serde(rename = "large_decor")]
    LargeDecor,
    #[serde(rename = "spawners")]
    Spawner,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Decoration,
        TileKind::Grass,
        TileKind::Stone,
        TileKind::LargeDecor,
        TileKind::Spawner,
    ];

    /// Grass and stone are the only kinds that take part in collision.
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    /// Asset category used for `"{category}/{variant}"` image keys.
    pub fn asset_category(self) -> &'static str {
        match self {
            TileKind::Decoration => "decor",
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawner => "spawners",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_category())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

impl Tile {
    pub fn new(kind: TileKind, variant: u32, pos: GridPos) -> Self {
        Self { kind, variant, pos }
    }

    pub fn rect(&self, tile_size: u32) -> Rect {
        let origin = self.pos.to_pixel(tile_size);
        let size = tile_size as f32;
        Rect::new(origin.x, origin.y, size, size)
    }
}

/// Visual-only tile placed at an arbitrary pixel position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffgridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// A tile returned by [`TileMap::extract`], always in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// Packed grid coordinate: x in the high 32 bits, y in the low 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey(u64);

impl GridKey {
    pub fn pos(self) -> GridPos {
        GridPos::new((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }
}

impl From<GridPos> for GridKey {
    fn from(pos: GridPos) -> Self {
        GridKey(((pos.x as u32 as u64) << 32) | pos.y as u32 as u64)
    }
}

/// Sparse tile grid plus off-grid decorations.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    tile_size: u32,
    tiles: HashMap<GridKey, Tile>,
    offgrid: Vec<OffgridTile>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}

impl TileMap {
    pub fn new(tile_size: u32) -> Self {
        assert!(tile_size > 0, "tile size must be positive");
        Self {
            tile_size,
            tiles: HashMap::new(),
            offgrid: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Inserts a grid tile keyed by its own position, returning the tile it replaced.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(GridKey::from(tile.pos), tile)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        self.tiles.remove(&GridKey::from(pos))
    }

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&GridKey::from(pos))
    }

    pub fn push_offgrid(&mut self, tile: OffgridTile) {
        self.offgrid.push(tile);
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn offgrid(&self) -> &[OffgridTile] {
        &self.offgrid
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.offgrid.is_empty()
    }

    pub fn tiles_around(&self, pixel: Vec2) -> Vec<Tile> {
        let center = GridPos::containing(pixel, self.tile_size);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| self.get(center.offset(dx, dy)).copied())
            .collect()
    }

    pub fn solid_rects_around(&self, pixel: Vec2) -> Vec<Rect> {
        self.tiles_around(pixel)
            .into_iter()
            .filter(|tile| tile.kind.is_solid())
            .map(|tile| tile.rect(self.tile_size))
            .collect()
    }

    /// Solid tile occupying the cell under `pixel`, if any.
    pub fn solid_at(&self, pixel: Vec2) -> Option<&Tile> {
        self.get(GridPos::containing(pixel, self.tile_size))
            .filter(|tile| tile.kind.is_solid())
    }

    /// Returns every grid and off-grid tile matching one of `matchers`.
    ///
    /// Grid tiles come back in pixel space and sorted by grid position so that
    /// consumers see a stable order. With `keep == false` the matches are removed.
    pub fn extract(&mut self, matchers: &[(TileKind, u32)], keep: bool) -> Vec<ExtractedTile> {
        let is_match =
            |kind: TileKind, variant: u32| matchers.iter().any(|m| *m == (kind, variant));
        let mut matched = Vec::new();

        for tile in &self.offgrid {
            if is_match(tile.kind, tile.variant) {
                matched.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: tile.pos,
                });
            }
        }
        if !keep {
            self.offgrid.retain(|tile| !is_match(tile.kind, tile.variant));
        }

        let mut grid_matches = self
            .tiles
            .values()
            .filter(|tile| is_match(tile.kind, tile.variant))
            .copied()
            .collect::<Vec<_>>();
        grid_matches.sort_by_key(|tile| (tile.pos.y, tile.pos.x));
        for tile in &grid_matches {
            matched.push(ExtractedTile {
                kind: tile.kind,
                variant: tile.variant,
                pos: tile.pos.to_pixel(self.tile_size),
            });
            if !keep {
                self.remove(tile.pos);
            }
        }

        matched
    }

    /// Grid cells overlapping a `view_size` window whose top-left is `offset`.
    pub fn visible_cells(&self, offset: Vec2, view_size: (u32, u32)) -> Vec<GridPos> {
        let min = GridPos::containing(offset, self.tile_size);
        let max = GridPos::containing(
            Vec2::new(
                offset.x + view_size.0 as f32,
                offset.y + view_size.1 as f32,
            ),
            self.tile_size,
        );
        let mut cells = Vec::new();
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                cells.push(GridPos::new(x, y));
            }
        }
        cells
    }
}
