use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::{GridPos, Vec2};
use crate::tilemap::{OffgridTile, Tile, TileKind, TileMap};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("parse level json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tile_size must be positive")]
    ZeroTileSize,
    #[error("invalid tile key '{key}': expected \"x;y\"")]
    InvalidKey { key: String },
    #[error("tile key '{key}' does not match its pos [{x}, {y}]")]
    KeyMismatch { key: String, x: i32, y: i32 },
    #[error("offgrid[{index}].pos must be finite")]
    NonFiniteOffgrid { index: usize },
    #[error("encode level json: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u32,
    pub pos: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffgridRecord {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u32,
    pub pos: [f32; 2],
}

/// On-disk level layout. Older map files call the grid table `tilemap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub tile_size: u32,
    #[serde(alias = "tilemap")]
    pub tiles: BTreeMap<String, TileRecord>,
    pub offgrid: Vec<OffgridRecord>,
}

impl LevelFile {
    pub fn parse(raw: &str) -> Result<Self, LevelError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            let path = if path.is_empty() { ".".to_string() } else { path };
            LevelError::Parse {
                path,
                source: error.into_inner(),
            }
        })
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        serde_json::to_string_pretty(self).map_err(LevelError::Encode)
    }

    pub fn from_tilemap(map: &TileMap) -> Self {
        let tiles = map
            .tiles()
            .map(|tile| {
                (
                    format_key(tile.pos),
                    TileRecord {
                        kind: tile.kind,
                        variant: tile.variant,
                        pos: [tile.pos.x, tile.pos.y],
                    },
                )
            })
            .collect();
        let offgrid = map
            .offgrid()
            .iter()
            .map(|tile| OffgridRecord {
                kind: tile.kind,
                variant: tile.variant,
                pos: [tile.pos.x, tile.pos.y],
            })
            .collect();
        Self {
            tile_size: map.tile_size(),
            tiles,
            offgrid,
        }
    }

    /// Validates the whole file before building anything, so a bad level never
    /// leaves a half-populated map behind.
    pub fn to_tilemap(&self) -> Result<TileMap, LevelError> {
        if self.tile_size == 0 {
            return Err(LevelError::ZeroTileSize);
        }
        for (key, record) in &self.tiles {
            let pos = parse_key(key).ok_or_else(|| LevelError::InvalidKey { key: key.clone() })?;
            if pos != GridPos::new(record.pos[0], record.pos[1]) {
                return Err(LevelError::KeyMismatch {
                    key: key.clone(),
                    x: record.pos[0],
                    y: record.pos[1],
                });
            }
        }
        for (index, record) in self.offgrid.iter().enumerate() {
            if !record.pos[0].is_finite() || !record.pos[1].is_finite() {
                return Err(LevelError::NonFiniteOffgrid { index });
            }
        }

        let mut map = TileMap::new(self.tile_size);
        for record in self.tiles.values() {
            map.insert(Tile::new(
                record.kind,
                record.variant,
                GridPos::new(record.pos[0], record.pos[1]),
            ));
        }
        for record in &self.offgrid {
            map.push_offgrid(OffgridTile {
                kind: record.kind,
                variant: record.variant,
                pos: Vec2::new(record.pos[0], record.pos[1]),
            });
        }
        Ok(map)
    }
}

pub fn load_level(raw: &str) -> Result<TileMap, LevelError> {
    LevelFile::parse(raw)?.to_tilemap()
}

pub fn save_level(map: &TileMap) -> Result<String, LevelError> {
    LevelFile::from_tilemap(map).to_json()
}

pub fn format_key(pos: GridPos) -> String {
    format!("{};{}", pos.x, pos.y)
}

pub fn parse_key(key: &str) -> Option<GridPos> {
    let (x, y) = key.split_once(';')?;
    Some(GridPos::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Small built-in level: a grass floor, a stone pillar, one tree, one enemy.
pub fn demo_level() -> LevelFile {
    let mut map = TileMap::new(16);
    for i in 0..10 {
        map.insert(Tile::new(TileKind::Grass, 1, GridPos::new(3 + i, 10)));
        map.insert(Tile::new(TileKind::Stone, 1, GridPos::new(14, 5 + i)));
    }
    for x in 12..14 {
        map.insert(Tile::new(TileKind::Grass, 1, GridPos::new(x, 10)));
    }
    map.insert(Tile::new(TileKind::Stone, 1, GridPos::new(2, 9)));
    map.insert(Tile::new(TileKind::Spawner, 0, GridPos::new(4, 8)));
    map.insert(Tile::new(TileKind::Spawner, 1, GridPos::new(11, 8)));
    map.insert(Tile::new(TileKind::Decoration, 0, GridPos::new(6, 9)));
    map.push_offgrid(OffgridTile {
        kind: TileKind::LargeDecor,
        variant: 2,
        pos: Vec2::new(120.0, 114.0),
    });
    LevelFile::from_tilemap(&map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "tile_size": 16,
        "tilemap": {
            "3;10": {"type": "grass", "variant": 1, "pos": [3, 10]},
            "-2;4": {"type": "stone", "variant": 0, "pos": [-2, 4]},
            "5;9": {"type": "spawners", "variant": 0, "pos": [5, 9]}
        },
        "offgrid": [
            {"type": "decor", "variant": 2, "pos": [40.5, 120]}
        ]
    }"#;

    #[test]
    fn parses_legacy_layout_with_tilemap_alias() {
        let map = load_level(SAMPLE).expect("level");
        assert_eq!(map.tile_size(), 16);
        assert_eq!(map.tile_count(), 3);
        let stone = map.get(GridPos::new(-2, 4)).expect("stone");
        assert_eq!(stone.kind, TileKind::Stone);
        assert_eq!(map.offgrid()[0].pos, Vec2::new(40.5, 120.0));
    }

    #[test]
    fn round_trip_preserves_every_tile() {
        let original = load_level(SAMPLE).expect("level");
        let saved = save_level(&original).expect("save");
        let reloaded = load_level(&saved).expect("reload");

        assert_eq!(reloaded.tile_size(), original.tile_size());
        assert_eq!(reloaded.tile_count(), original.tile_count());
        for tile in original.tiles() {
            assert_eq!(reloaded.get(tile.pos), Some(tile), "pos={:?}", tile.pos);
        }
        assert_eq!(reloaded.offgrid(), original.offgrid());
        assert!(saved.contains("\"tiles\""));
    }

    #[test]
    fn missing_field_reports_json_path() {
        let raw = r#"{"tile_size": 16, "tiles": {"0;0": {"type": "grass", "pos": [0, 0]}}, "offgrid": []}"#;
        let err = LevelFile::parse(raw).expect_err("missing variant");
        match err {
            LevelError::Parse { path, .. } => assert!(path.starts_with("tiles"), "path={path}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_tile_type_is_rejected() {
        let raw = r#"{"tile_size": 16, "tiles": {"0;0": {"type": "lava", "variant": 0, "pos": [0, 0]}}, "offgrid": []}"#;
        assert!(matches!(
            LevelFile::parse(raw),
            Err(LevelError::Parse { .. })
        ));
    }

    #[test]
    fn key_and_position_must_agree() {
        let raw = r#"{"tile_size": 16, "tiles": {"1;1": {"type": "grass", "variant": 0, "pos": [1, 2]}}, "offgrid": []}"#;
        let err = load_level(raw).expect_err("mismatch");
        assert!(matches!(err, LevelError::KeyMismatch { x: 1, y: 2, .. }));
    }

    #[test]
    fn malformed_key_and_zero_tile_size_fail_fast() {
        let raw = r#"{"tile_size": 16, "tiles": {"a-b": {"type": "grass", "variant": 0, "pos": [0, 0]}}, "offgrid": []}"#;
        assert!(matches!(
            load_level(raw),
            Err(LevelError::InvalidKey { .. })
        ));

        let raw = r#"{"tile_size": 0, "tiles": {}, "offgrid": []}"#;
        assert!(matches!(load_level(raw), Err(LevelError::ZeroTileSize)));
    }

    #[test]
    fn key_format_round_trips() {
        for pos in [GridPos::new(0, 0), GridPos::new(-7, 13)] {
            assert_eq!(parse_key(&format_key(pos)), Some(pos));
        }
        assert_eq!(parse_key("3;"), None);
        assert_eq!(parse_key("3"), None);
    }

    #[test]
    fn demo_level_has_player_and_enemy_spawners() {
        let mut map = demo_level().to_tilemap().expect("demo");
        let spawns = map.extract(&[(TileKind::Spawner, 0), (TileKind::Spawner, 1)], false);
        assert_eq!(spawns.iter().filter(|s| s.variant == 0).count(), 1);
        assert_eq!(spawns.iter().filter(|s| s.variant == 1).count(), 1);
    }
}
