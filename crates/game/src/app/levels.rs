use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ninja_engine::{demo_level, LevelError, LevelFile};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub(crate) enum LevelLoadError {
    #[error("failed to read level directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read level file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid level file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: LevelError,
    },
}

/// Loads `<index>.json` files from `dir` in numeric order. A missing or empty
/// directory yields the built-in demo level.
pub(crate) fn load_levels(dir: &Path) -> Result<Vec<LevelFile>, LevelLoadError> {
    if !dir.is_dir() {
        warn!(maps_dir = %dir.display(), "level_dir_missing_using_demo");
        return Ok(vec![demo_level()]);
    }

    let entries = fs::read_dir(dir).map_err(|source| LevelLoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut indexed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LevelLoadError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if let Some(index) = level_index(&path) {
            indexed.push((index, path));
        }
    }
    indexed.sort_by_key(|(index, _)| *index);

    let mut levels = Vec::with_capacity(indexed.len());
    for (_, path) in indexed {
        let raw = fs::read_to_string(&path).map_err(|source| LevelLoadError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let level =
            LevelFile::parse(&raw).map_err(|source| LevelLoadError::Parse { path, source })?;
        levels.push(level);
    }

    if levels.is_empty() {
        warn!(maps_dir = %dir.display(), "level_dir_empty_using_demo");
        return Ok(vec![demo_level()]);
    }
    info!(maps_dir = %dir.display(), level_count = levels.len(), "levels_loaded");
    Ok(levels)
}

fn level_index(path: &Path) -> Option<usize> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?.to_str()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ninja_engine::{GridPos, Tile, TileKind, TileMap};

    fn single_tile_level(x: i32) -> String {
        let mut map = TileMap::new(16);
        map.insert(Tile::new(TileKind::Spawner, 0, GridPos::new(x, 0)));
        LevelFile::from_tilemap(&map).to_json().expect("encode")
    }

    #[test]
    fn levels_load_in_numeric_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("10.json"), single_tile_level(10)).expect("write 10");
        fs::write(dir.path().join("2.json"), single_tile_level(2)).expect("write 2");
        fs::write(dir.path().join("0.json"), single_tile_level(0)).expect("write 0");
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write notes");
        fs::write(dir.path().join("backup.json"), "ignored").expect("write backup");

        let levels = load_levels(dir.path()).expect("levels");

        let first_keys = levels
            .iter()
            .map(|level| level.tiles.keys().next().cloned().expect("one tile"))
            .collect::<Vec<_>>();
        assert_eq!(first_keys, vec!["0;0", "2;0", "10;0"]);
    }

    #[test]
    fn missing_or_empty_directory_falls_back_to_demo() {
        let dir = tempfile::tempdir().expect("tempdir");

        let empty = load_levels(dir.path()).expect("empty dir");
        let missing = load_levels(&dir.path().join("nope")).expect("missing dir");

        assert_eq!(empty, vec![demo_level()]);
        assert_eq!(missing, vec![demo_level()]);
    }

    #[test]
    fn invalid_level_reports_its_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("0.json");
        fs::write(&path, r#"{"tile_size": 16, "tiles": {"0;0": {"type": "lava"}}}"#)
            .expect("write");

        let err = load_levels(dir.path()).expect_err("invalid level");

        match err {
            LevelLoadError::Parse { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
