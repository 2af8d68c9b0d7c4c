//! JSON persistence of levels as flat tile records.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use grid_astar_layouts::{Level, TileRecord};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::HarnessError;

/// On-disk form of a level: every tile in row-major order. Dimensions are recovered from
/// the largest position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub tiles: Vec<TileRecord>,
}

impl From<&Level> for LevelFile {
    fn from(level: &Level) -> LevelFile {
        LevelFile {
            tiles: level.to_records(),
        }
    }
}

/// Writes `level` to `<dir>/<name>.json`, creating the directory if needed.
pub fn save_level(level: &Level, dir: &Path, name: &str) -> Result<PathBuf, HarnessError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.json"));
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(writer, &LevelFile::from(level))?;
    debug!("Saved {}x{} level to {}", level.width(), level.height(), path.display());
    Ok(path)
}

pub fn load_level(path: &Path) -> Result<Level, HarnessError> {
    let reader = BufReader::new(File::open(path)?);
    let file: LevelFile = serde_json::from_reader(reader)?;
    Ok(Level::from_records(&file.tiles)?)
}

/// Loads every `.json` file below `dir`, sorted by path.
pub fn load_levels(dir: &Path) -> Result<Vec<(PathBuf, Level)>, HarnessError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().map_or(false, |e| e == "json") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();
    let levels = paths
        .into_iter()
        .map(|path| load_level(&path).map(|level| (path, level)))
        .collect::<Result<Vec<_>, _>>()?;
    info!("Loaded {} levels from {}", levels.len(), dir.display());
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_astar_layouts::Point;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("layout_harness_{name}_{}", std::process::id()))
    }

    #[test]
    fn record_format() {
        let mut level = Level::open(2, 1);
        level.set_walkable(Point::new(1, 0), false);
        let json = serde_json::to_string(&LevelFile::from(&level)).unwrap();
        assert_eq!(
            json,
            r#"{"tiles":[{"position":{"x":0,"y":0},"walkable":true},{"position":{"x":1,"y":0},"walkable":false}]}"#
        );
    }

    #[test]
    fn levels_survive_a_round_trip_through_disk() {
        let dir = temp_dir("storage");
        let mut level = Level::open(4, 3);
        level.set_walkable(Point::new(2, 1), false);
        save_level(&level, &dir, "b").unwrap();
        save_level(&Level::open(2, 2), &dir, "a").unwrap();
        fs::write(dir.join("notes.txt"), "not a level").unwrap();

        let loaded = load_levels(&dir).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[0].0.ends_with("a.json"));
        let (_, restored) = &loaded[1];
        assert_eq!(restored.to_records(), level.to_records());
        assert_eq!(restored.to_string(), level.to_string());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn broken_files_are_reported() {
        let dir = temp_dir("storage_broken");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        fs::write(&path, r#"{"tiles":[{"position":{"x":1,"y":0},"walkable":true}]}"#).unwrap();
        assert!(matches!(load_level(&path), Err(HarnessError::Grid(_))));
        fs::write(&path, "{").unwrap();
        assert!(matches!(load_level(&path), Err(HarnessError::Json(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
