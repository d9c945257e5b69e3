//! Loading and saving scene documents and configs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bonedot_spec::{BonedotConfig, SceneDocument};

/// A scene document together with the directory its relative paths resolve
/// against.
#[derive(Debug, Clone)]
pub struct LoadedScene {
    pub scene: SceneDocument,
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

impl LoadedScene {
    /// Writes the scene to `output`, or back to the file it came from.
    pub fn save(&self, output: Option<&str>) -> Result<PathBuf> {
        let path = output.map(PathBuf::from).unwrap_or_else(|| self.path.clone());
        self.scene
            .write(&path)
            .with_context(|| format!("Failed to write scene: {}", path.display()))?;
        Ok(path)
    }
}

/// Reads a scene document from `path`.
pub fn load_scene(path: &str) -> Result<LoadedScene> {
    let path = PathBuf::from(path);
    let scene = SceneDocument::read(&path)
        .with_context(|| format!("Failed to load scene: {}", path.display()))?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(LoadedScene {
        scene,
        path,
        base_dir,
    })
}

/// Resolves the config from `--config`, `BONEDOT_CONFIG` or defaults.
pub fn load_config(explicit: Option<&str>) -> Result<BonedotConfig> {
    BonedotConfig::discover(explicit.map(Path::new)).context("Failed to load config")
}
