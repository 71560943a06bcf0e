//! Saved game on disk.

use anyhow::{Context, Result};
use onemoveleft_core::{SavedState, Session};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const SAVE_FILE: &str = "onemoveleft_save.json";

/// Save file in the platform's local data directory
pub fn default_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SAVE_FILE)
}

/// Raw saved JSON, or `None` when nothing has been saved yet
pub fn load(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(Some(json)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Best score recorded in the save file, if it can be read at all
pub fn saved_best(path: &Path) -> u64 {
    load(path)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str::<SavedState>(&json).ok())
        .map_or(0, |state| state.best)
}

pub fn save(path: &Path, session: &Session) -> Result<()> {
    let json = serde_json::to_string_pretty(&session.to_snapshot())
        .context("failed to encode saved game")?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
