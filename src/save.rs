//! Player progress persistence
//!
//! A small JSON file; anything unreadable falls back to a fresh save.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted player progress
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProgressSave {
    /// Highest display level ever reached
    pub max_reached_level_index: usize,
    /// Level number shown to the player (keeps counting past the catalog)
    pub display_level_index: usize,
    /// Catalog index actually being played
    pub real_level_index: usize,
    /// Whether the current level came from the random-replay pool
    pub is_playing_random_level: bool,
    /// Last replayed catalog index, avoided by the next random pick
    pub last_played_level_index: Option<usize>,
}

impl ProgressSave {
    /// Load progress from disk, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(save) => {
                    log::info!("Loaded progress from {}", path.display());
                    save
                }
                Err(err) => {
                    log::warn!("Progress file unreadable ({err}), starting fresh");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No progress file, starting fresh");
                Self::default()
            }
        }
    }

    /// Write progress to disk
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Progress saved (level {})", self.display_level_index);
        Ok(())
    }
}
