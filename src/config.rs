//! Data-driven game tuning
//!
//! Everything the host may want to rebalance without touching code. Loaded
//! from JSON alongside the catalog, or taken as defaults.

use serde::{Deserialize, Serialize};

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    // === Timer ===
    /// Default stage duration in seconds (stages may override)
    pub timer_duration: f32,
    /// Levels below this display index play without a timer
    pub timer_free_levels: usize,

    // === Holes ===
    /// Playability scans probe at collider radius times this factor
    pub hole_trigger_factor: f32,

    // === Rewards ===
    /// Coins granted for completing a level (levels may override)
    pub level_reward: u32,
    /// Reward granted when replaying an already-beaten level
    pub replay_reward: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timer_duration: 180.0,
            timer_free_levels: 10,
            hole_trigger_factor: 1.1,
            level_reward: 50,
            replay_reward: 10,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
