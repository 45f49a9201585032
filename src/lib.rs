//! Unbolt - headless core for a screw-and-plank puzzle game
//!
//! Core modules:
//! - `catalog`: Authored level data (holes, planks, locked holes, stages)
//! - `config`: Data-driven game tuning
//! - `save`: Player progress persistence
//! - `sim`: Deterministic simulation (stage assembly, clicks, endgame puzzle)

pub mod catalog;
pub mod config;
pub mod save;
pub mod sim;

pub use catalog::{Catalog, Level, PlankKind, Stage};
pub use config::GameConfig;
pub use save::ProgressSave;

/// Game tuning constants
pub mod consts {
    /// Two points count as the same hole position within this distance
    pub const ALIGN_EPSILON: f32 = 0.1;

    /// Base hole collider radius (world units)
    pub const HOLE_RADIUS: f32 = 0.35;
    /// Screw collider radius (world units)
    pub const SCREW_RADIUS: f32 = 0.3;
    /// Probe radius for a tap on the board
    pub const CLICK_RADIUS: f32 = 0.05;

    /// Seconds between move-availability scans
    pub const SCAN_INTERVAL: f32 = 0.5;
    /// Hint blink fires when idle time enters [min, max)
    pub const HINT_IDLE_MIN: f32 = 3.0;
    pub const HINT_IDLE_MAX: f32 = 5.0;
    /// Consecutive all-blocked scans before declaring a stalemate
    pub const STALEMATE_SCANS: u32 = 5;

    /// Endgame puzzle layout caps
    pub const MAX_VISIBLE_SCREWS: usize = 10;
    pub const MAX_PUZZLE_HOLES: usize = 2;

    /// Endgame screw/hole row placement
    pub const TOP_ROW_Y: f32 = 5.0;
    pub const SECOND_ROW_Y: f32 = 3.0;
    pub const PUZZLE_ROW_Y: f32 = -5.0;
    /// Horizontal spacing between arranged slots
    pub const ROW_GAP: f32 = 1.8;

    /// Seconds of arrangement time per screw/hole pair
    pub const ARRANGE_STEP: f32 = 0.25;
    /// Settle time after the last pair lands, before the question shows
    pub const ARRANGE_SETTLE: f32 = 0.5;

    /// Seconds between idle shake reminders while the puzzle is active
    pub const PUZZLE_SHAKE_INTERVAL: f32 = 2.0;
}
