//! Authored level data
//!
//! Levels are a pure data description: base hole positions, plank placements
//! with their layer, and optional locked-hole entries. Catalogs are loaded
//! from JSON and never mutated at runtime.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Plank footprint variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlankKind {
    Size1,
    Size2,
    Size3,
    Size4,
    Size5,
    Size6,
    CShape,
    Circle,
    Donut,
    Dot,
    Plus,
    LShape,
    Rect,
    Rhombus,
    UShape,
    BigSquare,
    SmallSquare,
    Triangle,
    EShape,
    Star,
}

/// A base hole slot on the board
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HoleSpec {
    pub position: Vec2,
    /// Whether a screw starts seated in this hole
    #[serde(default)]
    pub has_screw: bool,
}

/// One plank placement within a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlankSpec {
    pub kind: PlankKind,
    /// Depth layer; planks only collide within the same layer
    pub layer: i32,
    pub position: Vec2,
    /// Rotation in radians
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: Vec2,
    /// Screw attachment points in plank-local space
    pub screw_holes: Vec<Vec2>,
}

fn default_scale() -> Vec2 {
    Vec2::ONE
}

/// How a locked hole can be opened (opaque to the core)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnlockKind {
    #[default]
    None,
    RewardedAd,
}

/// Marks one base hole as initially unusable
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LockedHoleConfig {
    /// Index into the stage's hole list; out-of-range entries are skipped
    pub hole_index: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub unlock: UnlockKind,
}

fn default_true() -> bool {
    true
}

/// A single board setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub holes: Vec<HoleSpec>,
    pub planks: Vec<PlankSpec>,
    #[serde(default)]
    pub locked_holes: Vec<LockedHoleConfig>,
    /// Replaces the configured timer duration for this stage
    #[serde(default)]
    pub timer_override: Option<f32>,
}

/// An ordered run of stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub stages: Vec<Stage>,
    /// Replaces the configured completion reward
    #[serde(default)]
    pub reward_override: Option<u32>,
    /// Eligible for random replay after the catalog is exhausted
    #[serde(default = "default_true")]
    pub use_in_randomizer: bool,
}

/// The full authored level set
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Catalog {
    pub levels: Vec<Level>,
}

impl Catalog {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Resolve a display index to a real level index.
    ///
    /// In-range indices map to themselves. Past the end of the catalog a
    /// random replay level is picked from the randomizer pool, avoiding the
    /// most recently played one when possible.
    pub fn resolve_level_index(
        &self,
        display_index: usize,
        last_played: Option<usize>,
        rng: &mut Pcg32,
    ) -> Option<usize> {
        if display_index < self.levels.len() {
            return Some(display_index);
        }

        let pool: Vec<usize> = self
            .levels
            .iter()
            .enumerate()
            .filter(|(i, level)| level.use_in_randomizer && Some(*i) != last_played)
            .map(|(i, _)| i)
            .collect();

        if !pool.is_empty() {
            return Some(pool[rng.random_range(0..pool.len())]);
        }

        // Pool can be empty when the only randomizer level was just played
        self.levels
            .iter()
            .position(|level| level.use_in_randomizer)
            .or(if self.levels.is_empty() { None } else { Some(0) })
    }
}
