//! Runtime configuration, read from a RON file with a default for every field.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GameError, GameResult};
use crate::shared::*;

pub const DEFAULT_CONFIG_PATH: &str = "furrow.ron";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world_width: i32,
    pub world_height: i32,
    /// World-space pixels per tile.
    pub tile_size: f32,
    pub hotbar_slots: usize,
    /// Player walk speed in pixels per second.
    pub player_speed: f32,
    pub starting_money: u32,
    pub max_stamina: f32,
    /// Multiplier on crop growth speed.
    pub growth_rate: f32,
    pub save_dir: PathBuf,
    /// Seconds between quest board postings.
    pub quest_refresh_secs: f32,
    pub max_active_quests: usize,
    /// Fixed seed for quest postings and harvest quality; `None` = entropy.
    pub rng_seed: Option<u64>,
    /// Radius (in tiles) of the world slice included in the render snapshot.
    pub snapshot_radius: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            tile_size: TILE_SIZE,
            hotbar_slots: DEFAULT_HOTBAR_SLOTS,
            player_speed: 80.0,
            starting_money: STARTING_MONEY,
            max_stamina: MAX_STAMINA,
            growth_rate: 1.0,
            save_dir: PathBuf::from("saves"),
            quest_refresh_secs: 120.0,
            max_active_quests: 3,
            rng_seed: None,
            snapshot_radius: 12,
        }
    }
}

impl GameConfig {
    pub fn from_ron(text: &str) -> GameResult<Self> {
        let config: GameConfig =
            ron::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> GameResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Missing file → defaults silently; unreadable or invalid file → defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("[Config] No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("[Config] Loaded {}", path.display());
                config
            }
            Err(e) => {
                warn!("[Config] {} rejected ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.world_width <= 0 || self.world_height <= 0 {
            return Err(GameError::Config(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.hotbar_slots == 0 {
            return Err(GameError::Config("hotbar needs at least one slot".into()));
        }
        if self.tile_size <= 0.0 || self.player_speed < 0.0 || self.growth_rate < 0.0 {
            return Err(GameError::Config(
                "tile size must be positive; speed and growth rate non-negative".into(),
            ));
        }
        Ok(())
    }
}
