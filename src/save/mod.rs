use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::inventory::Hotbar;
use crate::player::Player;
use crate::quests::QuestBoard;
use crate::session::GameSession;
use crate::shared::*;
use crate::world::WorldGrid;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

pub const SAVE_VERSION: u32 = 1;
/// Slot written by the quicksave key.
pub const QUICKSAVE_SLOT: u8 = 0;

/// Everything needed to rebuild a session. Transient state (overlays,
/// weather, queued clicks, held keys) is deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub player: Player,
    pub world: WorldGrid,
    pub hotbar: Hotbar,
    #[serde(default)]
    pub quests: QuestBoard,
    #[serde(default)]
    pub clock: f64,
}

impl SaveData {
    pub fn capture(session: &GameSession) -> Self {
        Self {
            version: SAVE_VERSION,
            player: session.player().clone(),
            world: session.world().clone(),
            hotbar: session.hotbar().clone(),
            quests: session.quests().clone(),
            clock: session.clock(),
        }
    }
}

pub fn encode(session: &GameSession) -> GameResult<Vec<u8>> {
    serde_json::to_vec_pretty(&SaveData::capture(session))
        .map_err(|e| GameError::CorruptSave(format!("serialize failed: {e}")))
}

/// Parse and sanity-check a save blob.
pub fn decode(bytes: &[u8]) -> GameResult<SaveData> {
    let data: SaveData =
        serde_json::from_slice(bytes).map_err(|e| GameError::CorruptSave(e.to_string()))?;
    if data.version > SAVE_VERSION {
        return Err(GameError::CorruptSave(format!(
            "save version {} is newer than supported {}",
            data.version, SAVE_VERSION
        )));
    }
    if !data.world.is_consistent() {
        return Err(GameError::CorruptSave("world tiles do not match its size".into()));
    }
    if !data.hotbar.is_consistent() {
        return Err(GameError::CorruptSave("hotbar selection or stacks invalid".into()));
    }
    if !data.player.is_valid() {
        return Err(GameError::CorruptSave("player position or stamina out of range".into()));
    }
    if !data.clock.is_finite() || data.clock < 0.0 {
        return Err(GameError::CorruptSave("session clock out of range".into()));
    }
    Ok(data)
}

// ═══════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════

/// One JSON file per slot under a directory.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: u8) -> PathBuf {
        self.dir.join(format!("slot_{}.json", slot))
    }

    pub fn exists(&self, slot: u8) -> bool {
        self.slot_path(slot).exists()
    }

    /// Write to a temp file first, then rename over the slot.
    pub fn write(&self, slot: u8, bytes: &[u8]) -> GameResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.slot_path(slot);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn read(&self, slot: u8) -> GameResult<Vec<u8>> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(GameError::MissingSave(path));
        }
        Ok(fs::read(&path)?)
    }

    pub fn save(&self, slot: u8, session: &GameSession) -> GameResult<()> {
        self.write(slot, &encode(session)?)
    }

    pub fn load(&self, slot: u8) -> GameResult<SaveData> {
        decode(&self.read(slot)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequest>().add_systems(
            Update,
            handle_save_requests
                .run_if(resource_exists::<GameSession>)
                .run_if(in_state(GameState::Running).or(in_state(GameState::Paused))),
        );
    }
}

fn handle_save_requests(
    mut requests: EventReader<SaveRequest>,
    mut commands: EventReader<GameCommand>,
    mut session: ResMut<GameSession>,
    config: Res<GameConfig>,
) {
    let mut slots: Vec<u8> = requests.read().map(|r| r.slot).collect();
    slots.extend(
        commands
            .read()
            .filter(|c| matches!(c, GameCommand::QuickSave))
            .map(|_| QUICKSAVE_SLOT),
    );
    if slots.is_empty() {
        return;
    }
    slots.dedup();

    let store = SaveStore::new(&config.save_dir);
    for slot in slots {
        info!("[Save] Saving to slot {}...", slot);
        match store.save(slot, &session) {
            Ok(()) => {
                info!("[Save] Slot {} written to {}", slot, store.slot_path(slot).display());
                session.push_event(SessionEvent::Saved { slot });
            }
            Err(e) => {
                warn!("[Save] Slot {} FAILED: {}", slot, e);
                session.push_event(SessionEvent::SaveFailed {
                    slot,
                    reason: e.to_string(),
                });
            }
        }
    }
}
