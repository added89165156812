//! Error taxonomy for the simulation core.
//!
//! Gameplay errors never escape the session: command handlers log them and
//! turn them into no-ops. Persistence and config errors fall back to fresh
//! defaults at the call site.

use std::path::PathBuf;

use thiserror::Error;

use crate::shared::{ItemKind, TilePos};

/// Alias for `Result<T, GameError>`.
pub type GameResult<T> = Result<T, GameError>;

#[derive(Debug, Error)]
pub enum GameError {
    /// Tile coordinate outside the configured world extent.
    #[error("tile {pos} is outside the {width}x{height} world")]
    OutOfBounds { pos: TilePos, width: i32, height: i32 },

    /// Tile is occupied or its terrain does not allow the action.
    #[error("tile {pos} cannot be used: {reason}")]
    InvalidTile { pos: TilePos, reason: &'static str },

    /// Harvest requested before the crop reached its final stage.
    #[error("nothing harvestable at {0}")]
    NotHarvestable(TilePos),

    /// Hotbar index at or beyond the slot count.
    #[error("hotbar index {index} out of range (slots: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("slot {index} holds {available}, cannot remove {requested}")]
    InsufficientQuantity {
        index: usize,
        requested: u32,
        available: u32,
    },

    #[error("costs {price}g but only {money}g available")]
    InsufficientFunds { price: u32, money: u32 },

    #[error("the shop is not open")]
    ShopClosed,

    #[error("{0:?} is not sold here")]
    NotForSale(ItemKind),

    #[error("the quest board is not open")]
    QuestBoardClosed,

    #[error("no quest with id {0}")]
    UnknownQuest(u32),

    #[error("already tracking {0} quests")]
    QuestLimitReached(usize),

    /// Save data exists but could not be decoded.
    #[error("corrupt save: {0}")]
    CorruptSave(String),

    #[error("no save at {}", .0.display())]
    MissingSave(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid key binding: {0}")]
    InvalidBinding(String),
}
