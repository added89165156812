//! Shared states, value types and events for Furrow.
//!
//! This is the type contract. Every domain module imports from here; domains
//! talk to each other through these events and the session resource.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    MainMenu,
    Running,
    Paused,
}

/// Transient overlay flags inside `Running`. They gate clicks and movement
/// at the router level but never stop the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiModes {
    pub shop_open: bool,
    pub quest_board_open: bool,
    pub weather_enabled: bool,
}

impl UiModes {
    pub fn overlay_open(&self) -> bool {
        self.shop_open || self.quest_board_open
    }

    /// Opening one overlay closes the other.
    pub fn toggle_shop(&mut self) {
        self.shop_open = !self.shop_open;
        if self.shop_open {
            self.quest_board_open = false;
        }
    }

    pub fn toggle_quest_board(&mut self) {
        self.quest_board_open = !self.quest_board_open;
        if self.quest_board_open {
            self.shop_open = false;
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GRID
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world-space pixel position.
    pub fn from_world(world: Vec2, tile_size: f32) -> Self {
        Self {
            x: (world.x / tile_size).floor() as i32,
            y: (world.y / tile_size).floor() as i32,
        }
    }

    /// Centre of this tile in world-space pixels.
    pub fn center(self, tile_size: f32) -> Vec2 {
        Vec2::new(
            (self.x as f32 + 0.5) * tile_size,
            (self.y as f32 + 0.5) * tile_size,
        )
    }

    pub fn chebyshev_distance(self, other: TilePos) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Female,
    Male,
    Unspecified,
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS & ITEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CropKind {
    Parsnip,
    Potato,
    Strawberry,
    Pumpkin,
}

impl CropKind {
    pub const ALL: [CropKind; 4] = [
        CropKind::Parsnip,
        CropKind::Potato,
        CropKind::Strawberry,
        CropKind::Pumpkin,
    ];

    /// Number of growth stages including the seeded and harvestable ones.
    pub fn stage_count(self) -> u8 {
        match self {
            CropKind::Parsnip => 4,
            CropKind::Potato => 5,
            CropKind::Strawberry => 5,
            CropKind::Pumpkin => 6,
        }
    }

    /// The terminal (harvestable) stage.
    pub fn harvest_stage(self) -> u8 {
        self.stage_count() - 1
    }

    /// Real seconds spent in each stage at growth rate 1.0.
    pub fn seconds_per_stage(self) -> f32 {
        match self {
            CropKind::Parsnip => 20.0,
            CropKind::Potato => 30.0,
            CropKind::Strawberry => 25.0,
            CropKind::Pumpkin => 45.0,
        }
    }

    /// Produce units per harvest.
    pub fn yield_quantity(self) -> u32 {
        match self {
            CropKind::Parsnip => 1,
            CropKind::Potato => 2,
            CropKind::Strawberry => 3,
            CropKind::Pumpkin => 1,
        }
    }

    pub fn seed_price(self) -> u32 {
        match self {
            CropKind::Parsnip => 20,
            CropKind::Potato => 50,
            CropKind::Strawberry => 100,
            CropKind::Pumpkin => 100,
        }
    }

    pub fn produce_price(self) -> u32 {
        match self {
            CropKind::Parsnip => 35,
            CropKind::Potato => 80,
            CropKind::Strawberry => 120,
            CropKind::Pumpkin => 320,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CropKind::Parsnip => "Parsnip",
            CropKind::Potato => "Potato",
            CropKind::Strawberry => "Strawberry",
            CropKind::Pumpkin => "Pumpkin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Seeds(CropKind),
    Produce(CropKind),
    Bread,
    Salad,
    FenceKit,
}

impl ItemKind {
    pub fn max_stack(self) -> u32 {
        match self {
            ItemKind::Seeds(_) | ItemKind::Produce(_) => 99,
            ItemKind::Bread | ItemKind::Salad => 20,
            ItemKind::FenceKit => 50,
        }
    }

    /// Stamina restored by eating one unit, `None` if not edible.
    pub fn food_energy(self) -> Option<f32> {
        match self {
            ItemKind::Bread => Some(40.0),
            ItemKind::Salad => Some(25.0),
            ItemKind::Produce(CropKind::Strawberry) => Some(15.0),
            ItemKind::Produce(CropKind::Parsnip) => Some(10.0),
            _ => None,
        }
    }

    pub fn is_food(self) -> bool {
        self.food_energy().is_some()
    }

    /// The crop this item plants, if it is a seed packet.
    pub fn seed_crop(self) -> Option<CropKind> {
        match self {
            ItemKind::Seeds(crop) => Some(crop),
            _ => None,
        }
    }

    /// Shop price per unit; `None` = not sold.
    pub fn buy_price(self) -> Option<u32> {
        match self {
            ItemKind::Seeds(crop) => Some(crop.seed_price()),
            ItemKind::Bread => Some(60),
            ItemKind::Salad => Some(120),
            ItemKind::FenceKit => Some(10),
            ItemKind::Produce(_) => None,
        }
    }

    /// Base sell price per unit before the quality multiplier.
    pub fn sell_price(self) -> u32 {
        match self {
            ItemKind::Seeds(crop) => crop.seed_price() / 2,
            ItemKind::Produce(crop) => crop.produce_price(),
            ItemKind::Bread => 25,
            ItemKind::Salad => 50,
            ItemKind::FenceKit => 5,
        }
    }

    pub fn name(self) -> String {
        match self {
            ItemKind::Seeds(crop) => format!("{} Seeds", crop.name()),
            ItemKind::Produce(crop) => crop.name().to_string(),
            ItemKind::Bread => "Bread".to_string(),
            ItemKind::Salad => "Salad".to_string(),
            ItemKind::FenceKit => "Fence Kit".to_string(),
        }
    }
}

/// Per-stack metadata. Affects sell price; stacks of different quality never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemQuality {
    #[default]
    Normal,
    Silver,
    Gold,
}

impl ItemQuality {
    pub fn sell_multiplier(&self) -> f32 {
        match self {
            ItemQuality::Normal => 1.0,
            ItemQuality::Silver => 1.25,
            ItemQuality::Gold => 1.5,
        }
    }
}

/// A non-empty stack. Empty slots are `None`, never a zero-quantity stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub kind: ItemKind,
    pub quantity: u32,
    #[serde(default)]
    pub quality: ItemQuality,
}

impl ItemStack {
    pub fn new(kind: ItemKind, quantity: u32) -> Self {
        Self {
            kind,
            quantity,
            quality: ItemQuality::Normal,
        }
    }

    pub fn with_quality(mut self, quality: ItemQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn stacks_with(&self, other: &ItemStack) -> bool {
        self.kind == other.kind && self.quality == other.quality
    }

    /// Sale value of the whole stack.
    pub fn sell_value(&self) -> u32 {
        let unit = (self.kind.sell_price() as f32 * self.quality.sell_multiplier()).round() as u32;
        unit.saturating_mul(self.quantity)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT FEED & COMMANDS
// ═══════════════════════════════════════════════════════════════════════

/// Raw input as delivered by the host. Pointer positions are world-space pixels.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum RawInput {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    PointerMoved(Vec2),
    Click { position: Vec2, button: MouseButton },
    /// Positive = wheel up, negative = wheel down.
    Scroll(f32),
}

/// Discrete commands consumed by the game manager.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum GameCommand {
    TogglePause,
    QuickSave,
    ReturnToMainMenu,
    SelectSlot(usize),
    InteractWithTile(TilePos),
    /// Secondary button: toggle a fence there, otherwise eat the held item.
    SecondaryAction(TilePos),
    DropItemFromHotbar(usize),
    SwapHotbar(usize, usize),
    ToggleShop,
    ToggleQuestBoard,
    ToggleWeather,
    BuyItem { kind: ItemKind, quantity: u32 },
    SellSlot { index: usize, quantity: u32 },
    AcceptQuest(u32),
    TurnInQuest(u32),
}

impl GameCommand {
    /// System commands are honoured in every session state.
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            GameCommand::TogglePause | GameCommand::QuickSave | GameCommand::ReturnToMainMenu
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: session lifecycle and notifications
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the main menu to begin a session.
#[derive(Event, Debug, Clone)]
pub struct StartGameRequest {
    /// Load this slot first; `None` = new game.
    pub load_slot: Option<u8>,
    pub player_name: String,
    pub gender: Gender,
}

impl StartGameRequest {
    pub fn new_game(player_name: impl Into<String>) -> Self {
        Self {
            load_slot: None,
            player_name: player_name.into(),
            gender: Gender::default(),
        }
    }

    pub fn load(slot: u8) -> Self {
        Self {
            load_slot: Some(slot),
            player_name: String::new(),
            gender: Gender::default(),
        }
    }
}

/// Sent by the host (pause menu) to save the running session.
#[derive(Event, Debug, Clone, Copy)]
pub struct SaveRequest {
    pub slot: u8,
}

/// The session was torn down; the shell should rebuild its menu UI.
#[derive(Event, Debug, Clone, Copy)]
pub struct ReturnedToMainMenu;

/// State-change notifications for presentation.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { loaded: bool },
    LoadFailed { slot: u8, reason: String },
    PauseChanged { paused: bool },
    CropPlanted { pos: TilePos, crop: CropKind },
    CropStageAdvanced { pos: TilePos, stage: u8 },
    CropHarvested { pos: TilePos, stack: ItemStack },
    FencePlaced { pos: TilePos },
    FenceToggled { pos: TilePos, open: bool },
    ItemDropped { pos: TilePos, stack: ItemStack },
    ItemsPickedUp { pos: TilePos, stack: ItemStack },
    ItemEaten { kind: ItemKind, stamina: f32 },
    HotbarSelectionChanged { index: usize },
    HotbarSwapped { a: usize, b: usize },
    MoneyChanged { money: u32 },
    ModesChanged { modes: UiModes },
    QuestPosted { id: u32 },
    QuestAccepted { id: u32 },
    QuestCompleted { id: u32, reward: u32 },
    Saved { slot: u8 },
    SaveFailed { slot: u8, reason: String },
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 16.0;
pub const DEFAULT_HOTBAR_SLOTS: usize = 10;
pub const DEFAULT_WORLD_WIDTH: i32 = 64;
pub const DEFAULT_WORLD_HEIGHT: i32 = 48;
pub const MAX_STAMINA: f32 = 100.0;
pub const STARTING_MONEY: u32 = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_from_world_floors_negative_coordinates() {
        assert_eq!(TilePos::from_world(Vec2::new(-0.5, 15.9), 16.0), TilePos::new(-1, 0));
        assert_eq!(TilePos::from_world(Vec2::new(56.0, 72.0), 16.0), TilePos::new(3, 4));
    }

    #[test]
    fn test_tile_center_round_trips() {
        let pos = TilePos::new(3, 4);
        assert_eq!(TilePos::from_world(pos.center(TILE_SIZE), TILE_SIZE), pos);
    }

    #[test]
    fn test_stacks_merge_only_with_same_quality() {
        let normal = ItemStack::new(ItemKind::Produce(CropKind::Potato), 3);
        let gold = normal.with_quality(ItemQuality::Gold);
        assert!(normal.stacks_with(&normal));
        assert!(!normal.stacks_with(&gold));
    }

    #[test]
    fn test_sell_value_applies_quality() {
        let stack = ItemStack::new(ItemKind::Produce(CropKind::Parsnip), 2).with_quality(ItemQuality::Gold);
        // 35 * 1.5 = 52.5 → 53 per unit
        assert_eq!(stack.sell_value(), 106);
    }

    #[test]
    fn test_food_and_seed_classification() {
        assert!(ItemKind::Bread.is_food());
        assert!(!ItemKind::FenceKit.is_food());
        assert_eq!(ItemKind::Seeds(CropKind::Pumpkin).seed_crop(), Some(CropKind::Pumpkin));
        assert_eq!(ItemKind::Produce(CropKind::Pumpkin).seed_crop(), None);
    }

    #[test]
    fn test_system_commands() {
        assert!(GameCommand::TogglePause.is_system());
        assert!(GameCommand::ReturnToMainMenu.is_system());
        assert!(!GameCommand::SelectSlot(2).is_system());
    }
}
