//! The live session and its command handlers.
//!
//! Every handler is a no-op when its preconditions fail. Grid and hotbar
//! errors are logged at debug level and never leave this module.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::economy::Shop;
use crate::error::GameResult;
use crate::inventory::Hotbar;
use crate::player::{apply_movement, MoveIntent, Player};
use crate::quests::QuestBoard;
use crate::save::SaveData;
use crate::shared::*;
use crate::world::{WeatherState, WorldGrid};

#[derive(Resource)]
pub struct GameSession {
    player: Player,
    world: WorldGrid,
    hotbar: Hotbar,
    modes: UiModes,
    weather: WeatherState,
    shop: Shop,
    quests: QuestBoard,
    /// Seconds of running (unpaused) time since the farm was created.
    clock: f64,
    pending: VecDeque<TilePos>,
    outbox: Vec<SessionEvent>,
    rng: StdRng,
    config: GameConfig,
}

fn session_rng(config: &GameConfig) -> StdRng {
    match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl GameSession {
    pub fn new_game(name: impl Into<String>, gender: Gender, config: &GameConfig) -> Self {
        let world = WorldGrid::generate(config);
        let player = Player::spawn(name, gender, config, &world);
        let mut session = Self {
            player,
            world,
            hotbar: Hotbar::starter(config.hotbar_slots),
            modes: UiModes::default(),
            weather: WeatherState::default(),
            shop: Shop::default(),
            quests: QuestBoard::default(),
            clock: 0.0,
            pending: VecDeque::new(),
            outbox: Vec::new(),
            rng: session_rng(config),
            config: config.clone(),
        };
        if let Some(id) = session.quests.post_random(&mut session.rng) {
            session.outbox.push(SessionEvent::QuestPosted { id });
        }
        session
    }

    pub fn from_save(data: SaveData, config: &GameConfig) -> Self {
        Self {
            player: data.player,
            world: data.world,
            hotbar: data.hotbar,
            modes: UiModes::default(),
            weather: WeatherState::default(),
            shop: Shop::default(),
            quests: data.quests,
            clock: data.clock,
            pending: VecDeque::new(),
            outbox: Vec::new(),
            rng: session_rng(config),
            config: config.clone(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Test hook for seeding scenarios. Gameplay goes through `execute`.
    #[doc(hidden)]
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn world(&self) -> &WorldGrid {
        &self.world
    }

    /// Test hook for seeding scenarios. Gameplay goes through `execute`.
    #[doc(hidden)]
    pub fn world_mut(&mut self) -> &mut WorldGrid {
        &mut self.world
    }

    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    /// Test hook for seeding scenarios. Gameplay goes through `execute`.
    #[doc(hidden)]
    pub fn hotbar_mut(&mut self) -> &mut Hotbar {
        &mut self.hotbar
    }

    pub fn modes(&self) -> UiModes {
        self.modes
    }

    pub fn weather(&self) -> &WeatherState {
        &self.weather
    }

    pub fn shop(&self) -> &Shop {
        &self.shop
    }

    pub fn quests(&self) -> &QuestBoard {
        &self.quests
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_tile(&self) -> TilePos {
        self.player.tile(self.config.tile_size)
    }

    pub fn pending_interactions(&self) -> usize {
        self.pending.len()
    }

    pub fn push_event(&mut self, event: SessionEvent) {
        self.outbox.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ── Command dispatch ────────────────────────────────────────────────────

    /// Apply one gameplay command. System commands are handled by the
    /// lifecycle systems and ignored here.
    pub fn execute(&mut self, command: GameCommand) {
        match command {
            GameCommand::SelectSlot(index) => self.change_hotbar_slot(index),
            GameCommand::InteractWithTile(pos) => self.pending.push_back(pos),
            GameCommand::SecondaryAction(pos) => self.secondary_action(pos),
            GameCommand::DropItemFromHotbar(slot) => self.drop_item_from_hotbar(slot),
            GameCommand::SwapHotbar(a, b) => self.swap_hotbar_items(a, b),
            GameCommand::ToggleShop => self.toggle_shop(),
            GameCommand::ToggleQuestBoard => self.toggle_quest_board(),
            GameCommand::ToggleWeather => self.toggle_weather(),
            GameCommand::BuyItem { kind, quantity } => self.buy(kind, quantity),
            GameCommand::SellSlot { index, quantity } => self.sell(index, quantity),
            GameCommand::AcceptQuest(id) => self.accept_quest(id),
            GameCommand::TurnInQuest(id) => self.turn_in_quest(id),
            GameCommand::TogglePause | GameCommand::QuickSave | GameCommand::ReturnToMainMenu => {}
        }
    }

    // ── Tick ────────────────────────────────────────────────────────────────

    /// One running frame: growth, movement, queued interactions, quest board, weather.
    pub fn tick(&mut self, dt: f32, intent: MoveIntent) {
        let dt = dt.max(0.0);
        self.clock += dt as f64;

        for (pos, stage) in self.world.advance_crop_growth(dt, self.config.growth_rate) {
            self.outbox.push(SessionEvent::CropStageAdvanced { pos, stage });
        }

        let intent = if self.modes.overlay_open() {
            MoveIntent::default()
        } else {
            intent
        };
        apply_movement(
            &mut self.player,
            intent,
            dt,
            self.config.player_speed,
            self.config.tile_size,
            &self.world,
        );

        while let Some(pos) = self.pending.pop_front() {
            self.interact_with_tile(pos);
        }

        if let Some(id) = self
            .quests
            .tick(dt, self.config.quest_refresh_secs, &mut self.rng)
        {
            debug!("[Quests] Posted quest {}", id);
            self.outbox.push(SessionEvent::QuestPosted { id });
        }

        self.advance_cosmetics(dt);
    }

    /// Weather easing. Runs while paused too.
    pub fn advance_cosmetics(&mut self, dt: f32) {
        self.weather.advance(dt);
    }

    // ── Tile interactions ───────────────────────────────────────────────────

    /// Primary action on a tile: harvest, else plant held seeds, else place a
    /// held fence kit, else pick up whatever lies there.
    pub fn interact_with_tile(&mut self, pos: TilePos) {
        if let Err(e) = self.world.tile_at(pos) {
            debug!("[Session] Interaction ignored: {}", e);
            return;
        }

        if self.world.crop_at(pos).is_some_and(|c| c.is_harvestable()) {
            self.harvest_at(pos);
            return;
        }

        let selected = self.hotbar.selected();
        if let Some(held) = self.hotbar.selected_stack().copied() {
            if let Some(crop) = held.kind.seed_crop() {
                match self.world.plant(pos, crop, self.clock) {
                    Ok(()) => {
                        self.consume_one(selected);
                        info!("[Farming] Planted {} at {}", crop.name(), pos);
                        self.outbox.push(SessionEvent::CropPlanted { pos, crop });
                        return;
                    }
                    Err(e) => debug!("[Farming] {}", e),
                }
            } else if held.kind == ItemKind::FenceKit && self.tile_is_free(pos) {
                match self.world.set_fence(pos, false) {
                    Ok(()) => {
                        self.consume_one(selected);
                        self.outbox.push(SessionEvent::FencePlaced { pos });
                        return;
                    }
                    Err(e) => debug!("[World] {}", e),
                }
            }
        }

        self.pick_up_at(pos);
    }

    fn tile_is_free(&self, pos: TilePos) -> bool {
        self.world.tile_at(pos).is_ok_and(|t| t.is_empty())
            && self.world.ground_items_at(pos).next().is_none()
    }

    fn consume_one(&mut self, slot: usize) {
        if let Err(e) = self.hotbar.remove_from_slot(slot, 1) {
            debug!("[Inventory] {}", e);
        }
    }

    fn roll_quality(&mut self) -> ItemQuality {
        let roll: f32 = self.rng.gen();
        if roll < 0.1 {
            ItemQuality::Gold
        } else if roll < 0.35 {
            ItemQuality::Silver
        } else {
            ItemQuality::Normal
        }
    }

    fn harvest_at(&mut self, pos: TilePos) {
        let stack = match self.world.harvest(pos) {
            Ok(stack) => stack.with_quality(self.roll_quality()),
            Err(e) => {
                debug!("[Farming] {}", e);
                return;
            }
        };
        if let Some(overflow) = self.hotbar.add_item(stack) {
            self.leave_on_ground(pos, overflow);
        }
        info!(
            "[Farming] Harvested {} x{} at {}",
            stack.kind.name(),
            stack.quantity,
            pos
        );
        self.outbox.push(SessionEvent::CropHarvested { pos, stack });
    }

    fn pick_up_at(&mut self, pos: TilePos) {
        for stack in self.world.take_ground_items(pos) {
            let left = self.hotbar.add_item(stack);
            let picked = stack.quantity - left.map_or(0, |l| l.quantity);
            if let Some(left) = left {
                self.leave_on_ground(pos, left);
            }
            if picked > 0 {
                self.outbox.push(SessionEvent::ItemsPickedUp {
                    pos,
                    stack: ItemStack {
                        quantity: picked,
                        ..stack
                    },
                });
            }
        }
    }

    fn leave_on_ground(&mut self, pos: TilePos, stack: ItemStack) {
        if let Err(e) = self.world.drop_item(pos, stack) {
            warn!("[World] Lost {:?}: {}", stack, e);
        }
    }

    /// Drop a whole slot onto the player's tile.
    pub fn drop_item_from_hotbar(&mut self, slot: usize) {
        let stack = match self.hotbar.take_slot(slot) {
            Ok(Some(stack)) => stack,
            Ok(None) => return,
            Err(e) => {
                debug!("[Inventory] {}", e);
                return;
            }
        };
        let pos = self.player_tile();
        match self.world.drop_item(pos, stack) {
            Ok(()) => self.outbox.push(SessionEvent::ItemDropped { pos, stack }),
            Err(e) => {
                debug!("[World] {}", e);
                // Put it back rather than lose it
                if let Some(rest) = self.hotbar.add_item(stack) {
                    warn!("[Inventory] Lost {:?} while restoring a failed drop", rest);
                }
            }
        }
    }

    /// Eat one unit of the held item if it is food. Nothing is eaten at
    /// full stamina.
    pub fn handle_player_eating(&mut self) {
        let selected = self.hotbar.selected();
        let Some(held) = self.hotbar.selected_stack().copied() else {
            return;
        };
        let Some(energy) = held.kind.food_energy() else {
            return;
        };
        if self.player.is_stamina_full() {
            debug!("[Player] Not hungry, {} kept", held.kind.name());
            return;
        }
        if let Err(e) = self.hotbar.remove_from_slot(selected, 1) {
            debug!("[Inventory] {}", e);
            return;
        }
        let gained = self.player.restore_stamina(energy);
        debug!("[Player] Ate {} (+{:.0} stamina)", held.kind.name(), gained);
        self.outbox.push(SessionEvent::ItemEaten {
            kind: held.kind,
            stamina: self.player.stamina,
        });
    }

    pub fn toggle_fence(&mut self, pos: TilePos) {
        match self.world.toggle_fence(pos) {
            Ok(Some(open)) => {
                debug!("[World] Fence at {} is now {}", pos, if open { "open" } else { "closed" });
                self.outbox.push(SessionEvent::FenceToggled { pos, open });
            }
            Ok(None) => {}
            Err(e) => debug!("[World] {}", e),
        }
    }

    /// Secondary button: a fence on the tile takes priority over eating.
    pub fn secondary_action(&mut self, pos: TilePos) {
        if self.world.has_fence_at(pos) {
            self.toggle_fence(pos);
        } else {
            self.handle_player_eating();
        }
    }

    pub fn change_hotbar_slot(&mut self, index: usize) {
        match self.hotbar.select_slot(index) {
            Ok(()) => self
                .outbox
                .push(SessionEvent::HotbarSelectionChanged { index }),
            Err(e) => debug!("[Inventory] {}", e),
        }
    }

    pub fn swap_hotbar_items(&mut self, a: usize, b: usize) {
        match self.hotbar.swap(a, b) {
            Ok(()) if a != b => self.outbox.push(SessionEvent::HotbarSwapped { a, b }),
            Ok(()) => {}
            Err(e) => debug!("[Inventory] {}", e),
        }
    }

    // ── Overlays ────────────────────────────────────────────────────────────

    /// Shop and quest board are never open together.
    pub fn toggle_shop(&mut self) {
        self.modes.toggle_shop();
        self.outbox.push(SessionEvent::ModesChanged { modes: self.modes });
    }

    pub fn toggle_quest_board(&mut self) {
        self.modes.toggle_quest_board();
        self.outbox.push(SessionEvent::ModesChanged { modes: self.modes });
    }

    pub fn toggle_weather(&mut self) {
        self.modes.weather_enabled = self.weather.toggle();
        self.outbox.push(SessionEvent::ModesChanged { modes: self.modes });
    }

    // ── Shop & quests ───────────────────────────────────────────────────────

    fn report(&mut self, domain: &str, result: GameResult<()>) {
        match result {
            Ok(()) => self.outbox.push(SessionEvent::MoneyChanged {
                money: self.player.money,
            }),
            Err(e) => debug!("[{}] {}", domain, e),
        }
    }

    pub fn buy(&mut self, kind: ItemKind, quantity: u32) {
        let result = self
            .shop
            .buy(self.modes.shop_open, &mut self.player, &mut self.hotbar, kind, quantity)
            .map(|purchase| {
                info!(
                    "[Economy] Bought {} x{} for {}g",
                    kind.name(),
                    purchase.quantity,
                    purchase.cost
                );
            });
        self.report("Economy", result);
    }

    pub fn sell(&mut self, index: usize, quantity: u32) {
        let result = self
            .shop
            .sell_slot(self.modes.shop_open, &mut self.player, &mut self.hotbar, index, quantity)
            .map(|sale| {
                info!(
                    "[Economy] Sold {} x{} for {}g",
                    sale.stack.kind.name(),
                    sale.stack.quantity,
                    sale.value
                );
            });
        self.report("Economy", result);
    }

    pub fn accept_quest(&mut self, id: u32) {
        match self
            .quests
            .accept(self.modes.quest_board_open, id, self.config.max_active_quests)
        {
            Ok(()) => self.outbox.push(SessionEvent::QuestAccepted { id }),
            Err(e) => debug!("[Quests] {}", e),
        }
    }

    pub fn turn_in_quest(&mut self, id: u32) {
        match self.quests.turn_in(
            self.modes.quest_board_open,
            id,
            &mut self.hotbar,
            &mut self.player,
        ) {
            Ok(reward) => {
                info!("[Quests] Quest {} complete, +{}g", id, reward);
                self.outbox.push(SessionEvent::QuestCompleted { id, reward });
                self.outbox.push(SessionEvent::MoneyChanged {
                    money: self.player.money,
                });
            }
            Err(e) => debug!("[Quests] {}", e),
        }
    }
}
