//! Classifies raw input into game commands. No game rules live here.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::config::GameConfig;
use crate::error::GameResult;
use crate::inventory::{wrap_next, wrap_prev};
use crate::shared::*;

use super::bindings::{HotbarKeyMap, KeyBindings};

/// Held keys and the last pointer position. Reset with every session.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputAccumulator {
    held: HashSet<KeyCode>,
    pointer: Option<Vec2>,
}

impl InputAccumulator {
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }
}

/// What the router needs to know about the session to classify an event.
///
/// Built once per frame and carried through the batch: each routed command
/// updates it, so later events see the selection, pause and overlays the
/// earlier ones produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteContext {
    /// A session exists. Without one the pause key changes nothing.
    pub in_session: bool,
    /// True whenever gameplay is not running (paused, or no session).
    pub paused: bool,
    pub modes: UiModes,
    pub selected_slot: usize,
    pub slot_count: usize,
    pub tile_size: f32,
}

impl RouteContext {
    pub fn overlay_open(&self) -> bool {
        self.modes.overlay_open()
    }

    /// Fold a routed command into the context for the rest of the batch.
    pub fn advance(&mut self, command: GameCommand) {
        match command {
            GameCommand::SelectSlot(slot) => self.selected_slot = slot,
            GameCommand::TogglePause if self.in_session => self.paused = !self.paused,
            GameCommand::ToggleShop => self.modes.toggle_shop(),
            GameCommand::ToggleQuestBoard => self.modes.toggle_quest_board(),
            _ => {}
        }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputRouter {
    bindings: KeyBindings,
    hotbar_keys: HotbarKeyMap,
}

impl InputRouter {
    pub fn new(bindings: KeyBindings, hotbar_keys: HotbarKeyMap) -> GameResult<Self> {
        bindings.validate(&hotbar_keys)?;
        Ok(Self {
            bindings,
            hotbar_keys,
        })
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Update the accumulator, classify one event and carry its effect
    /// forward in `ctx`.
    pub fn route(
        &self,
        input: RawInput,
        acc: &mut InputAccumulator,
        ctx: &mut RouteContext,
    ) -> Option<GameCommand> {
        let command = self.classify(input, acc, ctx)?;
        ctx.advance(command);
        Some(command)
    }

    fn classify(
        &self,
        input: RawInput,
        acc: &mut InputAccumulator,
        ctx: &RouteContext,
    ) -> Option<GameCommand> {
        match input {
            RawInput::KeyDown(key) => {
                acc.held.insert(key);
                self.route_key(key, ctx)
            }
            RawInput::KeyUp(key) => {
                acc.held.remove(&key);
                None
            }
            RawInput::PointerMoved(position) => {
                acc.pointer = Some(position);
                None
            }
            RawInput::Click { position, button } => {
                acc.pointer = Some(position);
                if ctx.paused || ctx.overlay_open() {
                    return None;
                }
                let tile = TilePos::from_world(position, ctx.tile_size);
                match button {
                    MouseButton::Right => Some(GameCommand::SecondaryAction(tile)),
                    MouseButton::Left => Some(GameCommand::InteractWithTile(tile)),
                    _ => None,
                }
            }
            RawInput::Scroll(delta) => {
                if ctx.paused || delta == 0.0 {
                    return None;
                }
                let next = if delta < 0.0 {
                    wrap_next(ctx.selected_slot, ctx.slot_count)
                } else {
                    wrap_prev(ctx.selected_slot, ctx.slot_count)
                };
                Some(GameCommand::SelectSlot(next))
            }
        }
    }

    fn route_key(&self, key: KeyCode, ctx: &RouteContext) -> Option<GameCommand> {
        // System actions first, regardless of pause
        if key == self.bindings.pause {
            return Some(GameCommand::TogglePause);
        }
        if key == self.bindings.quicksave {
            return Some(GameCommand::QuickSave);
        }

        if ctx.paused {
            return None;
        }
        if let Some(slot) = self.hotbar_keys.slot_for(key) {
            return Some(GameCommand::SelectSlot(slot));
        }
        if key == self.bindings.toggle_shop {
            return Some(GameCommand::ToggleShop);
        }
        if key == self.bindings.toggle_quest_board {
            return Some(GameCommand::ToggleQuestBoard);
        }
        if key == self.bindings.toggle_weather {
            return Some(GameCommand::ToggleWeather);
        }
        if key == self.bindings.drop_item && !ctx.overlay_open() {
            return Some(GameCommand::DropItemFromHotbar(ctx.selected_slot));
        }
        None
    }
}

impl FromWorld for InputRouter {
    fn from_world(world: &mut World) -> Self {
        let slots = world
            .get_resource::<GameConfig>()
            .map_or(DEFAULT_HOTBAR_SLOTS, |c| c.hotbar_slots);
        let bindings = world
            .get_resource::<KeyBindings>()
            .cloned()
            .unwrap_or_default();
        let hotbar_keys = HotbarKeyMap::digit_row(slots);
        match Self::new(bindings, hotbar_keys.clone()) {
            Ok(router) => router,
            Err(e) => {
                warn!("[Input] {}; falling back to default bindings", e);
                Self {
                    bindings: KeyBindings::default(),
                    hotbar_keys,
                }
            }
        }
    }
}
