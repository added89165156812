//! Read-only view of the session for presentation.

use bevy::prelude::*;

use crate::quests::Quest;
use crate::shared::*;
use crate::world::{GroundItem, Tile, WeatherState};

use super::GameSession;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub name: String,
    pub position: Vec2,
    pub tile: TilePos,
    pub facing: Facing,
    pub is_moving: bool,
    pub money: u32,
    pub stamina: f32,
    pub max_stamina: f32,
}

/// Everything a renderer needs for one frame, copied out of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub player: PlayerView,
    /// Tiles within the configured radius of the player.
    pub tiles: Vec<Tile>,
    pub ground_items: Vec<GroundItem>,
    pub hotbar: Vec<Option<ItemStack>>,
    pub selected_slot: usize,
    pub modes: UiModes,
    pub weather: WeatherState,
    pub paused: bool,
    pub posted_quests: Vec<Quest>,
    pub active_quests: Vec<Quest>,
    pub clock: f64,
}

impl SessionSnapshot {
    pub fn capture(session: &GameSession, paused: bool) -> Self {
        let player = session.player();
        let tile = session.player_tile();
        let radius = session.config().snapshot_radius;
        Self {
            player: PlayerView {
                name: player.name.clone(),
                position: player.position,
                tile,
                facing: player.facing,
                is_moving: player.is_moving,
                money: player.money,
                stamina: player.stamina,
                max_stamina: player.max_stamina,
            },
            tiles: session.world().tiles_in_view(tile, radius),
            ground_items: session.world().ground_items_in_view(tile, radius),
            hotbar: session.hotbar().slots().to_vec(),
            selected_slot: session.hotbar().selected(),
            modes: session.modes(),
            weather: *session.weather(),
            paused,
            posted_quests: session.quests().posted().to_vec(),
            active_quests: session.quests().active().to_vec(),
            clock: session.clock(),
        }
    }
}

/// Rebuilt every frame; `None` outside a session.
#[derive(Resource, Debug, Clone, Default)]
pub struct RenderSnapshot(pub Option<SessionSnapshot>);

pub(crate) fn publish_snapshot(
    session: Option<Res<GameSession>>,
    state: Res<State<GameState>>,
    mut snapshot: ResMut<RenderSnapshot>,
) {
    snapshot.0 = session.map(|s| SessionSnapshot::capture(&s, *state.get() == GameState::Paused));
}
