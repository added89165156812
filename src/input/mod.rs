//! Input router plugin: the single point where raw input becomes game commands.

pub mod bindings;
pub mod router;

use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseButtonInput, MouseWheel};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::CursorMoved;

use crate::config::GameConfig;
use crate::session::GameSession;
use crate::shared::*;

pub use bindings::{HotbarKeyMap, KeyBindings};
pub use router::{InputAccumulator, InputRouter, RouteContext};

pub struct InputRouterPlugin;

impl Plugin for InputRouterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>()
            .init_resource::<InputAccumulator>()
            .init_resource::<InputRouter>()
            .add_event::<RawInput>()
            .add_event::<GameCommand>()
            .add_systems(PreUpdate, route_raw_input);
    }
}

/// Feeds the router from a window host. Not needed when the host sends
/// `RawInput` itself (headless runs and tests).
///
/// Cursor positions are forwarded untransformed, so a host with a camera
/// should send `RawInput` in world space instead.
pub struct BevyInputBridgePlugin;

impl Plugin for BevyInputBridgePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<KeyboardInput>()
            .add_event::<MouseButtonInput>()
            .add_event::<MouseWheel>()
            .add_event::<CursorMoved>()
            .add_systems(PreUpdate, bridge_bevy_input.before(route_raw_input));
    }
}

fn route_raw_input(
    mut raw: EventReader<RawInput>,
    mut commands: EventWriter<GameCommand>,
    mut acc: ResMut<InputAccumulator>,
    router: Res<InputRouter>,
    state: Res<State<GameState>>,
    config: Res<GameConfig>,
    session: Option<Res<GameSession>>,
) {
    let mut ctx = match session.as_deref() {
        Some(session) => RouteContext {
            // The first frame after a start still reads MainMenu here
            in_session: *state.get() != GameState::MainMenu,
            paused: *state.get() != GameState::Running,
            modes: session.modes(),
            selected_slot: session.hotbar().selected(),
            slot_count: session.hotbar().len(),
            tile_size: config.tile_size,
        },
        None => RouteContext {
            in_session: false,
            paused: true,
            modes: UiModes::default(),
            selected_slot: 0,
            slot_count: config.hotbar_slots,
            tile_size: config.tile_size,
        },
    };

    for input in raw.read() {
        if let Some(command) = router.route(*input, &mut acc, &mut ctx) {
            debug!("[Input] {:?} -> {:?}", input, command);
            commands.send(command);
        }
    }
}

fn bridge_bevy_input(
    mut keys: EventReader<KeyboardInput>,
    mut buttons: EventReader<MouseButtonInput>,
    mut wheel: EventReader<MouseWheel>,
    mut cursor: EventReader<CursorMoved>,
    acc: Res<InputAccumulator>,
    mut raw: EventWriter<RawInput>,
) {
    // Cursor first so clicks this frame use the newest position
    let mut pointer = acc.pointer();
    for ev in cursor.read() {
        pointer = Some(ev.position);
        raw.send(RawInput::PointerMoved(ev.position));
    }
    for ev in keys.read() {
        match ev.state {
            ButtonState::Pressed if !ev.repeat => {
                raw.send(RawInput::KeyDown(ev.key_code));
            }
            ButtonState::Released => {
                raw.send(RawInput::KeyUp(ev.key_code));
            }
            _ => {}
        }
    }
    for ev in buttons.read() {
        if ev.state != ButtonState::Pressed {
            continue;
        }
        let Some(position) = pointer else {
            continue;
        };
        raw.send(RawInput::Click {
            position,
            button: ev.button,
        });
    }
    for ev in wheel.read() {
        if ev.y != 0.0 {
            raw.send(RawInput::Scroll(ev.y));
        }
    }
}
