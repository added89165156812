//! Game manager: owns the session resource and the state machine around it.
//!
//! `MainMenu → Running ⇄ Paused → MainMenu`. The session resource exists
//! exactly while the state is Running or Paused.

pub mod lifecycle;
pub mod snapshot;
pub mod state;
pub mod tick;

use bevy::prelude::*;

use crate::shared::*;

pub use lifecycle::build_session;
pub use snapshot::{PlayerView, RenderSnapshot, SessionSnapshot};
pub use state::GameSession;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_event::<GameCommand>()
            .add_event::<StartGameRequest>()
            .add_event::<ReturnedToMainMenu>()
            .add_event::<SessionEvent>()
            .init_resource::<RenderSnapshot>()
            .add_systems(
                Update,
                (
                    lifecycle::start_game.run_if(in_state(GameState::MainMenu)),
                    lifecycle::handle_system_commands,
                    tick::apply_gameplay_commands.run_if(resource_exists::<GameSession>),
                    tick::tick_session
                        .run_if(in_state(GameState::Running))
                        .run_if(resource_exists::<GameSession>),
                    tick::advance_paused_cosmetics
                        .run_if(in_state(GameState::Paused))
                        .run_if(resource_exists::<GameSession>),
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (lifecycle::drain_outbox, snapshot::publish_snapshot).chain(),
            );
    }
}
