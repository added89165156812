//! Per-frame systems that run against the live session.

use bevy::prelude::*;

use crate::input::{InputAccumulator, InputRouter};
use crate::player::MoveIntent;
use crate::shared::*;

use super::GameSession;

/// Feed gameplay commands to the session. System commands are left to the
/// lifecycle systems, but a pause toggle in the batch still decides whether
/// the commands after it apply.
pub(crate) fn apply_gameplay_commands(
    mut reader: EventReader<GameCommand>,
    state: Res<State<GameState>>,
    mut session: ResMut<GameSession>,
) {
    let mut running = match state.get() {
        GameState::Running => true,
        GameState::Paused => false,
        GameState::MainMenu => {
            reader.clear();
            return;
        }
    };
    let mut left = false;
    for command in reader.read() {
        match *command {
            GameCommand::TogglePause if !left => running = !running,
            GameCommand::ReturnToMainMenu => left = true,
            command if command.is_system() => {}
            command if running && !left => session.execute(command),
            command => debug!("[Session] Dropped {:?} issued while paused", command),
        }
    }
}

pub(crate) fn tick_session(
    time: Res<Time>,
    input: Res<InputAccumulator>,
    router: Res<InputRouter>,
    mut session: ResMut<GameSession>,
) {
    let intent = MoveIntent::from_held_keys(&input, router.bindings());
    session.tick(time.delta_secs(), intent);
}

pub(crate) fn advance_paused_cosmetics(time: Res<Time>, mut session: ResMut<GameSession>) {
    session.advance_cosmetics(time.delta_secs());
}
