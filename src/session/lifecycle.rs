//! Session start, pause and teardown.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::input::InputAccumulator;
use crate::save::SaveStore;
use crate::shared::*;

use super::GameSession;

pub const DEFAULT_PLAYER_NAME: &str = "Farmer";

/// Build the session a start request asks for. A failed load is logged and
/// replaced by a fresh farm; the caller never sees the error.
pub fn build_session(request: &StartGameRequest, config: &GameConfig) -> GameSession {
    let name = match request.player_name.trim() {
        "" => DEFAULT_PLAYER_NAME,
        name => name,
    };

    let Some(slot) = request.load_slot else {
        info!("[Session] New game for {}", name);
        let mut session = GameSession::new_game(name, request.gender, config);
        session.push_event(SessionEvent::Started { loaded: false });
        return session;
    };

    match SaveStore::new(&config.save_dir).load(slot) {
        Ok(data) => {
            info!("[Session] Loaded slot {} ({})", slot, data.player.name);
            let mut session = GameSession::from_save(data, config);
            session.push_event(SessionEvent::Started { loaded: true });
            session
        }
        Err(e) => {
            warn!("[Session] Load from slot {} failed: {}. Starting a new game.", slot, e);
            let mut session = GameSession::new_game(name, request.gender, config);
            session.push_event(SessionEvent::LoadFailed {
                slot,
                reason: e.to_string(),
            });
            session.push_event(SessionEvent::Started { loaded: false });
            session
        }
    }
}

pub(crate) fn start_game(
    mut requests: EventReader<StartGameRequest>,
    config: Res<GameConfig>,
    mut commands: Commands,
    mut input: ResMut<InputAccumulator>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // Only the newest request matters if the menu sent several
    let Some(request) = requests.read().last() else {
        return;
    };
    commands.insert_resource(build_session(request, &config));
    *input = InputAccumulator::default();
    next_state.set(GameState::Running);
}

pub(crate) fn handle_system_commands(
    mut reader: EventReader<GameCommand>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut session: Option<ResMut<GameSession>>,
    mut commands: Commands,
    mut input: ResMut<InputAccumulator>,
    mut returned: EventWriter<ReturnedToMainMenu>,
) {
    let mut current = *state.get();
    for command in reader.read() {
        match command {
            GameCommand::TogglePause => {
                let next = match current {
                    GameState::Running => GameState::Paused,
                    GameState::Paused => GameState::Running,
                    GameState::MainMenu => continue,
                };
                info!("[Session] {:?} -> {:?}", current, next);
                current = next;
                next_state.set(next);
                if let Some(session) = session.as_deref_mut() {
                    session.push_event(SessionEvent::PauseChanged {
                        paused: next == GameState::Paused,
                    });
                }
            }
            GameCommand::ReturnToMainMenu => {
                if current == GameState::MainMenu {
                    continue;
                }
                info!("[Session] Returning to main menu");
                commands.remove_resource::<GameSession>();
                *input = InputAccumulator::default();
                returned.send(ReturnedToMainMenu);
                current = GameState::MainMenu;
                next_state.set(GameState::MainMenu);
            }
            _ => {}
        }
    }
}

/// Move queued notifications out of the session into Bevy events.
pub(crate) fn drain_outbox(
    session: Option<ResMut<GameSession>>,
    mut events: EventWriter<SessionEvent>,
) {
    let Some(mut session) = session else {
        return;
    };
    for event in session.drain_events() {
        events.send(event);
    }
}
