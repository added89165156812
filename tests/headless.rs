//! Headless integration tests for Furrow.
//!
//! These drive the full plugin stack through Bevy's `MinimalPlugins`: raw
//! input goes in as `RawInput` events, and the tests observe the session
//! resource, `SessionEvent`s and the render snapshot. Time advances by a
//! fixed 100 ms per update so movement and growth are deterministic.
//!
//! Run with: `cargo test --test headless`

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use std::path::Path;
use std::time::Duration;

use furrow::config::GameConfig;
use furrow::session::{GameSession, RenderSnapshot};
use furrow::shared::*;
use furrow::FurrowPlugin;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn test_config(save_dir: &Path) -> GameConfig {
    GameConfig {
        rng_seed: Some(42),
        save_dir: save_dir.to_path_buf(),
        ..GameConfig::default()
    }
}

/// Minimal app with the whole simulation core and no host input plugins.
fn build_test_app(config: GameConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(config);
    app.add_plugins(FurrowPlugin);
    app.update();
    app
}

/// Request a new game and let the state transition land.
fn start_session(app: &mut App) {
    app.world_mut().send_event(StartGameRequest::new_game("Tester"));
    app.update(); // session inserted, NextState = Running
    app.update(); // transition applied
    assert_eq!(state(app), GameState::Running);
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn session(app: &App) -> &GameSession {
    app.world().resource::<GameSession>()
}

fn session_mut(app: &mut App) -> Mut<'_, GameSession> {
    app.world_mut().resource_mut::<GameSession>()
}

fn send(app: &mut App, input: RawInput) {
    app.world_mut().send_event(input);
}

/// Press and release a key within one frame.
fn tap(app: &mut App, key: KeyCode) {
    send(app, RawInput::KeyDown(key));
    send(app, RawInput::KeyUp(key));
    app.update();
}

fn click(app: &mut App, tile: TilePos, button: MouseButton) {
    let position = tile.center(TILE_SIZE);
    send(app, RawInput::Click { position, button });
    app.update();
}

/// Every retained event of type `E`.
fn collect_events<E: Event + Clone>(app: &App) -> Vec<E> {
    let events = app.world().resource::<Events<E>>();
    events.get_cursor().read(events).cloned().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_boot_waits_in_main_menu() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(state(&app), GameState::MainMenu);
    assert!(app.world().get_resource::<GameSession>().is_none());
    assert!(app.world().resource::<RenderSnapshot>().0.is_none());

    // Gameplay input with no session goes nowhere
    tap(&mut app, KeyCode::Digit3);
    assert!(collect_events::<GameCommand>(&app).is_empty());
}

#[test]
fn test_new_game_starts_running_with_starter_kit() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let s = session(&app);
    assert_eq!(s.player().name, "Tester");
    assert_eq!(s.player().money, STARTING_MONEY);
    assert_eq!(s.hotbar().len(), DEFAULT_HOTBAR_SLOTS);
    assert!(s.hotbar().count(ItemKind::Seeds(CropKind::Parsnip)) > 0);

    let snapshot = app.world().resource::<RenderSnapshot>().0.clone().unwrap();
    assert_eq!(snapshot.player.money, STARTING_MONEY);
    assert_eq!(snapshot.hotbar.len(), DEFAULT_HOTBAR_SLOTS);
    assert!(!snapshot.tiles.is_empty());
    assert!(!snapshot.paused);
}

#[test]
fn test_return_to_main_menu_clears_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    send(&mut app, RawInput::KeyDown(KeyCode::KeyD));
    app.world_mut().send_event(GameCommand::ReturnToMainMenu);
    app.update();
    assert_eq!(collect_events::<ReturnedToMainMenu>(&app).len(), 1);
    app.update();

    assert_eq!(state(&app), GameState::MainMenu);
    assert!(app.world().get_resource::<GameSession>().is_none());
    assert!(app.world().resource::<RenderSnapshot>().0.is_none());
    let input = app.world().resource::<furrow::input::InputAccumulator>();
    assert!(!input.is_key_held(KeyCode::KeyD));
}

#[test]
fn test_load_failure_falls_back_to_fresh_game() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    app.world_mut().send_event(StartGameRequest::load(7));
    app.update();
    let events = collect_events::<SessionEvent>(&app);
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::LoadFailed { slot: 7, .. })));
    assert!(events.contains(&SessionEvent::Started { loaded: false }));
    app.update();
    assert_eq!(state(&app), GameState::Running);
    assert_eq!(session(&app).player().money, STARTING_MONEY);
}

#[test]
fn test_quicksave_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    // Frozen growth so the ticks around save and load cannot change the crop
    let config = GameConfig {
        growth_rate: 0.0,
        ..test_config(dir.path())
    };
    let mut app = build_test_app(config);
    start_session(&mut app);

    click(&mut app, TilePos::new(5, 5), MouseButton::Left);
    {
        let mut s = session_mut(&mut app);
        s.player_mut().money = 999;
        s.player_mut().position = Vec2::new(300.5, 200.25);
        s.world_mut().set_fence(TilePos::new(3, 4), false).unwrap();
    }
    let world_before = session(&app).world().clone();
    let hotbar_before = session(&app).hotbar().clone();

    tap(&mut app, KeyCode::F5);
    assert!(collect_events::<SessionEvent>(&app).contains(&SessionEvent::Saved { slot: 0 }));
    assert!(dir.path().join("slot_0.json").exists());

    app.world_mut().send_event(GameCommand::ReturnToMainMenu);
    app.update();
    app.update();
    assert_eq!(state(&app), GameState::MainMenu);

    app.world_mut().send_event(StartGameRequest::load(0));
    app.update();
    app.update();
    assert_eq!(state(&app), GameState::Running);

    let s = session(&app);
    assert_eq!(s.player().money, 999);
    assert_eq!(s.player().position, Vec2::new(300.5, 200.25));
    assert_eq!(s.hotbar(), &hotbar_before);
    assert_eq!(s.world().tiles(), world_before.tiles());
    assert!(s.world().crop_at(TilePos::new(5, 5)).is_some());
    assert_eq!(s.world().fence_open_at(TilePos::new(3, 4)), Some(false));
}

// ─────────────────────────────────────────────────────────────────────────────
// Input routing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fence_at_3_4_toggles_with_secondary_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let pos = TilePos::new(3, 4);
    session_mut(&mut app).world_mut().set_fence(pos, false).unwrap();

    click(&mut app, pos, MouseButton::Right);
    assert_eq!(session(&app).world().fence_open_at(pos), Some(true));
    assert!(collect_events::<SessionEvent>(&app)
        .contains(&SessionEvent::FenceToggled { pos, open: true }));

    click(&mut app, pos, MouseButton::Right);
    assert_eq!(session(&app).world().fence_open_at(pos), Some(false));
}

#[test]
fn test_paused_session_discards_everything_but_escape() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);
    let pos = TilePos::new(3, 4);
    session_mut(&mut app).world_mut().set_fence(pos, false).unwrap();

    tap(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(state(&app), GameState::Paused);

    let player_before = session(&app).player().clone();
    let hotbar_before = session(&app).hotbar().clone();
    let world_before = session(&app).world().clone();

    tap(&mut app, KeyCode::Digit3);
    send(&mut app, RawInput::Scroll(-1.0));
    app.update();
    click(&mut app, pos, MouseButton::Right);
    click(&mut app, TilePos::new(5, 5), MouseButton::Left);
    tap(&mut app, KeyCode::KeyQ);
    send(&mut app, RawInput::KeyDown(KeyCode::KeyD));
    for _ in 0..5 {
        app.update();
    }

    let s = session(&app);
    assert_eq!(s.player(), &player_before);
    assert_eq!(s.hotbar(), &hotbar_before);
    assert_eq!(s.world(), &world_before);
    assert!(app.world().resource::<RenderSnapshot>().0.as_ref().unwrap().paused);

    send(&mut app, RawInput::KeyUp(KeyCode::KeyD));
    tap(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(state(&app), GameState::Running);
}

#[test]
fn test_digit_zero_selects_last_slot() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::Digit0);
    assert_eq!(session(&app).hotbar().selected(), 9);
    tap(&mut app, KeyCode::Digit1);
    assert_eq!(session(&app).hotbar().selected(), 0);
    tap(&mut app, KeyCode::Digit5);
    assert_eq!(session(&app).hotbar().selected(), 4);
}

#[test]
fn test_scroll_wraps_around_hotbar() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    // Wheel up from slot 0 wraps to the last slot
    send(&mut app, RawInput::Scroll(1.0));
    app.update();
    assert_eq!(session(&app).hotbar().selected(), 9);

    // Wheel down from the last slot wraps to 0
    send(&mut app, RawInput::Scroll(-1.0));
    app.update();
    assert_eq!(session(&app).hotbar().selected(), 0);
}

#[test]
fn test_drop_from_empty_slot_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::Digit0);
    assert!(session(&app).hotbar().selected_stack().is_none());
    let hotbar_before = session(&app).hotbar().clone();
    let ground_before = session(&app).world().ground_items().len();

    tap(&mut app, KeyCode::KeyQ);

    assert_eq!(session(&app).hotbar(), &hotbar_before);
    assert_eq!(session(&app).world().ground_items().len(), ground_before);
    assert!(!collect_events::<SessionEvent>(&app)
        .iter()
        .any(|e| matches!(e, SessionEvent::ItemDropped { .. })));
}

#[test]
fn test_drop_then_pick_up_selected_stack() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::Digit3);
    let stack = *session(&app).hotbar().selected_stack().unwrap();
    tap(&mut app, KeyCode::KeyQ);

    let tile = session(&app).player_tile();
    assert!(session(&app).hotbar().selected_stack().is_none());
    assert_eq!(session(&app).world().ground_items_at(tile).next(), Some(&stack));

    click(&mut app, tile, MouseButton::Left);
    assert_eq!(session(&app).world().ground_items_at(tile).count(), 0);
    assert_eq!(session(&app).hotbar().count(stack.kind), stack.quantity);
}

#[test]
fn test_overlay_blocks_clicks_but_not_digits() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::KeyB);
    assert!(session(&app).modes().shop_open);

    click(&mut app, TilePos::new(5, 5), MouseButton::Left);
    assert!(session(&app).world().crop_at(TilePos::new(5, 5)).is_none());

    tap(&mut app, KeyCode::Digit2);
    assert_eq!(session(&app).hotbar().selected(), 1);

    tap(&mut app, KeyCode::KeyB);
    assert!(!session(&app).modes().shop_open);
}

#[test]
fn test_swap_from_presentation_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let before = session(&app).hotbar().clone();
    app.world_mut().send_event(GameCommand::SwapHotbar(0, 3));
    app.update();
    let after = session(&app).hotbar().clone();
    assert_eq!(after.slots()[0], before.slots()[3]);
    assert_eq!(after.slots()[3], before.slots()[0]);

    // Out of range leaves the hotbar untouched
    app.world_mut().send_event(GameCommand::SwapHotbar(0, 99));
    app.update();
    assert_eq!(session(&app).hotbar(), &after);
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_walk_blocked_by_closed_fence_until_opened() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let start = session(&app).player_tile();
    let gate = TilePos::new(start.x + 2, start.y);
    session_mut(&mut app).world_mut().set_fence(gate, false).unwrap();

    send(&mut app, RawInput::KeyDown(KeyCode::KeyD));
    for _ in 0..20 {
        app.update();
    }
    let s = session(&app);
    assert_eq!(s.player_tile(), TilePos::new(start.x + 1, start.y));
    assert_eq!(s.player().facing, Facing::Right);
    assert!(s.player().is_moving);

    send(&mut app, RawInput::KeyUp(KeyCode::KeyD));
    click(&mut app, gate, MouseButton::Right);
    send(&mut app, RawInput::KeyDown(KeyCode::KeyD));
    for _ in 0..4 {
        app.update();
    }
    assert!(session(&app).player_tile().x >= gate.x);
}

#[test]
fn test_plant_grow_and_harvest_by_clicking() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let plot = TilePos::new(6, 6);
    click(&mut app, plot, MouseButton::Left);
    assert_eq!(
        session(&app).world().crop_at(plot).map(|c| c.kind),
        Some(CropKind::Parsnip)
    );

    // Not ready yet: clicking again does nothing
    click(&mut app, plot, MouseButton::Left);
    assert!(session(&app).world().crop_at(plot).is_some());

    // Parsnip needs 3 stages x 20 s; each update is 100 ms
    for _ in 0..610 {
        app.update();
    }
    assert!(session(&app).world().crop_at(plot).unwrap().is_harvestable());

    click(&mut app, plot, MouseButton::Left);
    assert!(session(&app).world().crop_at(plot).is_none());
    assert_eq!(
        session(&app).hotbar().count(ItemKind::Produce(CropKind::Parsnip)),
        CropKind::Parsnip.yield_quantity()
    );
}

#[test]
fn test_weather_eases_while_paused() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::KeyR);
    assert!(session(&app).weather().raining);
    tap(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(state(&app), GameState::Paused);

    let before = session(&app).weather().intensity;
    for _ in 0..3 {
        app.update();
    }
    assert!(session(&app).weather().intensity > before);
}

// ─────────────────────────────────────────────────────────────────────────────
// Several inputs in one frame
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_two_wheel_notches_in_one_frame_move_two_slots() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    send(&mut app, RawInput::Scroll(-1.0));
    send(&mut app, RawInput::Scroll(-1.0));
    app.update();
    assert_eq!(session(&app).hotbar().selected(), 2);
}

#[test]
fn test_digit_then_drop_in_one_frame_drops_new_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    let first = session(&app).hotbar().slot(0).unwrap().copied();
    let third = session(&app).hotbar().slot(2).unwrap().copied().unwrap();

    send(&mut app, RawInput::KeyDown(KeyCode::Digit3));
    send(&mut app, RawInput::KeyDown(KeyCode::KeyQ));
    app.update();

    let s = session(&app);
    assert_eq!(s.hotbar().selected(), 2);
    assert_eq!(s.hotbar().slot(0).unwrap().copied(), first);
    assert!(s.hotbar().slot(2).unwrap().is_none());
    assert_eq!(s.world().ground_items_at(s.player_tile()).next(), Some(&third));
}

#[test]
fn test_input_after_pause_key_in_same_frame_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    send(&mut app, RawInput::KeyDown(KeyCode::Escape));
    send(&mut app, RawInput::Scroll(-1.0));
    send(&mut app, RawInput::KeyDown(KeyCode::KeyQ));
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Paused);
    assert_eq!(session(&app).hotbar().selected(), 0);
    assert!(session(&app).hotbar().slot(0).unwrap().is_some());
}

#[test]
fn test_input_after_unpause_key_in_same_frame_applies() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = build_test_app(test_config(dir.path()));
    start_session(&mut app);

    tap(&mut app, KeyCode::Escape);
    app.update();
    assert_eq!(state(&app), GameState::Paused);

    send(&mut app, RawInput::KeyUp(KeyCode::Escape));
    send(&mut app, RawInput::KeyDown(KeyCode::Escape));
    send(&mut app, RawInput::KeyDown(KeyCode::Digit3));
    app.update();
    app.update();

    assert_eq!(state(&app), GameState::Running);
    assert_eq!(session(&app).hotbar().selected(), 2);
}
