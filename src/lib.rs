//! Furrow library crate: the farming simulation core.
//!
//! The binary (`main.rs`) is a headless host. Presentation layers and the
//! `tests/` integration tests drive the same plugins by sending `RawInput`
//! and reading `SessionEvent`s and the `RenderSnapshot`.

pub mod config;
pub mod economy;
pub mod error;
pub mod input;
pub mod inventory;
pub mod player;
pub mod quests;
pub mod save;
pub mod session;
pub mod shared;
pub mod world;

use bevy::prelude::*;

use config::GameConfig;

/// Everything except the host's own plugins. Insert a `GameConfig` first to
/// override the defaults.
pub struct FurrowPlugin;

impl Plugin for FurrowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>().add_plugins((
            input::InputRouterPlugin,
            session::SessionPlugin,
            save::SavePlugin,
        ));
    }
}
