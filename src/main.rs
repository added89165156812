use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use furrow::config::{GameConfig, DEFAULT_CONFIG_PATH};
use furrow::input::BevyInputBridgePlugin;
use furrow::shared::*;
use furrow::FurrowPlugin;

/// Headless host for the Furrow simulation core.
#[derive(Parser, Debug)]
#[command(name = "furrow", about = "Run the farming simulation headless", version)]
struct HostArgs {
    /// RON config file; defaults apply when it is missing
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load this save slot instead of starting a new farm
    #[arg(long = "load", value_name = "SLOT")]
    load_slot: Option<u8>,

    /// Player name for a new game
    #[arg(long)]
    name: Option<String>,

    /// Exit after this many frames; run forever when absent
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    frames: Option<u32>,
}

#[derive(Resource)]
struct FrameBudget(u32);

fn count_frames(mut budget: ResMut<FrameBudget>, mut exit: EventWriter<AppExit>) {
    budget.0 = budget.0.saturating_sub(1);
    if budget.0 == 0 {
        info!("[Host] Frame budget spent, exiting");
        exit.send(AppExit::Success);
    }
}

fn log_session_events(mut events: EventReader<SessionEvent>) {
    for event in events.read() {
        debug!("[Host] {:?}", event);
    }
}

fn main() {
    let args = HostArgs::parse();

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))),
        LogPlugin::default(),
        StatesPlugin,
        bevy::input::InputPlugin,
    ));

    // Logging is up from here on
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    app.insert_resource(GameConfig::load_or_default(&config_path));

    app.add_plugins((FurrowPlugin, BevyInputBridgePlugin))
        .add_systems(Update, log_session_events);

    if let Some(frames) = args.frames {
        app.insert_resource(FrameBudget(frames))
            .add_systems(Last, count_frames);
    }

    let request = match args.load_slot {
        Some(slot) => StartGameRequest {
            player_name: args.name.clone().unwrap_or_default(),
            ..StartGameRequest::load(slot)
        },
        None => StartGameRequest::new_game(args.name.clone().unwrap_or_default()),
    };
    app.world_mut().send_event(request);

    app.run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_args_parse_all_flags() {
        let args = HostArgs::try_parse_from([
            "furrow", "--config", "farm.ron", "--load", "2", "--name", "Wren", "--frames", "30",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("farm.ron")));
        assert_eq!(args.load_slot, Some(2));
        assert_eq!(args.name.as_deref(), Some("Wren"));
        assert_eq!(args.frames, Some(30));
    }

    #[test]
    fn test_host_args_reject_bad_values() {
        assert!(HostArgs::try_parse_from(["furrow", "--load", "abc"]).is_err());
        assert!(HostArgs::try_parse_from(["furrow", "--load", "300"]).is_err());
        assert!(HostArgs::try_parse_from(["furrow", "--frames", "0"]).is_err());
        assert!(HostArgs::try_parse_from(["furrow", "--bogus"]).is_err());
    }

    #[test]
    fn test_host_args_default_to_new_game() {
        let args = HostArgs::try_parse_from(["furrow"]).unwrap();
        assert!(args.load_slot.is_none());
        assert!(args.frames.is_none());
    }
}
