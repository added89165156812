use bevy::prelude::*;

use crate::input::{InputAccumulator, KeyBindings};
use crate::shared::*;
use crate::world::WorldGrid;

use super::Player;

/// Desired direction for this tick, built from held keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent(pub Vec2);

impl MoveIntent {
    pub fn from_held_keys(input: &InputAccumulator, bindings: &KeyBindings) -> Self {
        let mut dir = Vec2::ZERO;
        if bindings.up.iter().any(|k| input.is_key_held(*k)) {
            dir.y += 1.0;
        }
        if bindings.down.iter().any(|k| input.is_key_held(*k)) {
            dir.y -= 1.0;
        }
        if bindings.left.iter().any(|k| input.is_key_held(*k)) {
            dir.x -= 1.0;
        }
        if bindings.right.iter().any(|k| input.is_key_held(*k)) {
            dir.x += 1.0;
        }
        Self(dir)
    }

    pub fn is_idle(&self) -> bool {
        self.0 == Vec2::ZERO
    }
}

/// Move the player by `speed * dt` along the intent.
///
/// Diagonals are normalised. Collision is axis-separated so the player slides
/// along walls; a candidate position is rejected when the tile it lands on is
/// not walkable (water, stone, closed fence, outside the world).
pub fn apply_movement(
    player: &mut Player,
    intent: MoveIntent,
    dt: f32,
    speed: f32,
    tile_size: f32,
    world: &WorldGrid,
) {
    if intent.is_idle() {
        player.is_moving = false;
        return;
    }
    let dir = intent.0;
    player.is_moving = true;

    // Vertical wins ties; it reads better when walking up to plots.
    player.facing = if dir.y.abs() >= dir.x.abs() {
        if dir.y > 0.0 { Facing::Up } else { Facing::Down }
    } else if dir.x > 0.0 {
        Facing::Right
    } else {
        Facing::Left
    };

    let delta = dir.normalize() * speed * dt.max(0.0);
    let blocked = |p: Vec2| !world.is_walkable(TilePos::from_world(p, tile_size));

    let candidate_x = Vec2::new(player.position.x + delta.x, player.position.y);
    if !blocked(candidate_x) {
        player.position.x = candidate_x.x;
    }
    let candidate_y = Vec2::new(player.position.x, player.position.y + delta.y);
    if !blocked(candidate_y) {
        player.position.y = candidate_y.y;
    }
}
