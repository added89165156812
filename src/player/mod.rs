//! Player state: identity, position, money and stamina.

pub mod movement;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::shared::*;
use crate::world::WorldGrid;

pub use movement::{MoveIntent, apply_movement};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub gender: Gender,
    /// World-space pixels.
    pub position: Vec2,
    pub facing: Facing,
    pub is_moving: bool,
    pub money: u32,
    pub stamina: f32,
    pub max_stamina: f32,
}

impl Player {
    /// A fresh farmer standing on the first walkable tile nearest the world centre.
    pub fn spawn(name: impl Into<String>, gender: Gender, config: &GameConfig, world: &WorldGrid) -> Self {
        let spawn_tile = spawn_tile(world);
        Self {
            name: name.into(),
            gender,
            position: spawn_tile.center(config.tile_size),
            facing: Facing::Down,
            is_moving: false,
            money: config.starting_money,
            stamina: config.max_stamina,
            max_stamina: config.max_stamina,
        }
    }

    pub fn tile(&self, tile_size: f32) -> TilePos {
        TilePos::from_world(self.position, tile_size)
    }

    /// Finite position and stamina within a positive maximum.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.max_stamina.is_finite()
            && self.max_stamina > 0.0
            && self.stamina.is_finite()
            && (0.0..=self.max_stamina).contains(&self.stamina)
    }

    pub fn is_stamina_full(&self) -> bool {
        self.stamina >= self.max_stamina
    }

    /// Restore stamina, capped at the maximum. Returns the amount actually gained.
    pub fn restore_stamina(&mut self, amount: f32) -> f32 {
        let before = self.stamina;
        self.stamina = (self.stamina + amount.max(0.0)).min(self.max_stamina);
        self.stamina - before
    }

    pub fn earn(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Spend if affordable; money never goes negative.
    pub fn try_spend(&mut self, amount: u32) -> bool {
        if self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }
}

fn spawn_tile(world: &WorldGrid) -> TilePos {
    let center = TilePos::new(world.width() / 2, world.height() / 2);
    let reach = world.width().max(world.height());
    for radius in 0..=reach {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let pos = TilePos::new(center.x + dx, center.y + dy);
                if pos.chebyshev_distance(center) == radius && world.is_walkable(pos) {
                    return pos;
                }
            }
        }
    }
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Terrain;

    #[test]
    fn test_spawn_uses_config() {
        let config = GameConfig::default();
        let world = WorldGrid::generate(&config);
        let player = Player::spawn("Robin", Gender::Unspecified, &config, &world);
        assert_eq!(player.money, config.starting_money);
        assert_eq!(player.stamina, config.max_stamina);
        assert!(world.is_walkable(player.tile(config.tile_size)));
    }

    #[test]
    fn test_spawn_avoids_blocked_centre() {
        let config = GameConfig::default();
        let mut world = WorldGrid::new(5, 5);
        world.set_terrain(TilePos::new(2, 2), Terrain::Water).unwrap();
        let player = Player::spawn("Sam", Gender::Male, &config, &world);
        let tile = player.tile(config.tile_size);
        assert_ne!(tile, TilePos::new(2, 2));
        assert_eq!(tile.chebyshev_distance(TilePos::new(2, 2)), 1);
    }

    #[test]
    fn test_stamina_is_capped() {
        let config = GameConfig::default();
        let world = WorldGrid::new(4, 4);
        let mut player = Player::spawn("Ada", Gender::Female, &config, &world);
        player.stamina = 90.0;
        assert_eq!(player.restore_stamina(40.0), 10.0);
        assert_eq!(player.stamina, player.max_stamina);
    }

    #[test]
    fn test_spending_never_goes_negative() {
        let config = GameConfig::default();
        let world = WorldGrid::new(4, 4);
        let mut player = Player::spawn("Ada", Gender::Female, &config, &world);
        player.money = 30;
        assert!(!player.try_spend(31));
        assert_eq!(player.money, 30);
        assert!(player.try_spend(30));
        assert_eq!(player.money, 0);
    }
}
