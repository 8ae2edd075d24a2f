//! Spawn placement.
//!
//! Picks coordinates for new players, relocated victims and new food by
//! rejection sampling against current player positions.

use crate::config::SpawnConfig;
use crate::entity::{Food, PALETTE, Player};
use crate::world::World;
use glam::DVec2;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::warn;

/// Rejection sampler for spawn coordinates.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPlacer {
    max_attempts: usize,
}

impl SpawnPlacer {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &SpawnConfig) -> Self {
        Self::new(config.max_attempts)
    }

    /// A point is safe when it lies strictly outside every player's radius.
    pub fn is_safe(players: &BTreeMap<u32, Player>, base_radius: f64, point: DVec2) -> bool {
        players
            .values()
            .all(|p| p.position.distance(point) > p.radius(base_radius))
    }

    /// Draw samples until one is safe. After `max_attempts` the last sample is
    /// accepted as-is so a crowded world can never stall the game task.
    fn place(&self, world: &World, mut sample: impl FnMut() -> DVec2) -> DVec2 {
        let mut candidate = sample();
        for _ in 1..self.max_attempts {
            if Self::is_safe(&world.players, world.base_radius, candidate) {
                return candidate;
            }
            candidate = sample();
        }
        if !Self::is_safe(&world.players, world.base_radius, candidate) {
            warn!(
                "No safe spawn after {} attempts ({} players), placing anyway",
                self.max_attempts,
                world.players.len()
            );
        }
        candidate
    }

    /// Find a spawn point for a zero-score player, inside the border by its radius.
    pub fn find_safe_location(&self, world: &World) -> DVec2 {
        let border = world.border;
        let margin = world.base_radius;
        self.place(world, || border.random_position_inset(margin))
    }

    /// Find a point for a food pellet anywhere in the world.
    pub fn find_food_location(&self, world: &World) -> DVec2 {
        let border = world.border;
        self.place(world, || border.random_position())
    }

    /// Spawn `n` food pellets with random palette colors. Existing food is ignored.
    pub fn create_food(&self, world: &mut World, n: usize) {
        let mut rng = rand::rng();
        world.food.reserve(n);
        for _ in 0..n {
            let position = self.find_food_location(world);
            let color = PALETTE[rng.random_range(0..PALETTE.len())];
            world.food.push(Food::new(position, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use protocol::Color;

    fn world_with(players: &[(u32, f64, f64, f64)]) -> World {
        let mut world = World::new(&Config::default());
        for &(id, x, y, score) in players {
            let mut p = Player::new(id, String::new(), DVec2::new(x, y), Color::default());
            p.score = score;
            world.add_player(p);
        }
        world
    }

    #[test]
    fn test_is_safe_uses_radius() {
        let world = world_with(&[(1, 100.0, 100.0, 3.0)]);
        // radius 10: exactly on the edge is not safe
        assert!(!SpawnPlacer::is_safe(&world.players, 7.0, DVec2::new(110.0, 100.0)));
        assert!(SpawnPlacer::is_safe(&world.players, 7.0, DVec2::new(110.5, 100.0)));
    }

    #[test]
    fn test_spawn_avoids_players() {
        let world = world_with(&[(1, 425.0, 360.0, 200.0), (2, 100.0, 100.0, 50.0)]);
        let placer = SpawnPlacer::new(1000);
        for _ in 0..200 {
            let spot = placer.find_safe_location(&world);
            assert!(SpawnPlacer::is_safe(&world.players, 7.0, spot));
            assert!(world.border.contains_circle(spot, 7.0));
        }
    }

    #[test]
    fn test_saturated_world_terminates() {
        // One player covering the whole map.
        let world = world_with(&[(1, 425.0, 360.0, 5000.0)]);
        let spot = SpawnPlacer::new(50).find_safe_location(&world);
        assert!(world.border.contains_circle(spot, 7.0));
    }

    #[test]
    fn test_create_food_uses_palette() {
        let mut world = world_with(&[(1, 425.0, 360.0, 30.0)]);
        SpawnPlacer::new(1000).create_food(&mut world, 120);
        assert_eq!(world.food.len(), 120);
        for food in &world.food {
            assert!(PALETTE.contains(&food.color));
            assert!(food.position.distance(DVec2::new(425.0, 360.0)) > 37.0);
        }
    }
}
