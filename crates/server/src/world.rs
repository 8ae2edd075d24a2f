//! World state management.
//!
//! The world aggregates players, food, the chat log and the round clock. It is
//! owned by the game task, so every method here runs without contention.

use crate::chat::ChatLog;
use crate::config::Config;
use crate::entity::{Food, Player};
use crate::round::RoundClock;
use glam::DVec2;
use protocol::packets::Snapshot;
use rand::Rng;
use std::collections::BTreeMap;

/// World border bounds. The playable area is `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy)]
pub struct WorldBorder {
    pub width: f64,
    pub height: f64,
}

impl WorldBorder {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Get a random position anywhere within the border.
    #[inline]
    pub fn random_position(&self) -> DVec2 {
        self.random_position_inset(0.0)
    }

    /// Get a random position at least `margin` away from every edge.
    pub fn random_position_inset(&self, margin: f64) -> DVec2 {
        let mut rng = rand::rng();
        DVec2::new(
            random_axis(&mut rng, margin, self.width),
            random_axis(&mut rng, margin, self.height),
        )
    }

    /// Keep a circle of `radius` centered at `position` inside the border.
    ///
    /// A circle wider than an axis is pinned to that axis' center.
    pub fn clamp_circle(&self, position: DVec2, radius: f64) -> DVec2 {
        DVec2::new(
            clamp_axis(position.x, radius, self.width),
            clamp_axis(position.y, radius, self.height),
        )
    }

    /// Whether the circle lies fully inside the border (or is pinned on an axis it cannot fit).
    pub fn contains_circle(&self, position: DVec2, radius: f64) -> bool {
        self.clamp_circle(position, radius) == position
    }
}

fn random_axis(rng: &mut impl Rng, margin: f64, len: f64) -> f64 {
    if margin * 2.0 >= len {
        len / 2.0
    } else if margin > 0.0 {
        rng.random_range(margin..=len - margin)
    } else {
        rng.random_range(0.0..len)
    }
}

fn clamp_axis(value: f64, radius: f64, len: f64) -> f64 {
    if radius * 2.0 >= len {
        len / 2.0
    } else {
        value.clamp(radius, len - radius)
    }
}

/// The game world containing all players and food.
#[derive(Debug)]
pub struct World {
    pub border: WorldBorder,
    /// Radius of a zero-score player.
    pub base_radius: f64,
    /// Players keyed by id; iteration order is ascending id.
    pub players: BTreeMap<u32, Player>,
    pub food: Vec<Food>,
    pub chat: ChatLog,
    pub clock: RoundClock,
}

impl World {
    /// Create an empty world from the configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            border: WorldBorder::new(config.world.width, config.world.height),
            base_radius: config.world.base_radius,
            players: BTreeMap::new(),
            food: Vec::with_capacity(config.food.initial_amount + config.food.respawn_max),
            chat: ChatLog::new(config.chat.capacity),
            clock: RoundClock::new(config.round.duration_secs, config.round.decay_interval_secs),
        }
    }

    #[inline]
    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.get(&id)
    }

    #[inline]
    pub fn player_mut(&mut self, id: u32) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// Radius of a player in this world.
    #[inline]
    pub fn radius_of(&self, player: &Player) -> f64 {
        player.radius(self.base_radius)
    }

    /// Insert a player, keeping it inside the border.
    pub fn add_player(&mut self, mut player: Player) {
        let radius = self.radius_of(&player);
        player.position = self.border.clamp_circle(player.position, radius);
        self.players.insert(player.id, player);
    }

    pub fn remove_player(&mut self, id: u32) -> Option<Player> {
        self.players.remove(&id)
    }

    /// Move a player, clamped into the border. Returns false for unknown ids.
    pub fn set_position(&mut self, id: u32, target: DVec2) -> bool {
        let (border, base) = (self.border, self.base_radius);
        match self.players.get_mut(&id) {
            Some(player) => {
                player.position = border.clamp_circle(target, player.radius(base));
                true
            }
            None => false,
        }
    }

    /// Re-clamp one player after its score changed.
    pub fn clamp_player(&mut self, id: u32) {
        let (border, base) = (self.border, self.base_radius);
        if let Some(player) = self.players.get_mut(&id) {
            player.position = border.clamp_circle(player.position, player.radius(base));
        }
    }

    /// Re-clamp every player; radii change when scores do.
    pub fn clamp_players(&mut self) {
        let (border, base) = (self.border, self.base_radius);
        for player in self.players.values_mut() {
            player.position = border.clamp_circle(player.position, player.radius(base));
        }
    }

    /// Scale down every score above `threshold`, flooring to a whole number.
    ///
    /// Returns how many players were affected.
    pub fn apply_decay(&mut self, threshold: f64, factor: f64) -> usize {
        let mut affected = 0;
        for player in self.players.values_mut() {
            if player.score > threshold {
                player.score = (player.score * factor).floor().max(0.0);
                affected += 1;
            }
        }
        affected
    }

    /// Build the snapshot sent back to clients.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            food: self.food.iter().map(Food::view).collect(),
            players: self.players.values().map(Player::view).collect(),
            elapsed_secs: self.clock.elapsed_secs().min(u32::MAX as u64) as u32,
            round_active: self.clock.is_active(),
            chat: self.chat.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Color;

    fn world() -> World {
        World::new(&Config::default())
    }

    fn player(id: u32, x: f64, y: f64, score: f64) -> Player {
        let mut p = Player::new(id, format!("p{}", id), DVec2::new(x, y), Color::default());
        p.score = score;
        p
    }

    #[test]
    fn test_clamp_circle_edges() {
        let border = WorldBorder::new(850.0, 720.0);
        assert_eq!(border.clamp_circle(DVec2::new(-50.0, 1000.0), 7.0), DVec2::new(7.0, 713.0));
        assert_eq!(border.clamp_circle(DVec2::new(400.0, 300.0), 7.0), DVec2::new(400.0, 300.0));
    }

    #[test]
    fn test_oversized_circle_pinned_to_center() {
        let border = WorldBorder::new(850.0, 720.0);
        let pos = border.clamp_circle(DVec2::new(10.0, 10.0), 400.0);
        assert_eq!(pos, DVec2::new(400.0, 360.0));
        assert!(border.contains_circle(pos, 400.0));
    }

    #[test]
    fn test_random_positions_in_bounds() {
        let border = WorldBorder::new(850.0, 720.0);
        for _ in 0..500 {
            let p = border.random_position_inset(7.0);
            assert!(p.x >= 7.0 && p.x <= 843.0);
            assert!(p.y >= 7.0 && p.y <= 713.0);
            let q = border.random_position();
            assert!(q.x >= 0.0 && q.x < 850.0);
            assert!(q.y >= 0.0 && q.y < 720.0);
        }
    }

    #[test]
    fn test_set_position_clamps_by_radius() {
        let mut world = world();
        world.add_player(player(1, 100.0, 100.0, 20.0));
        assert!(world.set_position(1, DVec2::new(0.0, 0.0)));
        assert_eq!(world.player(1).unwrap().position, DVec2::new(27.0, 27.0));
        assert!(!world.set_position(2, DVec2::ZERO));
    }

    #[test]
    fn test_decay_floors_large_scores_only() {
        let mut world = world();
        world.add_player(player(1, 100.0, 100.0, 100.0));
        world.add_player(player(2, 300.0, 300.0, 8.0));
        world.add_player(player(3, 500.0, 500.0, 10.5));

        assert_eq!(world.apply_decay(8.0, 0.95), 2);
        assert_eq!(world.player(1).unwrap().score, 95.0);
        assert_eq!(world.player(2).unwrap().score, 8.0);
        assert_eq!(world.player(3).unwrap().score, 9.0);
    }

    #[test]
    fn test_snapshot_orders_players_by_id() {
        let mut world = world();
        world.add_player(player(5, 100.0, 100.0, 0.0));
        world.add_player(player(2, 200.0, 200.0, 0.0));
        world.chat.push("hello");

        let snapshot = world.snapshot();
        let ids: Vec<u32> = snapshot.players.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 5]);
        assert_eq!(snapshot.chat, vec!["hello".to_string()]);
        assert!(!snapshot.round_active);
    }
}
