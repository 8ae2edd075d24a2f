//! End of round that wipes scores and starts over.

use super::RoundPolicy;
use crate::spawn::SpawnPlacer;
use crate::world::World;
use std::time::Instant;
use tracing::info;

pub struct Restart;

impl RoundPolicy for Restart {
    fn name(&self) -> &str {
        "restart"
    }

    fn on_round_expired(&mut self, world: &mut World, placer: &SpawnPlacer, now: Instant) {
        let leader = world
            .players
            .values()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .map(|p| (p.name.clone(), p.score));

        if let Some((name, score)) = &leader {
            info!("Round over, {} wins with {:.1}", name, score);
            world.chat.push(format!("ROUND OVER - {} WINS", name));
        }

        let ids: Vec<u32> = world.players.keys().copied().collect();
        for id in ids {
            if let Some(player) = world.player_mut(id) {
                player.score = 0.0;
            }
            let position = placer.find_safe_location(world);
            if let Some(player) = world.player_mut(id) {
                player.position = position;
            }
        }

        world.clock.restart(now);
        world.chat.push("NEW ROUND");
        info!("New round started with {} players", world.players.len());
    }
}
