//! Default end of round: eating stops, nothing is reset.

use super::RoundPolicy;
use crate::spawn::SpawnPlacer;
use crate::world::World;
use std::time::Instant;
use tracing::info;

pub struct Freeze;

impl RoundPolicy for Freeze {
    fn name(&self) -> &str {
        "freeze"
    }

    fn on_round_expired(&mut self, world: &mut World, _placer: &SpawnPlacer, _now: Instant) {
        info!(
            "Round over after {}s with {} players; world frozen",
            world.clock.elapsed_secs(),
            world.players.len()
        );
    }
}
