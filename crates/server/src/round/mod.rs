//! Round timing and end-of-round behavior.

use crate::config::ExpiryPolicy;
use crate::spawn::SpawnPlacer;
use crate::world::World;
use std::time::Instant;

mod clock;
pub mod freeze;
pub mod restart;

pub use clock::{ClockTick, RoundClock};

/// Hook invoked once when the round timer runs out.
pub trait RoundPolicy: Send {
    fn name(&self) -> &str;

    /// Called from the game task right after the clock reports expiry.
    fn on_round_expired(&mut self, world: &mut World, placer: &SpawnPlacer, now: Instant);
}

pub fn get_policy(policy: ExpiryPolicy) -> Box<dyn RoundPolicy> {
    match policy {
        ExpiryPolicy::Freeze => Box::new(freeze::Freeze),
        ExpiryPolicy::Restart => Box::new(restart::Restart),
    }
}
