//! Collision detection and resolution.
//!
//! Only the acting player (the one that just moved) is checked:
//! - Food consumption (every pellet inside its radius)
//! - Eating other players that are sufficiently smaller and close enough

use crate::spawn::SpawnPlacer;
use crate::world::World;
use fixedbitset::FixedBitSet;
use glam::DVec2;
use tracing::{debug, info};

/// Player must be 15% larger to eat.
pub const PLAYER_EAT_MULT: f64 = 1.15;

/// Tunables for one collision pass.
#[derive(Debug, Clone, Copy)]
pub struct EatRules {
    /// Score gained per pellet.
    pub food_value: f64,
    /// Size advantage required to eat another player.
    pub eat_multiplier: f64,
}

impl Default for EatRules {
    fn default() -> Self {
        Self {
            food_value: 0.5,
            eat_multiplier: PLAYER_EAT_MULT,
        }
    }
}

/// What a collision pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub food_eaten: usize,
    /// Ids of players eaten, in the order they were eaten.
    pub victims: Vec<u32>,
}

/// Whether a player with `score` at `pos` eats the player `other_score` at `other_pos`.
#[inline]
pub fn can_eat(
    pos: DVec2,
    score: f64,
    other_pos: DVec2,
    other_score: f64,
    base_radius: f64,
    eat_multiplier: f64,
) -> bool {
    score > other_score * eat_multiplier && pos.distance(other_pos) < base_radius + score
}

/// Area-additive merge: the eater keeps the combined squared score.
#[inline]
pub fn merged_score(eater: f64, eaten: f64) -> f64 {
    (eater * eater + eaten * eaten).sqrt()
}

/// Resolve food and player consumption for the player `actor_id`.
///
/// Other players are visited in ascending id order and each check uses the
/// actor's current score, so one eat can enable the next.
pub fn resolve_collisions(
    world: &mut World,
    actor_id: u32,
    rules: &EatRules,
    placer: &SpawnPlacer,
) -> CollisionReport {
    let mut report = CollisionReport::default();
    let Some(actor) = world.player(actor_id) else {
        return report;
    };
    let position = actor.position;
    let reach = world.radius_of(actor);

    // 1. Player vs. food
    let mut eaten = FixedBitSet::with_capacity(world.food.len());
    for (i, food) in world.food.iter().enumerate() {
        if food.position.distance(position) <= reach {
            eaten.insert(i);
        }
    }
    report.food_eaten = eaten.count_ones(..);
    if report.food_eaten > 0 {
        let mut index = 0;
        world.food.retain(|_| {
            let keep = !eaten.contains(index);
            index += 1;
            keep
        });
        if let Some(actor) = world.player_mut(actor_id) {
            actor.score += report.food_eaten as f64 * rules.food_value;
        }
        debug!("Player {} ate {} food", actor_id, report.food_eaten);
    }

    // 2. Player vs. player
    let others: Vec<u32> = world
        .players
        .keys()
        .copied()
        .filter(|&id| id != actor_id)
        .collect();

    for other_id in others {
        let (Some(actor), Some(other)) = (world.player(actor_id), world.player(other_id)) else {
            continue;
        };
        if !can_eat(
            actor.position,
            actor.score,
            other.position,
            other.score,
            world.base_radius,
            rules.eat_multiplier,
        ) {
            continue;
        }

        let new_score = merged_score(actor.score, other.score);
        info!("{} ATE {}", actor.name, other.name);

        if let Some(actor) = world.player_mut(actor_id) {
            actor.score = new_score;
        }
        // The victim must land clear of where the grown actor ends up.
        world.clamp_player(actor_id);
        if let Some(other) = world.player_mut(other_id) {
            other.score = 0.0;
        }
        let respawn = placer.find_safe_location(world);
        if let Some(other) = world.player_mut(other_id) {
            other.position = respawn;
        }
        report.victims.push(other_id);
    }

    if report.food_eaten > 0 || !report.victims.is_empty() {
        world.clamp_players();
    }

    report
}
