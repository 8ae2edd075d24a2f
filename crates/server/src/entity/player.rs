//! Player entity.

use glam::DVec2;
use protocol::Color;
use protocol::packets::PlayerView;

/// A connected player's authoritative state.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Unique id, never reused for the lifetime of the process.
    pub id: u32,
    /// Center in world coordinates.
    pub position: DVec2,
    pub color: Color,
    /// Score doubles as mass and drives the radius.
    pub score: f64,
    /// Display name from the handshake, unvalidated.
    pub name: String,
}

impl Player {
    /// Create a player with zero score.
    pub fn new(id: u32, name: String, position: DVec2, color: Color) -> Self {
        Self {
            id,
            position,
            color,
            score: 0.0,
            name,
        }
    }

    /// Radius for a given base radius: `base + score`.
    #[inline]
    pub fn radius(&self, base_radius: f64) -> f64 {
        base_radius + self.score
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            position: self.position,
            color: self.color,
            score: self.score,
            name: self.name.clone(),
        }
    }
}
