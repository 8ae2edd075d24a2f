//! Food pellet.

use glam::DVec2;
use protocol::Color;
use protocol::packets::FoodView;

/// A food pellet that can be eaten by players.
///
/// Food has no identity beyond its position and color and never moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Food {
    pub position: DVec2,
    pub color: Color,
}

impl Food {
    pub fn new(position: DVec2, color: Color) -> Self {
        Self { position, color }
    }

    pub fn view(&self) -> FoodView {
        FoodView {
            position: self.position,
            color: self.color,
        }
    }
}
