//! Game entities.
//!
//! Players and food pellets, plus the fixed color palette both draw from.

mod food;
mod player;

pub use food::Food;
pub use player::Player;

use protocol::Color;

/// Fixed palette for players (by id) and food (random pick).
pub const PALETTE: [Color; 14] = [
    Color::new(255, 0, 0),
    Color::new(255, 128, 0),
    Color::new(255, 255, 0),
    Color::new(128, 255, 0),
    Color::new(0, 255, 0),
    Color::new(0, 255, 128),
    Color::new(0, 255, 255),
    Color::new(0, 128, 255),
    Color::new(0, 0, 255),
    Color::new(128, 0, 255),
    Color::new(255, 0, 255),
    Color::new(255, 0, 128),
    Color::new(128, 128, 128),
    Color::new(0, 0, 0),
];

/// Palette color assigned to a player id.
#[inline]
pub fn player_color(id: u32) -> Color {
    PALETTE[id as usize % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_color_wraps() {
        assert_eq!(player_color(0), Color::new(255, 0, 0));
        assert_eq!(player_color(13), Color::new(0, 0, 0));
        assert_eq!(player_color(14), player_color(0));
        assert_eq!(player_color(15), Color::new(255, 128, 0));
    }
}
