//! Shared protocol crate for the arena server.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - Length-prefixed framing
//! - Packet definitions, builders and parsers
//! - Shared types (Color, Position, snapshot views)

mod binary;
mod error;
pub mod frame;
pub mod packets;

pub use binary::{BinaryReader, BinaryWriter};
pub use error::ProtocolError;

/// Protocol version sent in the join handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// RGB color used for players and food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Represents a 2D position using glam's DVec2.
pub type Position = glam::DVec2;
