//! Packet definitions for the arena protocol.
//!
//! This module contains both client->server and server->client packet types.
//! The first payload byte of every frame is the opcode.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for client -> server packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Join with protocol version and display name.
    Join = 0x00,
    /// Absolute move target.
    Move = 0x10,
    /// Chat message.
    Chat = 0x63,
}

/// Opcodes for server -> client packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// Assigned player id.
    Welcome = 0x01,
    /// Full world snapshot.
    Snapshot = 0x10,
    /// Intent was understood as a frame but not as a command.
    Rejected = 0x7F,
}
