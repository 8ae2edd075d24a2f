//! Client -> Server packet parsing and building.

use super::ClientOpcode;
use crate::{BinaryReader, BinaryWriter, ProtocolError};

/// Parsed client packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Join (0x00) with protocol version and nickname.
    Join { version: u32, name: String },
    /// Move to absolute coordinates (0x10).
    Move { x: i32, y: i32 },
    /// Chat message (0x63).
    Chat { text: String },
}

impl ClientPacket {
    /// Parse a client packet from one frame payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::UnexpectedEof);
        }

        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        let packet = match opcode {
            0x00 => {
                let version = reader.get_u32()?;
                let name = reader.get_string_utf8()?;
                ClientPacket::Join { version, name }
            }
            0x10 => {
                let x = reader.get_i32()?;
                let y = reader.get_i32()?;
                ClientPacket::Move { x, y }
            }
            0x63 => {
                let text = reader.get_string_utf8()?;
                ClientPacket::Chat { text }
            }
            _ => return Err(ProtocolError::InvalidOpcode(opcode)),
        };

        reader.finish()?;
        Ok(packet)
    }
}

/// Build a Join packet (0x00).
pub fn build_join(version: u32, name: &str) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(6 + name.len());
    w.put_u8(ClientOpcode::Join as u8);
    w.put_u32(version);
    w.put_string_utf8(name);
    w
}

/// Build a Move packet (0x10).
pub fn build_move(x: i32, y: i32) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(9);
    w.put_u8(ClientOpcode::Move as u8);
    w.put_i32(x);
    w.put_i32(y);
    w
}

/// Build a Chat packet (0x63).
pub fn build_chat(text: &str) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(2 + text.len());
    w.put_u8(ClientOpcode::Chat as u8);
    w.put_string_utf8(text);
    w
}
