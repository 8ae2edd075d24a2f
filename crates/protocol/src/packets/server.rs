//! Server -> Client packet building and parsing.

use super::ServerOpcode;
use crate::{BinaryReader, BinaryWriter, Color, Position, ProtocolError};

/// A food pellet as seen by clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodView {
    pub position: Position,
    pub color: Color,
}

/// A player as seen by clients.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub id: u32,
    pub position: Position,
    pub color: Color,
    pub score: f64,
    pub name: String,
}

/// Full world state returned after every processed intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub food: Vec<FoodView>,
    /// Players in ascending id order.
    pub players: Vec<PlayerView>,
    /// Whole seconds since the round started.
    pub elapsed_secs: u32,
    pub round_active: bool,
    /// Chat history, oldest first.
    pub chat: Vec<String>,
}

impl Snapshot {
    /// Look up a player by id.
    pub fn player(&self, id: u32) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Parsed server packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    /// Welcome (0x01) with the assigned player id.
    Welcome { player_id: u32 },
    /// World snapshot (0x10).
    Snapshot(Snapshot),
    /// Rejected intent (0x7F).
    Rejected { reason: String },
}

fn put_color(w: &mut BinaryWriter, color: Color) {
    w.put_u8(color.r);
    w.put_u8(color.g);
    w.put_u8(color.b);
}

fn get_color(r: &mut BinaryReader) -> Result<Color, ProtocolError> {
    Ok(Color::new(r.get_u8()?, r.get_u8()?, r.get_u8()?))
}

/// Build a Welcome packet (0x01).
pub fn build_welcome(player_id: u32) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(5);
    w.put_u8(ServerOpcode::Welcome as u8);
    w.put_u32(player_id);
    w
}

/// Build a Snapshot packet (0x10).
pub fn build_snapshot(snapshot: &Snapshot) -> BinaryWriter {
    let capacity = 10 + snapshot.food.len() * 19 + snapshot.players.len() * 48;
    let mut w = BinaryWriter::with_capacity(capacity);
    w.put_u8(ServerOpcode::Snapshot as u8);
    w.put_u32(snapshot.elapsed_secs);
    w.put_u8(snapshot.round_active as u8);

    w.put_u32(snapshot.food.len() as u32);
    for food in &snapshot.food {
        w.put_f64(food.position.x);
        w.put_f64(food.position.y);
        put_color(&mut w, food.color);
    }

    w.put_u32(snapshot.players.len() as u32);
    for player in &snapshot.players {
        w.put_u32(player.id);
        w.put_f64(player.position.x);
        w.put_f64(player.position.y);
        put_color(&mut w, player.color);
        w.put_f64(player.score);
        w.put_string_utf8(&player.name);
    }

    w.put_u32(snapshot.chat.len() as u32);
    for line in &snapshot.chat {
        w.put_string_utf8(line);
    }
    w
}

/// Build a Rejected packet (0x7F).
pub fn build_rejected(reason: &str) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(2 + reason.len());
    w.put_u8(ServerOpcode::Rejected as u8);
    w.put_string_utf8(reason);
    w
}

impl ServerPacket {
    /// Parse a server packet from one frame payload.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.get_u8()?;

        let packet = match opcode {
            0x01 => ServerPacket::Welcome {
                player_id: reader.get_u32()?,
            },
            0x10 => ServerPacket::Snapshot(parse_snapshot(&mut reader)?),
            0x7F => ServerPacket::Rejected {
                reason: reader.get_string_utf8()?,
            },
            _ => return Err(ProtocolError::InvalidOpcode(opcode)),
        };

        reader.finish()?;
        Ok(packet)
    }
}

fn parse_snapshot(r: &mut BinaryReader) -> Result<Snapshot, ProtocolError> {
    let elapsed_secs = r.get_u32()?;
    let round_active = r.get_u8()? != 0;

    // Counts come off the wire; never pre-allocate more than the bytes could hold.
    let food_count = r.get_u32()? as usize;
    let mut food = Vec::with_capacity(food_count.min(r.remaining() / 19));
    for _ in 0..food_count {
        let x = r.get_f64()?;
        let y = r.get_f64()?;
        let color = get_color(r)?;
        food.push(FoodView {
            position: Position::new(x, y),
            color,
        });
    }

    let player_count = r.get_u32()? as usize;
    let mut players = Vec::with_capacity(player_count.min(r.remaining() / 32));
    for _ in 0..player_count {
        let id = r.get_u32()?;
        let x = r.get_f64()?;
        let y = r.get_f64()?;
        let color = get_color(r)?;
        let score = r.get_f64()?;
        let name = r.get_string_utf8()?;
        players.push(PlayerView {
            id,
            position: Position::new(x, y),
            color,
            score,
            name,
        });
    }

    let chat_count = r.get_u32()? as usize;
    let mut chat = Vec::with_capacity(chat_count.min(r.remaining()));
    for _ in 0..chat_count {
        chat.push(r.get_string_utf8()?);
    }

    Ok(Snapshot {
        food,
        players,
        elapsed_secs,
        round_active,
        chat,
    })
}
