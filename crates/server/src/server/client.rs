//! Client sessions.
//!
//! A session owns one client stream. It performs the join handshake, then
//! turns every intent frame into a world command and answers with the
//! snapshot the world task returns.

use super::game::{WorldClosed, WorldHandle};
use bytes::{Bytes, BytesMut};
use protocol::frame::{decode_frame, encode_frame};
use protocol::packets::{ClientPacket, build_rejected, build_snapshot, build_welcome};
use protocol::{BinaryWriter, PROTOCOL_VERSION, ProtocolError};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("expected a join packet, got {0:?}")]
    HandshakeExpected(ClientPacket),
    #[error(transparent)]
    WorldClosed(#[from] WorldClosed),
}

/// Framed connection to one client.
pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    max_frame_len: usize,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, max_frame_len: usize) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            max_frame_len,
        }
    }

    /// Read the next frame payload. `Ok(None)` means the peer closed cleanly
    /// between frames.
    pub async fn read_frame(&mut self) -> Result<Option<Bytes>, SessionError> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buffer, self.max_frame_len)? {
                return Ok(Some(frame));
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ProtocolError::UnexpectedEof.into());
            }
        }
    }

    /// Frame and send one packet.
    pub async fn write_packet(&mut self, packet: BinaryWriter) -> Result<(), SessionError> {
        let frame = encode_frame(packet.as_slice());
        self.stream.write_all(&frame).await?;
        Ok(())
    }
}

/// Run one TCP session to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    id: u32,
    world: WorldHandle,
    max_frame_len: usize,
) -> Result<(), SessionError> {
    if let Err(e) = stream.set_nodelay(true) {
        warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
    }
    run_session(Connection::new(stream, max_frame_len), addr, id, world).await
}

/// Drive a session over any framed stream. Once the join went through, the
/// player is removed from the world however the session ends.
pub async fn run_session<S: AsyncRead + AsyncWrite + Unpin>(
    mut conn: Connection<S>,
    addr: SocketAddr,
    id: u32,
    world: WorldHandle,
) -> Result<(), SessionError> {
    let Some(name) = handshake(&mut conn, addr).await? else {
        info!("Client {} closed before joining", addr);
        return Ok(());
    };

    world.join(id, name).await?;

    let result: Result<(), SessionError> = async {
        conn.write_packet(build_welcome(id)).await?;
        active(&mut conn, id, &world).await
    }
    .await;

    // The world may already be gone on shutdown; nothing left to clean up then.
    let _ = world.leave(id).await;
    result
}

async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
    addr: SocketAddr,
) -> Result<Option<String>, SessionError> {
    let Some(frame) = conn.read_frame().await? else {
        return Ok(None);
    };

    match ClientPacket::parse(&frame)? {
        ClientPacket::Join { version, name } => {
            if version != PROTOCOL_VERSION {
                return Err(ProtocolError::UnsupportedProtocol(version).into());
            }
            debug!("Handshake from {} as {:?}", addr, name);
            Ok(Some(name))
        }
        other => Err(SessionError::HandshakeExpected(other)),
    }
}

async fn active<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
    id: u32,
    world: &WorldHandle,
) -> Result<(), SessionError> {
    while let Some(frame) = conn.read_frame().await? {
        let reply = match ClientPacket::parse(&frame) {
            Ok(ClientPacket::Move { x, y }) => world.move_to(id, x, y).await?,
            Ok(ClientPacket::Chat { text }) => world.chat(id, text).await?,
            Ok(ClientPacket::Join { .. }) => {
                conn.write_packet(build_rejected("already joined")).await?;
                continue;
            }
            Err(e) => {
                debug!("Rejected packet from player {}: {}", id, e);
                conn.write_packet(build_rejected(&e.to_string())).await?;
                continue;
            }
        };

        match reply {
            Ok(snapshot) => conn.write_packet(build_snapshot(&snapshot)).await?,
            Err(e) => conn.write_packet(build_rejected(&e.to_string())).await?,
        }
    }
    Ok(())
}
