//! Game server implementation.

use crate::config::Config;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

pub mod client;
pub mod game;

pub use client::{Connection, SessionError, handle_connection, run_session};
pub use game::{GameState, WorldClosed, WorldCommand, WorldHandle, run_game_loop, spawn_game_loop};

/// Run the game server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on tcp://{}", addr);

    serve(listener, config).await
}

/// Accept connections on an already bound listener. Only returns if the world task stops
/// or the id space runs out.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    let state = GameState::new(&config);
    let (world, _task) = spawn_game_loop(state, config.server.command_queue);

    let mut next_id: u32 = 0;
    let max_frame_len = config.server.max_frame_len;

    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let id = next_id;
        next_id = next_id
            .checked_add(1)
            .ok_or_else(|| anyhow::anyhow!("player ids exhausted"))?;
        if id == 0 {
            world.start_round().await?;
        }
        info!("New connection from {} (ID {})", addr, id);

        let world = world.clone();
        tokio::spawn(async move {
            match handle_connection(stream, addr, id, world, max_frame_len).await {
                Ok(()) => info!("Client {} disconnected", addr),
                Err(e) => error!("Connection error from {}: {}", addr, e),
            }
        });
    }
}
