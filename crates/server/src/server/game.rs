//! Game state and the world task.
//!
//! One task owns the [`GameState`]. Sessions talk to it through a
//! [`WorldHandle`], which queues a [`WorldCommand`] and waits for the reply,
//! so every intent is applied atomically with respect to all other sessions.

use crate::collision::{self, EatRules};
use crate::config::Config;
use crate::entity::{Player, player_color};
use crate::round::{self, RoundPolicy};
use crate::spawn::SpawnPlacer;
use crate::world::World;
use glam::DVec2;
use protocol::packets::Snapshot;
use rand::Rng;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Main game state.
pub struct GameState {
    pub config: Config,
    pub world: World,
    pub policy: Box<dyn RoundPolicy>,
    placer: SpawnPlacer,
    rules: EatRules,
}

impl GameState {
    /// Create a new game state with the initial food already spawned.
    pub fn new(config: &Config) -> Self {
        let mut world = World::new(config);
        let placer = SpawnPlacer::from_config(&config.spawn);
        placer.create_food(&mut world, config.food.initial_amount);
        info!("World generated: {} food", world.food.len());

        Self {
            config: config.clone(),
            world,
            policy: round::get_policy(config.round.on_expiry),
            placer,
            rules: EatRules {
                food_value: config.food.value,
                eat_multiplier: config.player.eat_multiplier,
            },
        }
    }

    /// Start the round timer (first connection only).
    pub fn start_round(&mut self, now: Instant) {
        if self.world.clock.start(now) {
            info!("First player joined. Round timer started!");
        }
    }

    /// Register a player that completed the handshake.
    pub fn handle_join(&mut self, id: u32, name: String) {
        let position = self.placer.find_safe_location(&self.world);
        self.world.chat.push(format!("{} CONNECTED", name));
        info!("{} has connected with ID {} at ({:.0}, {:.0})", name, id, position.x, position.y);
        self.world.add_player(Player::new(id, name, position, player_color(id)));
    }

    /// Apply a move intent and return the resulting snapshot.
    pub fn handle_move(&mut self, id: u32, x: i32, y: i32, now: Instant) -> anyhow::Result<Snapshot> {
        if !self.world.set_position(id, DVec2::new(x as f64, y as f64)) {
            anyhow::bail!("Player {} not found", id);
        }

        self.update_round(now);

        if self.world.clock.is_active() {
            let report = collision::resolve_collisions(&mut self.world, id, &self.rules, &self.placer);
            if !report.victims.is_empty() {
                debug!("Player {} ate players {:?}", id, report.victims);
            }
        }

        self.replenish_food();
        Ok(self.world.snapshot())
    }

    /// Apply a chat intent and return the resulting snapshot.
    pub fn handle_chat(&mut self, id: u32, text: &str, now: Instant) -> anyhow::Result<Snapshot> {
        let name = self
            .world
            .player(id)
            .map(|p| p.name.clone())
            .ok_or_else(|| anyhow::anyhow!("Player {} not found", id))?;

        self.update_round(now);

        info!("[Chat] {}: {}", name, text);
        self.world.chat.push(format!("{}: {}", name, text));
        Ok(self.world.snapshot())
    }

    /// Remove a player whose session ended. Returns its name if it was present.
    pub fn remove_client(&mut self, id: u32) -> Option<String> {
        let player = self.world.remove_player(id)?;
        info!("{} has disconnected.", player.name);
        self.world.chat.push(format!("{} DISCONNECTED", player.name));
        Some(player.name)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.world.snapshot()
    }

    /// Advance the round clock: decay on a new interval, expiry hook once.
    fn update_round(&mut self, now: Instant) {
        let tick = self.world.clock.advance(now);

        if tick.decay {
            let round = &self.config.round;
            let affected = self.world.apply_decay(round.decay_threshold, round.decay_factor);
            if affected > 0 {
                debug!(
                    "Mass decay at {}s shrank {} players",
                    self.world.clock.elapsed_secs(),
                    affected
                );
            }
            self.world.clamp_players();
        }

        if tick.expired {
            info!("Round expired ({} policy)", self.policy.name());
            self.policy.on_round_expired(&mut self.world, &self.placer, now);
        }
    }

    /// Top food back up once it drops below the floor: the deficit plus a random batch.
    fn replenish_food(&mut self) {
        let food = &self.config.food;
        let count = self.world.food.len();
        if count >= food.min_amount {
            return;
        }

        let batch = rand::rng().random_range(food.respawn_min..food.respawn_max);
        let amount = food.min_amount - count + batch;
        self.placer.create_food(&mut self.world, amount);
        debug!("Replenished {} food ({} -> {})", amount, count, self.world.food.len());
    }
}

/// Requests handled by the world task.
#[derive(Debug)]
pub enum WorldCommand {
    StartRound,
    Join {
        id: u32,
        name: String,
        reply: oneshot::Sender<()>,
    },
    Move {
        id: u32,
        x: i32,
        y: i32,
        reply: oneshot::Sender<anyhow::Result<Snapshot>>,
    },
    Chat {
        id: u32,
        text: String,
        reply: oneshot::Sender<anyhow::Result<Snapshot>>,
    },
    Leave {
        id: u32,
    },
}

/// Error returned when the world task is gone.
#[derive(Debug, thiserror::Error)]
#[error("world task stopped")]
pub struct WorldClosed;

/// Cloneable sender side of the world task.
#[derive(Debug, Clone)]
pub struct WorldHandle {
    tx: mpsc::Sender<WorldCommand>,
}

impl WorldHandle {
    async fn send(&self, command: WorldCommand) -> Result<(), WorldClosed> {
        self.tx.send(command).await.map_err(|_| WorldClosed)
    }

    pub async fn start_round(&self) -> Result<(), WorldClosed> {
        self.send(WorldCommand::StartRound).await
    }

    pub async fn join(&self, id: u32, name: String) -> Result<(), WorldClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(WorldCommand::Join { id, name, reply }).await?;
        rx.await.map_err(|_| WorldClosed)
    }

    pub async fn move_to(&self, id: u32, x: i32, y: i32) -> Result<anyhow::Result<Snapshot>, WorldClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(WorldCommand::Move { id, x, y, reply }).await?;
        rx.await.map_err(|_| WorldClosed)
    }

    pub async fn chat(&self, id: u32, text: String) -> Result<anyhow::Result<Snapshot>, WorldClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(WorldCommand::Chat { id, text, reply }).await?;
        rx.await.map_err(|_| WorldClosed)
    }

    pub async fn leave(&self, id: u32) -> Result<(), WorldClosed> {
        self.send(WorldCommand::Leave { id }).await
    }
}

/// Spawn the world task. It returns the final state once every handle is dropped.
pub fn spawn_game_loop(state: GameState, queue: usize) -> (WorldHandle, JoinHandle<GameState>) {
    let (tx, rx) = mpsc::channel(queue.max(1));
    let task = tokio::spawn(run_game_loop(state, rx));
    (WorldHandle { tx }, task)
}

/// Process world commands one at a time until all senders are gone.
pub async fn run_game_loop(mut state: GameState, mut rx: mpsc::Receiver<WorldCommand>) -> GameState {
    while let Some(command) = rx.recv().await {
        let now = Instant::now();
        match command {
            WorldCommand::StartRound => state.start_round(now),
            WorldCommand::Join { id, name, reply } => {
                state.handle_join(id, name);
                let _ = reply.send(());
            }
            WorldCommand::Move { id, x, y, reply } => {
                let _ = reply.send(state.handle_move(id, x, y, now));
            }
            WorldCommand::Chat { id, text, reply } => {
                let _ = reply.send(state.handle_chat(id, &text, now));
            }
            WorldCommand::Leave { id } => {
                state.remove_client(id);
            }
        }
    }
    warn!("World task stopping: no more sessions can connect");
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.food.initial_amount = 0;
        config.food.min_amount = 0;
        config
    }

    fn at(start: Instant, secs: u64) -> Instant {
        start + Duration::from_secs(secs)
    }

    #[test]
    fn test_join_registers_player() {
        let mut game = GameState::new(&test_config());
        game.handle_join(3, "Alice".into());

        let player = game.world.player(3).unwrap();
        assert_eq!(player.score, 0.0);
        assert_eq!(player.color, player_color(3));
        assert_eq!(game.world.chat.to_vec(), vec!["Alice CONNECTED".to_string()]);
    }

    #[test]
    fn test_initial_food_spawned() {
        let game = GameState::new(&Config::default());
        assert_eq!(game.world.food.len(), 200);
    }

    #[test]
    fn test_move_sets_position_and_is_idempotent() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.start_round(t0);
        game.handle_join(0, "A".into());

        let first = game.handle_move(0, 300, 200, at(t0, 1)).unwrap();
        let second = game.handle_move(0, 300, 200, at(t0, 1)).unwrap();
        let (a, b) = (first.player(0).unwrap(), second.player(0).unwrap());
        assert_eq!(a.position, DVec2::new(300.0, 200.0));
        assert_eq!(a.position, b.position);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_move_clamped_into_world() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.start_round(t0);
        game.handle_join(0, "A".into());

        let snapshot = game.handle_move(0, -100, 5000, at(t0, 1)).unwrap();
        assert_eq!(snapshot.player(0).unwrap().position, DVec2::new(7.0, 713.0));
    }

    #[test]
    fn test_move_unknown_player_fails() {
        let mut game = GameState::new(&test_config());
        assert!(game.handle_move(42, 1, 1, Instant::now()).is_err());
        assert!(game.handle_chat(42, "hi", Instant::now()).is_err());
    }

    #[test]
    fn test_decay_example() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.start_round(t0);
        game.handle_join(0, "Big".into());
        game.world.player_mut(0).unwrap().score = 100.0;

        let s = game.handle_move(0, 400, 400, at(t0, 6)).unwrap();
        assert_eq!(s.player(0).unwrap().score, 100.0);

        let s = game.handle_move(0, 400, 400, at(t0, 8)).unwrap();
        assert_eq!(s.player(0).unwrap().score, 95.0);
        assert_eq!(s.elapsed_secs, 8);

        let s = game.handle_move(0, 400, 400, at(t0, 13)).unwrap();
        assert_eq!(s.player(0).unwrap().score, 95.0);
    }

    #[test]
    fn test_chat_intent_also_advances_clock() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.start_round(t0);
        game.handle_join(0, "Big".into());
        game.world.player_mut(0).unwrap().score = 100.0;

        let s = game.handle_chat(0, "hello", at(t0, 8)).unwrap();
        assert_eq!(s.player(0).unwrap().score, 95.0);
        assert_eq!(s.chat.last().map(String::as_str), Some("Big: hello"));
    }

    #[test]
    fn test_no_eating_before_round_or_after_expiry() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.handle_join(0, "A".into());
        game.handle_join(1, "B".into());
        game.world.player_mut(0).unwrap().score = 20.0;
        game.world.player_mut(1).unwrap().position = DVec2::new(105.0, 100.0);
        game.world.player_mut(1).unwrap().score = 10.0;

        // Round not started yet.
        let s = game.handle_move(0, 100, 100, t0).unwrap();
        assert_eq!(s.player(1).unwrap().score, 10.0);

        game.start_round(t0);
        let s = game.handle_move(0, 100, 100, at(t0, 300)).unwrap();
        assert!(!s.round_active);
        assert_eq!(s.player(1).unwrap().score, 10.0);
    }

    #[test]
    fn test_eating_during_round() {
        let t0 = Instant::now();
        let mut game = GameState::new(&test_config());
        game.start_round(t0);
        game.handle_join(0, "A".into());
        game.handle_join(1, "B".into());
        game.world.player_mut(0).unwrap().score = 20.0;
        {
            let b = game.world.player_mut(1).unwrap();
            b.position = DVec2::new(105.0, 100.0);
            b.score = 10.0;
        }

        let s = game.handle_move(0, 100, 100, at(t0, 1)).unwrap();
        assert!((s.player(0).unwrap().score - 22.36).abs() < 0.01);
        assert_eq!(s.player(1).unwrap().score, 0.0);
    }

    #[test]
    fn test_food_replenished_above_floor() {
        let t0 = Instant::now();
        let mut config = Config::default();
        config.food.initial_amount = 151;
        let mut game = GameState::new(&config);
        game.start_round(t0);
        game.handle_join(0, "A".into());

        game.world.food.drain(..2);
        assert_eq!(game.world.food.len(), 149);

        let s = game.handle_move(0, 400, 400, at(t0, 1)).unwrap();
        assert!(s.food.len() >= 200, "food count {}", s.food.len());
        assert!(s.food.len() < 250);
    }

    #[test]
    fn test_leave_announces_and_removes() {
        let mut game = GameState::new(&test_config());
        game.handle_join(0, "A".into());
        assert_eq!(game.remove_client(0).as_deref(), Some("A"));
        assert!(game.remove_client(0).is_none());

        let s = game.snapshot();
        assert!(s.player(0).is_none());
        assert_eq!(s.chat.last().map(String::as_str), Some("A DISCONNECTED"));
    }

    #[test]
    fn test_restart_policy_on_expiry() {
        let t0 = Instant::now();
        let mut config = test_config();
        config.round.duration_secs = 20;
        config.round.on_expiry = crate::config::ExpiryPolicy::Restart;
        let mut game = GameState::new(&config);
        game.start_round(t0);
        game.handle_join(0, "A".into());
        game.world.player_mut(0).unwrap().score = 5.0;

        let s = game.handle_move(0, 200, 200, at(t0, 21)).unwrap();
        assert!(s.round_active);
        assert_eq!(s.elapsed_secs, 0);
        assert_eq!(s.player(0).unwrap().score, 0.0);
    }

    #[tokio::test]
    async fn test_world_task_serializes_commands() {
        let (world, task) = spawn_game_loop(GameState::new(&test_config()), 8);
        world.start_round().await.unwrap();
        world.join(0, "A".into()).await.unwrap();
        world.join(1, "B".into()).await.unwrap();

        let snapshot = world.chat(1, "hi".into()).await.unwrap().unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(
            snapshot.chat,
            vec!["A CONNECTED".to_string(), "B CONNECTED".to_string(), "B: hi".to_string()]
        );

        world.leave(0).await.unwrap();
        let snapshot = world.move_to(1, 50, 50).await.unwrap().unwrap();
        assert!(snapshot.player(0).is_none());

        drop(world);
        let state = task.await.unwrap();
        assert_eq!(state.world.players.len(), 1);
    }
}
