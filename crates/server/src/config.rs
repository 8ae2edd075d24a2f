//! Server configuration.

use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub food: FoodConfig,
    #[serde(default)]
    pub round: RoundConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
}

impl Config {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from `path`, writing the defaults there if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the game rules cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let diameter = self.world.base_radius * 2.0;
        ensure!(self.world.base_radius >= 0.0, "world.base_radius must not be negative");
        ensure!(
            self.world.width > diameter && self.world.height > diameter,
            "world must be larger than one player ({}x{} vs radius {})",
            self.world.width,
            self.world.height,
            self.world.base_radius
        );
        ensure!(
            self.food.respawn_min < self.food.respawn_max,
            "food.respawn_min must be below food.respawn_max"
        );
        ensure!(self.food.value >= 0.0, "food.value must not be negative");
        ensure!(self.player.eat_multiplier > 0.0, "player.eat_multiplier must be positive");
        ensure!(
            self.round.decay_factor > 0.0 && self.round.decay_factor <= 1.0,
            "round.decay_factor must be in (0, 1]"
        );
        ensure!(self.round.decay_interval_secs > 0, "round.decay_interval_secs must be positive");
        ensure!(self.chat.capacity > 0, "chat.capacity must be positive");
        ensure!(self.spawn.max_attempts > 0, "spawn.max_attempts must be positive");
        ensure!(self.server.command_queue > 0, "server.command_queue must be positive");
        Ok(())
    }
}

/// Server networking settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted frame payload in bytes.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    /// Capacity of the queue feeding the world task.
    #[serde(default = "default_command_queue")]
    pub command_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            max_frame_len: default_max_frame_len(),
            command_queue: default_command_queue(),
        }
    }
}

fn default_port() -> u16 {
    5555
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_max_frame_len() -> usize {
    protocol::frame::DEFAULT_MAX_FRAME_LEN
}
fn default_command_queue() -> usize {
    1024
}

/// World dimensions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_width")]
    pub width: f64,
    #[serde(default = "default_world_height")]
    pub height: f64,
    /// Radius of a player with zero score.
    #[serde(default = "default_base_radius")]
    pub base_radius: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_world_width(),
            height: default_world_height(),
            base_radius: default_base_radius(),
        }
    }
}

fn default_world_width() -> f64 {
    850.0
}
fn default_world_height() -> f64 {
    720.0
}
fn default_base_radius() -> f64 {
    7.0
}

/// Player configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// A player must exceed `other * eat_multiplier` to eat another player.
    #[serde(default = "default_eat_multiplier")]
    pub eat_multiplier: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            eat_multiplier: default_eat_multiplier(),
        }
    }
}

fn default_eat_multiplier() -> f64 {
    crate::collision::PLAYER_EAT_MULT
}

/// Food configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoodConfig {
    /// Food spawned before the first connection.
    #[serde(default = "default_food_initial_amount")]
    pub initial_amount: usize,
    /// Replenish whenever the food count drops below this.
    #[serde(default = "default_food_min_amount")]
    pub min_amount: usize,
    /// Extra food per replenishment, drawn from `respawn_min..respawn_max`.
    #[serde(default = "default_food_respawn_min")]
    pub respawn_min: usize,
    #[serde(default = "default_food_respawn_max")]
    pub respawn_max: usize,
    /// Score gained per food item.
    #[serde(default = "default_food_value")]
    pub value: f64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            initial_amount: default_food_initial_amount(),
            min_amount: default_food_min_amount(),
            respawn_min: default_food_respawn_min(),
            respawn_max: default_food_respawn_max(),
            value: default_food_value(),
        }
    }
}

fn default_food_initial_amount() -> usize {
    200
}
fn default_food_min_amount() -> usize {
    150
}
fn default_food_respawn_min() -> usize {
    50
}
fn default_food_respawn_max() -> usize {
    100
}
fn default_food_value() -> f64 {
    0.5
}

/// What happens once the round timer runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Stop eating and decay; keep everyone where they are.
    #[default]
    Freeze,
    /// Reset scores, respawn everyone and start a new round.
    Restart,
}

/// Round timing and decay.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoundConfig {
    #[serde(default = "default_round_duration")]
    pub duration_secs: u64,
    #[serde(default = "default_decay_interval")]
    pub decay_interval_secs: u64,
    /// Only scores above this decay.
    #[serde(default = "default_decay_threshold")]
    pub decay_threshold: f64,
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,
    #[serde(default)]
    pub on_expiry: ExpiryPolicy,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_round_duration(),
            decay_interval_secs: default_decay_interval(),
            decay_threshold: default_decay_threshold(),
            decay_factor: default_decay_factor(),
            on_expiry: ExpiryPolicy::default(),
        }
    }
}

fn default_round_duration() -> u64 {
    300
}
fn default_decay_interval() -> u64 {
    7
}
fn default_decay_threshold() -> f64 {
    8.0
}
fn default_decay_factor() -> f64 {
    0.95
}

/// Chat history settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_capacity")]
    pub capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            capacity: default_chat_capacity(),
        }
    }
}

fn default_chat_capacity() -> usize {
    20
}

/// Spawn placement settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpawnConfig {
    /// Rejection-sampling attempts before the distance check is dropped.
    #[serde(default = "default_spawn_attempts")]
    pub max_attempts: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_spawn_attempts(),
        }
    }
}

fn default_spawn_attempts() -> usize {
    1000
}
