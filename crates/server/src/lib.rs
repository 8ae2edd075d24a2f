//! Authoritative arena game server library.

pub mod chat;
pub mod collision;
pub mod config;
pub mod entity;
pub mod round;
pub mod server;
pub mod spawn;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use server::{run, serve};
