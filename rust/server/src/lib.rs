//! # pokerd-server: the tournament session layer
//!
//! Hosts 2-9 bots over WebSocket for a single No-Limit Texas Hold'em
//! tournament. The [`coordinator`] task owns all game state and drives
//! [`pokerd_engine`] one decision at a time; [`connection`] tasks pump
//! frames between sockets and the coordinator; [`views`] masks hole
//! cards per recipient; [`protocol`] fixes the wire contract.

pub mod connection;
pub mod coordinator;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod views;

pub use coordinator::{Command, ConnectionHandle, Coordinator, CoordinatorConfig};
pub use logging::init_logging;
pub use protocol::{ErrorCode, ServerMessage};
pub use server::{PokerServer, ServerConfig, ServerError, ServerHandle};
