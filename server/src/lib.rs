//! # Arena Server Library
//!
//! This library provides the authoritative server for the multiplayer bug
//! arena. It owns the canonical world, applies client commands, runs the
//! fixed-step simulation and broadcasts full snapshots to every session.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Positions, combat outcomes and progression are decided here and nowhere
//! else. Clients send intent (directional input, class choice, attacks) and
//! render whatever the latest snapshot says.
//!
//! ### Session Management
//! Each WebSocket connection is bound to exactly one player for its
//! lifetime. Commands naming any other player are dropped. Closing the
//! socket removes the player between ticks.
//!
//! ### State Broadcasting
//! At the snapshot rate the whole world is serialised once and the same
//! text is queued for every session. Snapshots are never deltas.
//!
//! ## Architecture Design
//!
//! ### Single Simulation Task
//! One task owns the [`game::GameState`] and the [`client_manager::ClientManager`].
//! It selects over transport events, the tick interval and the snapshot
//! interval, so a snapshot can never observe a half-applied tick and no
//! locks are needed.
//!
//! ### Per-Connection Tasks
//! Every connection gets a reader (decode, validate, forward) and a writer
//! (drain the outbound channel into the socket). Neither touches game state.
//!
//! ### Tick Pipeline
//! Commands queued since the previous tick are applied first, then the
//! systems run in a fixed order: timers, respawns, player movement, spider
//! behaviour, contact damage and leaf pickup.
//!
//! ## Module Organization
//!
//! - `config`: command-line flags and the derived simulation parameters
//! - `entity`: player, spider and leaf state
//! - `registry`: id allocation and ownership of every entity
//! - `systems`: the per-tick movement, AI, combat and lifecycle rules
//! - `game`: the simulation context tying registry, RNG and command queue together
//! - `client_manager`: live sessions and their outbound channels
//! - `network`: the WebSocket transport and the main loop
//! - `error`: the server's error type
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         port: 8081,
//!         max_clients: 32,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Binds the listener and populates the world.
//!     let server = Server::bind(config).await?;
//!
//!     // Accepts connections, ticks at 30 Hz and broadcasts at 15 Hz
//!     // until the task is dropped.
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod network;
pub mod registry;
pub mod systems;
