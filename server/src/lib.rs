//! # Pong Server Library
//!
//! The authoritative side of the game. It owns the canonical `GameState`,
//! applies paddle inputs from both players as they arrive, advances the ball
//! on a fixed tick and publishes a full snapshot on the `state` topic after
//! every tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server is the only process that simulates the ball. Clients move
//! their own paddle locally for responsiveness but never decide where the
//! ball is.
//!
//! ### Input Application
//! Inputs are trusted at face value: the delta is added to the paddle and
//! the result clamped into range. Inputs naming a player that owns no paddle
//! are dropped silently.
//!
//! ### State Broadcasting
//! Every tick ends with a complete snapshot, not a delta. Delivery is
//! best-effort, so a lost snapshot is simply superseded by the next one.
//!
//! ## Module Organization
//!
//! ### Simulator Module (`simulator`)
//! - Lock-guarded canonical state
//! - Input decoding and application
//! - Tick: physics step, snapshot encoding, publication
//!
//! ### Network Module (`network`)
//! - UDP hub binding
//! - Main loop multiplexing input arrival and the tick interval
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::bind("0.0.0.0:20666", Duration::from_millis(16)).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Tick Scheduling
//!
//! Ticks come from a `tokio` interval whose deadlines are fixed multiples of
//! the period, so time spent inside a tick does not push later ticks back.
//! The `dt` given to physics is the measured time since the previous tick,
//! capped at 50ms.

pub mod network;
pub mod simulator;
