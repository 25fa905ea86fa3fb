//! # Pong Client Library
//!
//! The player side of the game: it samples the keyboard, moves the player's
//! own paddle immediately, sends rate-limited movement deltas to the server
//! and draws whatever the latest authoritative snapshot says about the rest
//! of the field.
//!
//! ## Architecture Overview
//!
//! ### Client-Side Prediction
//! The controlled paddle is simulated locally every frame, so a held key
//! moves it with no network delay. The locally predicted value is never sent
//! back as a position; only movement deltas travel to the server.
//!
//! ### Snapshot Reconciliation
//! Each snapshot from the server overwrites the mirrored state wholesale:
//! the opponent's paddle and the ball jump straight to the new values. There
//! is no interpolation and no sequencing, so a late snapshot arriving after
//! a newer one wins.
//!
//! ### Bounded Send Rate
//! Movement is sent at most twenty times a second, each message sized by the
//! fixed send interval rather than by the render frame time.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! - `ClientPredictor`: local paddle, send limiter, mirror access
//! - Snapshot decoding into the mirror
//!
//! ### Input Module (`input`)
//! - `InputSource` trait and the keyboard implementation
//! - Per-player key bindings
//!
//! ### Network Module (`network`)
//! - Background tasks draining snapshots and publishing inputs
//!
//! ### Rendering Module (`rendering`)
//! - Letterboxed 16:9 playfield, paddles and ball
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::ClientPredictor;
//! use client::input::{InputSource, KeyBindings, KeyboardInput};
//! use client::network;
//! use client::rendering::Renderer;
//! use macroquad::prelude::*;
//!
//! async fn play(runtime: &tokio::runtime::Runtime) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut predictor = ClientPredictor::new(1);
//!     let session = runtime.block_on(network::connect("127.0.0.1:20666", predictor.mirror()))?;
//!     let mut input = KeyboardInput::new(KeyBindings::for_player(1));
//!     let renderer = Renderer::new(predictor.side());
//!
//!     loop {
//!         if let Some(delta) = predictor.update(input.axis(), get_frame_time()) {
//!             session.send_input(delta);
//!         }
//!         renderer.render(&predictor.render_state());
//!         next_frame().await;
//!     }
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
