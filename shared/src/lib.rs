//! # Shared Game Library
//!
//! Types, constants and rules used by both the authoritative server and the
//! predicting clients. Keeping them in one crate means the server's physics
//! and the client's local paddle movement agree on every bound.
//!
//! ## Module Organization
//!
//! - `game_state`: the canonical records (`GameState`, `PaddleState`,
//!   `BallState`, `PaddleInput`) and the physics step
//! - `codec`: fixed-width binary encoding of those records
//! - `shared_state`: the lock-guarded container both roles keep their state in
//! - `transport`: the publish/subscribe seam plus UDP and in-process buses

pub mod codec;
pub mod game_state;
pub mod shared_state;
pub mod transport;

use std::time::Duration;

pub use codec::{DecodeError, WireRecord};
pub use game_state::{BallState, GameState, PaddleInput, PaddleState, Side};
pub use shared_state::SharedGameState;
pub use transport::{DeliveryMode, Subscription, Topic, Transport, TransportError};

pub const FIELD_WIDTH: f32 = 1920.0;
pub const FIELD_HEIGHT: f32 = 1080.0;

pub const PADDLE_MIN_Y: f32 = 80.0;
pub const PADDLE_MAX_Y: f32 = 1000.0;
pub const PADDLE_WIDTH: f32 = 20.0;
pub const PADDLE_HEIGHT: f32 = 160.0;
pub const LEFT_PADDLE_X: f32 = 40.0;
pub const RIGHT_PADDLE_X: f32 = 1880.0;

/// Ball x below which the left paddle can return it.
pub const PADDLE_HIT_X_LEFT: f32 = 60.0;
/// Ball x above which the right paddle can return it.
pub const PADDLE_HIT_X_RIGHT: f32 = 1860.0;
/// Maximum vertical distance (exclusive) between ball and paddle centre for a hit.
pub const PADDLE_HIT_RANGE: f32 = 90.0;

pub const BALL_RADIUS: f32 = 10.0;

pub const START_PADDLE_Y: f32 = 540.0;
pub const START_BALL_X: f32 = 960.0;
pub const START_BALL_Y: f32 = 540.0;
pub const START_BALL_VX: f32 = 350.0;
pub const START_BALL_VY: f32 = 220.0;

/// Paddle speed in field units per second while a movement key is held.
pub const PADDLE_SPEED: f32 = 600.0;
/// Seconds between two movement messages from a client.
pub const SEND_INTERVAL: f32 = 1.0 / 20.0;
/// Server simulation period.
pub const TICK_PERIOD: Duration = Duration::from_millis(16);

pub const DEFAULT_PORT: u16 = 20666;

/// Clamps a paddle centre into its legal vertical range.
pub fn clamp_paddle_y(y: f32) -> f32 {
    y.clamp(PADDLE_MIN_Y, PADDLE_MAX_Y)
}
