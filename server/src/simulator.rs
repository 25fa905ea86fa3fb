//! Authoritative simulation: the only writer of the canonical game state.

use log::{trace, warn};
use shared::{
    DeliveryMode, GameState, PaddleInput, SharedGameState, Topic, Transport, TransportError,
    WireRecord,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] bincode::Error),

    #[error("failed to publish snapshot: {0}")]
    Publish(#[from] TransportError),
}

/// Owns the canonical `GameState` and publishes a snapshot after every tick.
///
/// Inputs and ticks may arrive from different tasks; both go through the
/// same `SharedGameState` lock so they are serialized, never interleaved.
pub struct AuthoritativeSimulator {
    state: Arc<SharedGameState>,
    transport: Arc<dyn Transport>,
}

impl AuthoritativeSimulator {
    /// Creates a simulator starting from the fixed opening position.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_state(GameState::new(), transport)
    }

    pub fn with_state(state: GameState, transport: Arc<dyn Transport>) -> Self {
        Self {
            state: Arc::new(SharedGameState::new(state)),
            transport,
        }
    }

    /// Applies one paddle movement. Unknown player ids are ignored.
    pub fn apply_input(&self, input: &PaddleInput) {
        self.state.update(|state| state.apply_input(input));
    }

    /// Decodes an `input` payload and applies it, dropping anything malformed.
    pub fn handle_input_payload(&self, payload: &[u8]) {
        match PaddleInput::decode(payload) {
            Ok(input) => {
                trace!("Input from player {}: dy={}", input.id, input.dy);
                self.apply_input(&input);
            }
            Err(e) => warn!("Dropping input payload: {}", e),
        }
    }

    /// Advances the ball by `dt` seconds and publishes the resulting snapshot.
    ///
    /// The snapshot is copied out under the lock and published after it is
    /// released. Returns the published state.
    pub fn tick(&self, dt: f32) -> Result<GameState, SimulatorError> {
        let snapshot = self.state.update(|state| {
            state.step(dt);
            *state
        });

        let payload = snapshot.encode()?;
        self.transport
            .publish(Topic::State, &payload, DeliveryMode::BestEffort)?;

        Ok(snapshot)
    }

    /// Returns a copy of the canonical state.
    pub fn snapshot(&self) -> GameState {
        self.state.snapshot()
    }
}
