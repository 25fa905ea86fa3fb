//! Fixed-width binary records exchanged on the `input` and `state` topics.
//!
//! Every record is its fields in declaration order, `u32` and `f32` as four
//! little-endian bytes each, with no tag, length prefix or sequence number.
//! The layout is produced by bincode's fixed-int encoding rather than by the
//! in-memory representation, so both ends agree regardless of platform.

use crate::game_state::{BallState, GameState, PaddleInput, PaddleState};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{record} payload must be {expected} bytes, got {actual}")]
    WrongSize {
        record: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("malformed payload: {0}")]
    Malformed(#[from] bincode::Error),
}

/// A record with a fixed wire size.
pub trait WireRecord: Serialize + DeserializeOwned {
    const NAME: &'static str;
    const WIRE_SIZE: usize;

    fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }

    /// Decodes a payload, rejecting anything that is not exactly `WIRE_SIZE` bytes.
    fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() != Self::WIRE_SIZE {
            return Err(DecodeError::WrongSize {
                record: Self::NAME,
                expected: Self::WIRE_SIZE,
                actual: payload.len(),
            });
        }
        Ok(bincode::deserialize(payload)?)
    }
}

impl WireRecord for PaddleInput {
    const NAME: &'static str = "PaddleInput";
    const WIRE_SIZE: usize = 8;
}

impl WireRecord for PaddleState {
    const NAME: &'static str = "PaddleState";
    const WIRE_SIZE: usize = 8;
}

impl WireRecord for BallState {
    const NAME: &'static str = "BallState";
    const WIRE_SIZE: usize = 16;
}

impl WireRecord for GameState {
    const NAME: &'static str = "GameState";
    const WIRE_SIZE: usize = PaddleState::WIRE_SIZE * 2 + BallState::WIRE_SIZE;
}
