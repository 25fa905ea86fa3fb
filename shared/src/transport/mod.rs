//! Publish/subscribe transport between the server and its clients.
//!
//! The game only ever needs two operations: publish a payload on a topic and
//! receive whatever arrives on a topic. Delivery is best-effort: payloads may
//! be dropped, duplicated or reordered, and nothing is acknowledged.
//!
//! Incoming payloads are pushed into an unbounded queue per subscription, so
//! whatever thread the transport receives on never calls into game code. The
//! consumer drains its queue on its own schedule.

mod loopback;
mod udp;

pub use loopback::LoopbackTransport;
pub use udp::UdpTransport;

use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;

/// Named channel a payload is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Client to server `PaddleInput` records.
    Input,
    /// Server to client `GameState` snapshots.
    State,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Input => "input",
            Topic::State => "state",
        }
    }

    pub(crate) fn wire_id(&self) -> u8 {
        match self {
            Topic::Input => 0,
            Topic::State => 1,
        }
    }

    pub(crate) fn from_wire_id(id: u8) -> Result<Topic, TransportError> {
        match id {
            0 => Ok(Topic::Input),
            1 => Ok(Topic::State),
            other => Err(TransportError::UnknownTopic(other)),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery guarantee requested for a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Fire and forget: no acknowledgment, no retry, no ordering.
    BestEffort,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown topic id {0}")]
    UnknownTopic(u8),

    #[error("malformed frame of {0} bytes")]
    MalformedFrame(usize),
}

/// Queue of payloads received on one topic.
pub type Subscription = mpsc::UnboundedReceiver<Vec<u8>>;

pub trait Transport: Send + Sync {
    /// Hands `payload` to the transport for delivery to every subscriber of `topic`.
    ///
    /// Returning `Ok` means the payload was accepted, not that it arrived.
    fn publish(
        &self,
        topic: Topic,
        payload: &[u8],
        mode: DeliveryMode,
    ) -> Result<(), TransportError>;

    /// Starts receiving payloads published on `topic`.
    fn subscribe(&self, topic: Topic) -> Result<Subscription, TransportError>;
}
