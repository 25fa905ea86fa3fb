//! Server loop coordinating input arrival and the fixed-rate simulation tick

use crate::simulator::AuthoritativeSimulator;
use log::{debug, info, warn};
use shared::transport::UdpTransport;
use shared::{Subscription, Topic, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Largest `dt` fed into a single physics step, in seconds.
const MAX_DELTA_TIME: f32 = 1.0 / 20.0;

/// Main server coordinating the transport and the authoritative simulation
pub struct Server {
    simulator: AuthoritativeSimulator,
    inputs: Subscription,
    tick_duration: Duration,
    tick: u64,
}

impl Server {
    /// Binds the UDP hub on `addr` and prepares a fresh game.
    pub async fn bind(addr: &str, tick_duration: Duration) -> Result<Self, TransportError> {
        let transport = Arc::new(UdpTransport::bind(addr).await?);
        Self::with_transport(transport, tick_duration)
    }

    /// Builds a server on top of any transport, subscribing to the `input` topic.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        tick_duration: Duration,
    ) -> Result<Self, TransportError> {
        let inputs = transport.subscribe(Topic::Input)?;

        Ok(Server {
            simulator: AuthoritativeSimulator::new(transport),
            inputs,
            tick_duration,
            tick: 0,
        })
    }

    pub fn simulator(&self) -> &AuthoritativeSimulator {
        &self.simulator
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Runs one simulation step with the measured `dt`, capped to keep the ball
    /// from tunneling after a stall.
    fn advance(&mut self, measured_dt: f32) {
        let mut dt = measured_dt;
        if dt > MAX_DELTA_TIME {
            warn!(
                "Large delta time detected ({:.3}s), capping to {:.3}s",
                dt, MAX_DELTA_TIME
            );
            dt = MAX_DELTA_TIME;
        }

        if let Err(e) = self.simulator.tick(dt) {
            warn!("Tick {}: {}", self.tick, e);
        }
        self.tick += 1;

        if self.tick % 600 == 0 {
            let state = self.simulator.snapshot();
            debug!(
                "Tick {}: {:.1}Hz, ball ({:.0}, {:.0}), paddles {:.0}/{:.0}",
                self.tick,
                1.0 / measured_dt.max(f32::EPSILON),
                state.ball.x,
                state.ball.y,
                state.left.y,
                state.right.y
            );
        }
    }

    /// Main server loop: inputs are applied as they arrive, the ball advances
    /// on every tick of a fixed-deadline interval.
    ///
    /// Returns only if the transport closes the input queue.
    pub async fn run(&mut self) {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Skip the first tick since it fires immediately
        tick_interval.tick().await;
        let mut last_tick = Instant::now();

        info!(
            "Server started, ticking every {}ms",
            self.tick_duration.as_millis()
        );

        loop {
            tokio::select! {
                payload = self.inputs.recv() => {
                    match payload {
                        Some(payload) => self.simulator.handle_input_payload(&payload),
                        None => {
                            info!("Input queue closed, server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    self.advance(dt);
                },
            }
        }
    }
}
