use crate::game::reconcile;
use log::{debug, info, warn};
use shared::transport::UdpTransport;
use shared::{
    DeliveryMode, PaddleInput, SharedGameState, Topic, Transport, TransportError, WireRecord,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Background half of the client: feeds snapshots into the mirror and
/// forwards paddle inputs from the render loop to the transport.
///
/// Must be started inside a tokio runtime. The render loop only ever touches
/// the mirror and `send_input`, both of which are non-blocking.
pub struct NetworkSession {
    outgoing: mpsc::UnboundedSender<PaddleInput>,
    tasks: Vec<JoinHandle<()>>,
}

impl NetworkSession {
    pub fn start(
        transport: Arc<dyn Transport>,
        mirror: Arc<SharedGameState>,
    ) -> Result<Self, TransportError> {
        let snapshots = transport.subscribe(Topic::State)?;
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();

        let receiver = Self::spawn_snapshot_receiver(snapshots, mirror);
        let sender = Self::spawn_input_sender(transport, outgoing_rx);

        Ok(Self {
            outgoing,
            tasks: vec![receiver, sender],
        })
    }

    /// Queues an input for publication on the `input` topic.
    pub fn send_input(&self, input: PaddleInput) {
        if self.outgoing.send(input).is_err() {
            warn!("Input sender stopped, dropping input");
        }
    }

    /// Spawns task that drains the `state` queue into the mirror
    fn spawn_snapshot_receiver(
        mut snapshots: mpsc::UnboundedReceiver<Vec<u8>>,
        mirror: Arc<SharedGameState>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut received: u64 = 0;
            let mut first = true;

            while let Some(payload) = snapshots.recv().await {
                match reconcile(&mirror, &payload) {
                    Ok(_) => {
                        if first {
                            info!("Receiving game state");
                            first = false;
                        }
                        received += 1;
                    }
                    Err(e) => debug!("Dropping snapshot: {}", e),
                }
            }

            info!("State subscription closed after {} snapshots", received);
        })
    }

    /// Spawns task that publishes queued inputs
    fn spawn_input_sender(
        transport: Arc<dyn Transport>,
        mut outgoing_rx: mpsc::UnboundedReceiver<PaddleInput>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(input) = outgoing_rx.recv().await {
                let payload = match input.encode() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Failed to encode input: {}", e);
                        continue;
                    }
                };

                if let Err(e) = transport.publish(Topic::Input, &payload, DeliveryMode::BestEffort)
                {
                    warn!("Failed to publish input: {}", e);
                }
            }
        })
    }
}

impl Drop for NetworkSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Connects to the server hub and starts a session feeding `mirror`.
pub async fn connect(
    server: &str,
    mirror: Arc<SharedGameState>,
) -> Result<NetworkSession, TransportError> {
    info!("Connecting to {}", server);
    let transport = Arc::new(UdpTransport::connect(server).await?);
    NetworkSession::start(transport, mirror)
}
