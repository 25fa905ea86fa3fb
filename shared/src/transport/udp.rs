//! UDP implementation of the pub/sub transport.
//!
//! Each datagram is one frame: a kind byte, a topic byte, then the payload.
//! A process created with [`UdpTransport::bind`] acts as the hub: it records
//! every peer that sends a subscribe frame and publishes to all peers
//! subscribed to the topic. A process created with [`UdpTransport::connect`]
//! publishes to the hub and keeps its subscriptions registered there.

use super::{DeliveryMode, Subscription, Topic, Transport, TransportError};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep};

const FRAME_PUBLISH: u8 = 0;
const FRAME_SUBSCRIBE: u8 = 1;
const HEADER_LEN: usize = 2;
const RECV_BUFFER_SIZE: usize = 2048;

/// How often a connected transport re-announces its subscriptions.
const SUBSCRIBE_REFRESH: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq)]
enum Frame<'a> {
    Publish { topic: Topic, payload: &'a [u8] },
    Subscribe { topic: Topic },
}

impl<'a> Frame<'a> {
    fn parse(bytes: &'a [u8]) -> Result<Frame<'a>, TransportError> {
        if bytes.len() < HEADER_LEN {
            return Err(TransportError::MalformedFrame(bytes.len()));
        }

        let topic = Topic::from_wire_id(bytes[1])?;
        match bytes[0] {
            FRAME_PUBLISH => Ok(Frame::Publish {
                topic,
                payload: &bytes[HEADER_LEN..],
            }),
            FRAME_SUBSCRIBE if bytes.len() == HEADER_LEN => Ok(Frame::Subscribe { topic }),
            _ => Err(TransportError::MalformedFrame(bytes.len())),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Frame::Publish { topic, payload } => {
                let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
                bytes.push(FRAME_PUBLISH);
                bytes.push(topic.wire_id());
                bytes.extend_from_slice(payload);
                bytes
            }
            Frame::Subscribe { topic } => vec![FRAME_SUBSCRIBE, topic.wire_id()],
        }
    }
}

/// Local subscriber queues and remote subscriber addresses.
#[derive(Debug, Default)]
struct Routes {
    local: Mutex<HashMap<Topic, Vec<mpsc::UnboundedSender<Vec<u8>>>>>,
    peers: Mutex<HashMap<Topic, HashSet<SocketAddr>>>,
}

impl Routes {
    fn add_local(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.local.lock().entry(topic).or_default().push(tx);
        rx
    }

    fn local_topics(&self) -> Vec<Topic> {
        self.local.lock().keys().copied().collect()
    }

    fn deliver(&self, topic: Topic, payload: &[u8]) {
        let mut local = self.local.lock();
        match local.get_mut(&topic) {
            Some(senders) => senders.retain(|sender| sender.send(payload.to_vec()).is_ok()),
            None => debug!("No subscriber for topic {}, dropping payload", topic),
        }
    }

    fn add_peer(&self, topic: Topic, addr: SocketAddr) {
        let mut peers = self.peers.lock();
        if peers.entry(topic).or_default().insert(addr) {
            info!("Peer {} subscribed to {}", addr, topic);
        }
    }

    fn peers_for(&self, topic: Topic) -> Vec<SocketAddr> {
        self.peers
            .lock()
            .get(&topic)
            .map(|addrs| addrs.iter().copied().collect())
            .unwrap_or_default()
    }
}

pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    remote: Option<SocketAddr>,
    routes: Arc<Routes>,
    tasks: Vec<JoinHandle<()>>,
}

impl UdpTransport {
    /// Binds the hub endpoint that remote transports connect to.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        // try_send_to reports WouldBlock until the reactor has seen the socket
        socket.writable().await?;
        info!("Transport listening on {}", socket.local_addr()?);

        let routes = Arc::new(Routes::default());
        let receiver = Self::spawn_receiver(Arc::clone(&socket), Arc::clone(&routes));

        Ok(Self {
            socket,
            remote: None,
            routes,
            tasks: vec![receiver],
        })
    }

    /// Opens an ephemeral endpoint that publishes to and subscribes through `server`.
    pub async fn connect(server: &str) -> Result<Self, TransportError> {
        let remote = tokio::net::lookup_host(server).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("could not resolve {}", server),
            )
        })?;

        let bind_addr = if remote.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = Arc::new(UdpSocket::bind(bind_addr).await?);
        socket.writable().await?;
        info!(
            "Transport bound to {}, hub at {}",
            socket.local_addr()?,
            remote
        );

        let routes = Arc::new(Routes::default());
        let receiver = Self::spawn_receiver(Arc::clone(&socket), Arc::clone(&routes));
        let refresher =
            Self::spawn_subscription_refresh(Arc::clone(&socket), Arc::clone(&routes), remote);

        Ok(Self {
            socket,
            remote: Some(remote),
            routes,
            tasks: vec![receiver, refresher],
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Number of remote peers currently subscribed to `topic`.
    pub fn peer_count(&self, topic: Topic) -> usize {
        self.routes.peers_for(topic).len()
    }

    /// Spawns task that continuously receives frames and routes them
    fn spawn_receiver(socket: Arc<UdpSocket>, routes: Arc<Routes>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut buffer = [0u8; RECV_BUFFER_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => match Frame::parse(&buffer[..len]) {
                        Ok(Frame::Publish { topic, payload }) => routes.deliver(topic, payload),
                        Ok(Frame::Subscribe { topic }) => routes.add_peer(topic, addr),
                        Err(e) => warn!("Dropping datagram from {}: {}", addr, e),
                    },
                    Err(e) => {
                        error!("Error receiving datagram: {}", e);
                        sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        })
    }

    /// Spawns task that re-sends subscribe frames, since the first one may be lost
    fn spawn_subscription_refresh(
        socket: Arc<UdpSocket>,
        routes: Arc<Routes>,
        remote: SocketAddr,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(SUBSCRIBE_REFRESH);

            loop {
                ticker.tick().await;

                for topic in routes.local_topics() {
                    let frame = Frame::Subscribe { topic }.to_bytes();
                    if let Err(e) = Self::send_frame(&socket, &frame, remote) {
                        warn!("Failed to refresh subscription to {}: {}", topic, e);
                    }
                }
            }
        })
    }

    /// Sends without waiting; a full socket buffer drops the datagram.
    fn send_frame(
        socket: &UdpSocket,
        frame: &[u8],
        addr: SocketAddr,
    ) -> Result<(), TransportError> {
        match socket.try_send_to(frame, addr) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!("Send buffer full, dropping {} bytes to {}", frame.len(), addr);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Transport for UdpTransport {
    fn publish(
        &self,
        topic: Topic,
        payload: &[u8],
        _mode: DeliveryMode,
    ) -> Result<(), TransportError> {
        let frame = Frame::Publish { topic, payload }.to_bytes();

        if let Some(remote) = self.remote {
            Self::send_frame(&self.socket, &frame, remote)?;
        }

        for peer in self.routes.peers_for(topic) {
            if let Err(e) = Self::send_frame(&self.socket, &frame, peer) {
                warn!("Failed to publish {} to {}: {}", topic, peer, e);
            }
        }

        Ok(())
    }

    fn subscribe(&self, topic: Topic) -> Result<Subscription, TransportError> {
        let subscription = self.routes.add_local(topic);

        if let Some(remote) = self.remote {
            let frame = Frame::Subscribe { topic }.to_bytes();
            Self::send_frame(&self.socket, &frame, remote)?;
        }

        Ok(subscription)
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    async fn wait_for_peer(hub: &UdpTransport, topic: Topic) {
        for _ in 0..100 {
            if hub.peer_count(topic) > 0 {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("No peer subscribed to {}", topic);
    }

    #[test]
    fn test_frame_roundtrip() {
        let payload = [1u8, 2, 3, 4];
        let frame = Frame::Publish {
            topic: Topic::State,
            payload: &payload,
        };
        let bytes = frame.to_bytes();

        assert_eq!(bytes[0], FRAME_PUBLISH);
        assert_eq!(bytes.len(), HEADER_LEN + payload.len());
        assert_eq!(Frame::parse(&bytes).unwrap(), frame);

        let subscribe = Frame::Subscribe { topic: Topic::Input };
        assert_eq!(Frame::parse(&subscribe.to_bytes()).unwrap(), subscribe);
    }

    #[test]
    fn test_malformed_frames_rejected() {
        assert!(Frame::parse(&[]).is_err());
        assert!(Frame::parse(&[FRAME_PUBLISH]).is_err());
        assert!(Frame::parse(&[FRAME_PUBLISH, 9, 0]).is_err());
        assert!(Frame::parse(&[7, 0]).is_err());
        assert!(Frame::parse(&[FRAME_SUBSCRIBE, 0, 1]).is_err());
    }

    #[tokio::test]
    async fn test_client_receives_hub_publish() {
        let hub = assert_ok!(UdpTransport::bind("127.0.0.1:0").await);
        let hub_addr = hub.local_addr().unwrap().to_string();

        let client = assert_ok!(UdpTransport::connect(&hub_addr).await);
        let mut states = client.subscribe(Topic::State).unwrap();
        wait_for_peer(&hub, Topic::State).await;

        hub.publish(Topic::State, &[5; 32], DeliveryMode::BestEffort)
            .unwrap();

        let received = timeout(Duration::from_secs(1), states.recv())
            .await
            .expect("timed out waiting for state")
            .expect("subscription closed");
        assert_eq!(received, vec![5; 32]);
    }

    #[tokio::test]
    async fn test_hub_receives_client_publish() {
        let hub = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let mut inputs = hub.subscribe(Topic::Input).unwrap();
        let client = UdpTransport::connect(&hub.local_addr().unwrap().to_string())
            .await
            .unwrap();

        client
            .publish(Topic::Input, &[1, 0, 0, 0, 0, 0, 240, 65], DeliveryMode::BestEffort)
            .unwrap();

        let received = timeout(Duration::from_secs(1), inputs.recv())
            .await
            .expect("timed out waiting for input")
            .expect("subscription closed");
        assert_eq!(received, vec![1, 0, 0, 0, 0, 0, 240, 65]);
        assert_eq!(hub.peer_count(Topic::Input), 0);
    }

    #[tokio::test]
    async fn test_first_frames_after_connect_are_sent() {
        let hub = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let mut inputs = hub.subscribe(Topic::Input).unwrap();
        let client = UdpTransport::connect(&hub.local_addr().unwrap().to_string())
            .await
            .unwrap();

        // Both go out before any refresh tick could resend them.
        let _states = client.subscribe(Topic::State).unwrap();
        client
            .publish(Topic::Input, &[7; 8], DeliveryMode::BestEffort)
            .unwrap();

        let received = timeout(Duration::from_millis(500), inputs.recv())
            .await
            .expect("first publish was dropped")
            .expect("subscription closed");
        assert_eq!(received, vec![7; 8]);

        for _ in 0..50 {
            if hub.peer_count(Topic::State) > 0 {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("first subscribe frame was dropped");
    }

    #[tokio::test]
    async fn test_garbage_datagram_is_dropped() {
        let hub = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let hub_addr = hub.local_addr().unwrap();
        let mut inputs = hub.subscribe(Topic::Input).unwrap();

        let raw = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        raw.send_to(&[0xFF], hub_addr).await.unwrap();
        raw.send_to(&[FRAME_PUBLISH, 0, 42], hub_addr).await.unwrap();

        let received = timeout(Duration::from_secs(1), inputs.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, vec![42]);
    }
}
