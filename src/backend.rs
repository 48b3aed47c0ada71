use std::net::SocketAddr;
use std::sync::Arc;

use emotion_canvas::collab::{BackendNotifier, CellEvent};
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// One datagram to the session log service.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message<'a> {
    OpenSession { grid_width: u32, grid_height: u32 },
    Cell(&'a CellEvent),
    ClearSession,
}

/// Reports cell entries as JSON datagrams. Sending happens on the tokio
/// runtime; the caller never waits and failures are only logged.
pub struct UdpNotifier {
    socket: Arc<UdpSocket>,
    runtime: Handle,
}

impl UdpNotifier {
    pub fn connect(addr: SocketAddr, runtime: Handle) -> anyhow::Result<Self> {
        let socket = runtime.block_on(async {
            let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
            socket.connect(addr).await?;
            Ok::<_, std::io::Error>(socket)
        })?;
        info!("Reporting cells to {}", addr);
        Ok(Self {
            socket: Arc::new(socket),
            runtime,
        })
    }

    fn dispatch(&self, message: &Message<'_>) {
        let payload = match serde_json::to_vec(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode backend message: {}", e);
                return;
            }
        };
        let socket = self.socket.clone();
        self.runtime.spawn(async move {
            match socket.send(&payload).await {
                Ok(sent) => debug!("Sent {} bytes to backend", sent),
                Err(e) => warn!("Failed to reach backend: {}", e),
            }
        });
    }
}

impl BackendNotifier for UdpNotifier {
    fn open_session(&mut self, grid_width: u32, grid_height: u32) {
        self.dispatch(&Message::OpenSession {
            grid_width,
            grid_height,
        });
    }

    fn notify_cell(&mut self, event: &CellEvent) {
        self.dispatch(&Message::Cell(event));
    }

    fn clear_session(&mut self) {
        self.dispatch(&Message::ClearSession);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_canvas::Mood;

    #[test]
    fn messages_are_tagged_json() {
        let event = CellEvent {
            x: 3,
            y: 4,
            emotion: Mood::Calm,
            intensity: 1.0,
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(Message::Cell(&event)).unwrap();
        assert_eq!(json["type"], "cell");
        assert_eq!(json["emotion"], "calm");
        assert_eq!(json["y"], 4);

        let json = serde_json::to_value(Message::OpenSession {
            grid_width: 22,
            grid_height: 12,
        })
        .unwrap();
        assert_eq!(json["type"], "open_session");
        assert_eq!(json["grid_width"], 22);
    }

    #[tokio::test]
    async fn datagrams_reach_the_listener() {
        let listener = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let socket = UdpSocket::bind(("127.0.0.1", 0)).await.unwrap();
        socket.connect(addr).await.unwrap();
        let mut notifier = UdpNotifier {
            socket: Arc::new(socket),
            runtime: Handle::current(),
        };
        notifier.clear_session();

        let mut buf = [0u8; 256];
        let len = listener.recv(&mut buf).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(json["type"], "clear_session");
    }
}
