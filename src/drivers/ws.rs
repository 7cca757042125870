// Chope — WebSocket transport
//
// The ESP-IDF client runs its own task and reconnects by itself.  Its event
// callback only forwards events into a channel; the scheduler drains one per
// tick through `Transport::poll`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;

use esp_idf_svc::ws::client::{
    EspWebSocketClient, EspWebSocketClientConfig, WebSocketEventType,
};
use esp_idf_svc::ws::FrameType;

use super::Transport;
use crate::config::*;
use crate::events::LinkEvent;

pub struct WsTransport {
    client: EspWebSocketClient<'static>,
    events: Receiver<LinkEvent>,
    connected: Arc<AtomicBool>,
}

impl WsTransport {
    pub fn connect(uri: &str) -> anyhow::Result<Self> {
        let (tx, events) = mpsc::channel();
        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);

        let config = EspWebSocketClientConfig {
            reconnect_timeout_ms: Duration::from_millis(WS_RECONNECT_INTERVAL_MS),
            ..Default::default()
        };

        let client = EspWebSocketClient::new(
            uri,
            &config,
            Duration::from_millis(WS_SEND_TIMEOUT_MS),
            move |event| {
                let link_event = match event {
                    Ok(event) => match &event.event_type {
                        WebSocketEventType::Connected => {
                            flag.store(true, Ordering::SeqCst);
                            Some(LinkEvent::Connected)
                        }
                        WebSocketEventType::Disconnected
                        | WebSocketEventType::Close(_)
                        | WebSocketEventType::Closed => {
                            // Close and Disconnected often arrive together.
                            flag.swap(false, Ordering::SeqCst)
                                .then_some(LinkEvent::Disconnected)
                        }
                        WebSocketEventType::Text(text) => Some(LinkEvent::Text(text.to_string())),
                        _ => None,
                    },
                    Err(e) => {
                        log::warn!("[WS] error: {}", e);
                        None
                    }
                };
                if let Some(link_event) = link_event {
                    let _ = tx.send(link_event);
                }
            },
        )?;

        log::info!("[WS] Connecting to {}", uri);
        Ok(Self {
            client,
            events,
            connected,
        })
    }
}

impl Transport for WsTransport {
    fn poll(&mut self) -> Option<LinkEvent> {
        self.events.try_recv().ok()
    }

    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.client.send(FrameType::Text(false), text.as_bytes())?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}
