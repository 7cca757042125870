// Chope — Control Channel Protocol
//
// Inbound text frames become `Command`s; motion events go out as small JSON
// frames.  The link is fire-and-forget in both directions: nothing is
// acknowledged, retried or queued.

use serde::Deserialize;

use crate::config::*;
use crate::drivers::Transport;
use crate::events::{Command, LinkEvent, MotionEvent, OutboundEvent};

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "roastType")]
    roast_type: Option<i64>,
}

/// Map one inbound payload to a command.
///
/// A payload that parses as a frame is decided by its `type` alone, even when
/// that type is not recognised.  Only payloads that fail to parse fall back to
/// looking for the word `reset` anywhere in the raw text.
pub fn parse_command(payload: &[u8]) -> Command {
    match serde_json::from_slice::<InboundFrame>(payload) {
        Ok(frame) => match (frame.kind.as_str(), frame.roast_type) {
            ("reset", _) => Command::Reset,
            ("roast", Some(n)) => Command::Roast(n),
            _ => Command::Unknown,
        },
        Err(_) => {
            if contains(payload, b"reset") {
                Command::Reset
            } else {
                Command::Unknown
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

pub struct ControlChannel<T> {
    transport: T,
    frames_sent: u32,
    frames_dropped: u32,
}

impl<T: Transport> ControlChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            frames_sent: 0,
            frames_dropped: 0,
        }
    }

    /// Next link event, if any.  Never more than one per call.
    pub fn poll(&mut self) -> Option<LinkEvent> {
        self.transport.poll()
    }

    pub fn emit_sensor_data(&mut self, event: &MotionEvent) -> bool {
        self.send(&OutboundEvent::sensor_data(event))
    }

    pub fn emit_alert(&mut self, event: &MotionEvent) -> bool {
        log::info!(">>> ALERT: Movement detected <<<");
        self.send(&OutboundEvent::alert(event))
    }

    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    pub fn frames_dropped(&self) -> u32 {
        self.frames_dropped
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&mut self, event: &OutboundEvent) -> bool {
        if !self.transport.is_connected() {
            self.frames_dropped += 1;
            return false;
        }

        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Frame encode failed: {}", e);
                self.frames_dropped += 1;
                return false;
            }
        };
        if frame.len() > MAX_FRAME_LEN {
            log::warn!("Frame of {} bytes exceeds {}, dropped", frame.len(), MAX_FRAME_LEN);
            self.frames_dropped += 1;
            return false;
        }

        match self.transport.send_text(&frame) {
            Ok(()) => {
                self.frames_sent += 1;
                true
            }
            Err(e) => {
                log::warn!("[WS] send failed: {}", e);
                self.frames_dropped += 1;
                false
            }
        }
    }
}
