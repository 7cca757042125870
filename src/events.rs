// Chope — Shared Data Types
//
// Values that flow between the sampler, the audio controller and the control
// channel.  None of them are persisted.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Orientation (fused Euler angles from the BNO055)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Degrees, [0, 360).
    pub heading: f32,
    /// Degrees, [-180, 180].
    pub roll: f32,
    /// Degrees, [-180, 180].
    pub pitch: f32,
}

impl Orientation {
    pub const fn new(heading: f32, roll: f32, pitch: f32) -> Self {
        Self { heading, roll, pitch }
    }
}

/// Zero reference for motion deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Baseline {
    pub roll: f32,
    pub pitch: f32,
}

impl From<Orientation> for Baseline {
    fn from(o: Orientation) -> Self {
        Self { roll: o.roll, pitch: o.pitch }
    }
}

// ---------------------------------------------------------------------------
// Motion Event: one per sampling tick
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionEvent {
    pub heading: f32,
    pub roll: f32,
    pub pitch: f32,
    pub roll_delta: f32,
    pub pitch_delta: f32,
    /// Either delta reached the threshold on this tick.
    pub exceeded: bool,
}

// ---------------------------------------------------------------------------
// Inbound commands from the remote controller
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Silence the alert and re-seed the motion baseline.
    Reset,
    /// Play (or toggle off) one of the stored roast clips.  Not range-checked.
    Roast(i64),
    /// Anything the parser could not map.  Dropped without a reply.
    Unknown,
}

// ---------------------------------------------------------------------------
// Outbound telemetry, serialised straight to a text frame
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundEvent {
    SensorData {
        heading: f32,
        roll: f32,
        pitch: f32,
    },
    Alert {
        heading: f32,
        roll: f32,
        pitch: f32,
        #[serde(rename = "rollChange")]
        roll_delta: f32,
        #[serde(rename = "pitchChange")]
        pitch_delta: f32,
    },
}

impl OutboundEvent {
    pub fn sensor_data(event: &MotionEvent) -> Self {
        Self::SensorData {
            heading: event.heading,
            roll: event.roll,
            pitch: event.pitch,
        }
    }

    pub fn alert(event: &MotionEvent) -> Self {
        Self::Alert {
            heading: event.heading,
            roll: event.roll,
            pitch: event.pitch,
            roll_delta: event.roll_delta,
            pitch_delta: event.pitch_delta,
        }
    }
}

// ---------------------------------------------------------------------------
// Link events: what the transport hands to the scheduler each tick
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    Text(String),
}
