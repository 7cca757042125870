// Chope — Driver seams
//
// The core only ever talks to hardware through these traits.  Portable
// implementations (file-backed storage, MP3 decoding) live next to them; the
// ESP-IDF ones are only compiled for the device.

use std::io::{self, Read};

use crate::error::AudioError;
use crate::events::{LinkEvent, Orientation};

pub mod mp3;
pub mod storage;

#[cfg(target_os = "espidf")]
pub mod i2s;
#[cfg(target_os = "espidf")]
pub mod imu;
#[cfg(target_os = "espidf")]
pub mod spiffs;
#[cfg(target_os = "espidf")]
pub mod wifi;
#[cfg(target_os = "espidf")]
pub mod ws;

/// Byte stream of an opened clip.
pub type ClipStream = Box<dyn Read + Send + Sync>;

/// Inertial sensor poll.
pub trait OrientationSource {
    fn read_orientation(&mut self) -> anyhow::Result<Orientation>;
}

/// Open-by-path access to stored clips.
pub trait ClipStorage {
    fn open(&mut self, path: &str) -> io::Result<ClipStream>;
}

/// Streaming decoder.  `begin` takes ownership of the buffered source; `stop`
/// must drop it.
pub trait Decoder {
    fn begin(&mut self, source: io::BufReader<ClipStream>) -> Result<(), AudioError>;

    /// Advance one unit of work.  `false` once the clip can no longer advance.
    fn step(&mut self) -> bool;

    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// PCM sink (16-bit, interleaved, fixed rate/channels).
pub trait AudioOutput {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;
}

/// Persistent bidirectional text link.
pub trait Transport {
    /// At most one pending event.
    fn poll(&mut self) -> Option<LinkEvent>;

    fn send_text(&mut self, text: &str) -> anyhow::Result<()>;

    fn is_connected(&self) -> bool;
}
