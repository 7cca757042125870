// Chope — Motion-triggered audio firmware core
//
// Everything that does not touch ESP-IDF lives in this library so it can be
// unit-tested on a host.  `main.rs` wires it to the real drivers.

pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod tasks;

#[cfg(test)]
mod mock;

pub use scheduler::{Scheduler, TickReport};
pub use tasks::audio::{AudioMode, AudioModeController, PlaybackSession, RoastClip};
pub use tasks::channel::{parse_command, ControlChannel};
pub use tasks::pump::{DecodePump, PumpStatus};
pub use tasks::sensor::MotionSampler;
