// Chope — Motion Sampler
//
// Polls the orientation source once per sampling tick and compares roll and
// pitch against a stored baseline.  The first sample after boot (or after a
// reset) only seeds the baseline.  When a delta reaches the threshold the
// baseline jumps to the current reading, so a device that stays displaced
// alerts once rather than on every tick.

use crate::config::*;
use crate::drivers::OrientationSource;
use crate::events::{Baseline, MotionEvent, Orientation};

pub struct MotionSampler<S> {
    source: S,
    baseline: Option<Baseline>,
    last: Orientation,
    threshold: f32,
}

impl<S: OrientationSource> MotionSampler<S> {
    pub fn new(source: S) -> Self {
        Self::with_threshold(source, MOTION_THRESHOLD_DEG)
    }

    pub fn with_threshold(source: S, threshold: f32) -> Self {
        Self {
            source,
            baseline: None,
            last: Orientation::default(),
            threshold,
        }
    }

    pub fn sample(&mut self) -> MotionEvent {
        let now = self.read();
        log::debug!(
            "Heading: {:.2}, Roll: {:.2}, Pitch: {:.2}",
            now.heading,
            now.roll,
            now.pitch
        );

        let Some(baseline) = self.baseline else {
            self.baseline = Some(now.into());
            return MotionEvent {
                heading: now.heading,
                roll: now.roll,
                pitch: now.pitch,
                ..MotionEvent::default()
            };
        };

        let roll_delta = (now.roll - baseline.roll).abs();
        let pitch_delta = (now.pitch - baseline.pitch).abs();
        let exceeded = roll_delta >= self.threshold || pitch_delta >= self.threshold;

        if exceeded {
            log::info!(
                "Movement detected (roll Δ {:.2}°, pitch Δ {:.2}°)",
                roll_delta,
                pitch_delta
            );
            self.baseline = Some(now.into());
        }

        MotionEvent {
            heading: now.heading,
            roll: now.roll,
            pitch: now.pitch,
            roll_delta,
            pitch_delta,
            exceeded,
        }
    }

    /// Re-seed the baseline from a fresh reading.
    pub fn reset(&mut self) {
        let now = self.read();
        self.baseline = Some(now.into());
        log::info!("Motion baseline reset (roll {:.2}°, pitch {:.2}°)", now.roll, now.pitch);
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    // A failed read reuses the last good orientation so the cadence holds.
    fn read(&mut self) -> Orientation {
        match self.source.read_orientation() {
            Ok(o) => {
                self.last = o;
                o
            }
            Err(e) => {
                log::warn!("IMU read error: {}", e);
                self.last
            }
        }
    }
}
