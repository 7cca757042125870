// Chope — Cooperative Scheduler
//
// One tick runs three phases to completion, always in this order:
//   1. channel: take at most one link event and dispatch it
//   2. decode:  advance the decoder by one unit
//   3. motion:  if the sampling interval has elapsed, sample and report
//
// A reset handled in phase 1 has re-seeded the baseline before phase 3 of
// the same tick samples again.

use std::time::{Duration, Instant};

use crate::config::*;
use crate::drivers::{ClipStorage, Decoder, OrientationSource, Transport};
use crate::events::{Command, LinkEvent, MotionEvent};
use crate::tasks::audio::AudioModeController;
use crate::tasks::channel::{parse_command, ControlChannel};
use crate::tasks::pump::{DecodePump, PumpStatus};
use crate::tasks::sensor::MotionSampler;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub command: Option<Command>,
    pub pump: PumpStatus,
    pub motion: Option<MotionEvent>,
}

pub struct Scheduler<I, S, D, T> {
    sampler: MotionSampler<I>,
    audio: AudioModeController<S, D>,
    pump: DecodePump,
    channel: ControlChannel<T>,
    interval: Duration,
    last_sample: Option<Instant>,
}

impl<I, S, D, T> Scheduler<I, S, D, T>
where
    I: OrientationSource,
    S: ClipStorage,
    D: Decoder,
    T: Transport,
{
    pub fn new(
        sampler: MotionSampler<I>,
        audio: AudioModeController<S, D>,
        channel: ControlChannel<T>,
    ) -> Self {
        Self {
            sampler,
            audio,
            pump: DecodePump::new(),
            channel,
            interval: Duration::from_millis(SAMPLE_INTERVAL_MS),
            last_sample: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn tick(&mut self, now: Instant) -> TickReport {
        // 1. Control channel
        let command = self.channel.poll().and_then(|event| self.on_link_event(event));

        // 2. Decode pump
        let pump = self.pump.tick(&mut self.audio);

        // 3. Motion sampling (rate-limited)
        let due = self
            .last_sample
            .map_or(true, |last| now.duration_since(last) >= self.interval);
        let motion = if due {
            self.last_sample = Some(now);
            Some(self.sample_and_report())
        } else {
            None
        };

        TickReport { command, pump, motion }
    }

    fn on_link_event(&mut self, event: LinkEvent) -> Option<Command> {
        match event {
            LinkEvent::Connected => {
                log::info!("[WS] Connected to server");
                None
            }
            LinkEvent::Disconnected => {
                log::warn!("[WS] Disconnected");
                self.audio.on_disconnect();
                None
            }
            LinkEvent::Text(text) => {
                log::info!("[WS] Message: {}", text);
                let command = parse_command(text.as_bytes());
                self.dispatch(command);
                Some(command)
            }
        }
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::Reset => {
                log::info!(">>> RESET received <<<");
                self.audio.reset();
                self.sampler.reset();
            }
            Command::Roast(n) => self.audio.request_roast(n),
            Command::Unknown => log::debug!("Unrecognised message dropped"),
        }
    }

    fn sample_and_report(&mut self) -> MotionEvent {
        let event = self.sampler.sample();
        if event.exceeded {
            self.channel.emit_alert(&event);
            self.audio.request_alert();
        }
        self.channel.emit_sensor_data(&event);
        event
    }

    pub fn audio(&self) -> &AudioModeController<S, D> {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioModeController<S, D> {
        &mut self.audio
    }

    pub fn sampler(&self) -> &MotionSampler<I> {
        &self.sampler
    }

    pub fn channel(&self) -> &ControlChannel<T> {
        &self.channel
    }

    pub fn pump(&self) -> &DecodePump {
        &self.pump
    }
}
