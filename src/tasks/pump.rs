// Chope — Decode Pump
//
// Called once per scheduler tick, whatever the mode.  Advances the decoder by
// one unit of work and reports end-of-clip back to the controller.  Restart
// policy is the controller's business, never the pump's.

use crate::drivers::{ClipStorage, Decoder};
use crate::tasks::audio::AudioModeController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// No session.
    Idle,
    /// Decoder advanced one step.
    Advanced,
    /// Clip ended; controller notified.
    Finished,
    /// Decoder was running with no session behind it and has been stopped.
    ForcedStop,
}

#[derive(Debug, Default)]
pub struct DecodePump {
    steps: u64,
}

impl DecodePump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick<S: ClipStorage, D: Decoder>(
        &mut self,
        audio: &mut AudioModeController<S, D>,
    ) -> PumpStatus {
        if audio.session().is_none() {
            if audio.decoder().is_running() {
                log::warn!("Decoder running without a session, stopping it");
                audio.decoder_mut().stop();
                return PumpStatus::ForcedStop;
            }
            return PumpStatus::Idle;
        }

        let decoder = audio.decoder_mut();
        if decoder.is_running() && decoder.step() {
            self.steps += 1;
            return PumpStatus::Advanced;
        }

        audio.on_finished();
        PumpStatus::Finished
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
