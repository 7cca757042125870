// Chope — Audio Mode Controller
//
// Owns the current audio mode and the one playback session backing it.
//
//   Idle ──RequestAlert──▶ Alert ──finished / disconnect──▶ Idle
//   any  ──Reset──▶ Idle
//   any  ──RequestRoast(n)──▶ Roast(n) ──finished──▶ Idle
//   Roast(n) + RequestRoast(n) while decoding ──▶ Idle   (toggle off)
//   AutoLoop ──finished──▶ AutoLoop                       (re-open clip)
//
// Every transition tears the previous session down before anything new is
// opened, so at most one clip stream is ever open.

use std::io::BufReader;

use crate::config::*;
use crate::drivers::{ClipStorage, Decoder};
use crate::error::AudioError;

// ---------------------------------------------------------------------------
// Roast clip index (1..=4)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoastClip(u8);

impl RoastClip {
    /// `None` for anything outside 1..=ROAST_CLIP_COUNT.
    pub fn new(n: i64) -> Option<Self> {
        if (1..=ROAST_CLIP_COUNT as i64).contains(&n) {
            Some(Self(n as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn path(self) -> &'static str {
        ROAST_CLIPS[self.0 as usize - 1]
    }
}

// ---------------------------------------------------------------------------
// Audio mode
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioMode {
    #[default]
    Idle,
    /// Motion alert, plays once.
    Alert,
    /// On-demand clip, plays once.
    Roast(RoastClip),
    /// Background clip restarted every time it ends.
    AutoLoop,
}

impl AudioMode {
    pub fn clip_path(self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::Alert => Some(ALERT_CLIP),
            Self::Roast(clip) => Some(clip.path()),
            Self::AutoLoop => Some(LOOP_CLIP),
        }
    }
}

/// Bookkeeping for the live session.  The stream and its read-ahead buffer
/// are owned by the decoder between `begin` and `stop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    pub id: u64,
    pub mode: AudioMode,
    pub path: &'static str,
}

pub struct AudioModeController<S, D> {
    storage: S,
    decoder: D,
    mode: AudioMode,
    session: Option<PlaybackSession>,
    next_session_id: u64,
}

impl<S: ClipStorage, D: Decoder> AudioModeController<S, D> {
    pub fn new(storage: S, decoder: D) -> Self {
        Self {
            storage,
            decoder,
            mode: AudioMode::Idle,
            session: None,
            next_session_id: 1,
        }
    }

    pub fn mode(&self) -> AudioMode {
        self.mode
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn is_decoding(&self) -> bool {
        self.session.is_some() && self.decoder.is_running()
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub(crate) fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    // ---- Requests ---------------------------------------------------------

    pub fn request_alert(&mut self) {
        if self.mode == AudioMode::Alert && self.is_decoding() {
            return;
        }
        log::info!(">>> Starting alert sound <<<");
        self.enter(AudioMode::Alert);
    }

    pub fn request_roast(&mut self, n: i64) {
        let Some(clip) = RoastClip::new(n) else {
            log::warn!("Ignoring roast request for clip {}", n);
            return;
        };

        if self.mode == AudioMode::Roast(clip) && self.is_decoding() {
            log::info!("Roast {} toggled off", clip.index());
            self.go_idle();
            return;
        }
        log::info!("Playing roast {}", clip.index());
        self.enter(AudioMode::Roast(clip));
    }

    pub fn request_loop(&mut self) {
        if self.mode == AudioMode::AutoLoop && self.is_decoding() {
            return;
        }
        log::info!("Starting background loop");
        self.enter(AudioMode::AutoLoop);
    }

    /// Remote reset.  Silences whatever is playing.
    pub fn reset(&mut self) {
        if self.mode != AudioMode::Idle {
            log::info!(">>> {:?} sound stopped <<<", self.mode);
        }
        self.go_idle();
    }

    /// Link lost.  Alerts need a live supervisor, manual clips do not.
    pub fn on_disconnect(&mut self) {
        if self.mode == AudioMode::Alert {
            log::info!("Link down, stopping alert");
            self.go_idle();
        }
    }

    /// Natural end of clip, reported by the decode pump.
    pub fn on_finished(&mut self) {
        match self.mode {
            AudioMode::AutoLoop => {
                log::debug!("Loop clip ended, restarting");
                self.enter(AudioMode::AutoLoop);
            }
            AudioMode::Idle => self.teardown(),
            mode => {
                log::info!("{:?} finished", mode);
                self.go_idle();
            }
        }
    }

    // ---- Session lifecycle ------------------------------------------------

    fn enter(&mut self, mode: AudioMode) {
        self.teardown();

        let Some(path) = mode.clip_path() else {
            self.mode = AudioMode::Idle;
            return;
        };

        match self.open(path) {
            Ok(()) => {
                let id = self.next_session_id;
                self.next_session_id += 1;
                self.session = Some(PlaybackSession { id, mode, path });
                self.mode = mode;
            }
            Err(e) => {
                log::warn!("{}", e);
                self.teardown();
                self.mode = AudioMode::Idle;
            }
        }
    }

    fn open(&mut self, path: &'static str) -> Result<(), AudioError> {
        let stream = self.storage.open(path).map_err(|source| AudioError::Open {
            path: path.to_string(),
            source,
        })?;
        self.decoder
            .begin(BufReader::with_capacity(DECODE_BUFFER_SIZE, stream))
    }

    fn go_idle(&mut self) {
        self.teardown();
        self.mode = AudioMode::Idle;
    }

    // Unconditional: stop() releases the stream and buffer even if the
    // decoder already considers itself finished.
    fn teardown(&mut self) {
        self.decoder.stop();
        self.session = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDecoder, MockStorage};

    fn controller() -> (AudioModeController<MockStorage, MockDecoder>, MockStorage, MockDecoder) {
        let storage = MockStorage::with_all_clips();
        let decoder = MockDecoder::new(10);
        (
            AudioModeController::new(storage.clone(), decoder.clone()),
            storage,
            decoder,
        )
    }

    #[test]
    fn starts_idle() {
        let (ctl, storage, _) = controller();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
        assert_eq!(storage.opens(), 0);
    }

    #[test]
    fn alert_opens_alert_clip() {
        let (mut ctl, storage, decoder) = controller();
        ctl.request_alert();
        assert_eq!(ctl.mode(), AudioMode::Alert);
        assert_eq!(ctl.session().unwrap().path, ALERT_CLIP);
        assert_eq!(storage.opened_paths(), vec![ALERT_CLIP.to_string()]);
        assert!(decoder.is_running());
    }

    #[test]
    fn repeated_alert_while_decoding_is_idempotent() {
        let (mut ctl, storage, _) = controller();
        ctl.request_alert();
        let first = ctl.session().unwrap().id;
        ctl.request_alert();
        assert_eq!(ctl.session().unwrap().id, first);
        assert_eq!(storage.opens(), 1);
    }

    #[test]
    fn alert_after_decoder_halted_reopens() {
        let (mut ctl, storage, decoder) = controller();
        ctl.request_alert();
        let first = ctl.session().unwrap().id;
        decoder.halt();
        ctl.request_alert();
        assert_ne!(ctl.session().unwrap().id, first);
        assert_eq!(storage.opens(), 2);
    }

    #[test]
    fn same_roast_while_decoding_toggles_off() {
        let (mut ctl, storage, decoder) = controller();
        ctl.request_roast(2);
        assert_eq!(ctl.mode(), AudioMode::Roast(RoastClip::new(2).unwrap()));
        ctl.request_roast(2);
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
        assert!(!decoder.is_running());
        assert_eq!(storage.live(), 0);
    }

    #[test]
    fn same_roast_after_finish_starts_fresh_session() {
        let (mut ctl, storage, decoder) = controller();
        ctl.request_roast(2);
        let first = ctl.session().unwrap().id;
        decoder.halt();
        ctl.request_roast(2);
        assert_eq!(ctl.mode(), AudioMode::Roast(RoastClip::new(2).unwrap()));
        assert_ne!(ctl.session().unwrap().id, first);
        assert_eq!(storage.opens(), 2);
    }

    #[test]
    fn different_roast_replaces_current() {
        let (mut ctl, storage, _) = controller();
        ctl.request_roast(1);
        ctl.request_roast(4);
        assert_eq!(ctl.session().unwrap().path, "/roast4.mp3");
        assert_eq!(storage.max_live(), 1);
    }

    #[test]
    fn out_of_range_roast_is_rejected() {
        let (mut ctl, storage, _) = controller();
        ctl.request_alert();
        let id = ctl.session().unwrap().id;
        ctl.request_roast(0);
        ctl.request_roast(5);
        ctl.request_roast(-1);
        assert_eq!(ctl.mode(), AudioMode::Alert);
        assert_eq!(ctl.session().unwrap().id, id);
        assert_eq!(storage.opens(), 1);
    }

    #[test]
    fn roast_preempts_alert_and_alert_preempts_roast() {
        let (mut ctl, storage, _) = controller();
        ctl.request_alert();
        ctl.request_roast(3);
        assert_eq!(ctl.mode(), AudioMode::Roast(RoastClip::new(3).unwrap()));
        ctl.request_alert();
        assert_eq!(ctl.mode(), AudioMode::Alert);
        assert_eq!(storage.max_live(), 1);
        assert_eq!(storage.live(), 1);
    }

    #[test]
    fn reset_stops_every_mode() {
        let (mut ctl, storage, decoder) = controller();
        ctl.request_alert();
        ctl.reset();
        assert_eq!(ctl.mode(), AudioMode::Idle);

        ctl.request_roast(1);
        ctl.reset();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
        assert!(!decoder.is_running());
        assert_eq!(storage.live(), 0);

        ctl.reset();
        assert_eq!(ctl.mode(), AudioMode::Idle);
    }

    #[test]
    fn disconnect_spares_roast() {
        let (mut ctl, _, _) = controller();
        ctl.request_roast(1);
        ctl.on_disconnect();
        assert!(ctl.is_decoding());

        ctl.request_alert();
        ctl.on_disconnect();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
    }

    #[test]
    fn finished_returns_to_idle() {
        let (mut ctl, storage, _) = controller();
        ctl.request_roast(1);
        ctl.on_finished();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert_eq!(storage.live(), 0);
    }

    #[test]
    fn auto_loop_reenters_on_finish() {
        let (mut ctl, storage, _) = controller();
        ctl.request_loop();
        let first = ctl.session().unwrap().id;
        ctl.on_finished();
        assert_eq!(ctl.mode(), AudioMode::AutoLoop);
        assert_ne!(ctl.session().unwrap().id, first);
        assert_eq!(storage.opens(), 2);
        assert_eq!(storage.max_live(), 1);

        ctl.reset();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert_eq!(storage.live(), 0);
    }

    #[test]
    fn missing_clip_stays_idle() {
        let storage = MockStorage::with_clips(&[ALERT_CLIP]);
        let decoder = MockDecoder::new(10);
        let mut ctl = AudioModeController::new(storage.clone(), decoder.clone());

        ctl.request_alert();
        ctl.request_roast(2);
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
        assert!(!decoder.is_running());
        assert_eq!(storage.live(), 0);
    }

    #[test]
    fn decoder_rejecting_stream_releases_it() {
        let (mut ctl, storage, decoder) = controller();
        decoder.fail_next_begin();
        ctl.request_alert();
        assert_eq!(ctl.mode(), AudioMode::Idle);
        assert!(ctl.session().is_none());
        assert_eq!(storage.opens(), 1);
        assert_eq!(storage.live(), 0);
    }

    #[test]
    fn at_most_one_stream_across_rapid_switching() {
        let (mut ctl, storage, decoder) = controller();
        for n in [1, 2, 2, 3, 5, 4, 4, 1] {
            ctl.request_roast(n);
            ctl.request_alert();
            decoder.halt();
            ctl.request_alert();
            ctl.request_loop();
            ctl.on_finished();
            ctl.reset();
        }
        assert_eq!(storage.max_live(), 1);
        assert!(storage.live() <= 1);
    }
}
