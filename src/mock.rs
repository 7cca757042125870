// Chope — Test doubles for the driver seams
//
// Every mock is a cheap cloneable handle onto shared state, so a test can
// hand one clone to the component under test and keep another to drive and
// inspect it.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::io::{self, BufReader, Read};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::*;
use crate::drivers::{ClipStorage, ClipStream, Decoder, OrientationSource, Transport};
use crate::error::AudioError;
use crate::events::{LinkEvent, Orientation};

// ---------------------------------------------------------------------------
// Orientation source
// ---------------------------------------------------------------------------
#[derive(Default)]
struct ImuState {
    script: VecDeque<Orientation>,
    last: Orientation,
    fail_when_empty: bool,
}

/// Replays queued readings; repeats the last one once the queue runs dry.
#[derive(Clone, Default)]
pub struct ScriptedImu(Rc<RefCell<ImuState>>);

impl ScriptedImu {
    pub fn new(readings: &[(f32, f32, f32)]) -> Self {
        let imu = Self::default();
        for &(h, r, p) in readings {
            imu.push(h, r, p);
        }
        imu
    }

    pub fn push(&self, heading: f32, roll: f32, pitch: f32) {
        self.0
            .borrow_mut()
            .script
            .push_back(Orientation::new(heading, roll, pitch));
    }

    pub fn fail_after_script(&mut self) {
        self.0.borrow_mut().fail_when_empty = true;
    }
}

impl OrientationSource for ScriptedImu {
    fn read_orientation(&mut self) -> anyhow::Result<Orientation> {
        let mut s = self.0.borrow_mut();
        match s.script.pop_front() {
            Some(o) => {
                s.last = o;
                Ok(o)
            }
            None if s.fail_when_empty => anyhow::bail!("I2C NACK"),
            None => Ok(s.last),
        }
    }
}

// ---------------------------------------------------------------------------
// Clip storage
// ---------------------------------------------------------------------------
#[derive(Default)]
struct StorageState {
    files: HashSet<String>,
    opened: Vec<String>,
}

/// Counts opens and tracks how many returned streams are still alive.
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Rc<RefCell<StorageState>>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

struct TrackedStream {
    live: Arc<AtomicUsize>,
}

impl Read for TrackedStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockStorage {
    pub fn with_clips(paths: &[&str]) -> Self {
        let storage = Self::default();
        storage
            .state
            .borrow_mut()
            .files
            .extend(paths.iter().map(|p| p.to_string()));
        storage
    }

    pub fn with_all_clips() -> Self {
        let mut paths = vec![ALERT_CLIP, LOOP_CLIP];
        paths.extend(ROAST_CLIPS);
        Self::with_clips(&paths)
    }

    pub fn opens(&self) -> usize {
        self.state.borrow().opened.len()
    }

    pub fn opened_paths(&self) -> Vec<String> {
        self.state.borrow().opened.clone()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

impl ClipStorage for MockStorage {
    fn open(&mut self, path: &str) -> io::Result<ClipStream> {
        if !self.state.borrow().files.contains(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, path.to_string()));
        }
        self.state.borrow_mut().opened.push(path.to_string());
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(TrackedStream {
            live: Arc::clone(&self.live),
        }))
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------
#[derive(Default)]
struct DecoderState {
    clip_len: usize,
    remaining: usize,
    running: bool,
    source: Option<BufReader<ClipStream>>,
    fail_next_begin: bool,
    begins: usize,
}

/// Each clip lasts `clip_len` successful steps.
#[derive(Clone, Default)]
pub struct MockDecoder(Rc<RefCell<DecoderState>>);

impl MockDecoder {
    pub fn new(clip_len: usize) -> Self {
        let decoder = Self::default();
        decoder.0.borrow_mut().clip_len = clip_len;
        decoder
    }

    /// Decoder stops on its own, controller not told yet.
    pub fn halt(&self) {
        self.0.borrow_mut().running = false;
    }

    /// Running with nothing behind it.
    pub fn force_running(&self) {
        let mut s = self.0.borrow_mut();
        s.running = true;
        s.remaining = s.clip_len;
    }

    pub fn fail_next_begin(&self) {
        self.0.borrow_mut().fail_next_begin = true;
    }

    pub fn begins(&self) -> usize {
        self.0.borrow().begins
    }
}

impl Decoder for MockDecoder {
    fn begin(&mut self, source: BufReader<ClipStream>) -> Result<(), AudioError> {
        let mut s = self.0.borrow_mut();
        if std::mem::take(&mut s.fail_next_begin) {
            return Err(AudioError::Begin("bad header".into()));
        }
        s.begins += 1;
        s.source = Some(source);
        s.remaining = s.clip_len;
        s.running = true;
        Ok(())
    }

    fn step(&mut self) -> bool {
        let mut s = self.0.borrow_mut();
        if !s.running {
            return false;
        }
        if s.remaining == 0 {
            s.running = false;
            s.source = None;
            return false;
        }
        s.remaining -= 1;
        true
    }

    fn stop(&mut self) {
        let mut s = self.0.borrow_mut();
        s.running = false;
        s.source = None;
    }

    fn is_running(&self) -> bool {
        self.0.borrow().running
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------
#[derive(Default)]
struct LinkState {
    inbox: VecDeque<LinkEvent>,
    sent: Vec<String>,
    connected: bool,
    fail_sends: bool,
}

#[derive(Clone, Default)]
pub struct MockTransport(Rc<RefCell<LinkState>>);

impl MockTransport {
    pub fn connected() -> Self {
        let link = Self::default();
        link.set_connected(true);
        link
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.borrow_mut().connected = connected;
    }

    pub fn fail_sends(&self) {
        self.0.borrow_mut().fail_sends = true;
    }

    pub fn push(&self, event: LinkEvent) {
        self.0.borrow_mut().inbox.push_back(event);
    }

    pub fn push_text(&self, text: &str) {
        self.push(LinkEvent::Text(text.to_string()));
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().inbox.len()
    }

    pub fn sent(&self) -> Vec<String> {
        self.0.borrow().sent.clone()
    }
}

impl Transport for MockTransport {
    fn poll(&mut self) -> Option<LinkEvent> {
        self.0.borrow_mut().inbox.pop_front()
    }

    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        let mut s = self.0.borrow_mut();
        if s.fail_sends {
            anyhow::bail!("socket closed");
        }
        s.sent.push(text.to_string());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }
}
