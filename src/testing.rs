//! Test doubles for the device session layer.
//!
//! - [`ManualClock`]: a [`Clock`] whose `sleep` advances virtual time instantly
//! - [`ScriptedLink`]: a [`SerialLink`] replaying scripted replies per command
//! - [`FakeOpener`]: a [`PortOpener`] that can fail a number of opens first
//! - [`RecordingReclaimer`]: a [`PortReclaimer`] that only records its calls
//!
//! ```ignore
//! let opener = FakeOpener::new().fail_next(serialport::ErrorKind::NoDevice);
//! opener.link().push_reply(vec![None, Some(b"ok\r\n>: ".to_vec())]);
//! ```

use crate::core::session::Clock;
use crate::infrastructure::serial::{Endpoint, LinkSettings, PortOpener, PortReclaimer, SerialLink};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Virtual clock shared between clones
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Virtual time spent sleeping so far
    pub fn elapsed(&self) -> Duration {
        *lock(&self.elapsed)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        *lock(&self.elapsed) += duration;
    }
}

/// One poll result: `Some(bytes)` arrives, `None` is a quiet poll
pub type Poll = Option<Vec<u8>>;

#[derive(Debug, Default)]
struct LinkState {
    open: bool,
    closes: usize,
    clears: usize,
    flushes: usize,
    fail_writes: bool,
    written: Vec<u8>,
    buffered: Vec<u8>,
    pending: VecDeque<Poll>,
    replies: VecDeque<Vec<Poll>>,
}

/// Shared view of the state behind a [`ScriptedLink`]
#[derive(Debug, Clone, Default)]
pub struct LinkHandle {
    state: Arc<Mutex<LinkState>>,
}

impl LinkHandle {
    fn state(&self) -> MutexGuard<'_, LinkState> {
        lock(&self.state)
    }

    /// Bytes sitting in the input buffer before the next command
    pub fn push_stale(&self, data: &[u8]) {
        self.state().buffered.extend_from_slice(data);
    }

    /// Polls replayed after the next command is written
    pub fn push_reply(&self, polls: Vec<Poll>) {
        self.state().replies.push_back(polls);
    }

    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state().open
    }

    pub fn closes(&self) -> usize {
        self.state().closes
    }

    pub fn clears(&self) -> usize {
        self.state().clears
    }

    pub fn flushes(&self) -> usize {
        self.state().flushes
    }
}

/// Serial link replaying scripted device output
#[derive(Debug)]
pub struct ScriptedLink {
    handle: LinkHandle,
}

impl SerialLink for ScriptedLink {
    fn clear_input(&mut self) -> io::Result<()> {
        let mut state = self.handle.state();
        state.clears += 1;
        state.buffered.clear();
        Ok(())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.handle.state();
        if state.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        state.written.extend_from_slice(data);
        let reply = state.replies.pop_front().unwrap_or_default();
        state.pending = reply.into();
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle.state().flushes += 1;
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut state = self.handle.state();
        if state.buffered.is_empty() {
            if let Some(Some(bytes)) = state.pending.pop_front() {
                state.buffered = bytes;
            }
        }
        Ok(state.buffered.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.handle.state();
        let n = buf.len().min(state.buffered.len());
        buf[..n].copy_from_slice(&state.buffered[..n]);
        state.buffered.drain(..n);
        Ok(n)
    }
}

impl Drop for ScriptedLink {
    fn drop(&mut self) {
        let mut state = self.handle.state();
        state.open = false;
        state.closes += 1;
    }
}

/// Opener handing out [`ScriptedLink`]s over one shared [`LinkHandle`]
#[derive(Debug, Clone, Default)]
pub struct FakeOpener {
    link: LinkHandle,
    failures: Arc<Mutex<VecDeque<serialport::ErrorKind>>>,
    attempts: Arc<Mutex<usize>>,
}

impl FakeOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next not-yet-failed open with `kind`
    pub fn fail_next(self, kind: serialport::ErrorKind) -> Self {
        lock(&self.failures).push_back(kind);
        self
    }

    pub fn link(&self) -> LinkHandle {
        self.link.clone()
    }

    pub fn attempts(&self) -> usize {
        *lock(&self.attempts)
    }
}

impl PortOpener for FakeOpener {
    type Link = ScriptedLink;

    fn open(&self, endpoint: &Endpoint, _settings: &LinkSettings) -> serialport::Result<ScriptedLink> {
        *lock(&self.attempts) += 1;

        if let Some(kind) = lock(&self.failures).pop_front() {
            return Err(serialport::Error::new(
                kind,
                format!("Device or resource busy: {}", endpoint),
            ));
        }

        self.link.state().open = true;
        Ok(ScriptedLink {
            handle: self.link.clone(),
        })
    }
}

/// Reclaimer that records which endpoints it was asked to free
#[derive(Debug, Clone, Default)]
pub struct RecordingReclaimer {
    calls: Arc<Mutex<Vec<Endpoint>>>,
}

impl RecordingReclaimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Endpoint> {
        lock(&self.calls).clone()
    }
}

impl PortReclaimer for RecordingReclaimer {
    fn reclaim(&self, endpoint: &Endpoint) {
        lock(&self.calls).push(endpoint.clone());
    }
}

// A poisoned lock only means another test thread panicked; keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
