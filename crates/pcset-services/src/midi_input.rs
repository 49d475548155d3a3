//! MIDI keyboard input
//!
//! The midir callback only copies raw bytes onto a bounded channel, which acts
//! as the ring buffer. A worker thread drains it every poll interval, runs the
//! messages through a [`NoteTracker`] and publishes pitch-class events.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use midir::{Ignore, MidiInput, MidiInputConnection};
use pcset_core::PitchClass;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{InputEvent, publish};

const CLIENT_NAME: &str = "pcsetcalc";
const NUM_PITCHES: usize = 128;
const RING_CAPACITY: usize = 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

const STATUS_NOTE_OFF: u8 = 0x80;
const STATUS_NOTE_ON: u8 = 0x90;
const STATUS_CONTROL_CHANGE: u8 = 0xB0;

#[derive(Debug, Error)]
pub enum MidiInputError {
    #[error("MIDI backend unavailable: {0}")]
    Init(#[from] midir::InitError),
    #[error("No MIDI input port at index {0}")]
    PortNotFound(usize),
    #[error("Failed to query port: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("Failed to connect: {0}")]
    Connect(String),
}

/// Channel and sustain pedal settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiConfig {
    /// Zero-based; 0 is MIDI channel 1
    pub channel: u8,
    pub sustain_controller: u8,
    pub sustain_threshold: u8,
    /// Pedal down reads as values below the threshold (an expression pedal
    /// wired inversely)
    pub reversed_polarity: bool,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            sustain_controller: 11,
            sustain_threshold: 110,
            reversed_polarity: true,
        }
    }
}

impl MidiConfig {
    fn sustain_active(&self, value: u8) -> bool {
        if self.reversed_polarity {
            value < self.sustain_threshold
        } else {
            value >= self.sustain_threshold
        }
    }
}

// ======================================================================
// Note tracking
// ======================================================================

/// Per-pitch key state with sustain buffering and pitch-class projection
#[derive(Debug, Clone)]
pub struct NoteTracker {
    config: MidiConfig,
    pitches: [bool; NUM_PITCHES],
    held_offs: BTreeSet<u8>,
    sustain: bool,
}

impl NoteTracker {
    pub fn new(config: MidiConfig) -> Self {
        Self {
            config,
            pitches: [false; NUM_PITCHES],
            held_offs: BTreeSet::new(),
            sustain: false,
        }
    }

    pub fn is_sounding(&self, pitch: u8) -> bool {
        self.pitches.get(pitch as usize).copied().unwrap_or(false)
    }

    pub fn sustain(&self) -> bool {
        self.sustain
    }

    /// Process one raw MIDI message, returning the pitch-class changes it
    /// causes. Messages on other channels are ignored.
    pub fn process(&mut self, message: &[u8]) -> Vec<(PitchClass, bool)> {
        let mut changes = Vec::new();
        let &[status, data1, data2, ..] = message else {
            return changes;
        };
        if status & 0x0F != self.config.channel {
            return changes;
        }

        match status & 0xF0 {
            STATUS_NOTE_ON if data2 > 0 => {
                self.held_offs.remove(&data1);
                self.set_pitch(data1, true, &mut changes);
            }
            STATUS_NOTE_ON | STATUS_NOTE_OFF => {
                if self.sustain {
                    self.held_offs.insert(data1);
                } else {
                    self.set_pitch(data1, false, &mut changes);
                }
            }
            STATUS_CONTROL_CHANGE if data1 == self.config.sustain_controller => {
                let active = self.config.sustain_active(data2);
                if self.sustain && !active {
                    for pitch in std::mem::take(&mut self.held_offs) {
                        self.set_pitch(pitch, false, &mut changes);
                    }
                }
                self.sustain = active;
            }
            _ => {}
        }
        changes
    }

    /// Record the key state; report it only when no other octave of the same
    /// pitch class is sounding.
    fn set_pitch(&mut self, pitch: u8, on: bool, changes: &mut Vec<(PitchClass, bool)>) {
        let Some(slot) = self.pitches.get_mut(pitch as usize) else {
            return;
        };
        *slot = on;

        let pc = pitch % 12;
        let doubled = (pc as usize..NUM_PITCHES)
            .step_by(12)
            .any(|p| p != pitch as usize && self.pitches[p]);
        if !doubled {
            changes.push((pc, on));
        }
    }
}

/// Drain the raw message channel every poll interval until the connection
/// (the sending side) or the UI (the event receiver) goes away, or `stop`
/// is raised.
fn run_worker(
    raw_rx: Receiver<Vec<u8>>,
    mut tracker: NoteTracker,
    events: Sender<InputEvent>,
    stop: Arc<AtomicBool>,
) {
    loop {
        let connected = loop {
            match raw_rx.try_recv() {
                Ok(message) => {
                    for (pc, on) in tracker.process(&message) {
                        if !publish(&events, InputEvent::PitchClass { pc, on }, &stop, POLL_INTERVAL) {
                            debug!("MIDI worker exiting");
                            return;
                        }
                    }
                }
                Err(TryRecvError::Empty) => break true,
                Err(TryRecvError::Disconnected) => break false,
            }
        };
        if !connected || stop.load(Ordering::SeqCst) {
            debug!("MIDI worker exiting");
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

// ======================================================================
// Service
// ======================================================================

/// Connection to one MIDI input port
pub struct MidiInputService {
    connection: Option<MidiInputConnection<()>>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    port_index: Option<usize>,
    port_name: Option<String>,
}

impl MidiInputService {
    pub fn new() -> Self {
        Self {
            connection: None,
            worker: None,
            stop: Arc::new(AtomicBool::new(false)),
            port_index: None,
            port_name: None,
        }
    }

    /// Names of the available input ports, in index order
    pub fn list_ports() -> Result<Vec<String>, MidiInputError> {
        let input = MidiInput::new(CLIENT_NAME)?;
        let names = input
            .ports()
            .iter()
            .map(|port| input.port_name(port))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = names.len(), "Found MIDI input ports");
        Ok(names)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn port_index(&self) -> Option<usize> {
        self.port_index
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Open the port at `index`, replacing any current connection
    pub fn connect(
        &mut self,
        index: usize,
        config: MidiConfig,
        events: Sender<InputEvent>,
    ) -> Result<(), MidiInputError> {
        self.disconnect();

        let mut input = MidiInput::new(CLIENT_NAME)?;
        input.ignore(Ignore::All);
        let ports = input.ports();
        let port = ports.get(index).ok_or(MidiInputError::PortNotFound(index))?;
        let name = input.port_name(port)?;

        let (raw_tx, raw_rx) = bounded::<Vec<u8>>(RING_CAPACITY);
        let connection = input
            .connect(
                port,
                "pcsetcalc-in",
                move |_timestamp, message, _| {
                    if raw_tx.try_send(message.to_vec()).is_err() {
                        warn!("MIDI ring buffer full, message dropped");
                    }
                },
                (),
            )
            .map_err(|e| MidiInputError::Connect(e.to_string()))?;

        let tracker = NoteTracker::new(config);
        let stop = Arc::new(AtomicBool::new(false));
        self.stop = stop.clone();
        self.worker = Some(thread::spawn(move || run_worker(raw_rx, tracker, events, stop)));
        self.connection = Some(connection);
        self.port_index = Some(index);
        info!(port = %name, index, "MIDI input connected");
        self.port_name = Some(name);
        Ok(())
    }

    /// Close the port and wait for the worker to exit
    pub fn disconnect(&mut self) {
        if let Some(worker) = self.shut_down() {
            if worker.join().is_err() {
                warn!("MIDI worker panicked");
            }
        }
    }

    /// Close the port and signal the worker without waiting for it; the
    /// worker ends on its next poll or with the process.
    pub fn close(&mut self) {
        self.shut_down();
    }

    fn shut_down(&mut self) -> Option<JoinHandle<()>> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!(port = ?self.port_name, "MIDI input disconnected");
        }
        self.port_index = None;
        self.port_name = None;
        self.worker.take()
    }
}

impl Default for MidiInputService {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiInputService {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_on(pitch: u8) -> [u8; 3] {
        [STATUS_NOTE_ON, pitch, 100]
    }

    fn note_off(pitch: u8) -> [u8; 3] {
        [STATUS_NOTE_ON, pitch, 0]
    }

    fn pedal(value: u8) -> [u8; 3] {
        [STATUS_CONTROL_CHANGE, 11, value]
    }

    #[test]
    fn test_note_on_off() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        assert_eq!(tracker.process(&note_on(60)), vec![(0, true)]);
        assert!(tracker.is_sounding(60));
        assert_eq!(tracker.process(&note_off(60)), vec![(0, false)]);
        assert_eq!(tracker.process(&[STATUS_NOTE_ON, 61, 90]), vec![(1, true)]);
        assert_eq!(tracker.process(&[STATUS_NOTE_OFF, 61, 64]), vec![(1, false)]);
        assert!(!tracker.is_sounding(61));
    }

    #[test]
    fn test_octave_doubling_suppresses_events() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        assert_eq!(tracker.process(&note_on(60)), vec![(0, true)]);
        assert!(tracker.process(&note_on(72)).is_empty());
        assert!(tracker.process(&note_off(60)).is_empty());
        assert_eq!(tracker.process(&note_off(72)), vec![(0, false)]);
    }

    #[test]
    fn test_reversed_sustain_buffers_note_offs() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        tracker.process(&pedal(127));
        assert!(!tracker.sustain());

        tracker.process(&note_on(64));
        tracker.process(&note_on(67));
        assert!(tracker.process(&pedal(20)).is_empty());
        assert!(tracker.sustain());

        assert!(tracker.process(&note_off(64)).is_empty());
        assert!(tracker.process(&note_off(67)).is_empty());
        assert!(tracker.is_sounding(64));

        let mut released = tracker.process(&pedal(127));
        released.sort();
        assert_eq!(released, vec![(4, false), (7, false)]);
        assert!(!tracker.is_sounding(64));
    }

    #[test]
    fn test_restruck_note_survives_pedal_release() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        tracker.process(&pedal(0));
        tracker.process(&note_on(62));
        tracker.process(&note_off(62));
        tracker.process(&note_on(62));
        assert!(tracker.process(&pedal(127)).is_empty());
        assert!(tracker.is_sounding(62));
    }

    #[test]
    fn test_threshold_boundary_and_polarity() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        tracker.process(&pedal(110));
        assert!(!tracker.sustain());
        tracker.process(&pedal(109));
        assert!(tracker.sustain());

        let mut normal = NoteTracker::new(MidiConfig {
            reversed_polarity: false,
            sustain_controller: 64,
            sustain_threshold: 64,
            ..MidiConfig::default()
        });
        normal.process(&[STATUS_CONTROL_CHANGE, 64, 127]);
        assert!(normal.sustain());
        normal.process(&[STATUS_CONTROL_CHANGE, 11, 0]);
        assert!(normal.sustain());
    }

    #[test]
    fn test_other_channels_and_short_messages_ignored() {
        let mut tracker = NoteTracker::new(MidiConfig::default());
        assert!(tracker.process(&[STATUS_NOTE_ON | 1, 60, 100]).is_empty());
        assert!(tracker.process(&[0xC0, 5]).is_empty());
        assert!(tracker.process(&[]).is_empty());
        assert!(tracker.process(&[STATUS_NOTE_ON, 200, 100]).is_empty());

        let mut ch2 = NoteTracker::new(MidiConfig { channel: 1, ..MidiConfig::default() });
        assert_eq!(ch2.process(&[STATUS_NOTE_ON | 1, 60, 100]), vec![(0, true)]);
    }

    #[test]
    fn test_worker_preserves_order() {
        let (raw_tx, raw_rx) = bounded(RING_CAPACITY);
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        for message in [note_on(60), note_on(64), note_off(60), note_on(67)] {
            raw_tx.send(message.to_vec()).unwrap();
        }
        drop(raw_tx);

        let stop = Arc::new(AtomicBool::new(false));
        let worker = thread::spawn(move || run_worker(raw_rx, NoteTracker::new(MidiConfig::default()), event_tx, stop));
        worker.join().unwrap();

        let events: Vec<InputEvent> = event_rx.try_iter().collect();
        assert_eq!(events, vec![
            InputEvent::PitchClass { pc: 0, on: true },
            InputEvent::PitchClass { pc: 4, on: true },
            InputEvent::PitchClass { pc: 0, on: false },
            InputEvent::PitchClass { pc: 7, on: true },
        ]);
    }

    #[test]
    fn test_worker_stops_while_ui_queue_is_full() {
        let (raw_tx, raw_rx) = bounded(RING_CAPACITY);
        let (event_tx, event_rx) = bounded(1);
        for message in [note_on(60), note_on(62), note_on(64)] {
            raw_tx.send(message.to_vec()).unwrap();
        }

        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = stop.clone();
            thread::spawn(move || run_worker(raw_rx, NoteTracker::new(MidiConfig::default()), event_tx, stop))
        };
        thread::sleep(Duration::from_millis(100));
        assert!(event_rx.is_full());

        // The connection is still open, so only the stop flag can end the worker
        let started = std::time::Instant::now();
        stop.store(true, Ordering::SeqCst);
        worker.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(event_rx.try_recv(), Ok(InputEvent::PitchClass { pc: 0, on: true }));
        drop(raw_tx);
    }

    #[test]
    fn test_disconnect_without_connection_is_a_no_op() {
        let mut service = MidiInputService::new();
        service.disconnect();
        service.close();
        assert!(!service.is_connected());
        assert_eq!(service.port_index(), None);
        assert_eq!(service.port_name(), None);
    }
}
