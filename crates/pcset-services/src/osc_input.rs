//! OSC note input over UDP
//!
//! A worker thread receives datagrams on 127.0.0.1, decodes them with rosc
//! and turns every `/noteData` message into one [`InputEvent::Replace`].

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use pcset_core::PcSet;
use rosc::{OscMessage, OscPacket, OscType};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::events::{InputEvent, publish};

pub const OSC_ADDRESS: &str = "/noteData";
pub const SERVER_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_UDP_PORT: u16 = 3000;
pub const UDP_PORTS: RangeInclusive<u16> = 3000..=3009;

/// How often the worker wakes up to check the stop flag
const READ_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum OscServerError {
    #[error("UDP port {0} outside 3000..=3009")]
    PortOutOfRange(u16),
    #[error("Failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("Socket error: {0}")]
    Socket(#[from] std::io::Error),
}

/// Pitch-class sets carried by the `/noteData` messages of a packet, in
/// packet order. Bundles are searched recursively.
pub fn note_sets(packet: &OscPacket) -> Vec<PcSet> {
    let mut sets = Vec::new();
    collect_note_sets(packet, &mut sets);
    sets
}

fn collect_note_sets(packet: &OscPacket, sets: &mut Vec<PcSet>) {
    match packet {
        OscPacket::Message(message) if message.addr == OSC_ADDRESS => {
            sets.push(pitch_classes(message));
        }
        OscPacket::Message(message) => {
            debug!(addr = %message.addr, "Ignoring OSC message");
        }
        OscPacket::Bundle(bundle) => {
            for inner in &bundle.content {
                collect_note_sets(inner, sets);
            }
        }
    }
}

/// {p mod 12 : p in args}; non-numeric arguments are skipped
fn pitch_classes(message: &OscMessage) -> PcSet {
    let mask = message
        .args
        .iter()
        .filter_map(|arg| match *arg {
            OscType::Int(p) => Some(i64::from(p)),
            OscType::Long(p) => Some(p),
            OscType::Float(p) => Some(p.round() as i64),
            OscType::Double(p) => Some(p.round() as i64),
            _ => None,
        })
        .fold(0u16, |mask, pitch| mask | 1 << pitch.rem_euclid(12));
    PcSet::from_mask(mask)
}

fn receive_loop(socket: UdpSocket, stop: Arc<AtomicBool>, events: Sender<InputEvent>) {
    let mut buf = [0u8; rosc::decoder::MTU];
    while !stop.load(Ordering::SeqCst) {
        let size = match socket.recv_from(&mut buf) {
            Ok((size, _)) => size,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                error!(error = %e, "OSC socket failed");
                break;
            }
        };

        let packet = match rosc::decoder::decode_udp(&buf[..size]) {
            Ok((_, packet)) => packet,
            Err(e) => {
                warn!(error = ?e, "Malformed OSC packet");
                continue;
            }
        };

        for set in note_sets(&packet) {
            if !publish(&events, InputEvent::Replace(set), &stop, READ_TIMEOUT) {
                debug!("OSC worker exiting");
                return;
            }
        }
    }
    debug!("OSC worker exiting");
}

/// UDP server feeding `/noteData` messages to the UI thread
pub struct OscServer {
    port: u16,
    events: Sender<InputEvent>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl OscServer {
    /// Bind 127.0.0.1:`port` and start receiving
    pub fn start(port: u16, events: Sender<InputEvent>) -> Result<Self, OscServerError> {
        if !UDP_PORTS.contains(&port) {
            return Err(OscServerError::PortOutOfRange(port));
        }
        let socket = UdpSocket::bind((SERVER_ADDRESS, port))
            .map_err(|source| OscServerError::Bind { port, source })?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;

        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let stop = stop.clone();
            let events = events.clone();
            thread::spawn(move || receive_loop(socket, stop, events))
        };

        info!(port, "OSC server listening");
        Ok(Self {
            port,
            events,
            stop,
            worker: Some(worker),
        })
    }

    /// Like [`OscServer::start`], retrying once on the default port
    pub fn start_with_fallback(port: u16, events: Sender<InputEvent>) -> Result<Self, OscServerError> {
        match Self::start(port, events.clone()) {
            Ok(server) => Ok(server),
            Err(e) if port != DEFAULT_UDP_PORT => {
                warn!(port, error = %e, "OSC server failed, retrying on default port");
                Self::start(DEFAULT_UDP_PORT, events)
            }
            Err(e) => Err(e),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Signal the worker and wait for it; the socket closes with the thread
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.stop.store(true, Ordering::SeqCst);
        if worker.join().is_err() {
            error!(port = self.port, "OSC worker panicked");
        }
        info!(port = self.port, "OSC server stopped");
    }

    /// Stop, then listen on `port`, retrying once on the default port. On
    /// failure the server stays stopped.
    pub fn restart(&mut self, port: u16) -> Result<(), OscServerError> {
        self.stop();
        *self = Self::start_with_fallback(port, self.events.clone())?;
        Ok(())
    }
}

impl Drop for OscServer {
    fn drop(&mut self) {
        self.stop();
    }
}
