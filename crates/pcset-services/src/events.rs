//! Events published by the input adapters to the UI thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use pcset_core::{PcSet, PitchClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A pitch class switched on or off by the MIDI keyboard
    PitchClass { pc: PitchClass, on: bool },
    /// Replace the whole current set (OSC note data)
    Replace(PcSet),
}

/// Hand `event` to the UI, waiting in `patience` slices while the queue is
/// full. Returns false once `stop` is raised or the UI has hung up.
pub(crate) fn publish(
    events: &Sender<InputEvent>,
    mut event: InputEvent,
    stop: &AtomicBool,
    patience: Duration,
) -> bool {
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        match events.send_timeout(event, patience) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(pending)) => event = pending,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use crossbeam_channel::bounded;

    const PATIENCE: Duration = Duration::from_millis(10);

    #[test]
    fn test_publish_delivers_when_there_is_room() {
        let (tx, rx) = bounded(1);
        let stop = AtomicBool::new(false);
        assert!(publish(&tx, InputEvent::Replace(PcSet::new()), &stop, PATIENCE));
        assert_eq!(rx.try_recv(), Ok(InputEvent::Replace(PcSet::new())));
    }

    #[test]
    fn test_publish_gives_up_on_stop_while_queue_full() {
        let (tx, _rx) = bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        assert!(publish(&tx, InputEvent::Replace(PcSet::new()), &stop, PATIENCE));

        let worker = {
            let stop = stop.clone();
            thread::spawn(move || publish(&tx, InputEvent::Replace(PcSet::chromatic()), &stop, PATIENCE))
        };
        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        stop.store(true, Ordering::SeqCst);
        assert!(!worker.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_publish_fails_when_receiver_dropped() {
        let (tx, rx) = bounded(1);
        drop(rx);
        let stop = AtomicBool::new(false);
        assert!(!publish(&tx, InputEvent::PitchClass { pc: 0, on: true }, &stop, PATIENCE));
    }
}
