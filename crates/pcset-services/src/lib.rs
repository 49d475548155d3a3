//! pcset-services: MIDI and OSC input adapters and the preference file

pub mod events;
pub mod midi_input;
pub mod osc_input;
pub mod preferences;

pub use events::InputEvent;
pub use midi_input::{MidiConfig, MidiInputError, MidiInputService, NoteTracker};
pub use osc_input::{DEFAULT_UDP_PORT, OSC_ADDRESS, OscServer, OscServerError, UDP_PORTS};
pub use preferences::{Preferences, PreferencesError};
