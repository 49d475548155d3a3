//! MIDI / OSC adapter lifecycle and preference persistence

use pcset_services::{MidiConfig, MidiInputService, OscServer, Preferences};

use super::PcSetApp;

impl PcSetApp {
    /// Load preferences and bring both adapters up. Failures leave the
    /// affected adapter inactive.
    pub(super) fn start_inputs(&mut self) {
        self.prefs_path = match Preferences::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(error = %e, "Preferences will not be persisted");
                None
            }
        };
        self.prefs = self
            .prefs_path
            .as_deref()
            .map(Preferences::load_or_default)
            .unwrap_or_default();

        self.connect_midi(self.prefs.midi_in);

        match OscServer::start_with_fallback(self.prefs.osc, self.events_tx.clone()) {
            Ok(server) => {
                self.prefs.osc = server.port();
                self.osc = Some(server);
            }
            Err(e) => tracing::error!(error = %e, "OSC input inactive"),
        }
    }

    /// Move the OSC server to `port`, falling back to the default port once
    fn restart_osc(&mut self, port: u16) {
        let restarted = match self.osc.take() {
            Some(mut server) => server.restart(port).map(|()| server),
            None => OscServer::start_with_fallback(port, self.events_tx.clone()),
        };
        self.osc = match restarted {
            Ok(server) => Some(server),
            Err(e) => {
                tracing::error!(port, error = %e, "OSC input inactive");
                None
            }
        };
    }

    fn connect_midi(&mut self, index: usize) {
        if let Err(e) = self.midi.connect(index, MidiConfig::default(), self.events_tx.clone()) {
            tracing::warn!(index, error = %e, "MIDI input inactive");
        }
    }

    pub(super) fn open_connection_window(&mut self) {
        let ports = MidiInputService::list_ports().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not list MIDI ports");
            Vec::new()
        });
        let connected = self.midi.port_name().map(str::to_owned);
        self.connection_window.open(self.prefs, ports, connected);
    }

    /// Reconnect whatever changed and write the file when anything did
    pub(super) fn apply_preferences(&mut self, mut prefs: Preferences) {
        if prefs == self.prefs && self.midi.is_connected() && self.osc.is_some() {
            return;
        }

        if self.midi.port_index() != Some(prefs.midi_in) {
            self.connect_midi(prefs.midi_in);
        }

        if self.osc.as_ref().map(OscServer::port) != Some(prefs.osc) {
            self.restart_osc(prefs.osc);
        }
        if let Some(server) = &self.osc {
            prefs.osc = server.port();
        }

        self.prefs = prefs;
        if let Some(path) = &self.prefs_path {
            if let Err(e) = prefs.save(path) {
                tracing::error!(error = %e, "Failed to save preferences");
            }
        }
    }
}
