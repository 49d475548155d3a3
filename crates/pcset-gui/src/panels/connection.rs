//! MIDI input port and UDP port selection

use egui::{ComboBox, Context};
use pcset_services::{Preferences, UDP_PORTS};

/// Actions that can be triggered from the connection window
pub enum ConnectionAction {
    None,
    Apply(Preferences),
}

pub struct ConnectionWindow {
    open: bool,
    midi_ports: Vec<String>,
    connected: Option<String>,
    draft: Preferences,
}

impl ConnectionWindow {
    pub fn new() -> Self {
        Self {
            open: false,
            midi_ports: Vec::new(),
            connected: None,
            draft: Preferences::default(),
        }
    }

    /// Show the window with the current settings preselected
    pub fn open(&mut self, current: Preferences, midi_ports: Vec<String>, connected: Option<String>) {
        self.draft = current;
        self.midi_ports = midi_ports;
        self.connected = connected;
        self.open = true;
    }

    pub fn ui(&mut self, ctx: &Context) -> ConnectionAction {
        if !self.open {
            return ConnectionAction::None;
        }

        let mut action = ConnectionAction::None;
        let mut close = false;

        egui::Window::new("Connection")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("connection_fields").num_columns(2).show(ui, |ui| {
                    ui.label("MIDI input");
                    if self.midi_ports.is_empty() {
                        ui.weak("No MIDI input ports");
                    } else {
                        let selected = self
                            .midi_ports
                            .get(self.draft.midi_in)
                            .cloned()
                            .unwrap_or_else(|| format!("Port {}", self.draft.midi_in));
                        ComboBox::from_id_salt("midi_in_port")
                            .width(220.0)
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for (index, name) in self.midi_ports.iter().enumerate() {
                                    ui.selectable_value(&mut self.draft.midi_in, index, name);
                                }
                            });
                    }
                    ui.end_row();

                    ui.label("Connected");
                    match &self.connected {
                        Some(name) => ui.label(name.as_str()),
                        None => ui.weak("Not connected"),
                    };
                    ui.end_row();

                    ui.label("UDP port");
                    ComboBox::from_id_salt("udp_port")
                        .width(220.0)
                        .selected_text(self.draft.osc.to_string())
                        .show_ui(ui, |ui| {
                            for port in UDP_PORTS {
                                ui.selectable_value(&mut self.draft.osc, port, port.to_string());
                            }
                        });
                    ui.end_row();
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        action = ConnectionAction::Apply(self.draft);
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.open = false;
        }
        action
    }
}
