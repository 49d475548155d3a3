//! Pitch-class toggles and history controls

use egui::{Button, RichText, Ui, Vec2};
use pcset_core::{PcSet, PitchClass, Session};

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"];

/// Actions that can be triggered from the pitch-class bar
pub enum PitchClassAction {
    None,
    Toggle(PitchClass),
    Reset,
    Undo,
    Redo,
    OpenConnection,
}

pub struct PitchClassPanel {
    show_note_names: bool,
}

impl PitchClassPanel {
    pub fn new() -> Self {
        Self { show_note_names: false }
    }

    pub fn ui(&mut self, ui: &mut Ui, session: &Session) -> PitchClassAction {
        let mut action = PitchClassAction::None;
        let current: PcSet = session.current();

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;

            for pc in 0..12u8 {
                let label = if self.show_note_names {
                    NOTE_NAMES[pc as usize].to_string()
                } else {
                    pc.to_string()
                };
                let button = Button::new(RichText::new(label).size(18.0).strong())
                    .selected(current.contains(pc))
                    .min_size(Vec2::new(40.0, 36.0));
                if ui.add(button).clicked() {
                    action = PitchClassAction::Toggle(pc);
                }
            }

            ui.separator();

            if ui.button("Reset").clicked() {
                action = PitchClassAction::Reset;
            }
            if ui.add_enabled(session.can_undo(), Button::new("\u{21B6} Undo")).clicked() {
                action = PitchClassAction::Undo;
            }
            if ui.add_enabled(session.can_redo(), Button::new("Redo \u{21B7}")).clicked() {
                action = PitchClassAction::Redo;
            }

            ui.separator();
            ui.checkbox(&mut self.show_note_names, "Note names");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Connection\u{2026}").clicked() {
                    action = PitchClassAction::OpenConnection;
                }
            });
        });

        action
    }
}
