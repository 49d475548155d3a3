//! Tn / TnI preview and apply

use egui::{ComboBox, Ui};
use pcset_core::PcSet;
use pcset_core::query::format_pcs;

/// Actions that can be triggered from the operations panel
pub enum OperationsAction {
    None,
    Transpose(u8),
    Invert(u8),
}

pub struct OperationsPanel {
    /// T0 means no transposition selected
    tn: u8,
    tni: Option<u8>,
}

impl OperationsPanel {
    pub fn new() -> Self {
        Self { tn: 0, tni: None }
    }

    /// Clear both selectors after the set has changed
    pub fn reset(&mut self) {
        self.tn = 0;
        self.tni = None;
    }

    pub fn ui(&mut self, ui: &mut Ui, current: PcSet) -> OperationsAction {
        let mut action = OperationsAction::None;

        ui.horizontal(|ui| {
            ComboBox::from_id_salt("tn_level")
                .width(56.0)
                .selected_text(if self.tn == 0 { "Tn".to_string() } else { format!("T{}", self.tn) })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.tn, 0, "\u{2014}");
                    for n in 1..12u8 {
                        ui.selectable_value(&mut self.tn, n, format!("T{}", n));
                    }
                });

            let preview = (self.tn != 0 && !current.is_empty())
                .then(|| format_pcs(&current.transpose(self.tn).normal_form()))
                .unwrap_or_default();
            ui.add_sized([160.0, 20.0], egui::Label::new(egui::RichText::new(preview).monospace()));

            let can_apply = self.tn != 0 && !current.is_empty();
            if ui.add_enabled(can_apply, egui::Button::new("Apply")).clicked() {
                action = OperationsAction::Transpose(self.tn);
            }
        });

        ui.horizontal(|ui| {
            ComboBox::from_id_salt("tni_level")
                .width(56.0)
                .selected_text(self.tni.map(|n| format!("T{}I", n)).unwrap_or_else(|| "TnI".to_string()))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.tni, None, "\u{2014}");
                    for n in 0..12u8 {
                        ui.selectable_value(&mut self.tni, Some(n), format!("T{}I", n));
                    }
                });

            let preview = self
                .tni
                .filter(|_| !current.is_empty())
                .map(|n| format_pcs(&current.invert(n).normal_form()))
                .unwrap_or_default();
            ui.add_sized([160.0, 20.0], egui::Label::new(egui::RichText::new(preview).monospace()));

            let level = self.tni.filter(|_| !current.is_empty());
            if ui.add_enabled(level.is_some(), egui::Button::new("Apply")).clicked() {
                if let Some(n) = level {
                    action = OperationsAction::Invert(n);
                }
            }
        });

        action
    }
}
