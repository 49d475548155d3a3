//! Target set-class menu and member table

use egui::{ComboBox, Grid, RichText, ScrollArea, Ui};
use pcset_core::query::{TargetEntry, TargetMember, format_attributes, format_pcs};
use pcset_core::PcSet;

/// Actions that can be triggered from the target panel
pub enum TargetAction {
    None,
    Select(String),
    Adopt(PcSet),
}

pub struct TargetPanel {
    pub selected: Option<String>,
    pub menu: Vec<TargetEntry>,
    pub members: Vec<TargetMember>,
}

impl TargetPanel {
    pub fn new() -> Self {
        Self {
            selected: None,
            menu: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn ui(&mut self, ui: &mut Ui) -> TargetAction {
        let mut action = TargetAction::None;

        let selected_label = self
            .selected
            .as_ref()
            .and_then(|name| self.menu.iter().find(|e| &e.name == name))
            .map(|e| e.label())
            .unwrap_or_else(|| "Target set class".to_string());

        ComboBox::from_id_salt("target_set_class")
            .width(140.0)
            .height(400.0)
            .selected_text(selected_label)
            .show_ui(ui, |ui| {
                let mut last_card = None;
                for entry in &self.menu {
                    if last_card.is_some_and(|c| c != entry.cardinality) {
                        ui.separator();
                    }
                    last_card = Some(entry.cardinality);

                    let is_selected = self.selected.as_deref() == Some(entry.name.as_str());
                    let clicked = ui
                        .add_enabled_ui(entry.enabled, |ui| {
                            ui.selectable_label(is_selected, RichText::new(entry.label()).monospace())
                        })
                        .inner
                        .clicked();
                    if clicked {
                        action = TargetAction::Select(entry.name.clone());
                    }
                }
            });

        ui.add_space(4.0);
        ScrollArea::vertical()
            .id_salt("target_members")
            .max_height(260.0)
            .show(ui, |ui| {
                Grid::new("target_member_table")
                    .striped(true)
                    .num_columns(6)
                    .show(ui, |ui| {
                        ui.label("");
                        ui.strong("Member");
                        ui.strong("Tn/TnI");
                        ui.strong("MA");
                        ui.strong("Difference");
                        ui.strong("Difference set");
                        ui.end_row();

                        for (row, member) in self.members.iter().enumerate() {
                            if ui.small_button(format!("{}", row + 1)).on_hover_text("Make current").clicked() {
                                action = TargetAction::Adopt(member.member);
                            }
                            ui.monospace(format_pcs(&member.normal_form));
                            ui.monospace(member.level.map(|l| l.to_string()).unwrap_or_default());
                            ui.monospace(format_attributes(&member.modal_attributes));
                            ui.monospace(format_pcs(&member.difference));
                            ui.monospace(&member.difference_summary);
                            ui.end_row();
                        }
                    });
            });

        action
    }
}
