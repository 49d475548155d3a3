//! Modal set complex tables

use egui::{ComboBox, Grid, RichText, Ui};
use pcset_core::catalog::MSC_CARDINALITIES;
use pcset_core::query::format_attributes;
use pcset_core::Catalog;

/// Actions that can be triggered from the MSC panel
pub enum MscAction {
    None,
    /// Search the members of this set class in the current set
    FindMembers(String),
}

pub struct MscPanel {
    nexus: String,
}

impl MscPanel {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            nexus: catalog.nexus_names().next().unwrap_or_default().to_string(),
        }
    }

    /// `current_card` gates the search buttons: nothing to search in an
    /// empty set or at a member's own cardinality.
    pub fn ui(&mut self, ui: &mut Ui, catalog: &Catalog, current_card: usize) -> MscAction {
        let mut action = MscAction::None;

        ui.horizontal(|ui| {
            ui.label("Nexus");
            ComboBox::from_id_salt("msc_nexus")
                .width(80.0)
                .height(400.0)
                .selected_text(self.nexus.clone())
                .show_ui(ui, |ui| {
                    for name in catalog.nexus_names() {
                        ui.selectable_value(&mut self.nexus, name.to_string(), name);
                    }
                });
        });

        let Some(complex) = catalog.modal_set_complex(&self.nexus) else {
            return action;
        };

        ui.horizontal_top(|ui| {
            for card in MSC_CARDINALITIES {
                ui.vertical(|ui| {
                    ui.label(RichText::new(format!("Cardinality {}", card)).strong());
                    Grid::new(("msc_members", card))
                        .striped(true)
                        .show(ui, |ui| {
                            ui.strong("SN");
                            ui.strong("MA");
                            ui.strong("Sym");
                            ui.strong("#");
                            if card != 3 {
                                ui.strong("Z");
                            }
                            ui.end_row();

                            for member in complex.members(card) {
                                let searchable = current_card != 0 && current_card != card;
                                let response = ui.add_enabled(
                                    searchable,
                                    egui::Button::new(RichText::new(&member.name).monospace()).frame(false),
                                );
                                if response.on_hover_text("Find members in the current set").clicked() {
                                    action = MscAction::FindMembers(member.name.clone());
                                }
                                ui.monospace(format_attributes(&member.modal_attributes));
                                ui.monospace(format!("{}, {}", member.symmetry[0], member.symmetry[1]));
                                ui.monospace(member.inclusion.to_string());
                                if card != 3 {
                                    ui.monospace(member.z_corr.as_deref().unwrap_or(""));
                                }
                                ui.end_row();
                            }
                        });
                });
            }
        });

        action
    }
}
