//! Set profile display: forms, vectors, complements and collections

use egui::{Color32, Grid, RichText, Ui};
use pcset_core::query::{format_attributes, format_pcs};
use pcset_core::{PcSet, REF_COLS, RefCol, SetProfile};

fn collection_color(col: RefCol) -> Color32 {
    match col {
        RefCol::Octatonic => Color32::from_rgb(20, 64, 110),
        RefCol::WholeTone => Color32::from_rgb(200, 180, 45),
        RefCol::Hexatonic => Color32::from_rgb(160, 72, 72),
    }
}

fn field(ui: &mut Ui, label: &str, value: &str) {
    ui.label(label);
    ui.monospace(value);
    ui.end_row();
}

pub struct ProfilePanel;

impl ProfilePanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&mut self, ui: &mut Ui, profile: &SetProfile) {
        ui.heading(if profile.summary.is_empty() { "\u{2014}" } else { profile.summary.as_str() });
        ui.add_space(4.0);

        Grid::new("profile_fields")
            .num_columns(2)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                field(ui, "Normal form", &format_pcs(&profile.normal_form));
                field(ui, "Prime form", &profile.prime_form);
                field(ui, "Set name", &profile.set_name);
                field(
                    ui,
                    "Tn/TnI",
                    &profile.transformation_level.map(|l| l.to_string()).unwrap_or_default(),
                );
                field(ui, "Modal attributes", &format_attributes(&profile.modal_attributes));
                field(ui, "Interval-class vector", &profile.icv_string());
                field(ui, "Literal complement", &format_pcs(&profile.literal_complement));
                field(
                    ui,
                    "Abstract complement",
                    &format!("{}  {}", profile.abstract_complement, profile.abstract_complement_name),
                );
                field(
                    ui,
                    "Z-correspondent",
                    &match (&profile.z_correspondent, &profile.z_correspondent_prime_form) {
                        (Some(name), Some(pf)) => format!("{}  {}", name, pf),
                        _ => String::new(),
                    },
                );
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Index vector").strong());
        Grid::new("index_vector")
            .striped(true)
            .min_col_width(24.0)
            .show(ui, |ui| {
                for k in 0..12 {
                    ui.label(RichText::new(k.to_string()).weak());
                }
                ui.end_row();
                for value in profile.index_vector {
                    ui.monospace(value.map(|v| v.to_string()).unwrap_or_default());
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Modal complements").strong());
        Grid::new("modal_complements")
            .striped(true)
            .num_columns(3)
            .min_col_width(60.0)
            .show(ui, |ui| {
                for mc in &profile.modal_complements {
                    ui.label(RichText::new(mc.collection.name()).color(collection_color(mc.collection)));
                    ui.monospace(format_pcs(&mc.normal_form));
                    ui.monospace(&mc.set_name);
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.label(RichText::new("Referential collections").strong());
        collections_ui(ui, profile.set);
    }
}

/// Every member of each family, with the current set's pitch classes lit
fn collections_ui(ui: &mut Ui, set: PcSet) {
    Grid::new("collections").spacing([2.0, 2.0]).show(ui, |ui| {
        for col in REF_COLS {
            let color = collection_color(col);
            let closest = set.enclosure(col).collection;
            for (n, member) in col.transpositions().enumerate() {
                let marker = if !set.is_empty() && member == closest { "\u{25B8}" } else { " " };
                ui.monospace(format!("{}{}{}", marker, col.key(), n));
                for pc in member.iter() {
                    let text = RichText::new(format!("{:>2}", pc)).monospace();
                    if set.contains(pc) {
                        ui.label(text.background_color(color).color(Color32::WHITE));
                    } else {
                        ui.label(text.weak());
                    }
                }
                ui.end_row();
            }
        }
    });
}
