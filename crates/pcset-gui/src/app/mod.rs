//! Main application state

mod inputs;

use std::path::PathBuf;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};
use eframe::CreationContext;
use egui::Context;
use pcset_core::{Catalog, PcSet, SetProfile, Session, query};
use pcset_services::{InputEvent, MidiInputService, OscServer, Preferences};

use crate::panels::{
    ConnectionAction, ConnectionWindow, MscAction, MscPanel, OperationsAction, OperationsPanel,
    PitchClassAction, PitchClassPanel, ProfilePanel, TargetAction, TargetPanel,
};

/// Adapter events buffered between frames
const EVENT_QUEUE_CAPACITY: usize = 1024;
/// Repaint cadence while idle, so adapter events show up promptly
const POLL_REPAINT: Duration = Duration::from_millis(30);

pub struct PcSetApp {
    catalog: Catalog,
    session: Session,
    profile: SetProfile,

    events_tx: Sender<InputEvent>,
    events_rx: Receiver<InputEvent>,
    midi: MidiInputService,
    osc: Option<OscServer>,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,

    pitch_class_panel: PitchClassPanel,
    profile_panel: ProfilePanel,
    operations_panel: OperationsPanel,
    target_panel: TargetPanel,
    msc_panel: MscPanel,
    connection_window: ConnectionWindow,
}

impl PcSetApp {
    pub fn new(_cc: &CreationContext<'_>, catalog: Catalog) -> Self {
        let (events_tx, events_rx) = bounded(EVENT_QUEUE_CAPACITY);
        let session = Session::new();
        let profile = SetProfile::new(session.current(), &catalog);
        let msc_panel = MscPanel::new(&catalog);

        let mut app = Self {
            catalog,
            session,
            profile,
            events_tx,
            events_rx,
            midi: MidiInputService::new(),
            osc: None,
            prefs: Preferences::default(),
            prefs_path: None,
            pitch_class_panel: PitchClassPanel::new(),
            profile_panel: ProfilePanel::new(),
            operations_panel: OperationsPanel::new(),
            target_panel: TargetPanel::new(),
            msc_panel,
            connection_window: ConnectionWindow::new(),
        };
        app.start_inputs();
        app.refresh();
        app
    }

    // ======================================================================
    // Set mutations
    // ======================================================================

    /// Recompute everything derived from the current set
    fn refresh(&mut self) {
        let current = self.session.current();
        self.profile = SetProfile::new(current, &self.catalog);
        self.target_panel.menu = query::target_menu(current, &self.catalog);
        self.refresh_target_members();
    }

    fn refresh_target_members(&mut self) {
        let current = self.session.current();
        self.target_panel.members = match &self.target_panel.selected {
            Some(name) => query::target_members(current, name, &self.catalog).unwrap_or_else(|e| {
                tracing::warn!(target_class = %name, error = %e, "Target search failed");
                Vec::new()
            }),
            None => Vec::new(),
        };
    }

    /// Apply a session mutation and refresh when it changed the set
    fn mutate(&mut self, f: impl FnOnce(&mut Session) -> bool) {
        if f(&mut self.session) {
            self.operations_panel.reset();
            self.refresh();
        }
    }

    fn adopt(&mut self, set: PcSet) {
        self.mutate(|s| s.replace(set));
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                InputEvent::PitchClass { pc, on } => {
                    self.mutate(|s| s.set_pitch_class(pc, on).unwrap_or(false));
                }
                InputEvent::Replace(set) => self.adopt(set),
            }
        }
    }

    fn select_target(&mut self, name: String) {
        tracing::debug!(target_class = %name, "Target set class selected");
        self.target_panel.selected = Some(name);
        self.refresh_target_members();
    }
}

impl eframe::App for PcSetApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        // 1. Pitch-class bar
        let pc_action = egui::TopBottomPanel::top("pitch_classes").show(ctx, |ui| {
            ui.add_space(4.0);
            let action = self.pitch_class_panel.ui(ui, &self.session);
            ui.add_space(4.0);
            action
        }).inner;

        match pc_action {
            PitchClassAction::Toggle(pc) => {
                self.mutate(|s| s.toggle(pc).is_ok());
            }
            PitchClassAction::Reset => {
                self.target_panel.selected = None;
                self.mutate(Session::reset);
            }
            PitchClassAction::Undo => self.mutate(Session::undo),
            PitchClassAction::Redo => self.mutate(Session::redo),
            PitchClassAction::OpenConnection => self.open_connection_window(),
            PitchClassAction::None => {}
        }

        // 2. Profile
        egui::SidePanel::left("profile")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.profile_panel.ui(ui, &self.profile);
                });
            });

        // 3. Operations, target search and modal set complexes
        let (op_action, target_action, msc_action) = egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Operations");
            let op_action = self.operations_panel.ui(ui, self.session.current());
            ui.separator();

            ui.heading("Target set-class members");
            let target_action = self.target_panel.ui(ui);
            ui.separator();

            ui.heading("Modal set complex");
            let msc_action = egui::ScrollArea::vertical()
                .id_salt("msc_scroll")
                .show(ui, |ui| self.msc_panel.ui(ui, &self.catalog, self.session.current().len()))
                .inner;
            (op_action, target_action, msc_action)
        }).inner;

        match op_action {
            OperationsAction::Transpose(n) => self.mutate(|s| s.transpose_by(n)),
            OperationsAction::Invert(n) => self.mutate(|s| s.invert_by(n)),
            OperationsAction::None => {}
        }

        match target_action {
            TargetAction::Select(name) => self.select_target(name),
            TargetAction::Adopt(set) => self.adopt(set),
            TargetAction::None => {}
        }

        match msc_action {
            MscAction::FindMembers(name) => self.select_target(name),
            MscAction::None => {}
        }

        // 4. Connection window
        if let ConnectionAction::Apply(prefs) = self.connection_window.ui(ctx) {
            self.apply_preferences(prefs);
        }

        ctx.request_repaint_after(POLL_REPAINT);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Workers may be waiting on a full queue
        self.events_rx.try_iter().for_each(drop);
        if let Some(mut osc) = self.osc.take() {
            osc.stop();
        }
        self.midi.close();
    }
}
