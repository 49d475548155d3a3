//! UI panels

mod connection;
mod msc;
mod operations;
mod pitch_classes;
mod profile;
mod targets;

pub use connection::{ConnectionAction, ConnectionWindow};
pub use msc::{MscAction, MscPanel};
pub use operations::{OperationsAction, OperationsPanel};
pub use pitch_classes::{PitchClassAction, PitchClassPanel};
pub use profile::ProfilePanel;
pub use targets::{TargetAction, TargetPanel};
