//! Connection preferences persisted as JSON

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::{info, warn};

use crate::osc_input::{DEFAULT_UDP_PORT, UDP_PORTS};

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed preferences: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("No config directory on this platform")]
    NoConfigDir,
}

/// `{"MIDIIn": 0, "OSC": 3000}`; field order keeps the keys sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "MIDIIn")]
    pub midi_in: usize,
    #[serde(rename = "OSC")]
    pub osc: u16,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            midi_in: 0,
            osc: DEFAULT_UDP_PORT,
        }
    }
}

impl Preferences {
    /// `<config dir>/pcsetcalc/preferences.json`
    pub fn default_path() -> Result<PathBuf, PreferencesError> {
        dirs::config_dir()
            .map(|dir| dir.join("pcsetcalc").join("preferences.json"))
            .ok_or(PreferencesError::NoConfigDir)
    }

    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        let text = fs::read_to_string(path)?;
        let mut prefs: Self = serde_json::from_str(&text)?;
        if !UDP_PORTS.contains(&prefs.osc) {
            warn!(port = prefs.osc, "OSC port out of range, using default");
            prefs.osc = DEFAULT_UDP_PORT;
        }
        Ok(prefs)
    }

    /// Missing or malformed files fall back to the defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(prefs) => {
                info!(path = %path.display(), ?prefs, "Loaded preferences");
                prefs
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default preferences");
                Self::default()
            }
        }
    }

    /// Pretty JSON with 4-space indentation
    pub fn to_json(&self) -> Result<String, PreferencesError> {
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "Saved preferences");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pcsetcalc-test-{}-{}", std::process::id(), name))
            .join("preferences.json")
    }

    #[test]
    fn test_json_layout() {
        let prefs = Preferences { midi_in: 2, osc: 3004 };
        assert_eq!(prefs.to_json().unwrap(), "{\n    \"MIDIIn\": 2,\n    \"OSC\": 3004\n}");
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save");
        let prefs = Preferences { midi_in: 1, osc: 3002 };
        prefs.save(&path).unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), prefs);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let missing = temp_path("missing");
        assert!(matches!(Preferences::load(&missing), Err(PreferencesError::Io(_))));
        assert_eq!(Preferences::load_or_default(&missing), Preferences::default());

        let malformed = temp_path("malformed");
        fs::create_dir_all(malformed.parent().unwrap()).unwrap();
        fs::write(&malformed, "{\"MIDIIn\": \"first\"}").unwrap();
        assert!(matches!(Preferences::load(&malformed), Err(PreferencesError::Parse(_))));
        assert_eq!(Preferences::load_or_default(&malformed), Preferences::default());
        let _ = fs::remove_dir_all(malformed.parent().unwrap());
    }

    #[test]
    fn test_out_of_range_port_is_replaced() {
        let path = temp_path("range");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{\"MIDIIn\": 3, \"OSC\": 8000}").unwrap();
        assert_eq!(Preferences::load(&path).unwrap(), Preferences { midi_in: 3, osc: DEFAULT_UDP_PORT });
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
