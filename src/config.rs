use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const MIN_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 20;
pub const DEFAULT_ROUNDS: u32 = 6;

/// Minutes-per-round choices offered on the setup screen
pub const ROUND_MINUTES_MENU: [u32; 5] = [3, 5, 7, 10, 15];
pub const DEFAULT_ROUND_MINUTES: u32 = 5;
/// Upper bound for minutes that arrive from the command line or settings file
pub const MAX_ROUND_MINUTES: u32 = 600;

/// Break-between-rounds choices (seconds) offered on the setup screen
pub const BREAK_SECS_MENU: [u32; 5] = [15, 30, 45, 60, 90];
pub const DEFAULT_BREAK_SECS: u32 = 30;
pub const MAX_BREAK_SECS: u32 = 3600;

/// Settings for one session. Fixed from `start` until `restart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub rounds: u32,
    pub round_duration_secs: u32,
    pub break_duration_secs: u32,
}

impl SessionConfig {
    pub fn new(
        rounds: u32,
        round_duration_secs: u32,
        break_duration_secs: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            rounds,
            round_duration_secs,
            break_duration_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds < MIN_ROUNDS {
            return Err(ConfigError::InvalidRounds(self.rounds));
        }
        if self.round_duration_secs == 0 {
            return Err(ConfigError::InvalidRoundDuration(self.round_duration_secs));
        }
        if self.break_duration_secs == 0 {
            return Err(ConfigError::InvalidBreakDuration(self.break_duration_secs));
        }
        Ok(())
    }

    /// Whole minutes the event takes, rounding up: every round plus the
    /// breaks between them (none after the last round).
    pub fn estimated_total_minutes(&self) -> u32 {
        let total_secs = self
            .rounds
            .saturating_mul(self.round_duration_secs)
            .saturating_add(self.rounds.saturating_sub(1).saturating_mul(self.break_duration_secs));
        total_secs.div_ceil(60)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            round_duration_secs: DEFAULT_ROUND_MINUTES * 60,
            break_duration_secs: DEFAULT_BREAK_SECS,
        }
    }
}

/// Setup defaults read from the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub rounds: u32,
    pub round_minutes: u32,
    pub break_secs: u32,
    pub prompts_path: Option<PathBuf>,
    pub mute: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            round_minutes: DEFAULT_ROUND_MINUTES,
            break_secs: DEFAULT_BREAK_SECS,
            prompts_path: None,
            mute: false,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
}

/// Read-only JSON settings file. Nothing about a running event is ever
/// written back.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "dev-roulette") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("dev_roulette_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Settings::default(),
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring malformed settings file");
                Settings::default()
            }
        }
    }
}

/// Editable values behind the setup screen.
///
/// Rounds step by one inside [`MIN_ROUNDS`, `MAX_ROUNDS`]; durations cycle
/// through their menus. Values that came from the command line may sit off
/// the menu until the first cycle snaps them back onto it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupDraft {
    pub rounds: u32,
    pub round_minutes: u32,
    pub break_secs: u32,
}

impl SetupDraft {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rounds: settings.rounds.clamp(MIN_ROUNDS, MAX_ROUNDS),
            round_minutes: settings.round_minutes.clamp(1, MAX_ROUND_MINUTES),
            break_secs: settings.break_secs.clamp(1, MAX_BREAK_SECS),
        }
    }

    pub fn increment_rounds(&mut self) {
        self.rounds = (self.rounds + 1).min(MAX_ROUNDS);
    }

    pub fn decrement_rounds(&mut self) {
        self.rounds = self.rounds.saturating_sub(1).max(MIN_ROUNDS);
    }

    pub fn next_round_minutes(&mut self) {
        self.round_minutes = cycle_up(&ROUND_MINUTES_MENU, self.round_minutes);
    }

    pub fn prev_round_minutes(&mut self) {
        self.round_minutes = cycle_down(&ROUND_MINUTES_MENU, self.round_minutes);
    }

    pub fn next_break_secs(&mut self) {
        self.break_secs = cycle_up(&BREAK_SECS_MENU, self.break_secs);
    }

    pub fn prev_break_secs(&mut self) {
        self.break_secs = cycle_down(&BREAK_SECS_MENU, self.break_secs);
    }

    pub fn to_config(&self) -> SessionConfig {
        SessionConfig {
            rounds: self.rounds,
            round_duration_secs: self.round_minutes.saturating_mul(60),
            break_duration_secs: self.break_secs,
        }
    }
}

impl Default for SetupDraft {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

fn cycle_up(menu: &[u32], current: u32) -> u32 {
    menu.iter()
        .copied()
        .find(|&v| v > current)
        .unwrap_or(menu[0])
}

fn cycle_down(menu: &[u32], current: u32) -> u32 {
    menu.iter()
        .rev()
        .copied()
        .find(|&v| v < current)
        .unwrap_or(menu[menu.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn default_config_matches_setup_defaults() {
        let cfg = SessionConfig::default();
        assert_eq!(cfg.rounds, 6);
        assert_eq!(cfg.round_duration_secs, 300);
        assert_eq!(cfg.break_duration_secs, 30);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn new_rejects_zero_values() {
        assert_matches!(SessionConfig::new(0, 300, 30), Err(ConfigError::InvalidRounds(0)));
        assert_matches!(
            SessionConfig::new(3, 0, 30),
            Err(ConfigError::InvalidRoundDuration(0))
        );
        assert_matches!(
            SessionConfig::new(3, 300, 0),
            Err(ConfigError::InvalidBreakDuration(0))
        );
    }

    #[test]
    fn estimated_total_minutes_rounds_up() {
        // 6 * 5min + 5 * 30s = 32.5 min
        assert_eq!(SessionConfig::default().estimated_total_minutes(), 33);
        // a single round has no break
        let single = SessionConfig::new(1, 180, 90).unwrap();
        assert_eq!(single.estimated_total_minutes(), 3);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "rounds": 10, "mute": true }"#).unwrap();

        let loaded = FileConfigStore::with_path(&path).load();
        assert_eq!(loaded.rounds, 10);
        assert!(loaded.mute);
        assert_eq!(loaded.round_minutes, DEFAULT_ROUND_MINUTES);
        assert_eq!(loaded.break_secs, DEFAULT_BREAK_SECS);
    }

    #[test]
    fn malformed_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Settings::default());
    }

    #[test]
    fn draft_rounds_stay_in_bounds() {
        let mut draft = SetupDraft::default();
        for _ in 0..50 {
            draft.increment_rounds();
        }
        assert_eq!(draft.rounds, MAX_ROUNDS);
        for _ in 0..50 {
            draft.decrement_rounds();
        }
        assert_eq!(draft.rounds, MIN_ROUNDS);
    }

    #[test]
    fn draft_durations_cycle_through_menus() {
        let mut draft = SetupDraft::default();
        draft.next_round_minutes();
        assert_eq!(draft.round_minutes, 7);
        draft.next_round_minutes();
        draft.next_round_minutes();
        assert_eq!(draft.round_minutes, 15);
        draft.next_round_minutes();
        assert_eq!(draft.round_minutes, 3);
        draft.prev_round_minutes();
        assert_eq!(draft.round_minutes, 15);

        draft.prev_break_secs();
        assert_eq!(draft.break_secs, 15);
        draft.prev_break_secs();
        assert_eq!(draft.break_secs, 90);
    }

    #[test]
    fn off_menu_value_snaps_on_first_cycle() {
        let mut draft = SetupDraft::from_settings(&Settings {
            round_minutes: 1,
            break_secs: 50,
            ..Settings::default()
        });
        draft.next_round_minutes();
        assert_eq!(draft.round_minutes, 3);
        draft.next_break_secs();
        assert_eq!(draft.break_secs, 60);
    }

    #[test]
    fn draft_converts_minutes_to_seconds() {
        let draft = SetupDraft::default();
        let cfg = draft.to_config();
        assert_eq!(cfg, SessionConfig::default());
    }

    #[test]
    fn huge_settings_are_clamped_before_conversion() {
        let draft = SetupDraft::from_settings(&Settings {
            rounds: 20,
            round_minutes: 71_582_789,
            break_secs: u32::MAX,
            ..Settings::default()
        });
        assert_eq!(draft.round_minutes, MAX_ROUND_MINUTES);
        assert_eq!(draft.break_secs, MAX_BREAK_SECS);

        let cfg = draft.to_config();
        assert_eq!(cfg.round_duration_secs, MAX_ROUND_MINUTES * 60);
        assert!(cfg.validate().is_ok());
        // 20 * 600min + 19 * 60min
        assert_eq!(cfg.estimated_total_minutes(), 13_140);
    }

    #[test]
    fn estimate_saturates_instead_of_overflowing() {
        let cfg = SessionConfig {
            rounds: MAX_ROUNDS,
            round_duration_secs: u32::MAX,
            break_duration_secs: u32::MAX,
        };
        assert_eq!(cfg.estimated_total_minutes(), u32::MAX.div_ceil(60));
    }
}
