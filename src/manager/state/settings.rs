//! Debounced persistence of panel and tray edits

use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::config::SettingsPatch;
use crate::constants::gui::AUTO_SAVE_DELAY_MS;

use super::{SharedState, StatusMessage};

impl SharedState {
    /// Record an edit of `draft`; the save fires once edits pause
    pub fn mark_dirty(&mut self) {
        self.pending_save = Some(Instant::now());
    }

    /// Time left until the pending save is due (zero once due)
    pub fn save_due_in(&self, now: Instant) -> Option<Duration> {
        self.pending_save.map(|edited| {
            (edited + Duration::from_millis(AUTO_SAVE_DELAY_MS)).saturating_duration_since(now)
        })
    }

    /// Save if the debounce window has elapsed.
    ///
    /// Returns how long to wait before checking again while a save is pending.
    pub fn poll_pending_save(&mut self) -> Option<Duration> {
        let remaining = self.save_due_in(Instant::now())?;
        if remaining.is_zero() {
            self.flush_pending_save();
            None
        } else {
            Some(remaining)
        }
    }

    /// Save now if anything is pending
    pub fn flush_pending_save(&mut self) {
        if self.pending_save.take().is_some() {
            let patch = SettingsPatch::from_settings(&self.draft);
            self.save_settings(patch);
        }
    }

    /// Merge `patch` into the store and push the result to the overlay.
    ///
    /// The overlay follows the in-memory settings even when the file write fails.
    pub fn save_settings(&mut self, patch: SettingsPatch) {
        match self.store.save(patch) {
            Ok(saved) => {
                debug!(hex_color = %saved.hex_color, show = saved.show, "Settings saved");
                self.status_message = None;
            }
            Err(err) => {
                error!(error = %err, "Failed to save settings");
                self.status_message = Some(StatusMessage::error(format!("Save failed: {err}")));
            }
        }

        self.draft = self.store.settings().clone();
        self.sync_to_daemon();
    }

    /// Flip crosshair visibility through the regular save path
    pub fn toggle_show(&mut self) {
        self.draft.show = !self.draft.show;
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, Settings};
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> SharedState {
        SharedState::new(ConfigStore::open(dir.path().join("crosshair_config.json")), false)
    }

    #[test]
    fn test_save_waits_for_debounce_window() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        assert_eq!(state.save_due_in(Instant::now()), None);

        state.mark_dirty();
        let edited = state.pending_save.unwrap();

        assert!(!state.save_due_in(edited).unwrap().is_zero());
        assert!(
            state
                .save_due_in(edited + Duration::from_millis(AUTO_SAVE_DELAY_MS))
                .unwrap()
                .is_zero()
        );
    }

    #[test]
    fn test_flush_persists_draft() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);

        state.draft.thickness = 7;
        state.draft.r = 255;
        state.mark_dirty();
        state.flush_pending_save();

        assert!(state.pending_save.is_none());
        assert!(state.status_message.is_none());

        let reloaded = ConfigStore::open(state.store.path().to_path_buf());
        assert_eq!(reloaded.settings().thickness, 7);
        assert_eq!(reloaded.settings().hex_color, "#fff7ff");
        assert_eq!(state.draft.hex_color, "#fff7ff");
    }

    #[test]
    fn test_flush_without_pending_edit_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        state.draft.thickness = 9;

        state.flush_pending_save();

        assert_eq!(state.store.settings().thickness, 1);
    }

    #[test]
    fn test_toggle_show_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);

        state.toggle_show();
        assert!(!state.draft.show);
        assert!(state.pending_save.is_some());

        state.flush_pending_save();
        assert!(!state.store.settings().show);
    }

    #[test]
    fn test_save_failure_keeps_settings_and_reports() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let mut state = SharedState::new(ConfigStore::open(blocker.join("config.json")), false);
        state.draft.thickness = 4;
        state.mark_dirty();
        state.flush_pending_save();

        assert!(state.status_message.is_some());
        assert_eq!(state.store.settings().thickness, 4);
        assert_eq!(state.draft.thickness, 4);
    }

    #[test]
    fn test_save_clamps_draft() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);

        state.draft = Settings {
            vert_offset: 0.9,
            ..Settings::default()
        };
        state.mark_dirty();
        state.flush_pending_save();

        assert_eq!(state.draft.vert_offset, 0.5);
    }
}
