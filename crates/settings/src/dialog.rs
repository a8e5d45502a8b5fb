//! Settings dialog state machine, kept independent of any concrete UI.
//!
//! Input is abstracted as [`DialogEvent`]s so the open/close rules (close
//! button, cancel, backdrop pointer-down) stay testable without a real
//! pointer. Fields are populated once from the store when the dialog is
//! built at startup, not on every open.

use anyhow::{Result, bail};

use crate::{Settings, SettingsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Open,
    CloseButton,
    Cancel,
    Save,
    PointerDown { on_backdrop: bool },
}

/// What the caller should reflect in the UI after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEffect {
    None,
    Opened,
    Closed,
    /// Settings were written; show a transient acknowledgment.
    Saved,
}

pub struct SettingsDialog {
    state: DialogState,
    committed: Settings,
    draft: Settings,
}

impl SettingsDialog {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: DialogState::Closed,
            draft: settings.clone(),
            committed: settings,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    /// The last committed settings record.
    pub fn settings(&self) -> &Settings {
        &self.committed
    }

    /// The record currently being edited. Only meaningful while open.
    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    pub fn handle(&mut self, event: DialogEvent, store: &SettingsStore) -> Result<DialogEffect> {
        match (self.state, event) {
            (DialogState::Closed, DialogEvent::Open) => {
                self.draft = self.committed.clone();
                self.state = DialogState::Open;
                Ok(DialogEffect::Opened)
            }
            (DialogState::Closed, _) => Ok(DialogEffect::None),
            (DialogState::Open, DialogEvent::Open) => Ok(DialogEffect::None),
            (DialogState::Open, DialogEvent::CloseButton)
            | (DialogState::Open, DialogEvent::Cancel)
            | (DialogState::Open, DialogEvent::PointerDown { on_backdrop: true }) => {
                self.state = DialogState::Closed;
                Ok(DialogEffect::Closed)
            }
            (DialogState::Open, DialogEvent::PointerDown { on_backdrop: false }) => {
                Ok(DialogEffect::None)
            }
            (DialogState::Open, DialogEvent::Save) => {
                store.save(&self.draft)?;
                self.committed = self.draft.clone();
                self.state = DialogState::Closed;
                Ok(DialogEffect::Saved)
            }
        }
    }

    /// Edits one field of the draft from its textual form.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "role" => self.draft.role = value.to_string(),
            "seed" => self.draft.seed = value.parse()?,
            "temperature" => self.draft.temperature = value.parse()?,
            "model_path" => self.draft.model_path = value.to_string(),
            "max_tokens" => self.draft.max_tokens = value.parse()?,
            "top_p" => self.draft.top_p = value.parse()?,
            "top_k" => self.draft.top_k = value.parse()?,
            other => bail!("unknown settings field: {}", other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, SettingsStore, SettingsDialog) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let dialog = SettingsDialog::new(store.load());
        (dir, store, dialog)
    }

    #[test]
    fn open_then_backdrop_click_closes() {
        let (_dir, store, mut dialog) = setup();

        assert_eq!(dialog.handle(DialogEvent::Open, &store).unwrap(), DialogEffect::Opened);
        assert!(dialog.is_open());

        let effect = dialog
            .handle(DialogEvent::PointerDown { on_backdrop: true }, &store)
            .unwrap();
        assert_eq!(effect, DialogEffect::Closed);
        assert!(!dialog.is_open());
    }

    #[test]
    fn click_inside_content_keeps_dialog_open() {
        let (_dir, store, mut dialog) = setup();
        dialog.handle(DialogEvent::Open, &store).unwrap();

        let effect = dialog
            .handle(DialogEvent::PointerDown { on_backdrop: false }, &store)
            .unwrap();
        assert_eq!(effect, DialogEffect::None);
        assert!(dialog.is_open());
    }

    #[test]
    fn save_persists_draft_and_closes() {
        let (_dir, store, mut dialog) = setup();
        dialog.handle(DialogEvent::Open, &store).unwrap();
        dialog.set_field("temperature", "0.3").unwrap();
        dialog.set_field("seed", "42").unwrap();

        assert_eq!(dialog.handle(DialogEvent::Save, &store).unwrap(), DialogEffect::Saved);
        assert!(!dialog.is_open());

        let stored = store.load();
        assert_eq!(stored.temperature, 0.3);
        assert_eq!(stored.seed, 42);
        assert_eq!(dialog.settings(), &stored);
    }

    #[test]
    fn cancel_discards_edits() {
        let (_dir, store, mut dialog) = setup();
        dialog.handle(DialogEvent::Open, &store).unwrap();
        dialog.set_field("top_k", "5").unwrap();
        dialog.handle(DialogEvent::Cancel, &store).unwrap();

        assert_eq!(dialog.settings().top_k, 50);
        assert_eq!(store.load().top_k, 50);

        // reopening starts from the committed record again
        dialog.handle(DialogEvent::Open, &store).unwrap();
        assert_eq!(dialog.draft().top_k, 50);
    }

    #[test]
    fn events_while_closed_are_ignored() {
        let (_dir, store, mut dialog) = setup();

        assert_eq!(dialog.handle(DialogEvent::Save, &store).unwrap(), DialogEffect::None);
        assert_eq!(dialog.handle(DialogEvent::Cancel, &store).unwrap(), DialogEffect::None);
        assert!(!dialog.is_open());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let (_dir, _store, mut dialog) = setup();
        assert!(dialog.set_field("typingSpeed", "20").is_err());
    }
}
