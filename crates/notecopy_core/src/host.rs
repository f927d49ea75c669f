//! Host UI integration points.
//!
//! # Responsibility
//! - Describe the menu action the host registers for copying notes.
//! - Define the callbacks a batch copy drives (checkpoint, progress, reset,
//!   tooltip, warning).
//!
//! # Invariants
//! - A batch that passed selection validation always ends with
//!   `progress_finish`, `reset` and one `tooltip`.

use crate::config::CopyConfig;
use serde::{Deserialize, Serialize};

/// Label of the browser menu entry.
pub const COPY_ACTION_LABEL: &str = "Note Copy";
/// Menu that receives the entry.
pub const COPY_ACTION_MENU: &str = "Edit";
/// Undo checkpoint name recorded before a batch.
pub const COPY_CHECKPOINT_NAME: &str = "Copy Notes";

/// Menu entry the host registers to trigger a copy of the selected notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAction {
    pub label: String,
    pub menu: String,
    /// Keyboard shortcut in host notation (`Ctrl+C`).
    pub shortcut: String,
}

/// Builds the copy menu entry from user options.
pub fn copy_menu_action(config: &CopyConfig) -> MenuAction {
    MenuAction {
        label: COPY_ACTION_LABEL.to_string(),
        menu: COPY_ACTION_MENU.to_string(),
        shortcut: config.shortcut.trim().to_string(),
    }
}

/// Callbacks into the host window around a batch copy.
pub trait CopyHost {
    /// Begins a named undo checkpoint.
    fn checkpoint(&mut self, name: &str);
    fn progress_start(&mut self);
    fn progress_finish(&mut self);
    /// Re-synchronizes host views with storage.
    fn reset(&mut self);
    /// Transient, non-blocking notification.
    fn tooltip(&mut self, message: &str);
    /// Blocking warning dialog.
    fn warning(&mut self, message: &str);
}

/// One host callback, as recorded by `RecordingHost`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Checkpoint(String),
    ProgressStart,
    ProgressFinish,
    Reset,
    Tooltip(String),
    Warning(String),
}

/// Host that records callbacks for surfaces without a live window.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn tooltips(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Tooltip(message) => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|event| match event {
            HostEvent::Warning(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

impl CopyHost for RecordingHost {
    fn checkpoint(&mut self, name: &str) {
        self.events.push(HostEvent::Checkpoint(name.to_string()));
    }

    fn progress_start(&mut self) {
        self.events.push(HostEvent::ProgressStart);
    }

    fn progress_finish(&mut self) {
        self.events.push(HostEvent::ProgressFinish);
    }

    fn reset(&mut self) {
        self.events.push(HostEvent::Reset);
    }

    fn tooltip(&mut self, message: &str) {
        self.events.push(HostEvent::Tooltip(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.events.push(HostEvent::Warning(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::{copy_menu_action, COPY_ACTION_LABEL};
    use crate::config::CopyConfig;

    #[test]
    fn menu_action_uses_configured_shortcut() {
        let config = CopyConfig {
            shortcut: " Ctrl+Shift+D ".into(),
            ..CopyConfig::default()
        };
        let action = copy_menu_action(&config);
        assert_eq!(action.label, COPY_ACTION_LABEL);
        assert_eq!(action.menu, "Edit");
        assert_eq!(action.shortcut, "Ctrl+Shift+D");
    }
}
