//! Keyboard shortcuts for the canvas editor.

use serde::{Deserialize, Serialize};

/// A key press with its modifier state, as reported by the browser.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyChord {
    /// The `KeyboardEvent.key` value.
    pub key: String,
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
}

impl KeyChord {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    #[must_use]
    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// An editor action bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    Undo,
    Redo,
}

impl EditorCommand {
    /// Ctrl/Cmd+Z undoes; Ctrl/Cmd+Y and Ctrl/Cmd+Shift+Z redo.
    #[must_use]
    pub fn from_chord(chord: &KeyChord) -> Option<Self> {
        if !(chord.ctrl || chord.meta) {
            return None;
        }
        match chord.key.to_ascii_lowercase().as_str() {
            "z" if chord.shift => Some(Self::Redo),
            "z" => Some(Self::Undo),
            "y" => Some(Self::Redo),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_or_cmd_z_undoes() {
        assert_eq!(EditorCommand::from_chord(&KeyChord::new("z").ctrl()), Some(EditorCommand::Undo));
        assert_eq!(EditorCommand::from_chord(&KeyChord::new("z").meta()), Some(EditorCommand::Undo));
    }

    #[test]
    fn redo_chords() {
        assert_eq!(EditorCommand::from_chord(&KeyChord::new("y").ctrl()), Some(EditorCommand::Redo));
        // Shift reports the upper-case key in browsers.
        assert_eq!(
            EditorCommand::from_chord(&KeyChord::new("Z").meta().shift()),
            Some(EditorCommand::Redo)
        );
    }

    #[test]
    fn unmodified_keys_are_ignored() {
        assert_eq!(EditorCommand::from_chord(&KeyChord::new("z")), None);
        assert_eq!(EditorCommand::from_chord(&KeyChord::new("s").ctrl()), None);
    }
}
