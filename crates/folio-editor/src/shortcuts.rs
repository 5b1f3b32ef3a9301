//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Keys without a
//! binding fall through to the host's own text editing.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    /// Remove the selected object, or clear the selected table cell.
    Delete,
    Deselect,

    // ── Formatting ──
    Bold,
    Italic,
    Underline,
    Indent,
    Outdent,

    // ── Output ──
    Print,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "b" | "B" => Some(ShortcutAction::Bold),
                "i" | "I" => Some(ShortcutAction::Italic),
                "u" | "U" => Some(ShortcutAction::Underline),
                "p" | "P" => Some(ShortcutAction::Print),
                _ => None,
            };
        }

        match key {
            "Tab" if shift => Some(ShortcutAction::Outdent),
            "Tab" => Some(ShortcutAction::Indent),
            "Delete" | "Backspace" if !shift => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_undo_redo() {
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("Z", true, true, false, false),
            Some(ShortcutAction::Redo)
        );
        // macOS
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
    }

    #[test]
    fn resolve_formatting() {
        assert_eq!(
            ShortcutMap::resolve("b", true, false, false, false),
            Some(ShortcutAction::Bold)
        );
        assert_eq!(
            ShortcutMap::resolve("I", true, false, false, false),
            Some(ShortcutAction::Italic)
        );
        assert_eq!(
            ShortcutMap::resolve("u", false, false, false, true),
            Some(ShortcutAction::Underline)
        );
        assert_eq!(
            ShortcutMap::resolve("Tab", false, false, false, false),
            Some(ShortcutAction::Indent)
        );
        assert_eq!(
            ShortcutMap::resolve("Tab", false, true, false, false),
            Some(ShortcutAction::Outdent)
        );
    }

    #[test]
    fn resolve_other_keys() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
        assert_eq!(
            ShortcutMap::resolve("p", true, false, false, false),
            Some(ShortcutAction::Print)
        );
    }

    #[test]
    fn plain_letters_are_not_bound() {
        assert_eq!(ShortcutMap::resolve("b", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", true, false, false, false), None);
    }
}
