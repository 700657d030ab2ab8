//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Shortcuts are
//! suppressed while a text input has focus; the editor checks that before
//! resolving.
//!
//! - Single letters switch tools
//! - Space held = temporary pan tool, released = back to the previous tool
//! - Escape cancels the innermost modal state first (tab order, calibration)

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolPan,
    ToolPlace,
    ToolCable,
    ToolPipe,
    ToolMeasure,
    ToolLabel,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    /// Finish the in-progress polyline.
    Finish,
    /// Cancel drafts and modal modes, then fall back to the select tool.
    Cancel,

    // ── File ──
    Save,
    Open,
    Print,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomToFit,
    PanStart,
    PanEnd,

    // ── Z-order ──
    SendToBack,
    BringToFront,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::ToolSelect => "toolSelect",
            ShortcutAction::ToolPan => "toolPan",
            ShortcutAction::ToolPlace => "toolPlace",
            ShortcutAction::ToolCable => "toolCable",
            ShortcutAction::ToolPipe => "toolPipe",
            ShortcutAction::ToolMeasure => "toolMeasure",
            ShortcutAction::ToolLabel => "toolLabel",
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
            ShortcutAction::Delete => "delete",
            ShortcutAction::Duplicate => "duplicate",
            ShortcutAction::Finish => "finish",
            ShortcutAction::Cancel => "cancel",
            ShortcutAction::Save => "save",
            ShortcutAction::Open => "open",
            ShortcutAction::Print => "print",
            ShortcutAction::ZoomIn => "zoomIn",
            ShortcutAction::ZoomOut => "zoomOut",
            ShortcutAction::ZoomToFit => "zoomToFit",
            ShortcutAction::PanStart => "panStart",
            ShortcutAction::PanEnd => "panEnd",
            ShortcutAction::SendToBack => "sendToBack",
            ShortcutAction::BringToFront => "bringToFront",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key-down event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "[" | "{" => Some(ShortcutAction::SendToBack),
                "]" | "}" => Some(ShortcutAction::BringToFront),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "s" | "S" => Some(ShortcutAction::Save),
                "o" | "O" => Some(ShortcutAction::Open),
                "p" | "P" => Some(ShortcutAction::Print),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomToFit),
                _ => None,
            };
        }

        // ── Single keys (no command modifier) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "h" | "H" => Some(ShortcutAction::ToolPan),
            "w" | "W" => Some(ShortcutAction::ToolPlace),
            "c" | "C" => Some(ShortcutAction::ToolCable),
            "p" | "P" => Some(ShortcutAction::ToolPipe),
            "m" | "M" => Some(ShortcutAction::ToolMeasure),
            "l" | "L" => Some(ShortcutAction::ToolLabel),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            "Enter" => Some(ShortcutAction::Finish),
            " " => Some(ShortcutAction::PanStart),
            _ => None,
        }
    }

    /// Resolve a key-up event. Only releasing Space is bound.
    pub fn resolve_release(key: &str) -> Option<ShortcutAction> {
        match key {
            " " => Some(ShortcutAction::PanEnd),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_tool_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", false, false, false, false),
            Some(ShortcutAction::ToolSelect)
        );
        assert_eq!(
            ShortcutMap::resolve("H", false, false, false, false),
            Some(ShortcutAction::ToolPan)
        );
        assert_eq!(
            ShortcutMap::resolve("w", false, false, false, false),
            Some(ShortcutAction::ToolPlace)
        );
        assert_eq!(
            ShortcutMap::resolve("p", false, false, false, false),
            Some(ShortcutAction::ToolPipe)
        );
        assert_eq!(
            ShortcutMap::resolve("m", false, false, false, false),
            Some(ShortcutAction::ToolMeasure)
        );
        assert_eq!(
            ShortcutMap::resolve("l", false, false, false, false),
            Some(ShortcutAction::ToolLabel)
        );
    }

    #[test]
    fn resolve_undo_redo() {
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z → Redo
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        // Ctrl+Y → Redo
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn command_letters_do_not_switch_tools() {
        assert_eq!(
            ShortcutMap::resolve("p", true, false, false, false),
            Some(ShortcutAction::Print)
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, true),
            Some(ShortcutAction::Save)
        );
        assert_eq!(
            ShortcutMap::resolve("o", true, false, false, false),
            Some(ShortcutAction::Open)
        );
    }

    #[test]
    fn resolve_editing_keys() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Cancel)
        );
        assert_eq!(
            ShortcutMap::resolve("Enter", false, false, false, false),
            Some(ShortcutAction::Finish)
        );
    }

    #[test]
    fn space_holds_pan() {
        assert_eq!(
            ShortcutMap::resolve(" ", false, false, false, false),
            Some(ShortcutAction::PanStart)
        );
        assert_eq!(ShortcutMap::resolve_release(" "), Some(ShortcutAction::PanEnd));
        assert_eq!(ShortcutMap::resolve_release("v"), None);
    }

    #[test]
    fn unbound_keys() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", true, true, false, false), None);
    }
}
