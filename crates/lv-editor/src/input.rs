//! Input abstraction layer.
//!
//! Pointer events carry both the logical canvas position (already mapped
//! through the viewport) and the raw viewport position. Drawing tools use
//! the former, panning uses the latter.

use kurbo::Point;

/// Modifier key state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Ctrl on Windows/Linux, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(code: i16) -> Self {
        match code {
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            _ => MouseButton::Primary,
        }
    }
}

/// A normalized pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        at: Point,
        screen: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    PointerMove {
        at: Point,
        screen: Point,
        modifiers: Modifiers,
    },
    PointerUp {
        at: Point,
        screen: Point,
        modifiers: Modifiers,
    },
    /// Primary-button click (down and up without leaving the element).
    Click { at: Point, modifiers: Modifiers },
    DoubleClick { at: Point },
    /// Secondary-button click; the host suppresses the browser menu.
    ContextMenu { at: Point },
}

impl InputEvent {
    /// Logical canvas position of the event.
    pub fn position(&self) -> Point {
        match self {
            Self::PointerDown { at, .. }
            | Self::PointerMove { at, .. }
            | Self::PointerUp { at, .. }
            | Self::Click { at, .. }
            | Self::DoubleClick { at }
            | Self::ContextMenu { at } => *at,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Click { modifiers, .. } => *modifiers,
            Self::DoubleClick { .. } | Self::ContextMenu { .. } => Modifiers::NONE,
        }
    }
}
