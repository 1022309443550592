//! Dialog visibility state and focus-trap rules
//!
//! The focus trap only exists inside `DialogState::Open`, so there is no way to
//! ask a closed dialog to trap focus.

use tracing::debug;

/// Selector for the elements focus cycles through while a dialog is open
pub const FOCUSABLE_SELECTOR: &str = "button, [href]";

/// Handle that exists only while a dialog is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrap {
    _open: (),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open(FocusTrap),
}

/// Side effects the DOM layer applies after a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Show the dialog, focus its first focusable element, attach the trap
    Opened,
    /// Hide the dialog, detach the trap, focus the trigger
    Closed,
}

/// A key press as far as the trap is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub tab: bool,
    pub shift: bool,
}

impl KeyPress {
    /// Build from a `KeyboardEvent.key` value and the shift modifier
    pub fn from_key(key: &str, shift: bool) -> Self {
        Self {
            tab: key == "Tab",
            shift,
        }
    }
}

/// What to do with a key press inside an open dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMove {
    /// Let the browser handle it
    Default,
    /// Prevent the default and focus the focusable element at this index
    Wrap(usize),
}

impl FocusTrap {
    /// Decide where focus goes for a key press
    ///
    /// `focused` is the index of the active element within the dialog's
    /// focusable elements, if it is one of them.
    pub fn on_key(
        &self,
        key: KeyPress,
        focused: Option<usize>,
        focusable_count: usize,
    ) -> FocusMove {
        if !key.tab || focusable_count == 0 {
            return FocusMove::Default;
        }

        let last = focusable_count - 1;
        match focused {
            Some(0) if key.shift => FocusMove::Wrap(last),
            Some(i) if !key.shift && i == last => FocusMove::Wrap(0),
            _ => FocusMove::Default,
        }
    }
}

/// Open/closed state of a single dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogMachine {
    state: DialogState,
}

impl Default for DialogMachine {
    fn default() -> Self {
        Self {
            state: DialogState::Closed,
        }
    }
}

impl DialogMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open(_))
    }

    /// The trap handle, present only while open
    pub fn focus_trap(&self) -> Option<FocusTrap> {
        match self.state {
            DialogState::Open(trap) => Some(trap),
            DialogState::Closed => None,
        }
    }

    /// Flip between open and closed
    pub fn toggle(&mut self) -> Transition {
        let transition = match self.state {
            DialogState::Closed => {
                self.state = DialogState::Open(FocusTrap { _open: () });
                Transition::Opened
            }
            DialogState::Open(_) => {
                self.state = DialogState::Closed;
                Transition::Closed
            }
        };
        debug!(?transition, "dialog toggled");
        transition
    }

    /// Open if closed; `None` when already open
    pub fn open(&mut self) -> Option<Transition> {
        (!self.is_open()).then(|| self.toggle())
    }

    /// Close if open; `None` when already closed
    pub fn close(&mut self) -> Option<Transition> {
        self.is_open().then(|| self.toggle())
    }
}
