//! Browser widget logic for the LPA form wizard
//!
//! This crate holds the DOM-independent parts of three page widgets so they can
//! be tested natively:
//! - `dialog`: open/closed state and the Tab focus-trap rule
//! - `unsaved`: unsaved-changes detection across reloads via a short-lived cookie
//! - `upload`: scan-progress state driven by server-push messages
//!
//! The `lpa-widgets-wasm` crate binds these to the live page.

pub mod config;
pub mod dialog;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod unsaved;
pub mod upload;

pub use config::{CookieConfig, SameSite, UnsavedChangesConfig, UploadConfig, WidgetConfig};
pub use dialog::{
    DialogMachine, DialogState, FocusMove, FocusTrap, KeyPress, Transition, FOCUSABLE_SELECTOR,
};
pub use error::WidgetError;
pub use snapshot::FormSnapshot;
pub use storage::{find_cookie, format_cookie, MemoryStore, TransientStore};
pub use unsaved::{ChangeDetector, LeaveDecision};
pub use upload::{
    update_counter_label, HiddenForm, ScanEffect, ScanMessage, ScanState, TerminalReason,
    UploadSession,
};
