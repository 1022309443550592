//! WASM bindings for the LPA form widgets
//!
//! Mounts the page widgets against server-rendered markup. Widgets whose
//! anchors are missing are skipped, so the module can be loaded on every page.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { mountWidgets } from './pkg/lpa_widgets_wasm.js';
//!
//! // Mounts with the default anchors
//! await init();
//!
//! // Or remount with overrides
//! mountWidgets({ upload: { counterId: 'scan-count' } });
//! ```

pub mod cookie;
pub mod dialog;
pub mod dom;
pub mod unsaved;
pub mod upload;

use std::cell::RefCell;

use lpa_widgets_core::WidgetConfig;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use dialog::DialogController;
pub use unsaved::UnsavedChangesWarning;
pub use upload::UploadProgressModal;

#[derive(Default)]
struct MountedWidgets {
    unsaved_changes: Option<UnsavedChangesWarning>,
    upload: Option<UploadProgressModal>,
}

thread_local! {
    static MOUNTED: RefCell<MountedWidgets> = RefCell::new(MountedWidgets::default());
}

/// Which widgets found their markup
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountSummary {
    pub unsaved_changes: bool,
    pub upload: bool,
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    if let Err(e) = mount(&WidgetConfig::default()) {
        web_sys::console::warn_2(&"LPA widgets failed to mount".into(), &e);
    }
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Replace any mounted widgets with ones built from `config`
///
/// `config` may be `undefined` for the defaults or a partial config object.
#[wasm_bindgen(js_name = mountWidgets)]
pub fn mount_widgets(config: JsValue) -> Result<JsValue, JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        WidgetConfig::default()
    } else {
        let config: WidgetConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid widget config: {}", e)))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        config
    };

    let summary = mount(&config)?;
    serde_wasm_bindgen::to_value(&summary)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Detach every mounted widget
#[wasm_bindgen(js_name = unmountWidgets)]
pub fn unmount_widgets() {
    let previous = MOUNTED.with(|mounted| mounted.replace(MountedWidgets::default()));
    drop(previous);
}

/// True if the unsaved-changes widget is mounted and the form differs from its saved state
#[wasm_bindgen(js_name = unsavedChangesMade)]
pub fn unsaved_changes_made() -> Result<bool, JsValue> {
    MOUNTED.with(|mounted| match &mounted.borrow().unsaved_changes {
        Some(widget) => widget.changes_made(),
        None => Ok(false),
    })
}

fn mount(config: &WidgetConfig) -> Result<MountSummary, JsValue> {
    let document = dom::document()?;

    // Drop the old widgets first so their listeners are gone before new ones attach
    unmount_widgets();

    let unsaved_changes = UnsavedChangesWarning::init(&document, config)?;
    let upload = UploadProgressModal::init(&document, config)?;

    let summary = MountSummary {
        unsaved_changes: unsaved_changes.is_some(),
        upload: upload.is_some(),
    };

    MOUNTED.with(|mounted| {
        *mounted.borrow_mut() = MountedWidgets {
            unsaved_changes,
            upload,
        };
    });

    Ok(summary)
}
