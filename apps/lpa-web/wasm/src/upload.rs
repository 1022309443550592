//! Upload progress modal
//!
//! Shown while uploaded evidence is virus scanned. Progress arrives over an
//! `EventSource`; the session state machine in `lpa_widgets_core::upload`
//! decides what each message means and this module carries out the effects.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lpa_widgets_core::{
    update_counter_label, HiddenForm, ScanEffect, ScanState, UploadConfig, UploadSession,
    WidgetConfig,
};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventSource, MessageEvent};

use crate::dialog::DialogController;
use crate::dom;

struct Inner {
    document: Document,
    ids: UploadConfig,
    session: UploadSession,
    dialog: DialogController,
    counter: Option<Element>,
    stream_url: Option<String>,
    connection: Option<EventSource>,
    // Kept past close so a handler is never freed while it runs
    stream_listeners: Vec<EventListener>,
}

pub struct UploadProgressModal {
    inner: Rc<RefCell<Inner>>,
    _cancel: EventListener,
}

impl UploadProgressModal {
    /// Mount against the page
    ///
    /// Returns `Ok(None)` when the cancel button or dialog markup is missing.
    /// Opens the dialog and the progress stream straight away if the dialog
    /// says a scan is already running.
    pub fn init(document: &Document, config: &WidgetConfig) -> Result<Option<Self>, JsValue> {
        let ids = config.upload.clone();
        let Some(cancel) = dom::html_element_by_id(document, &ids.cancel_button_id) else {
            web_sys::console::debug_1(&"Upload cancel button not found".into());
            return Ok(None);
        };
        let dialog = DialogController::new(
            document,
            &ids.trigger_id,
            &ids.dialog_id,
            &ids.overlay_id,
            &config.hidden_class,
        );
        if !dialog.valid() {
            web_sys::console::debug_1(&"Upload dialog markup not found".into());
            return Ok(None);
        }

        let (stream_url, start_scan) = match dialog.dialog() {
            Some(el) => (
                el.get_attribute(&ids.stream_url_attr).filter(|url| !url.is_empty()),
                el.get_attribute(&ids.start_scan_attr)
                    .is_some_and(|flag| matches!(flag.as_str(), "1" | "true")),
            ),
            None => (None, false),
        };

        let inner = Rc::new(RefCell::new(Inner {
            document: document.clone(),
            counter: document.get_element_by_id(&ids.counter_id),
            ids,
            session: UploadSession::new(),
            dialog,
            stream_url,
            connection: None,
            stream_listeners: Vec::new(),
        }));

        let weak = Rc::downgrade(&inner);
        let cancel = EventListener::new_with_options(
            &cancel,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                event.prevent_default();
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let effects = inner.borrow_mut().session.cancel();
                run_effects(&inner, effects);
            },
        );

        if start_scan {
            let effects = inner.borrow_mut().session.start();
            run_effects(&inner, effects);
        }

        web_sys::console::log_1(&"Upload progress modal mounted".into());

        Ok(Some(Self {
            inner,
            _cancel: cancel,
        }))
    }

    /// Feed one stream payload through the session
    pub fn handle_message(&self, data: &str) {
        handle_message(&self.inner, data);
    }

    pub fn state(&self) -> ScanState {
        self.inner.borrow().session.state()
    }

    pub fn dialog_open(&self) -> bool {
        self.inner.borrow().dialog.is_open()
    }

    pub fn connected(&self) -> bool {
        self.inner.borrow().connection.is_some()
    }
}

impl Drop for UploadProgressModal {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.close_connection();
        }
    }
}

impl Inner {
    fn open_connection(&mut self, weak: Weak<RefCell<Inner>>) -> Result<(), JsValue> {
        let Some(url) = self.stream_url.clone() else {
            web_sys::console::warn_1(&"Upload dialog has no progress stream URL".into());
            return Ok(());
        };
        let source = EventSource::new(&url)?;

        let on_message = EventListener::new(&source, "message", move |event| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let data = event
                .dyn_ref::<MessageEvent>()
                .and_then(|message| message.data().as_string());
            match data {
                Some(data) => handle_message(&inner, &data),
                None => web_sys::console::warn_1(&"Ignoring non-text progress message".into()),
            }
        });

        let on_error = EventListener::new(&source, "error", |_event| {
            web_sys::console::warn_1(&"Upload progress stream error".into());
        });

        self.connection = Some(source);
        self.stream_listeners = vec![on_message, on_error];
        Ok(())
    }

    fn close_connection(&mut self) {
        if let Some(source) = self.connection.take() {
            source.close();
        }
    }

    fn update_counter(&self, scanned: u32) {
        if let Some(counter) = &self.counter {
            let label = counter.text_content().unwrap_or_default();
            counter.set_text_content(Some(&update_counter_label(&label, scanned)));
        }
    }

    fn submit(&self, form: HiddenForm) -> Result<(), JsValue> {
        let form_id = match form {
            HiddenForm::ScanResults => &self.ids.scan_results_form_id,
            HiddenForm::CloseConnection => &self.ids.close_connection_form_id,
            HiddenForm::CancelUpload => &self.ids.cancel_upload_form_id,
        };
        dom::submit_hidden_form(&self.document, form_id, form.action())
    }
}

fn handle_message(inner: &Rc<RefCell<Inner>>, data: &str) {
    let result = inner.borrow_mut().session.on_message(data);
    match result {
        Ok(effects) => run_effects(inner, effects),
        Err(e) => web_sys::console::warn_1(&format!("Ignoring progress message: {}", e).into()),
    }
}

fn run_effects(inner: &Rc<RefCell<Inner>>, effects: Vec<ScanEffect>) {
    for effect in effects {
        let mut state = inner.borrow_mut();
        let result = match effect {
            ScanEffect::OpenDialog => state.dialog.open(),
            ScanEffect::OpenConnection => state.open_connection(Rc::downgrade(inner)),
            ScanEffect::UpdateCounter(scanned) => {
                state.update_counter(scanned);
                Ok(())
            }
            ScanEffect::CloseConnection => {
                state.close_connection();
                Ok(())
            }
            ScanEffect::Submit(form) => state.submit(form),
        };

        if let Err(e) = result {
            web_sys::console::warn_2(&format!("Upload effect {:?} failed", effect).into(), &e);
        }
    }
}
