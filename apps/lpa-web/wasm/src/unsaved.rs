//! "You have unsaved changes" warning on the leave link
//!
//! Clicking the leave trigger opens the dialog instead of navigating when the
//! form holds values that would be lost. Clicking the form's submit button
//! records the form in the change cookie so the next page load can tell a
//! validation-error re-render apart from a saved page.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use lpa_widgets_core::{ChangeDetector, FormSnapshot, LeaveDecision, TransientStore, WidgetConfig};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlFormElement};

use crate::cookie::CookieStore;
use crate::dialog::DialogController;
use crate::dom;

struct Inner {
    form: HtmlFormElement,
    csrf_field: String,
    detector: ChangeDetector,
    store: Rc<RefCell<dyn TransientStore>>,
}

impl Inner {
    fn snapshot_now(&self) -> Result<FormSnapshot, JsValue> {
        dom::snapshot_form(&self.form, &self.csrf_field)
    }
}

pub struct UnsavedChangesWarning {
    inner: Rc<Inner>,
    dialog: Rc<RefCell<DialogController>>,
    _listeners: Vec<EventListener>,
}

impl UnsavedChangesWarning {
    /// Mount against the page using cookie storage
    ///
    /// Returns `Ok(None)` when the page lacks the warning's markup.
    pub fn init(document: &Document, config: &WidgetConfig) -> Result<Option<Self>, JsValue> {
        let store = CookieStore::new(document, &config.cookie)?;
        Self::init_with_store(document, config, Rc::new(RefCell::new(store)))
    }

    /// Mount against the page with an injected store
    pub fn init_with_store(
        document: &Document,
        config: &WidgetConfig,
        store: Rc<RefCell<dyn TransientStore>>,
    ) -> Result<Option<Self>, JsValue> {
        let ids = &config.unsaved_changes;
        let dialog = DialogController::new(
            document,
            &ids.trigger_id,
            &ids.dialog_id,
            &ids.overlay_id,
            &config.hidden_class,
        );
        if !dialog.valid() {
            web_sys::console::debug_1(&"Unsaved changes dialog markup not found".into());
            return Ok(None);
        }
        let Some(form) = dom::unnamed_form(document) else {
            web_sys::console::debug_1(&"No unnamed form for the unsaved changes warning".into());
            return Ok(None);
        };

        let at_load = dom::snapshot_form(&form, &ids.csrf_field)?;
        let detector = ChangeDetector::init(at_load, &*store.borrow(), &config.cookie);

        let trigger = dialog.trigger().cloned();
        let dialog = Rc::new(RefCell::new(dialog));
        let inner = Rc::new(Inner {
            form: form.clone(),
            csrf_field: ids.csrf_field.clone(),
            detector,
            store,
        });

        let mut listeners = Vec::new();

        if let Some(trigger) = trigger {
            let inner = inner.clone();
            let dialog = dialog.clone();
            listeners.push(EventListener::new_with_options(
                &trigger,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| match inner.snapshot_now() {
                    Ok(now) if inner.detector.on_leave(&now) == LeaveDecision::Intercept => {
                        event.prevent_default();
                        if let Err(e) = dialog.borrow_mut().toggle_visibility() {
                            web_sys::console::warn_2(
                                &"Failed to open unsaved changes dialog".into(),
                                &e,
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(e) => web_sys::console::warn_2(&"Failed to read form".into(), &e),
                },
            ));
        }

        if let Some(back) = dom::html_element_by_id(document, &ids.back_to_page_id) {
            let dialog = dialog.clone();
            listeners.push(EventListener::new_with_options(
                &back,
                "click",
                EventListenerOptions::enable_prevent_default(),
                move |event: &Event| {
                    event.prevent_default();
                    let _ = dialog.borrow_mut().close();
                },
            ));
        }

        if let Some(continue_link) = dom::html_element_by_id(document, &ids.continue_id) {
            let dialog = dialog.clone();
            listeners.push(EventListener::new(&continue_link, "click", move |_event| {
                let _ = dialog.borrow_mut().close();
            }));
        }

        if let Some(submit) = dom::submit_button(&form) {
            let inner = inner.clone();
            listeners.push(EventListener::new(&submit, "click", move |_event| {
                if let Err(e) = inner.add_form_values_to_cookie() {
                    web_sys::console::warn_2(&"Failed to record form values".into(), &e);
                }
            }));
        }

        web_sys::console::log_1(&"Unsaved changes warning mounted".into());

        Ok(Some(Self {
            inner,
            dialog,
            _listeners: listeners,
        }))
    }

    pub fn changes_made(&self) -> Result<bool, JsValue> {
        let now = self.inner.snapshot_now()?;
        Ok(self.inner.detector.changes_made(&now))
    }

    pub fn form_empty(&self) -> Result<bool, JsValue> {
        let now = self.inner.snapshot_now()?;
        Ok(ChangeDetector::form_empty(&now))
    }

    pub fn add_form_values_to_cookie(&self) -> Result<(), JsValue> {
        self.inner.add_form_values_to_cookie()
    }

    pub fn dialog_open(&self) -> bool {
        self.dialog.borrow().is_open()
    }
}

impl Inner {
    fn add_form_values_to_cookie(&self) -> Result<(), JsValue> {
        let now = self.snapshot_now()?;
        self.detector
            .add_form_values_to_cookie(&now, &mut *self.store.borrow_mut())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use lpa_widgets_core::MemoryStore;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;
    use web_sys::{HtmlElement, HtmlInputElement, MouseEvent, MouseEventInit};

    wasm_bindgen_test_configure!(run_in_browser);

    const PAGE: &str = r##"
        <iframe name="sink" hidden></iframe>
        <form method="post" action="about:blank" target="sink">
          <input type="hidden" name="csrf" value="token">
          <input id="f-first-names" name="first-names" value="">
          <input id="f-last-name" name="last-name" value="">
          <button type="submit" id="save">Save and continue</button>
        </form>
        <a id="return-to-task-list-button" href="#task-list">Return to task list</a>
        <div id="unsaved-changes-dialog-overlay" class="govuk-!-display-none"></div>
        <div id="unsaved-changes-dialog" class="govuk-!-display-none">
          <button id="back-to-page-dialog-btn" type="button">Back to page</button>
          <a id="return-to-tasklist-dialog-btn" href="#task-list">Continue without saving</a>
        </div>"##;

    fn mount(html: &str, store: &Rc<RefCell<MemoryStore>>) -> (Document, UnsavedChangesWarning) {
        let document = dom::document().unwrap();
        document.body().unwrap().set_inner_html(html);
        let config = WidgetConfig::default();
        let warning = UnsavedChangesWarning::init_with_store(&document, &config, store.clone())
            .unwrap()
            .unwrap();
        (document, warning)
    }

    fn set_value(document: &Document, id: &str, value: &str) {
        document
            .get_element_by_id(id)
            .unwrap()
            .dyn_into::<HtmlInputElement>()
            .unwrap()
            .set_value(value);
    }

    fn click(document: &Document, id: &str) {
        document
            .get_element_by_id(id)
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap()
            .click();
    }

    /// Dispatch a cancelable click and report whether navigation would go ahead
    fn dispatch_click(document: &Document, id: &str) -> bool {
        let init = MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        let event = MouseEvent::new_with_mouse_event_init_dict("click", &init).unwrap();
        document
            .get_element_by_id(id)
            .unwrap()
            .dispatch_event(&event)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn test_missing_markup_does_not_mount() {
        let document = dom::document().unwrap();
        document.body().unwrap().set_inner_html("<form><input name=\"a\"></form>");
        let store: Rc<RefCell<MemoryStore>> = Rc::new(RefCell::new(MemoryStore::new()));
        let config = WidgetConfig::default();
        let warning = UnsavedChangesWarning::init_with_store(&document, &config, store).unwrap();
        assert!(warning.is_none());
    }

    #[wasm_bindgen_test]
    fn test_untouched_empty_form_lets_navigation_through() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        assert!(!warning.changes_made().unwrap());
        assert!(warning.form_empty().unwrap());

        click(&document, "return-to-task-list-button");
        assert!(!warning.dialog_open());
    }

    #[wasm_bindgen_test]
    fn test_edit_then_leave_opens_dialog() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        set_value(&document, "f-first-names", "John");
        assert!(warning.changes_made().unwrap());

        click(&document, "return-to-task-list-button");
        assert!(warning.dialog_open());
        let dialog = document.get_element_by_id("unsaved-changes-dialog").unwrap();
        assert!(!dialog.class_list().contains("govuk-!-display-none"));
    }

    #[wasm_bindgen_test]
    fn test_back_to_page_refocuses_trigger() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        set_value(&document, "f-first-names", "John");
        click(&document, "return-to-task-list-button");
        click(&document, "back-to-page-dialog-btn");

        assert!(!warning.dialog_open());
        assert_eq!(
            document.active_element().unwrap().id(),
            "return-to-task-list-button"
        );
    }

    #[wasm_bindgen_test]
    fn test_continue_without_saving_closes_dialog() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        set_value(&document, "f-first-names", "John");
        click(&document, "return-to-task-list-button");
        click(&document, "return-to-tasklist-dialog-btn");

        assert!(!warning.dialog_open());
    }

    #[wasm_bindgen_test]
    fn test_submit_then_rerender_reports_changes() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        set_value(&document, "f-first-names", "John");
        warning.add_form_values_to_cookie().unwrap();
        assert!(store.borrow().get("formValues").is_some());
        drop(warning);

        // Server re-renders the page with the submitted values after a validation error
        let rerendered = PAGE.replace(
            r#"name="first-names" value="""#,
            r#"name="first-names" value="John""#,
        );
        let (document, warning) = mount(&rerendered, &store);

        assert!(warning.changes_made().unwrap());
        click(&document, "return-to-task-list-button");
        assert!(warning.dialog_open());
    }

    #[wasm_bindgen_test]
    fn test_rendered_values_without_cookie_are_not_changes() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let saved = PAGE.replace(
            r#"name="first-names" value="""#,
            r#"name="first-names" value="John""#,
        );
        let (document, warning) = mount(&saved, &store);

        assert!(!warning.changes_made().unwrap());
        click(&document, "return-to-task-list-button");
        assert!(!warning.dialog_open());
    }

    #[wasm_bindgen_test]
    fn test_leave_click_is_only_cancelled_when_intercepted() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        assert!(dispatch_click(&document, "return-to-task-list-button"));
        assert!(!warning.dialog_open());

        set_value(&document, "f-first-names", "John");
        assert!(!dispatch_click(&document, "return-to-task-list-button"));
        assert!(warning.dialog_open());
    }

    #[wasm_bindgen_test]
    fn test_continue_link_navigates_and_back_button_does_not() {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let (document, warning) = mount(PAGE, &store);

        set_value(&document, "f-first-names", "John");
        dispatch_click(&document, "return-to-task-list-button");
        assert!(!dispatch_click(&document, "back-to-page-dialog-btn"));
        assert!(!warning.dialog_open());

        dispatch_click(&document, "return-to-task-list-button");
        assert!(dispatch_click(&document, "return-to-tasklist-dialog-btn"));
        assert!(!warning.dialog_open());
    }
}
