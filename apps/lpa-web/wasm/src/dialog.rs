//! Focus-trapping dialog bound to one trigger element

use lpa_widgets_core::{DialogMachine, FocusMove, KeyPress, Transition};
use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, KeyboardEvent};

use crate::dom;

pub struct DialogController {
    document: Document,
    trigger: Option<HtmlElement>,
    dialog: Option<HtmlElement>,
    overlay: Option<Element>,
    hidden_class: String,
    machine: DialogMachine,
    keydown: Option<EventListener>,
}

impl DialogController {
    /// Look up the anchors; missing ones leave the controller invalid
    pub fn new(
        document: &Document,
        trigger_id: &str,
        dialog_id: &str,
        overlay_id: &str,
        hidden_class: &str,
    ) -> Self {
        Self {
            document: document.clone(),
            trigger: dom::html_element_by_id(document, trigger_id),
            dialog: dom::html_element_by_id(document, dialog_id),
            overlay: document.get_element_by_id(overlay_id),
            hidden_class: hidden_class.to_string(),
            machine: DialogMachine::new(),
            keydown: None,
        }
    }

    /// Both the trigger and the dialog exist
    pub fn valid(&self) -> bool {
        self.trigger.is_some() && self.dialog.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.machine.is_open()
    }

    pub fn trigger(&self) -> Option<&HtmlElement> {
        self.trigger.as_ref()
    }

    pub fn dialog(&self) -> Option<&HtmlElement> {
        self.dialog.as_ref()
    }

    /// Open when closed, close when open. No-op on an invalid controller.
    pub fn toggle_visibility(&mut self) -> Result<(), JsValue> {
        if !self.valid() {
            return Ok(());
        }
        let transition = self.machine.toggle();
        self.apply(transition)
    }

    pub fn open(&mut self) -> Result<(), JsValue> {
        if !self.valid() {
            return Ok(());
        }
        match self.machine.open() {
            Some(transition) => self.apply(transition),
            None => Ok(()),
        }
    }

    pub fn close(&mut self) -> Result<(), JsValue> {
        if !self.valid() {
            return Ok(());
        }
        match self.machine.close() {
            Some(transition) => self.apply(transition),
            None => Ok(()),
        }
    }

    fn apply(&mut self, transition: Transition) -> Result<(), JsValue> {
        let (Some(trigger), Some(dialog)) = (self.trigger.clone(), self.dialog.clone()) else {
            return Ok(());
        };

        match transition {
            Transition::Opened => {
                self.set_hidden(&dialog, false)?;
                self.keydown = Some(self.attach_trap(&dialog)?);
                if let Some(first) = dom::focusable_elements(&dialog).first() {
                    first.focus()?;
                }
            }
            Transition::Closed => {
                self.keydown = None;
                self.set_hidden(&dialog, true)?;
                trigger.focus()?;
            }
        }
        Ok(())
    }

    fn set_hidden(&self, dialog: &HtmlElement, hidden: bool) -> Result<(), JsValue> {
        dom::set_hidden(dialog, &self.hidden_class, hidden)?;
        if hidden {
            dialog.remove_attribute("open")?;
        } else {
            dialog.set_attribute("open", "")?;
        }
        if let Some(overlay) = &self.overlay {
            dom::set_hidden(overlay, &self.hidden_class, hidden)?;
        }
        Ok(())
    }

    fn attach_trap(&self, dialog: &HtmlElement) -> Result<EventListener, JsValue> {
        let Some(trap) = self.machine.focus_trap() else {
            return Err(JsValue::from_str("Focus trap requested while dialog closed"));
        };
        let document = self.document.clone();
        let root = dialog.clone();

        Ok(EventListener::new_with_options(
            dialog,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let key = KeyPress::from_key(&event.key(), event.shift_key());
                if !key.tab {
                    return;
                }

                let focusables = dom::focusable_elements(&root);
                let focused = dom::focused_index(&document, &focusables);
                if let FocusMove::Wrap(index) = trap.on_key(key, focused, focusables.len()) {
                    event.prevent_default();
                    let _ = focusables[index].focus();
                }
            },
        ))
    }
}
