//! DOM lookups shared by the widgets

use js_sys::Array;
use lpa_widgets_core::{FormSnapshot, FOCUSABLE_SELECTOR};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, FormData, HtmlElement, HtmlFormElement, Node};

pub fn document() -> Result<Document, JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
    window
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))
}

pub fn html_element_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    if id.is_empty() {
        return None;
    }
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Buttons and elements with an `href` inside `root`, in document order
pub fn focusable_elements(root: &Element) -> Vec<HtmlElement> {
    let Ok(nodes) = root.query_selector_all(FOCUSABLE_SELECTOR) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Index of the active element among `elements`
pub fn focused_index(document: &Document, elements: &[HtmlElement]) -> Option<usize> {
    let active: Node = document.active_element()?.into();
    elements
        .iter()
        .position(|el| el.is_same_node(Some(&active)))
}

/// The single form on the page without a `name` attribute
pub fn unnamed_form(document: &Document) -> Option<HtmlFormElement> {
    document
        .query_selector("form:not([name])")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
}

/// The button that submits `form`
pub fn submit_button(form: &HtmlFormElement) -> Option<HtmlElement> {
    let found = form
        .query_selector("button[type=submit], input[type=submit]")
        .ok()
        .flatten()
        .or_else(|| form.query_selector("button").ok().flatten());

    found.and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Snapshot the string values of `form`, skipping `excluded_field`
///
/// # Errors
/// Returns JsValue error if the browser cannot build `FormData` for the form
pub fn snapshot_form(
    form: &HtmlFormElement,
    excluded_field: &str,
) -> Result<FormSnapshot, JsValue> {
    let data = FormData::new_with_form(form)?;
    let mut fields: Vec<(String, String)> = Vec::new();

    if let Some(entries) = js_sys::try_iter(&data)? {
        for entry in entries {
            let entry: Array = entry?.unchecked_into();
            // File inputs yield File objects, which are not part of a snapshot
            let Some(value) = entry.get(1).as_string() else {
                continue;
            };
            fields.push((entry.get(0).as_string().unwrap_or_default(), value));
        }
    }

    Ok(FormSnapshot::capture(
        fields.iter().map(|(name, value)| (name.as_str(), value.as_str())),
        excluded_field,
    ))
}

/// Submit the form with `form_id`, adding a hidden `action` field if it has none
///
/// # Errors
/// Returns JsValue error if the form is missing or cannot be submitted
pub fn submit_hidden_form(document: &Document, form_id: &str, action: &str) -> Result<(), JsValue> {
    let form = document
        .get_element_by_id(form_id)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        .ok_or_else(|| JsValue::from_str(&format!("Missing form: {}", form_id)))?;

    if form.query_selector("[name=action]")?.is_none() {
        let input = document.create_element("input")?;
        input.set_attribute("type", "hidden")?;
        input.set_attribute("name", "action")?;
        input.set_attribute("value", action)?;
        form.append_child(&input)?;
    }

    form.submit()
}

pub fn set_hidden(element: &Element, hidden_class: &str, hidden: bool) -> Result<(), JsValue> {
    let classes = element.class_list();
    if hidden {
        classes.add_1(hidden_class)?;
    } else {
        classes.remove_1(hidden_class)?;
    }
    element.set_attribute("aria-hidden", if hidden { "true" } else { "false" })
}
