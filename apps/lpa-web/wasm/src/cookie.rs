//! `document.cookie` backed transient storage

use std::time::Duration;

use lpa_widgets_core::{find_cookie, format_cookie, CookieConfig, TransientStore, WidgetError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlDocument};

pub struct CookieStore {
    document: HtmlDocument,
    attrs: CookieConfig,
}

impl CookieStore {
    /// # Errors
    /// Returns JsValue error if the document is not an HTML document
    pub fn new(document: &Document, attrs: &CookieConfig) -> Result<Self, JsValue> {
        let document = document
            .clone()
            .dyn_into::<HtmlDocument>()
            .map_err(|_| JsValue::from_str("Cookies require an HTML document"))?;

        Ok(Self {
            document,
            attrs: attrs.clone(),
        })
    }
}

impl TransientStore for CookieStore {
    fn get(&self, key: &str) -> Option<String> {
        let header = self.document.cookie().ok()?;
        find_cookie(&header, key)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), WidgetError> {
        let cookie = format_cookie(key, value, ttl, &self.attrs);
        self.document
            .set_cookie(&cookie)
            .map_err(|e| WidgetError::Storage(format!("{:?}", e)))
    }
}
