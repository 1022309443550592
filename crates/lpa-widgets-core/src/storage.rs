//! Short-lived key/value storage that survives a page navigation
//!
//! The browser implementation is backed by `document.cookie`; the cookie string
//! helpers live here so they can be tested natively.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::CookieConfig;
use crate::error::WidgetError;

/// Storage with per-entry expiry
pub trait TransientStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), WidgetError>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Duration,
}

/// In-memory store with a manually advanced clock
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, MemoryEntry>,
    now: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward
    pub fn advance(&mut self, elapsed: Duration) {
        self.now += elapsed;
    }

    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.expires_at > self.now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransientStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|entry| entry.expires_at > self.now)
            .map(|entry| entry.value.clone())
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), WidgetError> {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: self.now + ttl,
            },
        );
        Ok(())
    }
}

/// Build the string assigned to `document.cookie`
///
/// `value` must already be cookie-safe (snapshots are URL-encoded).
pub fn format_cookie(key: &str, value: &str, ttl: Duration, attrs: &CookieConfig) -> String {
    let mut cookie = format!("{}={}; Max-Age={}", key, value, ttl.as_secs());

    if !attrs.path.is_empty() {
        cookie.push_str("; Path=");
        cookie.push_str(&attrs.path);
    }

    cookie.push_str("; SameSite=");
    cookie.push_str(attrs.same_site.as_str());

    if attrs.secure {
        cookie.push_str("; Secure");
    }

    cookie
}

/// Find a cookie's value in a `document.cookie` string
pub fn find_cookie(header: &str, key: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value.to_string())
}
