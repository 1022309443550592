//! Form snapshots
//!
//! A snapshot is the ordered list of non-empty values in a form, minus the
//! anti-forgery token. It is encoded as a URL-encoded JSON array so it can be
//! carried in a cookie and compared as a plain string.

use crate::error::WidgetError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    values: Vec<String>,
}

impl FormSnapshot {
    /// Capture from `(name, value)` pairs in document order
    ///
    /// Empty values and the field named `excluded_field` are skipped.
    pub fn capture<'a, I>(fields: I, excluded_field: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let values = fields
            .into_iter()
            .filter(|(name, value)| *name != excluded_field && !value.is_empty())
            .map(|(_, value)| value.to_string())
            .collect();

        Self { values }
    }

    pub fn from_values(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode as a URL-encoded JSON array
    pub fn encode(&self) -> String {
        // Serializing a Vec<String> cannot fail
        let json = serde_json::to_string(&self.values).unwrap_or_else(|_| "[]".to_string());
        urlencoding::encode(&json).into_owned()
    }

    /// Decode a value produced by [`FormSnapshot::encode`]
    pub fn decode(encoded: &str) -> Result<Self, WidgetError> {
        let json = urlencoding::decode(encoded)
            .map_err(|e| WidgetError::MalformedSnapshot(format!("Invalid encoding: {}", e)))?;

        let values: Vec<String> = serde_json::from_str(&json)
            .map_err(|e| WidgetError::MalformedSnapshot(format!("Invalid JSON: {}", e)))?;

        Ok(Self { values })
    }
}
