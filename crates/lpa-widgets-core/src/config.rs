//! Widget configuration
//!
//! Describes the DOM anchors each widget binds to and the change cookie
//! parameters. Every section has defaults matching the markup rendered by the
//! LPA service, so pages only need to override what differs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::WidgetError;

/// Top-level configuration for all widgets on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WidgetConfig {
    /// Class that hides a dialog and its overlay
    pub hidden_class: String,
    /// Unsaved-changes warning anchors
    pub unsaved_changes: UnsavedChangesConfig,
    /// Upload progress modal anchors
    pub upload: UploadConfig,
    /// Change cookie parameters
    pub cookie: CookieConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            hidden_class: "govuk-!-display-none".to_string(),
            unsaved_changes: UnsavedChangesConfig::default(),
            upload: UploadConfig::default(),
            cookie: CookieConfig::default(),
        }
    }
}

impl WidgetConfig {
    /// Parse configuration from a JSON string, filling omitted fields with defaults
    ///
    /// # Errors
    ///
    /// Returns `WidgetError::Config` if the JSON is malformed or a value fails validation
    pub fn from_json(s: &str) -> Result<Self, WidgetError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| WidgetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make a widget unusable
    pub fn validate(&self) -> Result<(), WidgetError> {
        if self.hidden_class.trim().is_empty() {
            return Err(WidgetError::Config("hiddenClass must not be empty".into()));
        }
        if self.hidden_class.contains(char::is_whitespace) {
            return Err(WidgetError::Config(format!(
                "hiddenClass must be a single class name, got '{}'",
                self.hidden_class
            )));
        }
        let bad_name_char = |c: char| matches!(c, '=' | ';' | ',') || c.is_whitespace();
        if self.cookie.name.is_empty() || self.cookie.name.contains(bad_name_char) {
            return Err(WidgetError::Config(format!(
                "invalid cookie name '{}'",
                self.cookie.name
            )));
        }
        if self.cookie.max_age_secs == 0 {
            return Err(WidgetError::Config("cookie maxAgeSecs must be positive".into()));
        }
        Ok(())
    }
}

/// Anchors for the unsaved-changes warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnsavedChangesConfig {
    /// Link that leaves the page ("Return to task list")
    pub trigger_id: String,
    pub dialog_id: String,
    pub overlay_id: String,
    /// Button that closes the dialog and stays on the page
    pub back_to_page_id: String,
    /// Link inside the dialog that leaves without saving
    pub continue_id: String,
    /// Name of the anti-forgery field left out of snapshots
    pub csrf_field: String,
}

impl Default for UnsavedChangesConfig {
    fn default() -> Self {
        Self {
            trigger_id: "return-to-task-list-button".to_string(),
            dialog_id: "unsaved-changes-dialog".to_string(),
            overlay_id: "unsaved-changes-dialog-overlay".to_string(),
            back_to_page_id: "back-to-page-dialog-btn".to_string(),
            continue_id: "return-to-tasklist-dialog-btn".to_string(),
            csrf_field: "csrf".to_string(),
        }
    }
}

/// Anchors for the upload progress modal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadConfig {
    /// Element that regains focus when the dialog closes
    pub trigger_id: String,
    pub dialog_id: String,
    pub overlay_id: String,
    pub cancel_button_id: String,
    pub counter_id: String,
    pub scan_results_form_id: String,
    pub close_connection_form_id: String,
    pub cancel_upload_form_id: String,
    /// Dialog attribute holding the event stream URL
    pub stream_url_attr: String,
    /// Dialog attribute set when a scan is already running on load
    pub start_scan_attr: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            trigger_id: "upload-files-btn".to_string(),
            dialog_id: "dialog".to_string(),
            overlay_id: "dialog-overlay".to_string(),
            cancel_button_id: "cancel-upload-button".to_string(),
            counter_id: "file-count".to_string(),
            scan_results_form_id: "scan-results-form".to_string(),
            close_connection_form_id: "close-connection-form".to_string(),
            cancel_upload_form_id: "cancel-upload-form".to_string(),
            stream_url_attr: "data-sse-url".to_string(),
            start_scan_attr: "data-start-scan".to_string(),
        }
    }
}

/// SameSite policy written into the change cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Change cookie parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieConfig {
    pub name: String,
    pub max_age_secs: u64,
    pub same_site: SameSite,
    pub secure: bool,
    /// Empty scopes the cookie to the path of the page that set it
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "formValues".to_string(),
            max_age_secs: 10,
            same_site: SameSite::Lax,
            secure: true,
            path: String::new(),
        }
    }
}

impl CookieConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_service_markup() {
        let config = WidgetConfig::default();
        assert_eq!(config.hidden_class, "govuk-!-display-none");
        assert_eq!(config.upload.dialog_id, "dialog");
        assert_eq!(config.upload.overlay_id, "dialog-overlay");
        assert_eq!(config.upload.counter_id, "file-count");
        assert_eq!(config.cookie.name, "formValues");
        assert_eq!(config.cookie.max_age(), Duration::from_secs(10));
        assert!(config.cookie.path.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WidgetConfig::from_json(
            r#"{ "upload": { "counterId": "scan-count" }, "cookie": { "maxAgeSecs": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.upload.counter_id, "scan-count");
        assert_eq!(config.upload.dialog_id, "dialog");
        assert_eq!(config.cookie.max_age_secs, 5);
        assert_eq!(config.cookie.name, "formValues");
        assert_eq!(config.unsaved_changes, UnsavedChangesConfig::default());
    }

    #[test]
    fn test_same_site_parses_by_variant_name() {
        let config = WidgetConfig::from_json(r#"{ "cookie": { "sameSite": "Strict" } }"#).unwrap();
        assert_eq!(config.cookie.same_site, SameSite::Strict);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = WidgetConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, WidgetError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_cookie_name() {
        let err = WidgetConfig::from_json(r#"{ "cookie": { "name": "a=b" } }"#).unwrap_err();
        assert!(err.to_string().contains("invalid cookie name"));
    }

    #[test]
    fn test_rejects_zero_max_age() {
        let result = WidgetConfig::from_json(r#"{ "cookie": { "maxAgeSecs": 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_multi_word_hidden_class() {
        let result = WidgetConfig::from_json(r#"{ "hiddenClass": "hidden  other" }"#);
        assert!(result.is_err());
    }
}
