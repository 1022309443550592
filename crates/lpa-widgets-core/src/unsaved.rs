//! Unsaved-changes detection
//!
//! Compares the live form against the snapshot taken at load and against the
//! snapshot the previous page wrote to the change cookie on submit. The second
//! comparison catches the re-render after a validation error, where the load
//! snapshot already contains the user's unsaved values.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::CookieConfig;
use crate::error::WidgetError;
use crate::snapshot::FormSnapshot;
use crate::storage::TransientStore;

/// Outcome of a click on the leave trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Let the navigation happen
    Proceed,
    /// Prevent the navigation and show the warning dialog
    Intercept,
}

#[derive(Debug, Clone)]
pub struct ChangeDetector {
    at_load: FormSnapshot,
    from_cookie: Option<FormSnapshot>,
    cookie_name: String,
    cookie_ttl: Duration,
}

impl ChangeDetector {
    /// Capture load state and read any snapshot left by the previous page
    ///
    /// An unreadable cookie is treated as absent.
    pub fn init<S>(at_load: FormSnapshot, store: &S, cookie: &CookieConfig) -> Self
    where
        S: TransientStore + ?Sized,
    {
        let from_cookie = store
            .get(&cookie.name)
            .and_then(|raw| match FormSnapshot::decode(&raw) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable change cookie");
                    None
                }
            });

        debug!(
            load_values = at_load.values().len(),
            has_cookie = from_cookie.is_some(),
            "change detector initialised"
        );

        Self {
            at_load,
            from_cookie,
            cookie_name: cookie.name.clone(),
            cookie_ttl: cookie.max_age(),
        }
    }

    pub fn snapshot_at_load(&self) -> &FormSnapshot {
        &self.at_load
    }

    pub fn snapshot_from_cookie(&self) -> Option<&FormSnapshot> {
        self.from_cookie.as_ref()
    }

    /// True if `now` differs from the load snapshot or matches the pre-submit one
    pub fn changes_made(&self, now: &FormSnapshot) -> bool {
        *now != self.at_load || self.from_cookie.as_ref() == Some(now)
    }

    pub fn form_empty(now: &FormSnapshot) -> bool {
        now.is_empty()
    }

    pub fn on_leave(&self, now: &FormSnapshot) -> LeaveDecision {
        if self.changes_made(now) && !Self::form_empty(now) {
            LeaveDecision::Intercept
        } else {
            LeaveDecision::Proceed
        }
    }

    /// Record `now` so the next page load can compare against it
    pub fn add_form_values_to_cookie<S>(
        &self,
        now: &FormSnapshot,
        store: &mut S,
    ) -> Result<(), WidgetError>
    where
        S: TransientStore + ?Sized,
    {
        store.set(&self.cookie_name, &now.encode(), self.cookie_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn snapshot(values: &[&str]) -> FormSnapshot {
        FormSnapshot::from_values(values.iter().map(|v| v.to_string()).collect())
    }

    fn detector(at_load: FormSnapshot, store: &MemoryStore) -> ChangeDetector {
        ChangeDetector::init(at_load, store, &CookieConfig::default())
    }

    #[test]
    fn test_untouched_form_has_no_changes() {
        let store = MemoryStore::new();
        let d = detector(snapshot(&["Jane"]), &store);
        assert!(!d.changes_made(&snapshot(&["Jane"])));
        assert_eq!(d.on_leave(&snapshot(&["Jane"])), LeaveDecision::Proceed);
    }

    #[test]
    fn test_typing_into_blank_field_is_a_change() {
        let store = MemoryStore::new();
        let d = detector(FormSnapshot::default(), &store);
        let now = snapshot(&["John"]);

        assert!(d.changes_made(&now));
        assert!(!ChangeDetector::form_empty(&now));
        assert_eq!(d.on_leave(&now), LeaveDecision::Intercept);
    }

    #[test]
    fn test_empty_form_never_intercepts() {
        let store = MemoryStore::new();
        let d = detector(snapshot(&["Jane"]), &store);
        let cleared = FormSnapshot::default();

        assert!(d.changes_made(&cleared));
        assert!(ChangeDetector::form_empty(&cleared));
        assert_eq!(d.on_leave(&cleared), LeaveDecision::Proceed);
    }

    #[test]
    fn test_cookie_round_trip_after_validation_error() {
        let mut store = MemoryStore::new();
        let submitted = snapshot(&["John", "Smith"]);

        let first_page = detector(FormSnapshot::default(), &store);
        first_page
            .add_form_values_to_cookie(&submitted, &mut store)
            .unwrap();

        // Server re-renders the same values after a validation error
        let second_page = detector(submitted.clone(), &store);
        assert_eq!(second_page.snapshot_from_cookie(), Some(&submitted));
        assert_eq!(second_page.snapshot_at_load(), &submitted);
        assert!(second_page.changes_made(&submitted));
        assert_eq!(second_page.on_leave(&submitted), LeaveDecision::Intercept);
    }

    #[test]
    fn test_saved_page_after_cookie_expiry_has_no_changes() {
        let mut store = MemoryStore::new();
        let submitted = snapshot(&["John"]);

        detector(FormSnapshot::default(), &store)
            .add_form_values_to_cookie(&submitted, &mut store)
            .unwrap();
        store.advance(Duration::from_secs(11));

        let later = detector(submitted.clone(), &store);
        assert_eq!(later.snapshot_from_cookie(), None);
        assert!(!later.changes_made(&submitted));
    }

    #[test]
    fn test_cookie_from_other_form_does_not_flag_untouched_page() {
        let mut store = MemoryStore::new();
        detector(FormSnapshot::default(), &store)
            .add_form_values_to_cookie(&snapshot(&["other"]), &mut store)
            .unwrap();

        let d = detector(snapshot(&["Jane"]), &store);
        assert!(!d.changes_made(&snapshot(&["Jane"])));
    }

    #[test]
    fn test_unreadable_cookie_is_ignored() {
        let mut store = MemoryStore::new();
        store
            .set("formValues", "%7Bbroken", Duration::from_secs(10))
            .unwrap();

        let d = detector(snapshot(&["Jane"]), &store);
        assert_eq!(d.snapshot_from_cookie(), None);
    }

    #[test]
    fn test_cookie_uses_configured_name_and_ttl() {
        let mut store = MemoryStore::new();
        let config = CookieConfig {
            name: "draft".into(),
            max_age_secs: 2,
            ..CookieConfig::default()
        };
        let d = ChangeDetector::init(FormSnapshot::default(), &store, &config);
        d.add_form_values_to_cookie(&snapshot(&["x"]), &mut store)
            .unwrap();

        assert!(store.get("draft").is_some());
        assert!(store.get("formValues").is_none());
        store.advance(Duration::from_secs(2));
        assert!(store.get("draft").is_none());
    }
}
