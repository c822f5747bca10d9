pub mod json_store;
pub mod memory;
pub mod schema;

use anyhow::Result;
use chrono::Utc;

use crate::store::schema::{FeedbackEntry, ProfileUpdate, UserProfile};

/// Typed persistence for the profile record and the feedback list.
pub trait Storage {
    /// None when absent. Implementations purge records that fail to parse.
    fn load_profile(&self) -> Option<UserProfile>;
    fn save_profile(&self, profile: &UserProfile) -> Result<()>;
    fn clear_profile(&self) -> Result<()>;
    /// Unparsable content reads as an empty list.
    fn load_feedback(&self) -> Vec<FeedbackEntry>;
    fn save_feedback(&self, entries: &[FeedbackEntry]) -> Result<()>;
}

/// Merge `update` into whatever is stored and write the result back.
pub fn save_profile(store: &dyn Storage, update: &ProfileUpdate) -> Result<UserProfile> {
    let mut profile = store.load_profile().unwrap_or_default();
    update.apply_to(&mut profile);
    store.save_profile(&profile)?;
    Ok(profile)
}

/// Append a feedback entry. Failures are logged and reported as `false`.
pub fn submit_feedback(store: &dyn Storage, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let mut entries = store.load_feedback();
    entries.push(FeedbackEntry {
        text: text.to_string(),
        timestamp: Utc::now(),
    });
    match store.save_feedback(&entries) {
        Ok(()) => {
            tracing::info!(count = entries.len(), "feedback saved");
            true
        }
        Err(err) => {
            tracing::error!(%err, "failed to save feedback");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn test_save_profile_name_only_preserves_other_fields() {
        let store = MemoryStore::default();
        let original = UserProfile {
            name: "Naledi".to_string(),
            target_date: Some("2026-12-15".to_string()),
            progress: 70,
            profile_picture: Some("data:image/png;base64,iVBORw0K".to_string()),
        };
        store.save_profile(&original).unwrap();

        let update = ProfileUpdate {
            name: Some("Naledi M".to_string()),
            ..ProfileUpdate::default()
        };
        let merged = save_profile(&store, &update).unwrap();

        assert_eq!(merged.name, "Naledi M");
        assert_eq!(merged.target_date, original.target_date);
        assert_eq!(merged.profile_picture, original.profile_picture);
        assert_eq!(merged.progress, 70);
        assert_eq!(store.load_profile(), Some(merged));
    }

    #[test]
    fn test_save_profile_without_stored_record_starts_from_default() {
        let store = MemoryStore::default();
        let update = ProfileUpdate {
            name: Some("Ayanda".to_string()),
            progress: Some(30),
            ..ProfileUpdate::default()
        };
        let merged = save_profile(&store, &update).unwrap();
        assert_eq!(merged.name, "Ayanda");
        assert_eq!(merged.progress, 30);
        assert_eq!(merged.target_date, None);
    }

    #[test]
    fn test_submit_feedback_appends() {
        let store = MemoryStore::default();
        assert!(submit_feedback(&store, "first"));
        assert!(submit_feedback(&store, "  second  "));
        let entries = store.load_feedback();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "first");
        assert_eq!(entries[1].text, "second");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_submit_blank_feedback_rejected() {
        let store = MemoryStore::default();
        assert!(!submit_feedback(&store, "   "));
        assert!(store.load_feedback().is_empty());
    }

    #[test]
    fn test_submit_feedback_reports_write_failure() {
        let store = MemoryStore::default();
        store.fail_writes(true);
        assert!(!submit_feedback(&store, "will not stick"));
        store.fail_writes(false);
        assert!(store.load_feedback().is_empty());
    }

    #[test]
    fn test_submit_feedback_over_corrupt_list_starts_fresh() {
        let store = MemoryStore::default();
        store.set_raw_feedback("not a list");
        assert!(submit_feedback(&store, "hello"));
        assert_eq!(store.load_feedback().len(), 1);
    }
}
