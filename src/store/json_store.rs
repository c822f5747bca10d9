use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::store::Storage;
use crate::store::schema::{FeedbackEntry, UserProfile};

const PROFILE_FILE: &str = "profile.json";
const FEEDBACK_FILE: &str = "feedback.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn save<T: Serialize + ?Sized>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl Storage for JsonStore {
    /// Returns None when no profile exists. A file that cannot be parsed is
    /// deleted so the next start goes straight to login.
    fn load_profile(&self) -> Option<UserProfile> {
        let path = self.file_path(PROFILE_FILE);
        let parsed = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(anyhow::Error::from),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => Err(err.into()),
        };
        match parsed {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable profile");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.save(PROFILE_FILE, profile)
    }

    fn clear_profile(&self) -> Result<()> {
        let path = self.file_path(PROFILE_FILE);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn load_feedback(&self) -> Vec<FeedbackEntry> {
        fs::read_to_string(self.file_path(FEEDBACK_FILE))
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn save_feedback(&self, entries: &[FeedbackEntry]) -> Result<()> {
        self.save(FEEDBACK_FILE, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_profile_is_none() {
        let (_dir, store) = make_test_store();
        assert!(store.load_profile().is_none());
    }

    #[test]
    fn test_profile_save_then_load() {
        let (_dir, store) = make_test_store();
        let mut profile = UserProfile::new("Lerato");
        profile.target_date = Some("2026-11-30".to_string());
        store.save_profile(&profile).unwrap();
        assert_eq!(store.load_profile(), Some(profile));
        assert!(!store.file_path("profile.tmp").exists());
    }

    #[test]
    fn test_malformed_profile_is_purged() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROFILE_FILE), "{not json").unwrap();
        assert!(store.load_profile().is_none());
        assert!(!store.file_path(PROFILE_FILE).exists());
    }

    #[test]
    fn test_non_utf8_profile_is_purged() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROFILE_FILE), [0xff, 0xfe, b'{']).unwrap();
        assert!(store.load_profile().is_none());
        assert!(!store.file_path(PROFILE_FILE).exists());
    }

    #[test]
    fn test_clear_profile_removes_file() {
        let (_dir, store) = make_test_store();
        store.save_profile(&UserProfile::new("A")).unwrap();
        store.clear_profile().unwrap();
        assert!(!store.file_path(PROFILE_FILE).exists());
        // Clearing twice is fine
        store.clear_profile().unwrap();
    }

    #[test]
    fn test_unreadable_feedback_reads_as_empty() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(FEEDBACK_FILE), "[{]").unwrap();
        assert!(store.load_feedback().is_empty());
    }

    #[test]
    fn test_feedback_written_as_list() {
        let (_dir, store) = make_test_store();
        let entries = vec![FeedbackEntry {
            text: "love the chart".to_string(),
            timestamp: Utc::now(),
        }];
        store.save_feedback(&entries).unwrap();
        assert_eq!(store.load_feedback(), entries);
        let raw = fs::read_to_string(store.file_path(FEEDBACK_FILE)).unwrap();
        assert!(raw.trim_start().starts_with('['));
    }
}
