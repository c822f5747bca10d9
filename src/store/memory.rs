use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::store::Storage;
use crate::store::schema::{FeedbackEntry, UserProfile};

#[derive(Default)]
struct MemoryInner {
    profile: Option<String>,
    feedback: Option<String>,
    fail_writes: bool,
}

/// In-memory `Storage` that keeps records as raw JSON, so parse failures
/// behave exactly as they do on disk. Clones share the same records, which
/// lets a test "restart" the app against the same storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn set_raw_profile(&self, json: &str) {
        self.inner.borrow_mut().profile = Some(json.to_string());
    }

    pub fn set_raw_feedback(&self, json: &str) {
        self.inner.borrow_mut().feedback = Some(json.to_string());
    }

    pub fn has_profile(&self) -> bool {
        self.inner.borrow().profile.is_some()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if self.inner.borrow().fail_writes {
            bail!("storage is read-only");
        }
        Ok(())
    }
}

impl Storage for MemoryStore {
    fn load_profile(&self) -> Option<UserProfile> {
        let raw = self.inner.borrow().profile.clone()?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(_) => {
                self.inner.borrow_mut().profile = None;
                None
            }
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.check_writable()?;
        self.inner.borrow_mut().profile = Some(serde_json::to_string(profile)?);
        Ok(())
    }

    fn clear_profile(&self) -> Result<()> {
        self.check_writable()?;
        self.inner.borrow_mut().profile = None;
        Ok(())
    }

    fn load_feedback(&self) -> Vec<FeedbackEntry> {
        self.inner
            .borrow()
            .feedback
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    fn save_feedback(&self, entries: &[FeedbackEntry]) -> Result<()> {
        self.check_writable()?;
        self.inner.borrow_mut().feedback = Some(serde_json::to_string(entries)?);
        Ok(())
    }
}
