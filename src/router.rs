use anyhow::Result;

use crate::store::Storage;
use crate::store::schema::UserProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Learners,
    Drivers,
    Chatbot,
    Progress,
    Profile,
}

impl View {
    /// Sidebar order.
    pub const ALL: [View; 6] = [
        View::Dashboard,
        View::Learners,
        View::Drivers,
        View::Progress,
        View::Chatbot,
        View::Profile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Learners => "Learner's Test",
            View::Drivers => "Driver's Simulator",
            View::Chatbot => "AI Tutor",
            View::Progress => "Progress Reports",
            View::Profile => "Profile",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|&v| v == self).unwrap_or(0)
    }

    pub fn next(self) -> View {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        let pos = self.position();
        Self::ALL[if pos == 0 { Self::ALL.len() - 1 } else { pos - 1 }]
    }

    /// `1`..`6` in sidebar order.
    pub fn from_digit(ch: char) -> Option<View> {
        let idx = ch.to_digit(10)? as usize;
        if idx == 0 {
            return None;
        }
        Self::ALL.get(idx - 1).copied()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Please enter your name to continue.")]
    BlankName,
    #[error("Could not save your profile: {0}")]
    Storage(String),
}

/// Which screen is showing and whether someone is signed in. Navigation has
/// no guards; the login screen is drawn whenever `authenticated` is false.
#[derive(Debug)]
pub struct Router {
    authenticated: bool,
    current: View,
}

impl Router {
    /// Derive the starting state from storage. A malformed record reads as
    /// absent (the store purges it).
    pub fn from_store(store: &dyn Storage) -> (Self, Option<UserProfile>) {
        let profile = store.load_profile();
        let router = Self {
            authenticated: profile.is_some(),
            current: View::Dashboard,
        };
        (router, profile)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn login(&mut self, store: &dyn Storage, name: &str) -> Result<UserProfile, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::BlankName);
        }
        let profile = UserProfile::new(name);
        store
            .save_profile(&profile)
            .map_err(|err| ProfileError::Storage(err.to_string()))?;
        tracing::info!(name, "logged in");
        self.authenticated = true;
        Ok(profile)
    }

    /// Always signs out locally; the error reports a profile that could not
    /// be removed from storage.
    pub fn logout(&mut self, store: &dyn Storage) -> Result<()> {
        self.authenticated = false;
        self.current = View::Dashboard;
        tracing::info!("logged out");
        store.clear_profile()
    }

    pub fn navigate(&mut self, view: View) {
        if view != self.current {
            tracing::debug!(from = ?self.current, to = ?view, "navigate");
        }
        self.current = view;
    }
}
