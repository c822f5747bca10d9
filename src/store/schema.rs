use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The single persisted user record. Field names are camelCase on disk so
/// records from earlier web builds still parse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub target_date: Option<String>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profile_picture: Option<String>,
}

impl UserProfile {
    /// Minimal profile created at login.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Partial update merged into the stored profile. `None` leaves the stored
/// value alone; `Some(None)` on an optional field clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub target_date: Option<Option<String>>,
    pub progress: Option<u32>,
    pub profile_picture: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(ref name) = self.name {
            profile.name = name.clone();
        }
        if let Some(ref target_date) = self.target_date {
            profile.target_date = target_date.clone();
        }
        if let Some(progress) = self.progress {
            profile.progress = progress.min(100);
        }
        if let Some(ref picture) = self.profile_picture {
            profile.profile_picture = picture.clone();
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_reads_web_format() {
        let json = r#"{"name":"Thandi","targetDate":"","progress":0,"profilePicture":null}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Thandi");
        assert_eq!(profile.target_date, None);
        assert_eq!(profile.profile_picture, None);
    }

    #[test]
    fn test_profile_missing_optional_fields() {
        let profile: UserProfile = serde_json::from_str(r#"{"name":"Sipho"}"#).unwrap();
        assert_eq!(profile, UserProfile::new("Sipho"));
    }

    #[test]
    fn test_profile_without_name_is_rejected() {
        assert!(serde_json::from_str::<UserProfile>(r#"{"progress":3}"#).is_err());
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut profile = UserProfile {
            name: "Old".to_string(),
            target_date: Some("2026-12-01".to_string()),
            progress: 40,
            profile_picture: Some("data:image/png;base64,AAAA".to_string()),
        };
        let update = ProfileUpdate {
            name: Some("New".to_string()),
            ..ProfileUpdate::default()
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.name, "New");
        assert_eq!(profile.target_date.as_deref(), Some("2026-12-01"));
        assert_eq!(profile.progress, 40);
        assert!(profile.profile_picture.is_some());
    }

    #[test]
    fn test_update_can_clear_optional_field() {
        let mut profile = UserProfile::new("A");
        profile.target_date = Some("2026-12-01".to_string());
        let update = ProfileUpdate {
            target_date: Some(None),
            ..ProfileUpdate::default()
        };
        update.apply_to(&mut profile);
        assert_eq!(profile.target_date, None);
    }
}
