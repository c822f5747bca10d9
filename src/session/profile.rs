use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;

use crate::store::schema::ProfileUpdate;

pub const SAVED_MESSAGE: &str = "Profile saved successfully!";
pub const MAX_PICTURE_BYTES: u64 = 2 * 1024 * 1024;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum ProfileFormError {
    #[error("Name cannot be empty.")]
    BlankName,
    #[error("Target date must be in YYYY-MM-DD format.")]
    BadDate,
    #[error("Unsupported picture type; use a PNG, JPEG, GIF or WebP file.")]
    UnsupportedImage,
    #[error("Picture is larger than 2 MB.")]
    PictureTooLarge,
    #[error("Could not read picture: {0}")]
    Io(#[from] std::io::Error),
}

pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    image_mime(path).is_some()
}

/// Empty input clears the date. Anything else must be a real calendar day.
pub fn parse_target_date(text: &str) -> Result<Option<String>, ProfileFormError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| ProfileFormError::BadDate)?;
    Ok(Some(date.format(DATE_FORMAT).to_string()))
}

/// Whole days from `today` to the stored target date; negative once it has
/// passed. None when the stored value is not a date.
pub fn days_until(target: &str, today: NaiveDate) -> Option<i64> {
    let date = NaiveDate::parse_from_str(target, DATE_FORMAT).ok()?;
    Some(date.signed_duration_since(today).num_days())
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Read an image file into a `data:<mime>;base64,...` URL.
pub fn picture_data_url(path: &Path) -> Result<String, ProfileFormError> {
    let mime = image_mime(path).ok_or(ProfileFormError::UnsupportedImage)?;
    if fs::metadata(path)?.len() > MAX_PICTURE_BYTES {
        return Err(ProfileFormError::PictureTooLarge);
    }
    let bytes = fs::read(path)?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// The editor's field values at the moment the user saves.
#[derive(Debug, Default)]
pub struct ProfileDraft<'a> {
    pub name: &'a str,
    pub target_date: &'a str,
    /// Blank keeps the current picture.
    pub picture_path: &'a str,
    pub remove_picture: bool,
}

impl ProfileDraft<'_> {
    pub fn to_update(&self) -> Result<ProfileUpdate, ProfileFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProfileFormError::BlankName);
        }
        let target_date = parse_target_date(self.target_date)?;

        let profile_picture = if self.remove_picture {
            Some(None)
        } else if self.picture_path.trim().is_empty() {
            None
        } else {
            let path = expand_home(self.picture_path.trim());
            Some(Some(picture_data_url(&path)?))
        };

        Ok(ProfileUpdate {
            name: Some(name.to_string()),
            target_date: Some(target_date),
            progress: None,
            profile_picture,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_by_extension() {
        assert_eq!(image_mime(Path::new("me.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("a/b.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("x.webp")), Some("image/webp"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("noext")), None);
    }

    #[test]
    fn test_parse_target_date() {
        assert_eq!(parse_target_date("  ").unwrap(), None);
        assert_eq!(
            parse_target_date(" 2026-12-15 ").unwrap(),
            Some("2026-12-15".to_string())
        );
        assert!(matches!(parse_target_date("15/12/2026"), Err(ProfileFormError::BadDate)));
        assert!(matches!(parse_target_date("2026-02-30"), Err(ProfileFormError::BadDate)));
    }

    #[test]
    fn test_days_until() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(days_until("2026-10-29", today), Some(10));
        assert_eq!(days_until("2026-10-19", today), Some(0));
        assert_eq!(days_until("2026-10-18", today), Some(-1));
        assert_eq!(days_until("soon", today), None);
    }

    #[test]
    fn test_picture_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(picture_data_url(&path).unwrap(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_picture_errors() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("face.txt");
        fs::write(&txt, "hi").unwrap();
        assert!(matches!(picture_data_url(&txt), Err(ProfileFormError::UnsupportedImage)));

        let missing = dir.path().join("missing.png");
        assert!(matches!(picture_data_url(&missing), Err(ProfileFormError::Io(_))));

        let big = dir.path().join("big.gif");
        fs::write(&big, vec![0u8; MAX_PICTURE_BYTES as usize + 1]).unwrap();
        assert!(matches!(picture_data_url(&big), Err(ProfileFormError::PictureTooLarge)));
    }

    #[test]
    fn test_draft_name_only_leaves_picture_alone() {
        let draft = ProfileDraft {
            name: " Naledi ",
            target_date: "2026-12-15",
            ..ProfileDraft::default()
        };
        let update = draft.to_update().unwrap();
        assert_eq!(update.name.as_deref(), Some("Naledi"));
        assert_eq!(update.target_date, Some(Some("2026-12-15".to_string())));
        assert_eq!(update.profile_picture, None);
        assert_eq!(update.progress, None);
    }

    #[test]
    fn test_draft_remove_picture_and_blank_name() {
        let draft = ProfileDraft {
            name: "A",
            remove_picture: true,
            ..ProfileDraft::default()
        };
        assert_eq!(draft.to_update().unwrap().profile_picture, Some(None));

        let blank = ProfileDraft {
            name: "  ",
            ..ProfileDraft::default()
        };
        assert!(matches!(blank.to_update(), Err(ProfileFormError::BlankName)));
    }
}
