//! Profile records and the JSON profile store.
//!
//! The store is written once per ingestion run as a JSON array of
//! `{"url": ..., "text": ...}` objects and read back wholesale at query time.
//! Extra fields written by other tools (keywords, embeddings) are ignored on
//! load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// One lawyer biography page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub url: String,

    /// Visible page text; `None` when the page was blocked or failed.
    #[serde(default)]
    pub text: Option<String>,
}

impl Profile {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Some(text.into()),
        }
    }

    /// A profile whose text could not be obtained.
    pub fn without_text(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
        }
    }

    /// Text, if present and not blank.
    pub fn usable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Ordered collection of profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, profile: Profile) {
        self.profiles.push(profile);
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Profile> {
        self.profiles.iter()
    }

    /// Read a store previously written by [`ProfileStore::save`].
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profiles: Vec<Profile> =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), count = profiles.len(), "Loaded profile store");
        Ok(Self { profiles })
    }

    /// Write the store as a compact JSON array, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string(&self.profiles).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), count = self.profiles.len(), "Saved profile store");
        Ok(())
    }
}

impl From<Vec<Profile>> for ProfileStore {
    fn from(profiles: Vec<Profile>) -> Self {
        Self { profiles }
    }
}

impl FromIterator<Profile> for ProfileStore {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ProfileStore {
    type Item = &'a Profile;
    type IntoIter = std::slice::Iter<'a, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.iter()
    }
}

/// Read the profile URL list.
///
/// Accepts one URL per line or a CSV whose first column is the URL.
pub fn read_url_list(path: impl AsRef<Path>) -> StoreResult<Vec<String>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_url_list(&contents))
}

/// Parse URL list contents: first CSV column of each line, trimmed.
/// Blank lines are skipped.
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| {
            let first = line.split(',').next().unwrap_or_default();
            let url = first.trim().trim_matches('"').trim();
            (!url.is_empty()).then(|| url.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_text() {
        assert_eq!(Profile::new("u", "text").usable_text(), Some("text"));
        assert_eq!(Profile::new("u", "  \n ").usable_text(), None);
        assert_eq!(Profile::without_text("u").usable_text(), None);
    }

    #[test]
    fn test_parse_url_list_plain_and_csv() {
        let contents = "https://a.com/lawyers/one\r\n\n  https://a.com/lawyers/two  \n\"https://a.com/lawyers/three\",Three\n";
        assert_eq!(
            parse_url_list(contents),
            vec![
                "https://a.com/lawyers/one",
                "https://a.com/lawyers/two",
                "https://a.com/lawyers/three",
            ]
        );
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");

        let store: ProfileStore = vec![
            Profile::new("https://a.com/b", "Bea"),
            Profile::new("https://a.com/a", "Abe"),
            Profile::without_text("https://a.com/c"),
        ]
        .into();
        store.save(&path).unwrap();

        let loaded = ProfileStore::load(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_load_ignores_enrichment_fields_and_missing_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        fs::write(
            &path,
            r#"[{"url":"https://a.com/x","text":"Tax partner","keywords":["tax"]},{"url":"https://a.com/y"}]"#,
        )
        .unwrap();

        let loaded = ProfileStore::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.profiles()[0].usable_text(), Some("Tax partner"));
        assert_eq!(loaded.profiles()[1].text, None);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProfileStore::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();

        let err = ProfileStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
