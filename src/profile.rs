// src/profile.rs
//! Named profile persistence and the autosaved working draft.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::types::{Resume, ResumeFields};
use crate::utils::normalize_profile_name;

pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Stores named resumes as JSON files under a profiles directory.
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn profile_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", normalize_profile_name(name)))
    }

    pub async fn save(&self, name: &str, resume: &Resume) -> Result<()> {
        if name.trim().is_empty() {
            anyhow::bail!("Profile name cannot be empty");
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.profile_path(name);
        let json = serde_json::to_string_pretty(resume).context("Failed to serialize profile")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write profile: {}", path.display()))?;

        info!("Saved profile '{}' to {}", name, path.display());
        Ok(())
    }

    pub async fn load(&self, name: &str) -> Result<Resume> {
        let path = self.profile_path(name);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Profile not found: {}", name))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Malformed profile file: {}", path.display()))
    }

    /// Normalized profile names, sorted.
    pub async fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to read directory: {}", self.dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.profile_path(name);
        if !path.exists() {
            anyhow::bail!("Profile not found: {}", name);
        }

        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete profile: {}", path.display()))?;

        info!("Deleted profile '{}'", name);
        Ok(())
    }

    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::metadata(self.profile_path(name)).await.is_ok()
    }
}

/// The working resume: section fields plus the selected template, stamped
/// on each flush.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub fields: ResumeFields,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

/// In-memory working copy of the current resume, flushed to disk on a
/// fixed interval so an interrupted session loses at most one cycle.
pub struct DraftStore {
    path: PathBuf,
    current: RwLock<Draft>,
    dirty: AtomicBool,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(Draft::default()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Load a previously saved draft, keeping the default on any failure.
    pub async fn restore(&self) -> Result<bool> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str::<Draft>(&content) {
                Ok(draft) => {
                    *self.current.write().await = draft;
                    info!("Restored draft from {}", self.path.display());
                    Ok(true)
                }
                Err(e) => {
                    warn!("Ignoring malformed draft file {}: {}", self.path.display(), e);
                    Ok(false)
                }
            },
            Err(_) => Ok(false),
        }
    }

    pub async fn get(&self) -> Draft {
        self.current.read().await.clone()
    }

    pub async fn set(&self, mut draft: Draft) {
        draft.saved_at = None;
        *self.current.write().await = draft;
        self.dirty.store(true, Ordering::Release);
    }

    /// Write the draft to disk if it changed since the last flush.
    pub async fn flush(&self) -> Result<bool> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        let snapshot = {
            let mut current = self.current.write().await;
            current.saved_at = Some(Utc::now());
            current.clone()
        };
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize draft")?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write draft: {}", self.path.display()))?;

        debug!("Autosaved draft to {}", self.path.display());
        Ok(true)
    }
}

/// Background task flushing the draft every [`AUTOSAVE_INTERVAL`].
pub fn spawn_autosave(store: Arc<DraftStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(AUTOSAVE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = store.flush().await {
                error!("Draft autosave failed: {}", e);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resume() -> Resume {
        let mut resume = Resume::default();
        resume.first_name = "Jane".to_string();
        resume.last_name = "Doe".to_string();
        resume.email = "jane@example.com".to_string();
        resume
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("Jane Doe", &sample_resume()).await.unwrap();
        let loaded = store.load("Jane Doe").await.unwrap();
        assert_eq!(loaded.first_name, "Jane");
        assert_eq!(loaded.email, "jane@example.com");
    }

    #[tokio::test]
    async fn test_profile_names_are_normalized_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("Marie@Company", &sample_resume()).await.unwrap();
        assert!(dir.path().join("marie_company.json").exists());
        assert!(store.exists("marie_company").await);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        store.save("zoe", &sample_resume()).await.unwrap();
        store.save("adam", &sample_resume()).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["adam", "zoe"]);
    }

    #[tokio::test]
    async fn test_delete_missing_profile_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        assert!(store.delete("nobody").await.is_err());

        store.save("jane", &sample_resume()).await.unwrap();
        store.delete("jane").await.unwrap();
        assert!(!store.exists("jane").await);
    }

    #[tokio::test]
    async fn test_empty_profile_name_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(store.save("   ", &sample_resume()).await.is_err());
    }

    fn sample_draft() -> Draft {
        Draft {
            fields: ResumeFields {
                name: "Jane Doe".to_string(),
                contact: "jane@example.com".to_string(),
                ..ResumeFields::default()
            },
            template: "modern".to_string(),
            saved_at: None,
        }
    }

    #[tokio::test]
    async fn test_draft_flush_only_when_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path().join("draft.json"));

        assert!(!store.flush().await.unwrap());

        store.set(sample_draft()).await;
        assert!(store.flush().await.unwrap());
        assert!(!store.flush().await.unwrap());
    }

    #[tokio::test]
    async fn test_draft_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");

        let store = DraftStore::new(&path);
        store.set(sample_draft()).await;
        store.flush().await.unwrap();

        let fresh = DraftStore::new(&path);
        assert!(fresh.restore().await.unwrap());
        let draft = fresh.get().await;
        assert_eq!(draft.fields.name, "Jane Doe");
        assert_eq!(draft.template, "modern");
        assert!(draft.saved_at.is_some());
    }

    #[tokio::test]
    async fn test_draft_restore_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = DraftStore::new(&path);
        assert!(!store.restore().await.unwrap());
        assert_eq!(store.get().await, Draft::default());
    }
}
