use std::sync::Arc;

use serde_json::Value;

use crate::{
    db::{KeyValueStore, StoreKey},
    error::{AppError, AppResult},
    models::{Item, ItemId, PreferenceProfile},
};

/// Loads and persists preference profiles, one key per session
///
/// Every mutation is a read-modify-write of the whole profile. Two writers
/// racing on the same session resolve as last-save-wins.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    fn key(session: &str) -> AppResult<StoreKey> {
        let session = session.trim();
        if session.is_empty() {
            return Err(AppError::InvalidInput("Session id cannot be empty".to_string()));
        }
        Ok(StoreKey::Preferences(session.to_string()))
    }

    /// Returns the stored profile, or an empty one when nothing usable is stored
    pub async fn load(&self, session: &str) -> PreferenceProfile {
        let key = match Self::key(session) {
            Ok(key) => key,
            Err(_) => return PreferenceProfile::new(),
        };

        let raw = match self.backend.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return PreferenceProfile::new(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    key = %key,
                    backend = self.backend.name(),
                    "Preference load failed, using empty profile"
                );
                return PreferenceProfile::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(doc) => PreferenceProfile::from_document(&doc),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Stored preferences are corrupt, using empty profile");
                PreferenceProfile::new()
            }
        }
    }

    /// Persists `profile` as one whole-object replace
    pub async fn save(&self, session: &str, profile: &PreferenceProfile) -> AppResult<()> {
        let key = Self::key(session)?;
        let json = serde_json::to_string(profile)
            .map_err(|e| AppError::Internal(format!("Preference serialization error: {}", e)))?;

        self.backend.put(&key, json).await.map_err(|e| {
            tracing::error!(error = %e, key = %key, "Failed to save preferences");
            match e {
                AppError::Persistence(_) => e,
                other => AppError::Persistence(other.to_string()),
            }
        })?;

        tracing::debug!(
            key = %key,
            tags = profile.favorite_tags.len(),
            items = profile.favorite_items.len(),
            "Saved preferences"
        );
        Ok(())
    }

    async fn update<F>(&self, session: &str, change: F) -> AppResult<PreferenceProfile>
    where
        F: FnOnce(&mut PreferenceProfile),
    {
        Self::key(session)?;
        let mut profile = self.load(session).await;
        change(&mut profile);
        self.save(session, &profile).await?;
        Ok(profile)
    }

    pub async fn add_tag(&self, session: &str, tag: &str) -> AppResult<PreferenceProfile> {
        if tag.trim().is_empty() {
            return Err(AppError::InvalidInput("Tag cannot be empty".to_string()));
        }
        self.update(session, |p| {
            p.add_tag(tag);
        })
        .await
    }

    pub async fn remove_tag(&self, session: &str, tag: &str) -> AppResult<PreferenceProfile> {
        self.update(session, |p| {
            p.remove_tag(tag);
        })
        .await
    }

    pub async fn add_item(&self, session: &str, item: Item) -> AppResult<PreferenceProfile> {
        if item.id.as_str().trim().is_empty() {
            return Err(AppError::InvalidInput("Item id cannot be empty".to_string()));
        }
        self.update(session, |p| {
            p.add_item(item);
        })
        .await
    }

    pub async fn remove_item(&self, session: &str, id: &ItemId) -> AppResult<PreferenceProfile> {
        self.update(session, |p| {
            p.remove_item(id);
        })
        .await
    }

    pub async fn clear(&self, session: &str) -> AppResult<PreferenceProfile> {
        self.update(session, PreferenceProfile::clear).await
    }

    pub async fn clear_tags(&self, session: &str) -> AppResult<PreferenceProfile> {
        self.update(session, PreferenceProfile::clear_tags).await
    }
}
