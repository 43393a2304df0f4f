//! # User collection
//!
//! Accounts are kept as one JSON document collection on disk,
//! `<data_dir>/users.json`, loaded once at startup and rewritten after every
//! change. The whole collection lives in memory behind a lock; the file is
//! only the durable copy.
//!
//! Writes go to a sibling temp file first and are renamed into place so a
//! crash never leaves a half-written collection.
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("An account with this email already exists.")]
    DuplicateEmail,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt user collection: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Stored form of an account, password hash included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl UserDocument {
    pub fn new(full_name: &str, email: &str, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            full_name: full_name.trim().to_string(),
            email: normalize_email(email),
            password: password_hash,
            created_at: Utc::now(),
        }
    }

    /// Everything but the password.
    pub fn public(&self) -> User {
        User {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            created_at: Some(self.created_at),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserStore {
    path: PathBuf,
    users: RwLock<Vec<UserDocument>>,
}

impl UserStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let users = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        info!("Loaded {} users from {}", users.len(), path.display());

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    pub async fn find_by_email(&self, email: &str) -> Option<UserDocument> {
        let email = normalize_email(email);
        let users = self.users.read().await;
        users.iter().find(|u| u.email == email).cloned()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<UserDocument> {
        let users = self.users.read().await;
        users.iter().find(|u| u.id == id).cloned()
    }

    pub async fn insert(&self, user: UserDocument) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        users.push(user);
        if let Err(e) = persist(&self.path, &users).await {
            users.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Returns whether a user was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        let removed = users.remove(index);
        if let Err(e) = persist(&self.path, &users).await {
            users.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }
}

async fn persist(path: &Path, users: &[UserDocument]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(users)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("portal-users-{}", uuid::Uuid::new_v4()))
            .join("users.json")
    }

    #[tokio::test]
    async fn documents_survive_a_reopen() {
        let path = scratch_file();
        let store = UserStore::open(&path).await.unwrap();
        let doc = UserDocument::new("Jane Roe", " Jane@Uni.edu ", "hash".into());
        let id = doc.id.clone();
        store.insert(doc).await.unwrap();

        let reopened = UserStore::open(&path).await.unwrap();
        assert_eq!(reopened.users.read().await.len(), 1);
        let found = reopened.find_by_email("jane@uni.edu").await.unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.full_name, "Jane Roe");
        assert!(reopened.find_by_id(&id).await.is_some());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn emails_are_unique_ignoring_case() {
        let path = scratch_file();
        let store = UserStore::open(&path).await.unwrap();
        store
            .insert(UserDocument::new("A", "a@uni.edu", "h".into()))
            .await
            .unwrap();
        let err = store
            .insert(UserDocument::new("B", "A@UNI.EDU", "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.users.read().await.len(), 1);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let path = scratch_file();
        let store = UserStore::open(&path).await.unwrap();
        let doc = UserDocument::new("A", "a@uni.edu", "h".into());
        let id = doc.id.clone();
        store.insert(doc).await.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(UserStore::open(&path).await.unwrap().find_by_id(&id).await.is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn public_view_drops_the_hash() {
        let doc = UserDocument::new("A B", "a@uni.edu", "$2b$secret".into());
        let json = serde_json::to_string(&doc.public()).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"_id\""));
    }
}
