//! Persistence of the Matrix session between runs.
//!
//! The authenticated session and the latest sync token live in one JSON
//! file under the data directory; the Matrix SDK keeps its own state in a
//! SQLite database next to it. Restoring the session on startup avoids a
//! fresh login (and a fresh device) on every run.

use std::{fs::exists, path::PathBuf};

use log::{debug, trace};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

/// On-disk shape of the persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedSession {
    /// Authentication data of the logged-in account.
    auth: matrix::MatrixSession,
    /// Latest sync token, for resuming where the last run stopped.
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Loads and persists the session file, and tracks the SQLite store path.
#[derive(Clone)]
pub struct SessionStore {
    session: Option<PersistedSession>,
    /// `<dir>/sqlite`, handed to the SDK's store builder.
    sqlite_path: String,
    /// `<dir>/session`, the JSON file this store owns.
    session_path: String,
}

impl SessionStore {
    /// Opens the store under `dir_path`, loading a previously persisted
    /// session when one exists.
    pub async fn new(dir_path: &str) -> Result<SessionStore, anyhow::Error> {
        let sqlite_path_buf: PathBuf = [dir_path, "sqlite"].iter().collect();
        let session_path_buf: PathBuf = [dir_path, "session"].iter().collect();
        let sqlite_path = sqlite_path_buf.to_string_lossy().into_owned();
        let session_path = session_path_buf.to_string_lossy().into_owned();

        let session = SessionStore::read_session(&session_path).await.ok();
        debug!(
            "session store at {}: persisted session {}",
            dir_path,
            if session.is_some() { "found" } else { "absent" }
        );

        Ok(SessionStore {
            session,
            sqlite_path,
            session_path,
        })
    }

    async fn read_session(session_path: &str) -> Result<PersistedSession, anyhow::Error> {
        if !exists(session_path).unwrap_or_default() {
            return Err(anyhow::anyhow!("session file does not exist"));
        }

        let data = fs::read_to_string(session_path).await?;
        let session = serde_json::from_str(&data)?;
        Ok(session)
    }

    /// Path of the SQLite database for the SDK state store.
    pub fn sqlite_path(&self) -> &str {
        &self.sqlite_path
    }

    /// The persisted authentication data, if a previous run left one.
    pub fn auth(&self) -> Option<&matrix::MatrixSession> {
        self.session.as_ref().map(|s| &s.auth)
    }

    /// The persisted sync token, if any.
    pub fn sync_token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Writes a freshly obtained authentication session to disk, replacing
    /// whatever was there. The sync token starts over.
    pub async fn persist_auth(&self, auth: &matrix::MatrixSession) -> anyhow::Result<()> {
        trace!("persist auth session");

        let session = PersistedSession {
            auth: auth.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;
        Ok(())
    }

    /// Updates the sync token in the session file, keeping the
    /// authentication data as it is.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let data = fs::read_to_string(&self.session_path).await?;
        let mut session: PersistedSession = serde_json::from_str(&data)?;
        session.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_sdk::{
        SessionMeta, SessionTokens, authentication::matrix::MatrixSession as SdkMatrixSession,
    };
    use tempfile::TempDir;

    fn sdk_session() -> SdkMatrixSession {
        SdkMatrixSession {
            meta: SessionMeta {
                user_id: "@blanks:example.org".try_into().unwrap(),
                device_id: "DEVICEID".into(),
            },
            tokens: SessionTokens {
                access_token: "access_token".to_string(),
                refresh_token: None,
            },
        }
    }

    #[tokio::test]
    async fn test_store_without_persisted_session() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().to_str().unwrap()).await.unwrap();

        assert!(store.auth().is_none());
        assert!(store.sync_token().is_none());
        assert!(store.sqlite_path().ends_with("sqlite"));
    }

    #[tokio::test]
    async fn test_persist_and_reload_auth() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();

        let store = SessionStore::new(path).await.unwrap();
        store.persist_auth(&sdk_session()).await.unwrap();

        let reloaded = SessionStore::new(path).await.unwrap();
        assert_eq!(
            reloaded.auth().unwrap().meta.user_id.to_string(),
            "@blanks:example.org"
        );
        assert!(reloaded.sync_token().is_none());
    }

    #[tokio::test]
    async fn test_persist_sync_token_keeps_auth() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();

        let store = SessionStore::new(path).await.unwrap();
        store.persist_auth(&sdk_session()).await.unwrap();
        store.persist_sync_token("token_123".to_string()).await.unwrap();

        let reloaded = SessionStore::new(path).await.unwrap();
        assert_eq!(reloaded.sync_token(), Some("token_123".to_string()));
        assert!(reloaded.auth().is_some());
    }

    #[tokio::test]
    async fn test_persist_sync_token_without_auth_fails() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().to_str().unwrap()).await.unwrap();

        assert!(store.persist_sync_token("token".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_session_file_is_treated_as_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_str().unwrap();
        tokio::fs::write(format!("{}/session", path), "not json")
            .await
            .unwrap();

        let store = SessionStore::new(path).await.unwrap();
        assert!(store.auth().is_none());
    }
}
