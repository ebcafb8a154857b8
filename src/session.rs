use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::api::CounselBackend;
use crate::error::{ClientError, ClientResult};

const SESSION_FILE: &str = "session_id";

/// Owns the session identifier lifecycle: load-or-create, persist, clear.
///
/// The identifier is a single opaque string minted by the backend and kept in
/// one state file, the native stand-in for the browser's tab-scoped storage.
/// At most one creation request is issued per client lifetime unless
/// [`SessionStore::reset`] intervenes.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(SESSION_FILE),
        }
    }

    /// The persisted identifier, if any.
    pub fn current(&self) -> Option<String> {
        let id = fs::read_to_string(&self.path).ok()?;
        let id = id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Return the persisted identifier, or mint a new one from the backend
    /// and persist it.
    pub async fn get_or_create(&self, api: &dyn CounselBackend) -> ClientResult<String> {
        if let Some(id) = self.current() {
            return Ok(id);
        }

        info!("no persisted session, requesting a new one");
        let id = api.init_session().await?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::SessionInit(e.to_string()))?;
        }
        fs::write(&self.path, &id).map_err(|e| ClientError::SessionInit(e.to_string()))?;

        Ok(id)
    }

    /// Clear the persisted identifier. The caller is expected to reinitialize.
    pub fn reset(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("cleared persisted session");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Io(e)),
        }
    }
}
