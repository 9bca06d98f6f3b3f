use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{AsyncTokenStorage, TokenStorage};
use crate::api_tokens::models::ApiToken;
use crate::config::loader::expand_home;
use crate::errors::StorageError;
use crate::utils::constants::DEFAULT_TOKEN_FILE_PATH;

/// Stores the token record as a JSON document at a single path.
///
/// Saves go through a temp file in the same directory which is fsynced and then
/// renamed over the target, so readers only ever see the old or the new record.
#[derive(Debug, Clone)]
pub struct JsonFileTokenStorage {
    path: PathBuf,
}

impl JsonFileTokenStorage {
    /// A leading `~` in `path` is expanded to the home directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: expand_home(path.as_ref()),
        }
    }

    pub fn at_default_location() -> Self {
        Self::new(DEFAULT_TOKEN_FILE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(content: &str) -> Result<ApiToken, StorageError> {
        Ok(serde_json::from_str(content)?)
    }

    fn write_atomic(&self, content: &[u8]) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let prefix = format!("{}.", file_name(&self.path));
        let mut tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(&dir)?;

        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        restrict_permissions(tmp.path());

        // on failure the temp file is dropped together with the error
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        debug!(path = %self.path.display(), "API token saved");
        Ok(())
    }
}

impl Default for JsonFileTokenStorage {
    fn default() -> Self {
        Self::at_default_location()
    }
}

impl TokenStorage for JsonFileTokenStorage {
    fn load(&self) -> Result<ApiToken, StorageError> {
        let content = fs::read_to_string(&self.path).map_err(not_found_or_io)?;
        Self::parse(&content)
    }

    fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        let content = serde_json::to_vec(api_token)?;
        self.write_atomic(&content)
    }

    fn delete(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Async flavor of [`JsonFileTokenStorage`]; writes run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct AsyncJsonFileTokenStorage {
    inner: JsonFileTokenStorage,
}

impl AsyncJsonFileTokenStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            inner: JsonFileTokenStorage::new(path),
        }
    }

    pub fn at_default_location() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    async fn run_blocking<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(JsonFileTokenStorage) -> Result<(), StorageError> + Send + 'static,
    {
        let storage = self.inner.clone();
        tokio::task::spawn_blocking(move || f(storage))
            .await
            .map_err(|e| StorageError::Io(io::Error::other(e)))?
    }
}

#[async_trait]
impl AsyncTokenStorage for AsyncJsonFileTokenStorage {
    async fn load(&self) -> Result<ApiToken, StorageError> {
        let content = tokio::fs::read_to_string(self.inner.path())
            .await
            .map_err(not_found_or_io)?;
        JsonFileTokenStorage::parse(&content)
    }

    async fn save(&self, api_token: &ApiToken) -> Result<(), StorageError> {
        let api_token = api_token.clone();
        self.run_blocking(move |storage| storage.save(&api_token)).await
    }

    async fn delete(&self) -> Result<(), StorageError> {
        self.run_blocking(|storage| storage.delete()).await
    }
}

fn not_found_or_io(err: io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => StorageError::Io(err),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "api_token".to_owned())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        debug!(path = %path.display(), "could not restrict token file permissions: {}", e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
