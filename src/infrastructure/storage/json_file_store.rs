use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::domain::history::{History, HistoryStore};
use crate::shared::errors::StoreError;

/// History persisted as a single JSON file `{ "data": [...] }`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn archive_path(&self) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut archived = self.path.clone().into_os_string();
        archived.push(format!(".corrupt-{}", ts));
        PathBuf::from(archived)
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Option<History>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        Ok(Some(serde_json::from_slice::<History>(&bytes)?))
    }

    fn save(&self, history: &History) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(history)?;
        atomic_write(&self.path, &json).map_err(|e| self.io_error(e))?;
        debug!("Saved {} readings to {:?}", history.len(), self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Rename the file to `<file>.corrupt-<unix>` instead of deleting it.
    fn quarantine(&self) -> Result<(), StoreError> {
        let archived = self.archive_path();
        match fs::rename(&self.path, &archived) {
            Ok(()) => {
                warn!("⚠️ Moved unreadable history {:?} to {:?}", self.path, archived);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "history.json".to_string());
    let tmp = dir.join(format!(".{}.tmp", file_name));

    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)
}
