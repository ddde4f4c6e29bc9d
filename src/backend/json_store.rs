use std::{fs, io, path::{Path, PathBuf}, sync::Mutex};

use log::debug;

use crate::backend::document::{StoreDocument, DocumentAccess};
use crate::backend::interface::{BackendError, Result};

/// Store kept as one pretty-printed JSON file.
///
/// Every operation reads the file fresh, so changes made by another process
/// are picked up; writes from different processes race and the last one wins.
/// Within one process the read-modify-write cycle is serialised.
pub struct JsonStore {
    path: PathBuf,
    lock: Mutex<()>
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_path_buf(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> BackendError {
        BackendError::Io { path: self.path.clone(), source }
    }

    fn load(&self) -> Result<StoreDocument> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(err) => return Err(self.io_error(err))
        };
        if content.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        return Ok(serde_json::from_str(&content)?);
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let content = serde_json::to_string_pretty(doc)?;

        // write next to the target, then swap it in
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, content).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))?;

        debug!("saved store to {}", self.path.display());
        return Ok(());
    }
}

impl DocumentAccess for JsonStore {
    fn view<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> Result<T> {
        let _guard = self.lock.lock().map_err(|_| BackendError::Poisoned)?;
        let doc = self.load()?;
        return Ok(f(&doc));
    }

    fn update<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> Result<T> {
        let _guard = self.lock.lock().map_err(|_| BackendError::Poisoned)?;
        let mut doc = self.load()?;
        let out = f(&mut doc);
        self.save(&doc)?;
        return Ok(out);
    }
}
