//! Store documents as JSON files in a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};
use simon_common::config::MAX_DOCUMENT_BYTES;
use simon_common::storage::{BlobStorage, StorageError, StorageStats, StoreFile};

pub struct FileBlobs {
    dir: PathBuf,
}

impl FileBlobs {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    fn path(
        &self,
        file: StoreFile,
    ) -> PathBuf {
        self.dir.join(file.name())
    }
}

fn io_error(e: &std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound
    } else {
        warn!("[STORAGE] {e}");
        StorageError::Io
    }
}

impl BlobStorage for FileBlobs {
    fn mount(&mut self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&e))?;
        info!("[STORAGE] Using {}", self.dir.display());
        Ok(())
    }

    fn read(
        &mut self,
        file: StoreFile,
        buf: &mut [u8],
    ) -> Result<usize, StorageError> {
        let data = fs::read(self.path(file)).map_err(|e| io_error(&e))?;
        let dst = buf.get_mut(..data.len()).ok_or(StorageError::TooLarge)?;
        dst.copy_from_slice(&data);
        Ok(data.len())
    }

    /// Write to a temporary file and rename it over the old one.
    fn write(
        &mut self,
        file: StoreFile,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if data.len() > MAX_DOCUMENT_BYTES {
            return Err(StorageError::TooLarge);
        }
        let path = self.path(file);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| io_error(&e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&e))
    }

    fn remove(
        &mut self,
        file: StoreFile,
    ) -> Result<(), StorageError> {
        match fs::remove_file(self.path(file)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(io_error(&e)),
            _ => Ok(()),
        }
    }

    fn stats(&mut self) -> Result<StorageStats, StorageError> {
        let mut used = 0u64;
        for file in StoreFile::ALL {
            match fs::metadata(self.path(file)) {
                Ok(meta) => used += meta.len(),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&e)),
            }
        }
        Ok(StorageStats {
            total_bytes: (MAX_DOCUMENT_BYTES * StoreFile::ALL.len()) as u32,
            used_bytes: used as u32,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
