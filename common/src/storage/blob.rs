//! Raw file backend underneath the record store.

use heapless::Vec;

use super::StorageError;
use super::records::StorageStats;
use crate::config::MAX_DOCUMENT_BYTES;

/// The four documents the store keeps.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreFile {
    Players,
    History,
    Scores,
    Settings,
}

impl StoreFile {
    pub const ALL: [Self; 4] = [Self::Players, Self::History, Self::Scores, Self::Settings];

    /// File name on a filesystem backend.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Players => "players.json",
            Self::History => "history.json",
            Self::Scores => "scores.json",
            Self::Settings => "settings.json",
        }
    }

    /// Position in [`StoreFile::ALL`], used as a slot number by sector backends.
    pub const fn index(self) -> usize { self as usize }
}

/// Whole-file storage: every write replaces the previous content.
pub trait BlobStorage {
    /// Prepare the backend. A store whose backend fails to mount runs without persistence.
    fn mount(&mut self) -> Result<(), StorageError> { Ok(()) }

    /// Read a file into `buf`, returning its length.
    ///
    /// Returns [`StorageError::NotFound`] if the file was never written or was removed.
    fn read(
        &mut self,
        file: StoreFile,
        buf: &mut [u8],
    ) -> Result<usize, StorageError>;

    fn write(
        &mut self,
        file: StoreFile,
        data: &[u8],
    ) -> Result<(), StorageError>;

    /// Delete a file. Removing a missing file is not an error.
    fn remove(
        &mut self,
        file: StoreFile,
    ) -> Result<(), StorageError>;

    fn stats(&mut self) -> Result<StorageStats, StorageError>;
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// RAM-backed files, for tests and for running without a filesystem.
pub struct MemoryBlobs {
    files: [Option<Vec<u8, MAX_DOCUMENT_BYTES>>; 4],
    mountable: bool,
    fail_writes: bool,
}

impl MemoryBlobs {
    pub const fn new() -> Self {
        Self {
            files: [None, None, None, None],
            mountable: true,
            fail_writes: false,
        }
    }

    /// A backend that refuses to mount, as if the flash were absent.
    pub const fn unmountable() -> Self {
        Self {
            files: [None, None, None, None],
            mountable: false,
            fail_writes: false,
        }
    }

    /// Make every following write fail with [`StorageError::Io`].
    pub fn set_fail_writes(
        &mut self,
        fail: bool,
    ) {
        self.fail_writes = fail;
    }

    /// Raw content of a file, if present.
    pub fn contents(
        &self,
        file: StoreFile,
    ) -> Option<&[u8]> {
        self.files[file.index()].as_deref()
    }

    /// Overwrite a file without going through the store.
    pub fn put(
        &mut self,
        file: StoreFile,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let blob = Vec::from_slice(data).map_err(|_| StorageError::TooLarge)?;
        self.files[file.index()] = Some(blob);
        Ok(())
    }
}

impl Default for MemoryBlobs {
    fn default() -> Self { Self::new() }
}

impl BlobStorage for MemoryBlobs {
    fn mount(&mut self) -> Result<(), StorageError> {
        if self.mountable { Ok(()) } else { Err(StorageError::Unavailable) }
    }

    fn read(
        &mut self,
        file: StoreFile,
        buf: &mut [u8],
    ) -> Result<usize, StorageError> {
        let blob = self.files[file.index()].as_ref().ok_or(StorageError::NotFound)?;
        let dst = buf.get_mut(..blob.len()).ok_or(StorageError::TooLarge)?;
        dst.copy_from_slice(blob);
        Ok(blob.len())
    }

    fn write(
        &mut self,
        file: StoreFile,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io);
        }
        self.put(file, data)
    }

    fn remove(
        &mut self,
        file: StoreFile,
    ) -> Result<(), StorageError> {
        self.files[file.index()] = None;
        Ok(())
    }

    fn stats(&mut self) -> Result<StorageStats, StorageError> {
        let used: usize = self.files.iter().flatten().map(|f| f.len()).sum();
        Ok(StorageStats {
            total_bytes: (MAX_DOCUMENT_BYTES * StoreFile::ALL.len()) as u32,
            used_bytes: used as u32,
        })
    }
}
