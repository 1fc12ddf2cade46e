//! On-flash layout of the game store.
//!
//! Each [`StoreFile`] owns a fixed, erase-aligned slot inside the store area
//! at the end of flash:
//!
//! ```text
//! | magic u32 LE | length u32 LE | JSON document ... | erased (0xFF) ... |
//! ```
//!
//! A slot whose header is still erased reads as "not found". The document is
//! programmed before the header, so a write interrupted by a reset leaves the
//! slot erased instead of half-written.

use simon_common::config::MAX_DOCUMENT_BYTES;
use simon_common::storage::{StorageError, StoreFile};

use crate::board::{FLASH_ERASE_SIZE, STORE_OFFSET, STORE_SIZE};

/// Marks a written slot ("SMON").
pub const SLOT_MAGIC: u32 = 0x534D_4F4E;

/// Bytes in front of every document.
pub const HEADER_LEN: usize = 8;

/// Flash bytes per store file.
pub const SLOT_SIZE: usize = STORE_SIZE / StoreFile::ALL.len();

/// Largest document a slot can hold.
pub const SLOT_CAPACITY: usize = SLOT_SIZE - HEADER_LEN;

const _: () = assert!(SLOT_SIZE.is_multiple_of(FLASH_ERASE_SIZE));
const _: () = assert!(SLOT_CAPACITY >= MAX_DOCUMENT_BYTES);

/// Flash blob failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum FlashBlobError {
    /// Header present but not ours, or length out of range.
    Corrupt,
    /// Document larger than a slot.
    TooLarge,
    /// The flash driver reported an error.
    Flash,
}

impl core::fmt::Display for FlashBlobError {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        match self {
            Self::Corrupt => write!(f, "Corrupt slot header"),
            Self::TooLarge => write!(f, "Document exceeds slot"),
            Self::Flash => write!(f, "Flash access failed"),
        }
    }
}

impl From<FlashBlobError> for StorageError {
    fn from(e: FlashBlobError) -> Self {
        match e {
            // Unreadable slots are treated as never written
            FlashBlobError::Corrupt => Self::NotFound,
            FlashBlobError::TooLarge => Self::TooLarge,
            FlashBlobError::Flash => Self::Io,
        }
    }
}

/// Offset of a file's slot from the start of flash.
pub const fn slot_offset(file: StoreFile) -> u32 { STORE_OFFSET + (file.index() * SLOT_SIZE) as u32 }

/// Header for a document of `len` bytes.
pub fn encode_header(len: usize) -> Result<[u8; HEADER_LEN], FlashBlobError> {
    if len > SLOT_CAPACITY {
        return Err(FlashBlobError::TooLarge);
    }
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&SLOT_MAGIC.to_le_bytes());
    header[4..].copy_from_slice(&(len as u32).to_le_bytes());
    Ok(header)
}

/// Document length stored in a header; `None` for an erased slot.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<Option<usize>, FlashBlobError> {
    if header.iter().all(|&b| b == 0xFF) {
        return Ok(None);
    }

    let magic = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if magic != SLOT_MAGIC {
        return Err(FlashBlobError::Corrupt);
    }

    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if len > SLOT_CAPACITY {
        return Err(FlashBlobError::Corrupt);
    }
    Ok(Some(len))
}

// =============================================================================
// Unit Tests
// =============================================================================
