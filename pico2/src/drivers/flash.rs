//! Store documents in on-board flash, one erase-aligned slot per file.
//!
//! See [`simon_pico2::flash_layout`] for the slot format.

use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use log::{info, warn};
use simon_common::storage::{BlobStorage, StorageError, StorageStats, StoreFile};
use simon_pico2::board::{FLASH_SIZE, STORE_SIZE};
use simon_pico2::flash_layout::{
    FlashBlobError, HEADER_LEN, SLOT_SIZE, encode_header, parse_header, slot_offset,
};

pub struct FlashBlobs {
    flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>,
}

impl FlashBlobs {
    pub const fn new(flash: Flash<'static, FLASH, Blocking, FLASH_SIZE>) -> Self { Self { flash } }

    fn header(
        &mut self,
        file: StoreFile,
    ) -> Result<Option<usize>, FlashBlobError> {
        let mut header = [0u8; HEADER_LEN];
        self.flash
            .blocking_read(slot_offset(file), &mut header)
            .map_err(|_| FlashBlobError::Flash)?;
        parse_header(&header)
    }

    fn erase(
        &mut self,
        file: StoreFile,
    ) -> Result<(), FlashBlobError> {
        let from = slot_offset(file);
        self.flash
            .blocking_erase(from, from + SLOT_SIZE as u32)
            .map_err(|_| FlashBlobError::Flash)
    }
}

impl BlobStorage for FlashBlobs {
    /// Erase any slot whose header is not ours so it reads as empty from now on.
    fn mount(&mut self) -> Result<(), StorageError> {
        for file in StoreFile::ALL {
            match self.header(file) {
                Ok(_) => {}
                Err(FlashBlobError::Corrupt) => {
                    warn!("[STORAGE] Slot {} corrupt, erasing", file.name());
                    self.erase(file)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        info!("[STORAGE] Flash store mounted ({} bytes)", STORE_SIZE);
        Ok(())
    }

    fn read(
        &mut self,
        file: StoreFile,
        buf: &mut [u8],
    ) -> Result<usize, StorageError> {
        let len = self.header(file)?.ok_or(StorageError::NotFound)?;
        let dst = buf.get_mut(..len).ok_or(StorageError::TooLarge)?;
        self.flash
            .blocking_read(slot_offset(file) + HEADER_LEN as u32, dst)
            .map_err(|_| FlashBlobError::Flash)?;
        Ok(len)
    }

    fn write(
        &mut self,
        file: StoreFile,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let header = encode_header(data.len())?;
        let offset = slot_offset(file);

        self.erase(file)?;
        // Header last: an interrupted write leaves the slot erased
        self.flash
            .blocking_write(offset + HEADER_LEN as u32, data)
            .map_err(|_| FlashBlobError::Flash)?;
        self.flash.blocking_write(offset, &header).map_err(|_| FlashBlobError::Flash)?;
        Ok(())
    }

    fn remove(
        &mut self,
        file: StoreFile,
    ) -> Result<(), StorageError> {
        if self.header(file)?.is_some() {
            self.erase(file)?;
        }
        Ok(())
    }

    fn stats(&mut self) -> Result<StorageStats, StorageError> {
        let mut used = 0;
        for file in StoreFile::ALL {
            if let Some(len) = self.header(file)? {
                used += (HEADER_LEN + len) as u32;
            }
        }
        Ok(StorageStats {
            total_bytes: STORE_SIZE as u32,
            used_bytes: used,
        })
    }
}
