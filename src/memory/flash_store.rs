use std::fs::OpenOptions;
use std::ops::{Index, IndexMut};
use std::path::Path;

use log::{info, warn};
use memmap2::MmapMut;

// The contents of the flash chip. Starts as a copy of PRG ROM, and can optionally be backed by a
// battery save file so that erased and programmed bytes survive between sessions.
pub struct FlashStore {
    mode_state: FlashStoreModeState,
}

impl FlashStore {
    pub fn from_rom(prg_rom: &[u8]) -> Self {
        FlashStore { mode_state: FlashStoreModeState::InMemory(prg_rom.to_vec()) }
    }

    // An existing save file of the right size is the flash content. Otherwise the file is
    // (re)initialized from PRG ROM.
    pub fn open(path: &Path, prg_rom: &[u8]) -> Self {
        if prg_rom.is_empty() {
            return Self::from_rom(prg_rom);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path);
        let mode_state = file
            .and_then(|file| {
                let existing_size = file.metadata()?.len();
                file.set_len(prg_rom.len() as u64)?;
                // SAFETY: Unsafe. We can't guarantee that another process doesn't modify the file.
                let mut mmap = unsafe { MmapMut::map_mut(&file) }?;
                if existing_size == prg_rom.len() as u64 {
                    info!("Restored flash contents from {}. CRC32: {:08X}", path.display(), crc32fast::hash(&mmap[..]));
                } else {
                    if existing_size != 0 {
                        warn!("Flash save {} had the wrong size ({existing_size} bytes). Reinitializing it from PRG ROM.",
                            path.display());
                    }

                    mmap.copy_from_slice(prg_rom);
                }

                Ok(mmap)
            })
            .map_err(|err| warn!("Failed to load or create flash save at {}. Flash writes will be lost upon exit. {err}", path.display()))
            .map(FlashStoreModeState::FileBacked)
            .unwrap_or_else(|()| FlashStoreModeState::InMemory(prg_rom.to_vec()));

        FlashStore { mode_state }
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.mode_state {
            FlashStoreModeState::InMemory(vec) => &vec[..],
            FlashStoreModeState::FileBacked(mmap) => &mmap[..],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.mode_state {
            FlashStoreModeState::InMemory(vec) => &mut vec[..],
            FlashStoreModeState::FileBacked(mmap) => &mut mmap[..],
        }
    }

    pub fn size(&self) -> u32 {
        self.as_slice().len() as u32
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.mode_state, FlashStoreModeState::FileBacked(_))
    }

    pub fn fill(&mut self, value: u8) {
        self.as_mut_slice().fill(value);
    }

    pub fn copy_from(&mut self, source: &[u8]) -> Result<(), String> {
        let target = self.as_mut_slice();
        if target.len() != source.len() {
            return Err(format!("Flash contents must be {} bytes, but were {}.", target.len(), source.len()));
        }

        target.copy_from_slice(source);
        Ok(())
    }

    pub fn flush(&self) -> Result<(), String> {
        match &self.mode_state {
            FlashStoreModeState::InMemory(_) => Ok(()),
            FlashStoreModeState::FileBacked(mmap) => mmap.flush()
                .map_err(|err| format!("Failed to flush flash save. {err}")),
        }
    }
}

impl Index<u32> for FlashStore {
    type Output = u8;

    fn index(&self, index: u32) -> &u8 {
        &self.as_slice()[index as usize]
    }
}

impl IndexMut<u32> for FlashStore {
    fn index_mut(&mut self, index: u32) -> &mut u8 {
        &mut self.as_mut_slice()[index as usize]
    }
}

enum FlashStoreModeState {
    InMemory(Vec<u8>),
    FileBacked(MmapMut),
}
