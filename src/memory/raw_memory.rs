use std::ops::{Index, IndexMut};

// A chunk of primitive memory. Allows indexing on u32s instead of usizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMemory(Vec<u8>);

impl RawMemory {
    pub fn new(size: u32) -> Self {
        Self(vec![0; size as usize])
    }

    pub fn from_vec(vec: Vec<u8>) -> Result<Self, String> {
        if u32::try_from(vec.len()).is_err() {
            return Err(format!("Memory of {} bytes is too large to address.", vec.len()));
        }

        Ok(Self(vec))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }

    pub fn copy_from(&mut self, source: &[u8]) -> Result<(), String> {
        if source.len() != self.0.len() {
            return Err(format!("Expected {} bytes but got {}.", self.0.len(), source.len()));
        }

        self.0.copy_from_slice(source);
        Ok(())
    }

    pub fn size(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<u32> for RawMemory {
    type Output = u8;

    fn index(&self, index: u32) -> &u8 {
        &self.0[index as usize]
    }
}

impl IndexMut<u32> for RawMemory {
    fn index_mut(&mut self, index: u32) -> &mut u8 {
        &mut self.0[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_from_requires_matching_size() {
        let mut memory = RawMemory::new(4);
        assert!(memory.copy_from(&[1, 2, 3]).is_err());
        memory.copy_from(&[1, 2, 3, 4]).unwrap();
        assert_eq!(memory.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn indexes_by_u32() {
        let mut memory = RawMemory::from_vec(vec![0xFF; 0x10]).unwrap();
        memory[0x0F] = 0x12;
        assert_eq!(memory[0x0F], 0x12);
        assert_eq!(memory[0x00], 0xFF);
        assert_eq!(&memory.as_slice()[0x0E..0x10], &[0xFF, 0x12]);
    }
}
