//! Memory image: a mutable sequence of 16-bit words loaded from a
//! little-endian binary. Addresses are word indices, not byte indices.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{ToolError, VmError};
use crate::word::Word;

/// The VM's addressable memory. Writes never extend it (SPEC_FULL §3).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryImage {
    words: Vec<Word>,
}

impl MemoryImage {
    /// Builds a memory image directly from a word sequence (used by tests
    /// and by hand-assembled fixture programs).
    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// Reads a binary image as little-endian 16-bit pairs. A trailing odd
    /// byte is an error (SPEC_FULL §6).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ToolError> {
        if bytes.len() % 2 != 0 {
            return Err(ToolError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "binary image has a trailing odd byte",
            )));
        }

        let words = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]) as Word)
            .collect();

        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    /// Bounds-checked read.
    pub fn get(&self, addr: usize) -> Result<Word, VmError> {
        self.words
            .get(addr)
            .copied()
            .ok_or(VmError::MemoryOutOfRange(addr, self.words.len()))
    }

    /// Bounds-checked write. Never grows the image.
    pub fn set(&mut self, addr: usize, value: Word) -> Result<(), VmError> {
        match self.words.get_mut(addr) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(VmError::MemoryOutOfRange(addr, self.words.len())),
        }
    }
}

impl Index<usize> for MemoryImage {
    type Output = Word;

    fn index(&self, addr: usize) -> &Word {
        &self.words[addr]
    }
}

impl IndexMut<usize> for MemoryImage {
    fn index_mut(&mut self, addr: usize) -> &mut Word {
        &mut self.words[addr]
    }
}

impl fmt::Display for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory[{} words]", self.words.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_little_endian_pairs() {
        let mem = MemoryImage::from_bytes(&[0x01, 0x00, 0xff, 0x7f]).unwrap();
        assert_eq!(mem.as_slice(), &[1, 0x7fff]);
    }

    #[test]
    fn rejects_trailing_odd_byte() {
        assert!(MemoryImage::from_bytes(&[0x01]).is_err());
    }

    #[test]
    fn writes_never_extend_the_image() {
        let mut mem = MemoryImage::from_words(vec![0, 0]);
        assert!(mem.set(2, 5).is_err());
        assert_eq!(mem.len(), 2);
    }

    #[test]
    fn bounds_checked_read() {
        let mem = MemoryImage::from_words(vec![7]);
        assert_eq!(mem.get(0).unwrap(), 7);
        assert!(mem.get(1).is_err());
    }
}
