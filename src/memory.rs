//! The linearly addressed word memory of the machine.

use std::fmt;

/// Number of words in a [FixedMemory] created with [FixedMemory::default].
pub const DEFAULT_MEMORY_SIZE: usize = 2048;

/// Trait for implementing the memory of a DREAMCHASER machine.
///
/// Instructions and data share the same address space. Every cell holds one 32-bit word.
pub trait Memory {
    /// Error type returned by all methods of this trait.
    type Error;

    /// Number of addressable words. Valid addresses are `0..size()`.
    fn size(&self) -> usize;

    /// Fetch the word from the specified address.
    ///
    /// # Parameters
    /// - `addr`: The address of the word.
    ///
    /// # Returns
    /// The word at `addr` or a memory error.
    fn get_word(&self, addr: usize) -> Result<u32, Self::Error>;

    /// Overwrite the word in the specified address.
    ///
    /// # Parameters
    /// - `addr`: The address of the word.
    /// - `word`: The word to be written to the location specified by `addr`.
    ///
    /// # Returns
    /// A memory error if the operation cannot be performed.
    fn set_word(&mut self, addr: usize, word: u32) -> Result<(), Self::Error>;
}

/// Error returned when accessing an address outside of the memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryError {
    /// The address that was accessed.
    pub address: usize,

    /// The size of the memory at the time of the access.
    pub size: usize,
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "address {} is outside of the memory of {} words", self.address, self.size)
    }
}

impl std::error::Error for MemoryError {}

/// Memory of a fixed number of zero-initialized words.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedMemory {
    inner: Vec<u32>,
}

impl FixedMemory {
    /// Creates a zeroed memory of `size` words.
    pub fn new(size: usize) -> FixedMemory {
        FixedMemory {
            inner: vec![0; size],
        }
    }

    /// Returns up to `len` words starting from `start`, clipped to the end of the memory.
    pub fn window(&self, start: usize, len: usize) -> &[u32] {
        let start = std::cmp::min(start, self.inner.len());
        let end = std::cmp::min(start.saturating_add(len), self.inner.len());

        &self.inner[start..end]
    }

    /// Lists the address and value of every non-zero word.
    pub fn occupied(&self) -> Vec<(usize, u32)> {
        self.inner
            .iter()
            .enumerate()
            .filter(|(_, word)| **word != 0)
            .map(|(addr, word)| (addr, *word))
            .collect()
    }
}

impl Default for FixedMemory {
    fn default() -> FixedMemory {
        FixedMemory::new(DEFAULT_MEMORY_SIZE)
    }
}

impl Memory for FixedMemory {
    type Error = MemoryError;

    fn size(&self) -> usize {
        self.inner.len()
    }

    fn get_word(&self, address: usize) -> Result<u32, MemoryError> {
        self.inner.get(address).copied().ok_or(MemoryError {
            address,
            size: self.inner.len(),
        })
    }

    fn set_word(&mut self, address: usize, word: u32) -> Result<(), MemoryError> {
        let size = self.inner.len();

        match self.inner.get_mut(address) {
            Some(cell) => {
                *cell = word;
                Ok(())
            }
            None => Err(MemoryError { address, size }),
        }
    }
}

impl Memory for Vec<u32> {
    type Error = MemoryError;

    fn size(&self) -> usize {
        self.len()
    }

    fn get_word(&self, address: usize) -> Result<u32, MemoryError> {
        self.get(address).copied().ok_or(MemoryError {
            address,
            size: self.len(),
        })
    }

    fn set_word(&mut self, address: usize, word: u32) -> Result<(), MemoryError> {
        let size = self.len();

        match self.get_mut(address) {
            Some(cell) => {
                *cell = word;
                Ok(())
            }
            None => Err(MemoryError { address, size }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_memory_bounds() {
        let mut memory = FixedMemory::new(4);

        assert_eq!(memory.size(), 4);
        assert_eq!(memory.get_word(3), Ok(0));
        assert_eq!(memory.set_word(3, 7), Ok(()));
        assert_eq!(memory.get_word(3), Ok(7));

        assert_eq!(memory.get_word(4), Err(MemoryError { address: 4, size: 4 }));
        assert_eq!(memory.set_word(4, 1), Err(MemoryError { address: 4, size: 4 }));
    }

    #[test]
    fn test_fixed_memory_default_size() {
        assert_eq!(FixedMemory::default().size(), 2048);
    }

    #[test]
    fn test_window_and_occupied() {
        let mut memory = FixedMemory::new(8);
        memory.set_word(2, 5).unwrap();
        memory.set_word(7, 9).unwrap();

        assert_eq!(memory.window(1, 3), &[0, 5, 0]);
        assert_eq!(memory.window(6, 10), &[0, 9]);
        assert_eq!(memory.window(20, 2), &[] as &[u32]);
        assert_eq!(memory.occupied(), vec![(2, 5), (7, 9)]);
    }

    #[test]
    fn test_vec_memory() {
        let mut memory = vec![0u32; 3];

        assert_eq!(Memory::size(&memory), 3);
        assert_eq!(memory.set_word(1, 42), Ok(()));
        assert_eq!(memory.get_word(1), Ok(42));
        assert_eq!(memory.get_word(3), Err(MemoryError { address: 3, size: 3 }));
    }
}
