//! The linker-loader: relocates assembled programs to an absolute base address and places them
//! into a [Memory].
//!
//! Addresses embedded in `CARGAR`, `ALMACENAR` and jump instructions are written relative to
//! the start of the program. Linking adds the base address to each of them, so a program can be
//! placed anywhere it fits. Other words, including data and words that do not decode, are copied
//! unchanged.

use std::fmt;

use slog::{o, trace, Discard, Logger};

use crate::instruction::{decode, MAX_FIELD};
use crate::memory::Memory;

/// Errors that can occur while linking or loading a program.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadError<E> {
    /// The program contains no words.
    EmptyProgram,

    /// The word at `index` would be placed at `address`, past the end of a memory of `size`
    /// words.
    MemoryOverflow {
        index: usize,
        address: usize,
        size: usize,
    },

    /// The relocated address of the word at `index` does not fit into the 11-bit field.
    AddressOutOfRange {
        index: usize,
        address: usize,
    },

    /// The memory rejected a write.
    Memory(E),
}

impl<E: fmt::Display> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::EmptyProgram => write!(f, "the program is empty"),
            LoadError::MemoryOverflow { index, address, size } => write!(
                f,
                "instruction {} would be placed at address {}, but the memory has only {} words",
                index, address, size,
            ),
            LoadError::AddressOutOfRange { index, address } => write!(
                f,
                "instruction {} refers to address {} after relocation, which does not fit into {} bits",
                index,
                address,
                crate::instruction::FIELD_BITS,
            ),
            LoadError::Memory(err) => write!(f, "memory error: {}", err),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for LoadError<E> {}

/// A relocated program and the address it was linked for.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryImage {
    pub base: usize,
    pub words: Vec<u32>,
}

impl MemoryImage {
    /// Range of addresses the image occupies.
    pub fn addresses(&self) -> std::ops::Range<usize> {
        self.base..self.base + self.words.len()
    }

    /// Writes the image into `memory`.
    pub fn load_into<M: Memory>(&self, memory: &mut M) -> Result<(), LoadError<M::Error>> {
        if self.base + self.words.len() > memory.size() {
            return Err(LoadError::MemoryOverflow {
                index: memory.size().saturating_sub(self.base),
                address: memory.size(),
                size: memory.size(),
            });
        }

        for (address, word) in self.addresses().zip(&self.words) {
            memory.set_word(address, *word).map_err(LoadError::Memory)?;
        }

        Ok(())
    }
}

/// Relocates `program` to `base` for a memory of `memory_size` words.
///
/// See [link_with_logger].
pub fn link<E>(program: &[u32], base: usize, memory_size: usize) -> Result<MemoryImage, LoadError<E>> {
    link_with_logger(program, base, memory_size, None)
}

/// Relocates `program` to `base` for a memory of `memory_size` words.
///
/// # Errors
/// Fails without producing a partial image if the program is empty, if any word would be placed
/// at or past `memory_size`, or if a relocated address does not fit into the field.
pub fn link_with_logger<E, L>(
    program: &[u32],
    base: usize,
    memory_size: usize,
    logger: L,
) -> Result<MemoryImage, LoadError<E>>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "linking", "base" => base));

    if program.is_empty() {
        return Err(LoadError::EmptyProgram);
    }

    let mut words = Vec::with_capacity(program.len());

    for (index, word) in program.iter().enumerate() {
        let address = base + index;

        if address >= memory_size {
            return Err(LoadError::MemoryOverflow {
                index,
                address,
                size: memory_size,
            });
        }

        let mut ins = match decode(*word) {
            Ok(ins) if ins.opcode.references_memory() => ins,
            _ => {
                words.push(*word);
                continue;
            }
        };

        let relocated = base + ins.field as usize;

        if relocated > MAX_FIELD as usize {
            return Err(LoadError::AddressOutOfRange {
                index,
                address: relocated,
            });
        }

        trace!(logger, "relocate"; "address" => address, "from" => ins.field, "to" => relocated);

        ins.field = relocated as u16;
        words.push(ins.into());
    }

    Ok(MemoryImage { base, words })
}

/// Links `program` at `base` against the size of `memory` and writes it into the memory.
///
/// Nothing is written unless the whole program links.
pub fn load<M: Memory>(memory: &mut M, program: &[u32], base: usize) -> Result<MemoryImage, LoadError<M::Error>> {
    let image = link(program, base, memory.size())?;
    image.load_into(memory)?;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::instruction::{Instruction, JumpCondition, OpCode, Register};
    use crate::memory::{FixedMemory, MemoryError};

    fn word(ins: Instruction) -> u32 {
        ins.into()
    }

    #[test]
    fn test_relocate_load() {
        let mut memory = FixedMemory::default();
        let program = [word(Instruction::with_field(OpCode::Load, Register::R0, 3))];

        load(&mut memory, &program, 256).unwrap();

        let expected = Instruction::with_field(OpCode::Load, Register::R0, 259);
        assert_eq!(memory.get_word(256), Ok(word(expected)));
    }

    #[test]
    fn test_only_addresses_are_relocated() {
        let program = [
            word(Instruction::with_field(OpCode::LoadImmediate, Register::R1, 3)),
            word(Instruction::jump(JumpCondition::Zero, 0)),
            word(Instruction::with_registers(OpCode::Add, Register::R1, Register::R2)),
            word(Instruction::with_field(OpCode::Store, Register::R1, 7)),
            0x0000_0001,
            0,
        ];

        let image = link::<MemoryError>(&program, 100, 2048).unwrap();

        assert_eq!(image.addresses(), 100..106);
        assert_eq!(image.words, vec![
            program[0],
            word(Instruction::jump(JumpCondition::Zero, 100)),
            program[2],
            word(Instruction::with_field(OpCode::Store, Register::R1, 107)),
            0x0000_0001,
            0,
        ]);
    }

    #[test]
    fn test_base_zero_is_identity() {
        let program = [
            word(Instruction::with_field(OpCode::Load, Register::R2, 40)),
            word(Instruction::jump(JumpCondition::Always, 0)),
        ];

        let image = link::<MemoryError>(&program, 0, 2048).unwrap();

        assert_eq!(image.words, program.to_vec());
    }

    #[test]
    fn test_empty_program() {
        let mut memory = FixedMemory::default();

        assert_eq!(load(&mut memory, &[], 0), Err(LoadError::EmptyProgram));
    }

    #[test]
    fn test_memory_overflow_writes_nothing() {
        let mut memory = FixedMemory::new(16);
        let program = [word(Instruction::with_field(OpCode::LoadImmediate, Register::R0, 1)); 4];

        assert_eq!(
            load(&mut memory, &program, 14),
            Err(LoadError::MemoryOverflow { index: 2, address: 16, size: 16 }),
        );
        assert!(memory.occupied().is_empty());
    }

    #[test]
    fn test_relocated_address_out_of_range() {
        let program = [
            word(Instruction::with_field(OpCode::LoadImmediate, Register::R0, 2000)),
            word(Instruction::with_field(OpCode::Store, Register::R0, 2000)),
        ];

        assert_eq!(
            link::<MemoryError>(&program, 100, 4096),
            Err(LoadError::AddressOutOfRange { index: 1, address: 2100 }),
        );
    }
}
