//! A crate for assembling, loading and executing programs for DREAMCHASER, a small teaching
//! architecture with eight 32-bit registers, five condition flags and a word-addressed memory.
//!
//! Currently this crate provides the functionality to:
//! - Assemble mnemonic source (`CARGAR R0 512`, `SUMAR R0 R1`, ...) into 32-bit words.
//! - Read and write programs as text, one 32-character bit string per word.
//! - Decode words back into instructions and print them as assembly.
//! - Relocate a program to an arbitrary base address and load it into memory.
//! - Execute the loaded program, observing its state changes through events.
//!
//! # Example
//! ```
//! use dreamchaser::{
//!     assembler::assemble,
//!     emulator::Emulator,
//!     instruction::Register,
//!     memory::{FixedMemory, Memory},
//! };
//!
//! // Adds the words at addresses 100 and 101 and stores the sum to address 102. Addresses are
//! // relative to the start of the program.
//! let source = r#"
//!     CARGAR    R0 100
//!     CARGAR    R1 101
//!     SUMAR     R0 R1
//!     ALMACENAR R0 102
//!     PARAR
//! "#;
//!
//! let program = assemble(source).expect("could not assemble the program");
//!
//! let mut emulator = Emulator::new(FixedMemory::default());
//!
//! // Place the program at address 256. Its addresses are relocated to 356, 357 and 358.
//! emulator.load(&program, 256).expect("could not load the program");
//! emulator.memory.set_word(356, 13).unwrap();
//! emulator.memory.set_word(357, 15).unwrap();
//!
//! emulator.run(256).expect("an error occured while emulating the program");
//!
//! assert!(emulator.halted);
//! assert_eq!(emulator.register(Register::R0), 28);
//! assert_eq!(emulator.memory.get_word(358), Ok(28));
//! ```
//!
//! # Executables
//!
//! ## `dreamchaser-run`
//!
//! Enabled with the `dreamchaser-run` feature. Assembles a source file (or reads a bit-string
//! file ending in `.bin`), loads it at `--base`, runs it and prints the registers, flags and a
//! window of the memory.
//!
//! ```text
//! $ dreamchaser-run gcd.asm --base 256 --dump 256:12
//! ```

pub mod assembler;
pub mod bytecode;
pub mod emulator;
pub mod error;
pub mod event;
pub mod instruction;
pub mod loader;
pub mod memory;
pub mod symbolic;
