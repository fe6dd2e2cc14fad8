//! Parsing and storing assembled programs.
//!
//! An assembled program is an ordered sequence of 32-bit words. Its text form holds one word per
//! line, written as 32 `0`/`1` characters with the most significant bit first.

mod parser;
mod program;

pub use self::parser::{ErrorKind, ParseError};
pub use self::program::{word_from_bits, word_to_bits, Program};
