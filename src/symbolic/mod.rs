//! Tokenizing and parsing mnemonic assembly lines.
//!
//! A line holds one operation followed by its operands:
//!
//! ```text
//! CARGAR R0 512      ; load the word at address 512 into R0
//! SUMAR R0, R1
//! SALTARSICERO 0x0A
//! PARAR
//! ```
//!
//! Operands are separated by whitespace or `,`, and everything after a `;` is a comment.

pub mod parser;
pub mod token;

pub use self::parser::{parse_line, AssemblyError, AssemblyErrorKind};
pub use self::token::Token;
