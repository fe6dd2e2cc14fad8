//! Tokens and a tokenizer for mnemonic assembly lines.

use logos::{Lexer, Logos};

use std::fmt;

/// Enumeration of all tokens of the assembly language.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Errorneous token that could not be interpreted as any of the other variants.
    #[error]
    #[regex(r"[ \t\r\f]+", logos::skip)]
    #[regex(r";[^\n]*", logos::skip)]
    Error,

    /// A mnemonic or a register name. Which one is decided by its position on the line.
    #[regex("[A-Za-z_][A-Za-z0-9_]*", Lexer::slice)]
    Word(&'a str),

    /// A non-negative decimal or `0x` prefixed hexadecimal number.
    #[regex("[0-9]+", decimal_callback)]
    #[regex("0[xX][0-9a-fA-F]+", hexadecimal_callback)]
    Number(u64),

    /// Token (`,`) that can be used to separate the operands of an instruction.
    #[token(",")]
    Separator,
}

fn decimal_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<u64, std::num::ParseIntError> {
    lex.slice().parse()
}

fn hexadecimal_callback<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<u64, std::num::ParseIntError> {
    u64::from_str_radix(&lex.slice()[2..], 16)
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Word(word) => write!(f, "{}", word),
            Token::Number(num) => write!(f, "{}", num),
            Token::Separator => write!(f, ","),
        }
    }
}
