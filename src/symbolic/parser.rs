//! Parser turning a single assembly line into an [Instruction].

use std::fmt;
use std::iter::Peekable;
use std::ops::Range;

use edit_distance::edit_distance;
use logos::{Logos, SpannedIter};

use super::token::Token;
use crate::instruction::{Format, Instruction, OpCode, Register, MAX_FIELD};

/// Reason why a line could not be assembled.
#[derive(Clone, Debug, PartialEq)]
pub enum AssemblyErrorKind {
    /// The line does not begin with a mnemonic.
    MissingOperation,

    /// The mnemonic is not part of the instruction set.
    UnknownOperation {
        mnemonic: String,

        /// The closest known mnemonic, if any is close enough.
        suggestion: Option<&'static str>,
    },

    /// A register operand is not one of `R0`-`R7`.
    UnknownRegister {
        name: String,
    },

    /// The line ended before all operands of the operation were given.
    MissingOperand {
        operation: OpCode,
        expected: &'static str,
    },

    UnexpectedToken {
        token: String,
    },

    /// An address or immediate operand does not fit into the 11-bit field.
    OperandOutOfRange {
        value: u64,
    },
}

impl fmt::Display for AssemblyErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssemblyErrorKind::MissingOperation => write!(f, "expected an operation"),
            AssemblyErrorKind::UnknownOperation { mnemonic, suggestion: Some(suggestion) } => {
                write!(f, "unknown operation '{}', did you mean '{}'?", mnemonic, suggestion)
            }
            AssemblyErrorKind::UnknownOperation { mnemonic, suggestion: None } => {
                write!(f, "unknown operation '{}'", mnemonic)
            }
            AssemblyErrorKind::UnknownRegister { name } => write!(f, "unknown register '{}'", name),
            AssemblyErrorKind::MissingOperand { operation, expected } => {
                write!(f, "operation {} expects {} as an operand", operation, expected)
            }
            AssemblyErrorKind::UnexpectedToken { token } => write!(f, "unexpected '{}'", token),
            AssemblyErrorKind::OperandOutOfRange { value } => write!(
                f,
                "operand {} does not fit into the field (maximum {})",
                value, MAX_FIELD,
            ),
        }
    }
}

/// An error on a specific line of the assembly source.
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyError {
    /// One-based line number.
    pub line: usize,
    pub kind: AssemblyErrorKind,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for AssemblyError {}

type Result<T> = std::result::Result<T, AssemblyErrorKind>;

/// Finds the mnemonic closest to `mnemonic`, ignoring case, within an edit distance of two.
fn suggest(mnemonic: &str) -> Option<&'static str> {
    let mnemonic = mnemonic.to_uppercase();

    OpCode::ALL
        .iter()
        .map(|opcode| opcode.mnemonic())
        .map(|candidate| (edit_distance(&mnemonic, candidate), candidate))
        .filter(|(distance, _)| *distance <= 2)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

struct LineParser<'a> {
    source: &'a str,
    tokens: Peekable<SpannedIter<'a, Token<'a>>>,
}

impl<'a> LineParser<'a> {
    fn new(source: &'a str) -> LineParser<'a> {
        LineParser {
            source,
            tokens: Token::lexer(source).spanned().peekable(),
        }
    }

    fn unexpected(&self, span: Range<usize>) -> AssemblyErrorKind {
        AssemblyErrorKind::UnexpectedToken {
            token: self.source[span].to_string(),
        }
    }

    fn take_operation(&mut self) -> Result<Option<OpCode>> {
        match self.tokens.next() {
            None => Ok(None),
            Some((Token::Word(mnemonic), _)) => match mnemonic.parse() {
                Ok(opcode) => Ok(Some(opcode)),
                Err(()) => Err(AssemblyErrorKind::UnknownOperation {
                    mnemonic: mnemonic.to_string(),
                    suggestion: suggest(mnemonic),
                }),
            },
            Some((Token::Error, span)) => Err(self.unexpected(span)),
            Some(_) => Err(AssemblyErrorKind::MissingOperation),
        }
    }

    /// Consumes the `,` between two operands, if there is one.
    fn take_separator(&mut self) {
        if let Some((Token::Separator, _)) = self.tokens.peek() {
            self.tokens.next();
        }
    }

    fn take_register(&mut self, operation: OpCode) -> Result<Register> {
        match self.tokens.next() {
            Some((Token::Word(name), _)) => name
                .parse()
                .map_err(|()| AssemblyErrorKind::UnknownRegister { name: name.to_string() }),
            Some((_, span)) => Err(self.unexpected(span)),
            None => Err(AssemblyErrorKind::MissingOperand {
                operation,
                expected: "a register",
            }),
        }
    }

    fn take_field(&mut self, operation: OpCode, expected: &'static str) -> Result<u16> {
        match self.tokens.next() {
            Some((Token::Number(value), _)) if value <= MAX_FIELD as u64 => Ok(value as u16),
            Some((Token::Number(value), _)) => Err(AssemblyErrorKind::OperandOutOfRange { value }),
            Some((_, span)) => Err(self.unexpected(span)),
            None => Err(AssemblyErrorKind::MissingOperand { operation, expected }),
        }
    }

    fn finish(&mut self) -> Result<()> {
        match self.tokens.next() {
            None => Ok(()),
            Some((_, span)) => Err(self.unexpected(span)),
        }
    }

    fn parse(&mut self) -> Result<Option<Instruction>> {
        let opcode = match self.take_operation()? {
            Some(opcode) => opcode,
            None => return Ok(None),
        };

        let ins = match opcode.format() {
            None => Instruction::halt(),
            Some(Format::RegisterMemory) => {
                let register = self.take_register(opcode)?;
                self.take_separator();
                let address = self.take_field(opcode, "an address")?;
                Instruction::with_field(opcode, register, address)
            }
            Some(Format::RegisterImmediate) => {
                let register = self.take_register(opcode)?;
                self.take_separator();
                let value = self.take_field(opcode, "a value")?;
                Instruction::with_field(opcode, register, value)
            }
            Some(Format::Jump) => {
                let address = self.take_field(opcode, "an address")?;
                Instruction::with_field(opcode, Register::R0, address)
            }
            Some(Format::RegisterRegister) => {
                let first = self.take_register(opcode)?;
                self.take_separator();

                // NOT only reads its first operand.
                let second = if opcode == OpCode::Not && self.tokens.peek().is_none() {
                    Register::R0
                } else {
                    self.take_register(opcode)?
                };

                Instruction::with_registers(opcode, first, second)
            }
        };

        self.finish()?;

        Ok(Some(ins))
    }
}

/// Parses one line of assembly.
///
/// # Returns
/// `Ok(None)` for blank and comment-only lines, otherwise the instruction on the line.
///
/// # Errors
/// The error reports `line_number` as the location.
pub fn parse_line(source: &str, line_number: usize) -> std::result::Result<Option<Instruction>, AssemblyError> {
    LineParser::new(source)
        .parse()
        .map_err(|kind| AssemblyError {
            line: line_number,
            kind,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::instruction::JumpCondition;

    fn parse(source: &str) -> std::result::Result<Option<Instruction>, AssemblyErrorKind> {
        parse_line(source, 1).map_err(|err| err.kind)
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!(
            parse("CARGAR R0 512"),
            Ok(Some(Instruction::with_field(OpCode::Load, Register::R0, 512))),
        );
        assert_eq!(
            parse("ROTACIONR R7, 0x1F"),
            Ok(Some(Instruction::with_field(OpCode::RotateRight, Register::R7, 31))),
        );
        assert_eq!(
            parse("  SALTARSINODES 2047 ; loop"),
            Ok(Some(Instruction::jump(JumpCondition::NoOverflow, 2047))),
        );
        assert_eq!(
            parse("INTERCAMBIAR R1,R2"),
            Ok(Some(Instruction::with_registers(OpCode::Swap, Register::R1, Register::R2))),
        );
        assert_eq!(parse("PARAR"), Ok(Some(Instruction::halt())));
    }

    #[test]
    fn test_parse_not() {
        assert_eq!(
            parse("NOT R3"),
            Ok(Some(Instruction::with_registers(OpCode::Not, Register::R3, Register::R0))),
        );
        assert_eq!(
            parse("NOT R3 R5"),
            Ok(Some(Instruction::with_registers(OpCode::Not, Register::R3, Register::R5))),
        );
    }

    #[test]
    fn test_parse_empty_lines() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   \t"), Ok(None));
        assert_eq!(parse("; only a comment"), Ok(None));
    }

    #[test]
    fn test_unknown_operation() {
        assert_eq!(
            parse("SUMA R0 R1"),
            Err(AssemblyErrorKind::UnknownOperation {
                mnemonic: "SUMA".to_string(),
                suggestion: Some("SUMAR"),
            }),
        );
        assert_eq!(
            parse("HELLO"),
            Err(AssemblyErrorKind::UnknownOperation {
                mnemonic: "HELLO".to_string(),
                suggestion: None,
            }),
        );
    }

    #[test]
    fn test_operand_errors() {
        assert_eq!(
            parse("CARGAR R8 3"),
            Err(AssemblyErrorKind::UnknownRegister { name: "R8".to_string() }),
        );
        assert_eq!(
            parse("CARGARVALOR R1 2048"),
            Err(AssemblyErrorKind::OperandOutOfRange { value: 2048 }),
        );
        assert_eq!(
            parse("COPIAR R1"),
            Err(AssemblyErrorKind::MissingOperand {
                operation: OpCode::Copy,
                expected: "a register",
            }),
        );
        assert_eq!(
            parse("SALTAR"),
            Err(AssemblyErrorKind::MissingOperand {
                operation: OpCode::Jump(JumpCondition::Always),
                expected: "an address",
            }),
        );
        assert_eq!(
            parse("PARAR R0"),
            Err(AssemblyErrorKind::UnexpectedToken { token: "R0".to_string() }),
        );
        assert_eq!(
            parse("LSL R1 -2"),
            Err(AssemblyErrorKind::UnexpectedToken { token: "-".to_string() }),
        );
        assert_eq!(parse("12 R1"), Err(AssemblyErrorKind::MissingOperation));
    }

    #[test]
    fn test_error_display() {
        let err = parse_line("SUMA R0 R1", 4).unwrap_err();
        assert_eq!(err.to_string(), "line 4: unknown operation 'SUMA', did you mean 'SUMAR'?");
    }
}
