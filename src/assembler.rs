//! Assembly from mnemonic source to words.

use std::fmt;

use itertools::Itertools;
use slog::{o, trace, Discard, Logger};

use crate::bytecode::Program;
use crate::symbolic::{parse_line, AssemblyError, AssemblyErrorKind};

/// Every error found while assembling a program, in line order.
#[derive(Clone, Debug, PartialEq)]
pub struct AssemblyErrors {
    pub errors: Vec<AssemblyError>,
}

impl fmt::Display for AssemblyErrors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.errors.iter().join("\n"))
    }
}

impl std::error::Error for AssemblyErrors {}

/// Assembles a single line into a word.
///
/// # Errors
/// Blank and comment-only lines are rejected with [AssemblyErrorKind::MissingOperation], since
/// they produce no word.
pub fn assemble_line(line: &str) -> Result<u32, AssemblyError> {
    match parse_line(line, 1)? {
        Some(ins) => Ok(ins.into()),
        None => Err(AssemblyError {
            line: 1,
            kind: AssemblyErrorKind::MissingOperation,
        }),
    }
}

/// Assembles a program, one word per instruction line.
///
/// See [assemble_with_logger].
pub fn assemble(source: &str) -> Result<Program, AssemblyErrors> {
    assemble_with_logger(source, None)
}

/// Assembles a program, one word per instruction line.
///
/// Blank and comment-only lines are skipped. The whole source is checked even after an error,
/// and no program is produced unless every line assembles.
pub fn assemble_with_logger<L>(source: &str, logger: L) -> Result<Program, AssemblyErrors>
where
    L: Into<Option<Logger>>,
{
    let logger = logger
        .into()
        .unwrap_or(Logger::root(Discard, o!()))
        .new(o!("stage" => "assembly"));

    let mut words = Vec::new();
    let mut errors = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;

        match parse_line(line, line_number) {
            Ok(Some(ins)) => {
                let word: u32 = ins.into();
                trace!(logger, "assemble"; "line" => line_number, "instruction" => %ins, "word" => word);
                words.push(word);
            }
            Ok(None) => (),
            Err(err) => {
                trace!(logger, "assembly error"; "line" => line_number, "error" => %err.kind);
                errors.push(err);
            }
        }
    }

    if !errors.is_empty() {
        return Err(AssemblyErrors { errors });
    }

    Ok(Program::from(words))
}
