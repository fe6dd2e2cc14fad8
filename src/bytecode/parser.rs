use std::fmt;
use std::result::Result as StdResult;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{take_while, take_while_m_n},
    character::complete::{char, line_ending, not_line_ending},
    combinator::{map_res, opt},
    error::{context, ErrorKind as NomErrorKind, ParseError as _},
    sequence::{delimited, preceded, terminated, tuple},
};

use super::program::Program;

/// The bit-string format has no failure modes beyond the generic ones reported by `nom`.
#[derive(Debug, Clone)]
pub enum ErrorKind {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, _f: &mut fmt::Formatter) -> fmt::Result {
        match *self {}
    }
}

pub type ParseError = crate::error::ParseError<ErrorKind>;
type Result<'a, T> = IResult<&'a str, T, ParseError>;

const SPACE_CHARACTERS: &str = " \t";

fn sp(input: &str) -> Result<&str> {
    take_while(|c: char| SPACE_CHARACTERS.contains(c))(input)
}

fn end_of_input(input: &str) -> Result<&str> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        Err(nom::Err::Error(ParseError::from_error_kind(input, NomErrorKind::Eof)))
    }
}

fn comment(input: &str) -> Result<&str> {
    preceded(char(';'), not_line_ending)(input)
}

fn take_word(input: &str) -> Result<u32> {
    context(
        "word",
        map_res(
            take_while_m_n(32, 32, |c: char| c == '0' || c == '1'),
            |bits| u32::from_str_radix(bits, 2),
        ),
    )(input)
}

/// A line holding at most one word, optionally followed by a comment.
fn take_line(input: &str) -> Result<Option<u32>> {
    terminated(
        delimited(sp, opt(take_word), tuple((sp, opt(comment)))),
        alt((line_ending, end_of_input)),
    )(input)
}

fn parse_program_text_nom(mut input: &str) -> Result<Vec<u32>> {
    let mut words = Vec::new();

    while !input.is_empty() {
        let (rest, word) = take_line(input)?;
        words.extend(word);
        input = rest;
    }

    Ok((input, words))
}

pub(crate) fn parse_program_text(input: &str) -> StdResult<Program, ParseError> {
    match parse_program_text_nom(input) {
        Ok((_, words)) => Ok(Program::from(words)),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::incomplete()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_comments() {
        let text = "; gcd\n00000000000000010000000000000011 ; CARGAR R0 3\n\n  00000000000000000000000000000000\r\n";

        let program = parse_program_text(text).unwrap();

        assert_eq!(program.words(), &[65539, 0]);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let program = parse_program_text("00000000000000000000000000000101").unwrap();
        assert_eq!(program.words(), &[5]);
    }

    #[test]
    fn test_parse_errors() {
        let text = "00000000000000000000000000000000\n0101\n";
        let err = parse_program_text(text).unwrap_err().verbose(text);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 1);

        let text = "000000000000000000000000000000001\n";
        let err = parse_program_text(text).unwrap_err().verbose(text);
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 33);

        assert!(parse_program_text("CARGAR R0 3").is_err());
    }
}
