//! Error type shared by the `nom` parsers of the crate.

use std::fmt::{self, Display};

use nom::error::ErrorKind;

/// Longest excerpt of the remaining input included in error messages.
const EXCERPT_LENGTH: usize = 20;

#[derive(Debug, Clone)]
enum InnerError<Kind> {
    Incomplete,
    Context(&'static str),
    Other(Kind),
    Nom(ErrorKind),
}

impl<Kind: Display> fmt::Display for InnerError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InnerError::Context(ctx) => write!(f, "invalid {}", ctx),
            InnerError::Nom(_err) => write!(f, "unexpected input"),
            InnerError::Other(op) => fmt::Display::fmt(op, f),
            InnerError::Incomplete => write!(f, "expected more input"),
        }
    }
}

/// Returns the start of `input` up to the end of the line, at most [EXCERPT_LENGTH] characters.
fn excerpt(input: &str) -> &str {
    let end = input
        .char_indices()
        .take(EXCERPT_LENGTH)
        .find(|(_, c)| *c == '\n' || *c == '\r')
        .map(|(i, _)| i)
        .or_else(|| input.char_indices().nth(EXCERPT_LENGTH).map(|(i, _)| i))
        .unwrap_or_else(|| input.len());

    &input[..end]
}

/// Error type that contains the reason of the error and the unconsumed input.
///
/// For error location information see [ParseError::verbose].
#[derive(Clone, Debug)]
pub struct ParseError<Kind> {
    stack: Vec<(String, InnerError<Kind>)>,
}

impl<Kind> ParseError<Kind> {
    pub fn from_kind(input: &str, kind: Kind) -> ParseError<Kind> {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Other(kind))],
        }
    }

    pub(crate) fn incomplete() -> ParseError<Kind> {
        ParseError {
            stack: vec![(String::new(), InnerError::Incomplete)],
        }
    }
}

/// Error type containing location information in addition to the reason of the error.
///
/// Created from a [ParseError] with [ParseError::verbose].
#[derive(Clone, Debug)]
pub struct VerboseParseError<'a, Kind> {
    /// The line number of the error location.
    pub line: usize,
    /// The column number of the error location.
    pub column: usize,
    kind: InnerError<Kind>,
    rest: &'a str,
}

impl<'a, Kind: Display> fmt::Display for VerboseParseError<'a, Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "at line {} col {}: {}, at '{}'", self.line, self.column, self.kind, self.rest)
    }
}

impl<Kind> ParseError<Kind> {
    /// Calculates the error location information from the [ParseError] and the original input
    /// buffer.
    ///
    /// # Parameters
    /// - `input`: The original input buffer or an exact copy of it.
    pub fn verbose(self, input: &str) -> VerboseParseError<Kind> {
        let (rest, kind) = self
            .stack
            .into_iter()
            .next()
            .unwrap_or((String::new(), InnerError::Incomplete));

        let start = input.len().saturating_sub(rest.len());
        let consumed = &input[..start];

        let line = consumed.matches('\n').count() + 1;
        let column = match consumed.rfind('\n') {
            Some(newline) => consumed[newline + 1..].chars().count() + 1,
            None => consumed.chars().count() + 1,
        };

        VerboseParseError {
            line,
            column,
            kind,
            rest: excerpt(&input[start..]),
        }
    }
}

impl<Kind: Display> fmt::Display for ParseError<Kind> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.stack.first() {
            Some((input, kind)) => write!(f, "{} at: {}", kind, excerpt(input)),
            None => write!(f, "unknown parse error"),
        }
    }
}

impl<Kind: Display + fmt::Debug> std::error::Error for ParseError<Kind> {}

impl<Kind> nom::error::ParseError<&str> for ParseError<Kind> {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError {
            stack: vec![(input.to_string(), InnerError::Nom(kind))],
        }
    }

    fn append(input: &str, kind: ErrorKind, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Nom(kind)));
        other
    }

    fn add_context(input: &str, ctx: &'static str, mut other: Self) -> Self {
        other.stack.push((input.to_string(), InnerError::Context(ctx)));
        other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_location() {
        let input = "first\nsecond line\nthird";
        let rest = &input[input.find("line").unwrap()..];

        let err = ParseError::from_kind(rest, "bad");
        let verbose = err.verbose(input);

        assert_eq!(verbose.line, 2);
        assert_eq!(verbose.column, 8);
        assert_eq!(verbose.to_string(), "at line 2 col 8: bad, at 'line'");
    }

    #[test]
    fn test_excerpt_is_clipped() {
        assert_eq!(excerpt("abc\ndef"), "abc");
        assert_eq!(excerpt(&"x".repeat(50)), "x".repeat(20));
        assert_eq!(excerpt("short"), "short");
    }
}
