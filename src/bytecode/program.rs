use std::fmt;

use super::parser::{parse_program_text, ParseError};

/// Formats `word` as 32 `0`/`1` characters, most significant bit first.
pub fn word_to_bits(word: u32) -> String {
    format!("{:032b}", word)
}

/// Reads a word from its bit string. Returns `None` unless `bits` is exactly 32 `0`/`1`
/// characters.
pub fn word_from_bits(bits: &str) -> Option<u32> {
    if bits.len() != 32 || !bits.chars().all(|c| c == '0' || c == '1') {
        return None;
    }

    u32::from_str_radix(bits, 2).ok()
}

/// An assembled program: the words in the order they will be placed into memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    words: Vec<u32>,
}

impl Program {
    /// Parses the bit-string text form. Blank lines and `;` comments are ignored.
    pub fn parse(text: &str) -> Result<Program, ParseError> {
        parse_program_text(text)
    }

    pub fn words(&self) -> &[u32] {
        &self.words[..]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn to_bitstrings(&self) -> Vec<String> {
        self.words.iter().map(|word| word_to_bits(*word)).collect()
    }
}

impl From<Vec<u32>> for Program {
    fn from(words: Vec<u32>) -> Program {
        Program { words }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{}", word_to_bits(*word))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_bits() {
        assert_eq!(word_to_bits(0), "0".repeat(32));
        assert_eq!(word_to_bits(65536 | (3 << 11) | 3), "00000000000000010001100000000011");

        assert_eq!(word_from_bits("00000000000000010001100000000011"), Some(65536 | (3 << 11) | 3));
        assert_eq!(word_from_bits(&"1".repeat(32)), Some(u32::max_value()));
        assert_eq!(word_from_bits("0101"), None);
        assert_eq!(word_from_bits(&"2".repeat(32)), None);
    }

    #[test]
    fn test_display_matches_bitstrings() {
        let program = Program::from(vec![1, 0x8000_0000, 0]);

        assert_eq!(program.to_bitstrings().len(), 3);
        assert_eq!(program.to_string(), program.to_bitstrings().join("\n") + "\n");
        assert_eq!(Program::parse(&program.to_string()).unwrap(), program);
    }
}
