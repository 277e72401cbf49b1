use regex::Regex;

use crate::error::Result;

pub const BEGIN_SECTION_PATTERN: &str = r"^R$";
pub const AMOUNT_PATTERN: &str = r"^(?:[+-][0-9]+\.?[0-9]*|[0-9]*\.[0-9]+)$";
pub const END_SECTION_PATTERN: &str = r"^W$";

/// What one input line means
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    BeginSection,
    Amount(f64),
    EndSection,
}

/// Compiled line patterns. Built once at startup and shared by every worker
#[derive(Debug, Clone)]
pub struct Grammar {
    begin: Regex,
    amount: Regex,
    end: Regex,
}

impl Grammar {
    pub fn new() -> Result<Self> {
        Ok(Grammar {
            begin: Regex::new(BEGIN_SECTION_PATTERN)?,
            amount: Regex::new(AMOUNT_PATTERN)?,
            end: Regex::new(END_SECTION_PATTERN)?,
        })
    }

    /// Tokenizes `line`. Returns None for anything outside the grammar
    pub fn classify(&self, line: &str) -> Option<Token> {
        if self.begin.is_match(line) {
            Some(Token::BeginSection)
        } else if self.end.is_match(line) {
            Some(Token::EndSection)
        } else if self.amount.is_match(line) {
            line.parse::<f64>().ok().map(Token::Amount)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        let grammar = Grammar::new().unwrap();
        assert_eq!(grammar.classify("R"), Some(Token::BeginSection));
        assert_eq!(grammar.classify("W"), Some(Token::EndSection));
        assert_eq!(grammar.classify(" R"), None);
        assert_eq!(grammar.classify("RW"), None);
    }

    #[test]
    fn amounts() {
        let grammar = Grammar::new().unwrap();
        assert_eq!(grammar.classify("+100.00"), Some(Token::Amount(100.0)));
        assert_eq!(grammar.classify("-150.25"), Some(Token::Amount(-150.25)));
        assert_eq!(grammar.classify("+7"), Some(Token::Amount(7.0)));
        assert_eq!(grammar.classify("-3."), Some(Token::Amount(-3.0)));
        assert_eq!(grammar.classify(".5"), Some(Token::Amount(0.5)));
        assert_eq!(grammar.classify("12.75"), Some(Token::Amount(12.75)));
    }

    #[test]
    fn rejects_garbage() {
        let grammar = Grammar::new().unwrap();
        for line in ["abc", "", "100", "+", "+1.2.3", "--5", "+5 ", "1e5"] {
            assert_eq!(grammar.classify(line), None, "line {:?}", line);
        }
    }
}
