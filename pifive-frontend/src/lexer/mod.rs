//! Python-subset Lexer
//!
//! Tokenizes source text into a stream of tokens. Besides keywords,
//! operators, literals and identifiers it turns leading whitespace into
//! `Indent`/`Dedent` tokens and ends every logical line with `Newline`.
//! Blank lines, comment-only lines and newlines inside parentheses produce
//! no tokens.

pub mod token;

pub use token::{Token, TokenType};

use pifive_common::{CompilerError, SourceLocation, SourceTracker};
use std::collections::HashMap;

/// Width a tab advances the indentation column to (next multiple of 8)
const TAB_WIDTH: u32 = 8;

/// Indentation-aware lexer
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    tracker: SourceTracker,
    keywords: HashMap<&'static str, TokenType>,
    indent_stack: Vec<u32>,
    paren_depth: u32,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl Lexer {
    /// Create a lexer for input that has no file name
    pub fn new(input: &str) -> Self {
        Self::with_filename(input, "<input>")
    }

    /// Create a lexer whose locations name `filename`
    pub fn with_filename(input: &str, filename: &str) -> Self {
        let keywords = [
            ("def", TokenType::Def),
            ("return", TokenType::Return),
            ("if", TokenType::If),
            ("elif", TokenType::Elif),
            ("else", TokenType::Else),
            ("while", TokenType::While),
            ("pass", TokenType::Pass),
            ("True", TokenType::True),
            ("False", TokenType::False),
        ]
        .into_iter()
        .collect();

        Self {
            input: input.chars().collect(),
            position: 0,
            tracker: SourceTracker::new(filename),
            keywords,
            indent_stack: vec![0],
            paren_depth: 0,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.position += 1;
        self.tracker.advance(ch);
        Some(ch)
    }

    fn current_location(&self) -> SourceLocation {
        self.tracker.location()
    }

    fn push(&mut self, token_type: TokenType, start: SourceLocation) {
        let span = self.tracker.span_from(start);
        self.tokens.push(Token::new(token_type, span));
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Consume leading whitespace of a physical line and emit indentation
    /// tokens. Returns false when the line carries no tokens.
    fn handle_line_start(&mut self) -> Result<bool, CompilerError> {
        let mut width = 0u32;
        while let Some(ch) = self.current_char() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
                '\r' | '\x0c' => {}
                _ => break,
            }
            self.advance();
        }

        match self.current_char() {
            None => return Ok(false),
            Some('#') => {
                self.skip_comment();
                return Ok(false);
            }
            Some('\n') => {
                self.advance();
                return Ok(false);
            }
            _ => {}
        }

        let start = self.current_location();
        let current = self.indent_stack.last().copied().unwrap_or(0);
        if width > current {
            self.indent_stack.push(width);
            self.push(TokenType::Indent, start);
        } else {
            while self.indent_stack.last().copied().unwrap_or(0) > width {
                self.indent_stack.pop();
                self.push(TokenType::Dedent, start.clone());
            }
            if self.indent_stack.last().copied().unwrap_or(0) != width {
                return Err(CompilerError::lexer_error(
                    "unindent does not match any outer indentation level".to_string(),
                    start,
                ));
            }
        }
        Ok(true)
    }

    fn tokenize_identifier(&mut self) -> TokenType {
        let mut identifier = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match self.keywords.get(identifier.as_str()) {
            Some(keyword) => keyword.clone(),
            None => TokenType::Identifier(identifier),
        }
    }

    fn tokenize_integer(&mut self) -> Result<TokenType, CompilerError> {
        let start = self.current_location();
        let radix = match (self.current_char(), self.peek_char(1)) {
            (Some('0'), Some('x' | 'X')) => 16,
            (Some('0'), Some('o' | 'O')) => 8,
            (Some('0'), Some('b' | 'B')) => 2,
            _ => 10,
        };
        if radix != 10 {
            self.advance();
            self.advance();
        }

        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                digits.push(ch);
                self.advance();
            } else if ch == '_' {
                self.advance();
            } else if ch.is_alphanumeric() {
                return Err(CompilerError::lexer_error(
                    format!("invalid digit '{}' in integer literal", ch),
                    self.current_location(),
                ));
            } else {
                break;
            }
        }

        u64::from_str_radix(&digits, radix)
            .map(TokenType::IntLiteral)
            .map_err(|e| CompilerError::lexer_error(format!("invalid integer literal: {}", e), start))
    }

    fn tokenize_string(&mut self, quote: char) -> Result<TokenType, CompilerError> {
        let start = self.current_location();
        self.advance();
        let mut value = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    return Err(CompilerError::lexer_error(
                        "unterminated string literal".to_string(),
                        start,
                    ))
                }
                Some(ch) if ch == quote => break,
                Some('\\') => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('0') => value.push('\0'),
                    Some(other) => value.push(other),
                    None => {
                        return Err(CompilerError::lexer_error(
                            "unterminated string literal".to_string(),
                            start,
                        ))
                    }
                },
                Some(ch) => value.push(ch),
            }
        }
        Ok(TokenType::StringLiteral(value))
    }

    /// Consume `first` and pick the longest operator starting with it
    fn tokenize_operator(&mut self, first: char) -> Result<TokenType, CompilerError> {
        let location = self.current_location();
        self.advance();
        let next = self.current_char();
        let after = self.peek_char(1);

        let (token_type, extra) = match (first, next, after) {
            ('/', Some('/'), Some('=')) => (TokenType::SlashSlashEqual, 2),
            ('/', Some('/'), _) => (TokenType::SlashSlash, 1),
            ('/', Some('='), _) => (TokenType::SlashEqual, 1),
            ('/', _, _) => (TokenType::Slash, 0),
            ('<', Some('<'), Some('=')) => (TokenType::LeftShiftEqual, 2),
            ('<', Some('<'), _) => (TokenType::LeftShift, 1),
            ('<', Some('='), _) => (TokenType::LessEqual, 1),
            ('<', _, _) => (TokenType::Less, 0),
            ('>', Some('>'), Some('=')) => (TokenType::RightShiftEqual, 2),
            ('>', Some('>'), _) => (TokenType::RightShift, 1),
            ('>', Some('='), _) => (TokenType::GreaterEqual, 1),
            ('>', _, _) => (TokenType::Greater, 0),
            ('=', Some('='), _) => (TokenType::EqualEqual, 1),
            ('=', _, _) => (TokenType::Equal, 0),
            ('!', Some('='), _) => (TokenType::BangEqual, 1),
            ('+', Some('='), _) => (TokenType::PlusEqual, 1),
            ('+', _, _) => (TokenType::Plus, 0),
            ('-', Some('='), _) => (TokenType::MinusEqual, 1),
            ('-', _, _) => (TokenType::Minus, 0),
            ('*', Some('='), _) => (TokenType::StarEqual, 1),
            ('*', _, _) => (TokenType::Star, 0),
            ('%', Some('='), _) => (TokenType::PercentEqual, 1),
            ('%', _, _) => (TokenType::Percent, 0),
            ('&', Some('='), _) => (TokenType::AmpersandEqual, 1),
            ('&', _, _) => (TokenType::Ampersand, 0),
            ('|', Some('='), _) => (TokenType::PipeEqual, 1),
            ('|', _, _) => (TokenType::Pipe, 0),
            ('^', Some('='), _) => (TokenType::CaretEqual, 1),
            ('^', _, _) => (TokenType::Caret, 0),
            ('~', _, _) => (TokenType::Tilde, 0),
            ('(', _, _) => (TokenType::LeftParen, 0),
            (')', _, _) => (TokenType::RightParen, 0),
            (',', _, _) => (TokenType::Comma, 0),
            (':', _, _) => (TokenType::Colon, 0),
            (';', _, _) => (TokenType::Semicolon, 0),
            (other, _, _) => {
                return Err(CompilerError::lexer_error(
                    format!("unexpected character '{}'", other),
                    location,
                ))
            }
        };

        for _ in 0..extra {
            self.advance();
        }
        Ok(token_type)
    }

    /// Tokenize the whole input
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompilerError> {
        loop {
            if self.at_line_start && self.paren_depth == 0 {
                if self.current_char().is_none() {
                    break;
                }
                if !self.handle_line_start()? {
                    continue;
                }
                self.at_line_start = false;
            }

            let start = self.current_location();
            let token_type = match self.current_char() {
                None => break,
                Some(' ' | '\t' | '\r' | '\x0c') => {
                    self.advance();
                    continue;
                }
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some('\\') if self.peek_char(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                    continue;
                }
                Some('\n') => {
                    self.advance();
                    if self.paren_depth > 0 {
                        continue;
                    }
                    self.at_line_start = true;
                    TokenType::Newline
                }
                Some(ch) if ch.is_alphabetic() || ch == '_' => self.tokenize_identifier(),
                Some(ch) if ch.is_ascii_digit() => self.tokenize_integer()?,
                Some(quote @ ('"' | '\'')) => self.tokenize_string(quote)?,
                Some(ch) => {
                    let token_type = self.tokenize_operator(ch)?;
                    match token_type {
                        TokenType::LeftParen => self.paren_depth += 1,
                        TokenType::RightParen => self.paren_depth = self.paren_depth.saturating_sub(1),
                        _ => {}
                    }
                    token_type
                }
            };
            self.push(token_type, start);
        }

        let end = self.current_location();
        let needs_newline = self
            .tokens
            .last()
            .map_or(false, |t| !matches!(t.token_type, TokenType::Newline | TokenType::Dedent));
        if needs_newline {
            self.push(TokenType::Newline, end.clone());
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(TokenType::Dedent, end.clone());
        }
        self.tokens.push(Token::eof(end));

        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_types(source: &str) -> Vec<TokenType> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let tokens = token_types("def while return elif factorial True");
        assert_eq!(
            tokens,
            vec![
                TokenType::Def,
                TokenType::While,
                TokenType::Return,
                TokenType::Elif,
                TokenType::Identifier("factorial".to_string()),
                TokenType::True,
                TokenType::Newline,
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_longest_operator_match() {
        let tokens = token_types("a //= b << 2 <= c != d");
        assert_eq!(
            tokens,
            vec![
                TokenType::Identifier("a".to_string()),
                TokenType::SlashSlashEqual,
                TokenType::Identifier("b".to_string()),
                TokenType::LeftShift,
                TokenType::IntLiteral(2),
                TokenType::LessEqual,
                TokenType::Identifier("c".to_string()),
                TokenType::BangEqual,
                TokenType::Identifier("d".to_string()),
                TokenType::Newline,
                TokenType::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "def f(n):\n    if n:\n        return 1\n    return 2\n";
        let tokens = token_types(source);
        let indents = tokens.iter().filter(|t| **t == TokenType::Indent).count();
        let dedents = tokens.iter().filter(|t| **t == TokenType::Dedent).count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
        assert_eq!(tokens.last(), Some(&TokenType::EndOfFile));
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        let source = "x = 1\n\n   # just a comment\n\ny = 2  # trailing\n";
        let tokens = token_types(source);
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Newline).count(), 2);
        assert!(!tokens.contains(&TokenType::Indent));
    }

    #[test]
    fn test_newlines_inside_parentheses_are_joined() {
        let tokens = token_types("f(1,\n  2)\n");
        assert_eq!(tokens.iter().filter(|t| **t == TokenType::Newline).count(), 1);
        assert!(!tokens.contains(&TokenType::Indent));
    }

    #[test]
    fn test_missing_trailing_newline_closes_blocks() {
        let tokens = token_types("while x:\n    x = 0");
        let n = tokens.len();
        assert_eq!(tokens[n - 3], TokenType::Newline);
        assert_eq!(tokens[n - 2], TokenType::Dedent);
        assert_eq!(tokens[n - 1], TokenType::EndOfFile);
    }

    #[test]
    fn test_integer_radixes() {
        let tokens = token_types("0x1f 0b101 1_000");
        assert_eq!(tokens[0], TokenType::IntLiteral(31));
        assert_eq!(tokens[1], TokenType::IntLiteral(5));
        assert_eq!(tokens[2], TokenType::IntLiteral(1000));
    }

    #[test]
    fn test_integer_magnitude_up_to_u64() {
        let tokens = token_types("9223372036854775808");
        assert_eq!(tokens[0], TokenType::IntLiteral(1 << 63));
        assert!(Lexer::new("18446744073709551616").tokenize().is_err());
    }

    #[test]
    fn test_string_literal() {
        let tokens = token_types("print('hi\\n')");
        assert_eq!(tokens[2], TokenType::StringLiteral("hi\n".to_string()));
    }

    #[test]
    fn test_bad_dedent_is_an_error() {
        let result = Lexer::new("if x:\n        y = 1\n    z = 2\n").tokenize();
        assert!(matches!(result, Err(CompilerError::LexError { .. })));
    }

    #[test]
    fn test_unexpected_character() {
        let result = Lexer::new("x = $").tokenize();
        match result {
            Err(CompilerError::LexError { location, .. }) => {
                assert_eq!(location.line, 1);
                assert_eq!(location.column, 5);
            }
            other => panic!("expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_token_locations() {
        let tokens = Lexer::with_filename("x = 1\ny = 2\n", "prog.py").tokenize().unwrap();
        let y = &tokens[4];
        assert_eq!(y.token_type, TokenType::Identifier("y".to_string()));
        assert_eq!(y.span.start.to_string(), "prog.py:2:1");
    }
}
