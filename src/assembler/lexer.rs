//! Lexical analysis for assembly source lines
//!
//! This module provides the first phase of assembly: converting one source line
//! into a stream of typed tokens. The lexer separates character-level concerns
//! (what is a number? where does a comment start?) from syntactic analysis (is
//! this a valid instruction?).
//!
//! # Architecture
//!
//! 1. **Tokenization** ([`tokenize`]): Converts line text into a [`Token`] vector
//! 2. **Consumption** ([`TokenStream`]): The parser navigates tokens with lookahead
//!
//! **Lexer responsibilities:**
//! - Recognize token boundaries and classify tokens ([`TokenType`])
//! - Parse numeric literals (`$42` → `HexNumber(0x42)`, `%1010` → `BinaryNumber(10)`)
//! - Track columns for error reporting
//! - Detect lexical errors (invalid hex digits, number overflow)
//!
//! **Parser responsibilities** (see [`parser`](super::parser)):
//! - Label, directive and operand syntax
//!
//! Identifiers keep their case: labels are case-sensitive, and the parser
//! upper-cases mnemonics itself.
//!
//! # Examples
//!
//! ```
//! use sim6502::assembler::lexer::{tokenize, TokenType};
//!
//! let tokens = tokenize("loop: LDA #$42 ; load").unwrap();
//!
//! assert_eq!(tokens[0].token_type, TokenType::Identifier("loop".to_string()));
//! assert_eq!(tokens[1].token_type, TokenType::Colon);
//! assert_eq!(tokens[5].token_type, TokenType::Hash);
//! assert_eq!(tokens[6].token_type, TokenType::HexNumber(0x42));
//! ```

use thiserror::Error;

/// Lexical errors, reported with the 0-indexed column they start at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    #[error("invalid hex digit '{ch}' at column {column}")]
    InvalidHexDigit { ch: char, column: usize },

    #[error("expected hex digits after '$' at column {column}")]
    MissingHexDigits { column: usize },

    #[error("invalid binary digit '{ch}' at column {column}")]
    InvalidBinaryDigit { ch: char, column: usize },

    #[error("expected binary digits after '%' at column {column}")]
    MissingBinaryDigits { column: usize },

    #[error("number {value} is too large at column {column}")]
    NumberTooLarge { value: String, column: usize },

    #[error("unexpected character '{ch}' at column {column}")]
    UnexpectedCharacter { ch: char, column: usize },
}

/// Single-character token types (operators and punctuation)
#[derive(Debug, Clone, Copy, PartialEq)]
enum SingleCharTokenType {
    Colon,
    Comma,
    Hash,
    Equal,
    LParen,
    RParen,
    Less,
    Greater,
    Star,
}

impl SingleCharTokenType {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            ':' => Some(Self::Colon),
            ',' => Some(Self::Comma),
            '#' => Some(Self::Hash),
            '=' => Some(Self::Equal),
            '(' => Some(Self::LParen),
            ')' => Some(Self::RParen),
            '<' => Some(Self::Less),
            '>' => Some(Self::Greater),
            '*' => Some(Self::Star),
            _ => None,
        }
    }

    fn to_token_type(self) -> TokenType {
        match self {
            Self::Colon => TokenType::Colon,
            Self::Comma => TokenType::Comma,
            Self::Hash => TokenType::Hash,
            Self::Equal => TokenType::Equal,
            Self::LParen => TokenType::LParen,
            Self::RParen => TokenType::RParen,
            Self::Less => TokenType::Less,
            Self::Greater => TokenType::Greater,
            Self::Star => TokenType::Star,
        }
    }
}

/// Classification of lexical tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    /// Mnemonics, labels, directive names and index registers (case preserved)
    Identifier(String),

    /// Decimal number literal
    DecimalNumber(u64),
    /// Hexadecimal number literal with `$` prefix
    HexNumber(u64),
    /// Binary number literal with `%` prefix
    BinaryNumber(u64),

    /// `:` label definition suffix
    Colon,
    /// `,` list separator and index marker
    Comma,
    /// `#` immediate mode prefix
    Hash,
    /// `=` in origin directives
    Equal,
    /// `(` indirect addressing open
    LParen,
    /// `)` indirect addressing close
    RParen,
    /// `<` low limb of a label address
    Less,
    /// `>` high limb of a label address
    Greater,
    /// `*` the location counter in origin directives
    Star,

    /// Spaces, tabs and stray carriage returns
    Whitespace,
    /// Comment text after `;` (excluding the `;`)
    Comment(String),
    /// End of line marker
    Eof,
}

impl TokenType {
    /// Numeric value of a number token.
    pub fn number(&self) -> Option<u64> {
        match self {
            TokenType::DecimalNumber(value)
            | TokenType::HexNumber(value)
            | TokenType::BinaryNumber(value) => Some(*value),
            _ => None,
        }
    }
}

/// A single lexical token with type, value, and source column
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,

    /// Column offset within the line (0-indexed)
    pub column: usize,

    /// Character span (for error highlighting)
    pub length: usize,
}

/// Lexer state for converting a line into tokens
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current = chars.next();
        Lexer {
            source,
            chars,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn peek(&self) -> Option<char> {
        self.current.map(|(_, ch)| ch)
    }

    fn column(&self) -> usize {
        match self.current {
            Some((pos, _)) => pos,
            None => self.source.len(),
        }
    }

    /// Scan an identifier: [a-zA-Z_][a-zA-Z0-9_]*
    fn scan_identifier(&mut self, start_col: usize) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token {
            length: identifier.len(),
            token_type: TokenType::Identifier(identifier),
            column: start_col,
        }
    }

    /// Scan a number literal. `prefix` is the `$` or `%` already consumed, if any.
    fn scan_number(&mut self, start_col: usize, prefix: Option<char>) -> Result<Token, LexerError> {
        let radix = match prefix {
            Some('$') => 16,
            Some('%') => 2,
            _ => 10,
        };

        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                digits.push(ch);
                self.advance();
            } else if radix != 10 && (ch.is_ascii_alphanumeric() || ch == '_') {
                let column = self.column();
                return Err(match radix {
                    16 => LexerError::InvalidHexDigit { ch, column },
                    _ => LexerError::InvalidBinaryDigit { ch, column },
                });
            } else {
                break;
            }
        }

        if digits.is_empty() {
            let column = self.column();
            return Err(match radix {
                16 => LexerError::MissingHexDigits { column },
                _ => LexerError::MissingBinaryDigits { column },
            });
        }

        let literal: String = prefix.into_iter().chain(digits.chars()).collect();
        let value = u64::from_str_radix(&digits, radix).map_err(|_| LexerError::NumberTooLarge {
            value: literal.clone(),
            column: start_col,
        })?;

        let token_type = match radix {
            16 => TokenType::HexNumber(value),
            2 => TokenType::BinaryNumber(value),
            _ => TokenType::DecimalNumber(value),
        };

        Ok(Token {
            token_type,
            column: start_col,
            length: literal.len(),
        })
    }

    /// Scan a comment: everything after `;` to the end of the line
    fn scan_comment(&mut self, start_col: usize) -> Token {
        let mut comment = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            comment.push(ch);
            self.advance();
        }

        let length = comment.len() + 1;

        Token {
            token_type: TokenType::Comment(comment),
            column: start_col,
            length,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let start_col = self.column();

        match ch {
            ' ' | '\t' | '\r' => {
                let mut whitespace_len = 0;
                while let Some(' ' | '\t' | '\r') = self.peek() {
                    whitespace_len += 1;
                    self.advance();
                }
                Ok(Some(Token {
                    token_type: TokenType::Whitespace,
                    column: start_col,
                    length: whitespace_len,
                }))
            }

            ';' => {
                self.advance();
                Ok(Some(self.scan_comment(start_col)))
            }

            '$' | '%' => {
                self.advance();
                Ok(Some(self.scan_number(start_col, Some(ch))?))
            }

            '0'..='9' => Ok(Some(self.scan_number(start_col, None)?)),

            'a'..='z' | 'A'..='Z' | '_' => Ok(Some(self.scan_identifier(start_col))),

            _ => match SingleCharTokenType::from_char(ch) {
                Some(token_type) => {
                    self.advance();
                    Ok(Some(Token {
                        token_type: token_type.to_token_type(),
                        column: start_col,
                        length: 1,
                    }))
                }
                None => Err(LexerError::UnexpectedCharacter {
                    ch,
                    column: start_col,
                }),
            },
        }
    }
}

/// Tokenize one line of assembly source.
///
/// Returns every lexical error found; the lexer skips to the next whitespace or
/// comment after each one so later errors are reported too.
///
/// ```
/// use sim6502::assembler::lexer::tokenize;
///
/// let tokens = tokenize("LDA #$42").unwrap();
/// assert_eq!(tokens.len(), 5); // LDA, whitespace, #, $42, EOF
///
/// let errors = tokenize("LDA $ZZ").unwrap_err();
/// assert_eq!(errors.len(), 1);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<LexerError>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {
                tokens.push(Token {
                    token_type: TokenType::Eof,
                    column: lexer.column(),
                    length: 0,
                });
                break;
            }
            Err(err) => {
                errors.push(err);
                lexer.advance();
                while let Some(ch) = lexer.peek() {
                    if matches!(ch, ' ' | '\t' | '\r' | ';') {
                        break;
                    }
                    lexer.advance();
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

/// Token stream with lookahead capability for parser consumption
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream {
            tokens,
            position: 0,
        }
    }

    /// Peek at the current token without consuming it
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Peek ahead n tokens without consuming them. `peek_n(0)` is `peek()`.
    #[must_use]
    pub fn peek_n(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    /// Advance the stream position by one token without returning it
    pub fn advance(&mut self) -> bool {
        if self.position < self.tokens.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Consume and return the current token, advancing the stream
    pub fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Skip all whitespace tokens
    pub fn skip_whitespace(&mut self) {
        while let Some(token) = self.peek() {
            match token.token_type {
                TokenType::Whitespace => self.position += 1,
                _ => break,
            }
        }
    }

    /// True at the end of the line: EOF, a comment, or past the last token.
    #[must_use]
    pub fn at_line_end(&self) -> bool {
        match self.peek() {
            Some(token) => matches!(token.token_type, TokenType::Eof | TokenType::Comment(_)),
            None => true,
        }
    }

    /// Column of the current token, for error reporting.
    #[must_use]
    pub fn current_column(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|token| token.column)
            .unwrap_or(0)
    }
}
