//! Lexer (tokenizer) for C declarations and expressions
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! `#include` and other preprocessor directives are silently skipped rather than
//! parsed, and comments are dropped.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    CharLiteral(i8, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Type keywords
    Int(SourceLocation),
    Char(SourceLocation),
    Void(SourceLocation),
    Short(SourceLocation),
    Long(SourceLocation),
    Signed(SourceLocation),
    Unsigned(SourceLocation),
    Float(SourceLocation),
    Double(SourceLocation),
    Bool(SourceLocation),
    Struct(SourceLocation),
    Union(SourceLocation),
    Enum(SourceLocation),
    Typedef(SourceLocation),
    Const(SourceLocation),
    Volatile(SourceLocation),

    // Value keywords
    Null(SourceLocation),
    True(SourceLocation),
    False(SourceLocation),

    // Operators
    Plus(SourceLocation),  // +
    Minus(SourceLocation), // -
    Star(SourceLocation),  // *
    Amp(SourceLocation),   // &
    Eq(SourceLocation),    // =
    Dot(SourceLocation),   // .
    Arrow(SourceLocation), // ->
    Colon(SourceLocation), // :

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of input
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Int(loc)
            | Token::Char(loc)
            | Token::Void(loc)
            | Token::Short(loc)
            | Token::Long(loc)
            | Token::Signed(loc)
            | Token::Unsigned(loc)
            | Token::Float(loc)
            | Token::Double(loc)
            | Token::Bool(loc)
            | Token::Struct(loc)
            | Token::Union(loc)
            | Token::Enum(loc)
            | Token::Typedef(loc)
            | Token::Const(loc)
            | Token::Volatile(loc)
            | Token::Null(loc)
            | Token::True(loc)
            | Token::False(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Amp(loc)
            | Token::Eq(loc)
            | Token::Dot(loc)
            | Token::Arrow(loc)
            | Token::Colon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(n, _) => write!(f, "float literal {}", n),
            Token::CharLiteral(c, _) => {
                let byte = *c as u8;
                if byte.is_ascii_graphic() || byte == b' ' {
                    write!(f, "char literal '{}'", byte as char)
                } else {
                    write!(f, "char literal '\\x{:02x}'", byte)
                }
            }
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Int(_) => write!(f, "'int'"),
            Token::Char(_) => write!(f, "'char'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::Short(_) => write!(f, "'short'"),
            Token::Long(_) => write!(f, "'long'"),
            Token::Signed(_) => write!(f, "'signed'"),
            Token::Unsigned(_) => write!(f, "'unsigned'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Double(_) => write!(f, "'double'"),
            Token::Bool(_) => write!(f, "'_Bool'"),
            Token::Struct(_) => write!(f, "'struct'"),
            Token::Union(_) => write!(f, "'union'"),
            Token::Enum(_) => write!(f, "'enum'"),
            Token::Typedef(_) => write!(f, "'typedef'"),
            Token::Const(_) => write!(f, "'const'"),
            Token::Volatile(_) => write!(f, "'volatile'"),
            Token::Null(_) => write!(f, "'NULL'"),
            Token::True(_) => write!(f, "'true'"),
            Token::False(_) => write!(f, "'false'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Amp(_) => write!(f, "'&'"),
            Token::Eq(_) => write!(f, "'='"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Arrow(_) => write!(f, "'->'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::LBracket(_) => write!(f, "'['"),
            Token::RBracket(_) => write!(f, "']'"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Lexer error type
#[derive(Debug, Clone, thiserror::Error)]
#[error("Lexer error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }

            if self.peek() == Some('#') {
                self.skip_preprocessor_directive();
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(),
            '\'' => self.char_literal(),
            '0'..='9' => self.number_literal(ch),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.number_literal(ch),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch)),

            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    Ok(Token::Arrow(loc))
                } else {
                    Ok(Token::Minus(loc))
                }
            }
            '+' => Ok(Token::Plus(loc)),
            '*' => Ok(Token::Star(loc)),
            '&' => Ok(Token::Amp(loc)),
            '=' => Ok(Token::Eq(loc)),
            '.' => Ok(Token::Dot(loc)),
            ':' => Ok(Token::Colon(loc)),
            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Decode the character after a backslash
    fn escape(&mut self, context: &str) -> Result<char, LexError> {
        let escaped = self.advance().ok_or_else(|| LexError {
            message: format!("Unexpected end of input in {}", context),
            location: self.current_location(),
        })?;

        match escaped {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '\'' => Ok('\''),
            '"' => Ok('"'),
            '0' => Ok('\0'),
            'x' => {
                let mut hex = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_hexdigit() && hex.len() < 2 {
                        hex.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                u8::from_str_radix(&hex, 16)
                    .map(char::from)
                    .map_err(|_| LexError {
                        message: format!("Invalid hex escape sequence: \\x{}", hex),
                        location: self.current_location(),
                    })
            }
            _ => Err(LexError {
                message: format!("Unknown escape sequence: \\{}", escaped),
                location: self.current_location(),
            }),
        }
    }

    /// Parse string literal
    fn string_literal(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance();
                return Ok(Token::StringLiteral(string, loc));
            }

            self.advance();
            if ch == '\\' {
                string.push(self.escape("string literal")?);
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);

        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of input in character literal".to_string(),
            location: self.current_location(),
        })?;

        let value = if ch == '\\' {
            self.escape("character literal")? as u32 as u8 as i8
        } else {
            ch as u32 as u8 as i8
        };

        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Token::CharLiteral(value, loc))
    }

    /// Parse numeric literal: decimal or hex integers, decimal floats
    fn number_literal(&mut self, first: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut text = String::new();
        text.push(first);

        if first == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut digits = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() {
                    digits.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            self.skip_integer_suffix();
            let value = u64::from_str_radix(&digits, 16).map_err(|_| LexError {
                message: format!("Invalid hex literal: 0x{}", digits),
                location: loc,
            })?;
            return Ok(Token::IntLiteral(value as i64, loc));
        }

        let mut is_float = first == '.';
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && !is_float {
                is_float = true;
                text.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek_ahead(1)
                    .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+')
            {
                is_float = true;
                text.push(ch);
                self.advance();
                if let Some(sign) = self.peek().filter(|c| *c == '-' || *c == '+') {
                    text.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        if is_float {
            if matches!(self.peek(), Some('f') | Some('F')) {
                self.advance();
            }
            let value = text.parse::<f64>().map_err(|_| LexError {
                message: format!("Invalid float literal: {}", text),
                location: loc,
            })?;
            return Ok(Token::FloatLiteral(value, loc));
        }

        self.skip_integer_suffix();
        let value = text.parse::<i64>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", text),
            location: loc,
        })?;

        Ok(Token::IntLiteral(value, loc))
    }

    fn skip_integer_suffix(&mut self) {
        while matches!(self.peek(), Some('u') | Some('U') | Some('l') | Some('L')) {
            self.advance();
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> Token {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "int" => Token::Int(loc),
            "char" => Token::Char(loc),
            "void" => Token::Void(loc),
            "short" => Token::Short(loc),
            "long" => Token::Long(loc),
            "signed" => Token::Signed(loc),
            "unsigned" => Token::Unsigned(loc),
            "float" => Token::Float(loc),
            "double" => Token::Double(loc),
            "_Bool" | "bool" => Token::Bool(loc),
            "struct" | "class" => Token::Struct(loc),
            "union" => Token::Union(loc),
            "enum" => Token::Enum(loc),
            "typedef" => Token::Typedef(loc),
            "const" => Token::Const(loc),
            "volatile" => Token::Volatile(loc),
            "NULL" | "nullptr" => Token::Null(loc),
            "true" => Token::True(loc),
            "false" => Token::False(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Skip preprocessor directive (#include, #define, ...)
    fn skip_preprocessor_directive(&mut self) {
        while let Some(ch) = self.peek() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_tokens() {
        let mut lexer = Lexer::new("struct node *head = &nodes[0];");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Struct(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "node"));
        assert!(matches!(tokens[2], Token::Star(_)));
        assert!(matches!(tokens[3], Token::Ident(ref s, _) if s == "head"));
        assert!(matches!(tokens[4], Token::Eq(_)));
        assert!(matches!(tokens[5], Token::Amp(_)));
        assert!(matches!(tokens[6], Token::Ident(ref s, _) if s == "nodes"));
        assert!(matches!(tokens[7], Token::LBracket(_)));
        assert!(matches!(tokens[8], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[9], Token::RBracket(_)));
        assert!(matches!(tokens[10], Token::Semicolon(_)));
        assert!(matches!(tokens[11], Token::Eof(_)));
    }

    #[test]
    fn test_number_literals() {
        let mut lexer = Lexer::new("42 0xdeadbeef 2.5 1e3 10UL");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::IntLiteral(42, _)));
        assert!(matches!(tokens[1], Token::IntLiteral(0xdead_beef, _)));
        assert!(matches!(tokens[2], Token::FloatLiteral(f, _) if f == 2.5));
        assert!(matches!(tokens[3], Token::FloatLiteral(f, _) if f == 1000.0));
        assert!(matches!(tokens[4], Token::IntLiteral(10, _)));
    }

    #[test]
    fn test_arrow_and_minus() {
        let mut lexer = Lexer::new("p->next - 1");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[1], Token::Arrow(_)));
        assert!(matches!(tokens[3], Token::Minus(_)));
    }

    #[test]
    fn test_comments_and_directives() {
        let mut lexer =
            Lexer::new("#include <stdio.h>\nint x; // comment\n/* block\ncomment */ int y;");
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
    }

    #[test]
    fn test_string_and_char_literals() {
        let mut lexer = Lexer::new(r#""hi\n" 'A' '\0'"#);
        let tokens = lexer.tokenize().unwrap();

        assert!(matches!(tokens[0], Token::StringLiteral(ref s, _) if s == "hi\n"));
        assert!(matches!(tokens[1], Token::CharLiteral(65, _)));
        assert!(matches!(tokens[2], Token::CharLiteral(0, _)));
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("int x @");
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.location.column, 7);
    }
}
