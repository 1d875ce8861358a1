//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the three entry points:
//! whole declaration files, single expressions and single type names.
//!
//! # Parser Architecture
//!
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: type specifiers, declarators, struct/union/enum/typedef
//!   definitions and global variables
//! - `expressions`: expressions with precedence climbing
//!
//! Parser methods are split across multiple files using `impl Parser` blocks.
//!
//! # Typedef names
//!
//! C cannot be parsed without knowing which identifiers name types. The parser
//! records every `typedef` it sees, and callers parsing prompt input seed it
//! with the typedef names of the loaded image via [`Parser::with_typedefs`].

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use rustc_hash::FxHashSet;

/// Parser error type
#[derive(Debug, Clone, thiserror::Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the C declaration subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) typedef_names: FxHashSet<String>,
    /// Inline struct/union/enum definitions met inside a type specifier,
    /// emitted ahead of the declaration that contained them
    pub(crate) pending: Vec<Decl>,
    pub(crate) anonymous_count: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        Self::with_typedefs(source, FxHashSet::default())
    }

    pub fn with_typedefs(
        source: &str,
        typedef_names: FxHashSet<String>,
    ) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            typedef_names,
            pending: Vec::new(),
            anonymous_count: 0,
        })
    }

    /// Parse a whole declaration file
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let decls = self.parse_top_level_declaration()?;
            program.decls.append(&mut self.pending);
            program.decls.extend(decls);
        }

        Ok(program)
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse_standalone_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parse a complete type name such as `struct node *` or `int [4]`
    pub fn parse_standalone_type_name(&mut self) -> Result<Type, ParseError> {
        let ty = self.parse_type_name()?;
        self.expect_end()?;
        Ok(ty)
    }

    // ===== Helper methods =====

    fn expect_end(&self) -> Result<(), ParseError> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(ParseError {
                message: format!("Unexpected {} after end of input", self.peek()),
                location: self.current_location(),
            })
        }
    }

    pub(crate) fn is_type_start(&self) -> bool {
        match self.peek() {
            Token::Int(_)
            | Token::Char(_)
            | Token::Void(_)
            | Token::Short(_)
            | Token::Long(_)
            | Token::Signed(_)
            | Token::Unsigned(_)
            | Token::Float(_)
            | Token::Double(_)
            | Token::Bool(_)
            | Token::Struct(_)
            | Token::Union(_)
            | Token::Enum(_)
            | Token::Const(_)
            | Token::Volatile(_) => true,
            Token::Ident(name, _) => self.typedef_names.contains(name),
            _ => false,
        }
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError {
            message: message.into(),
            location: self.current_location(),
        })
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            self.error(format!("{}, found {}", message, self.peek()))
        }
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBrace(self.current_location()),
            &format!("Expected '}}' {ctx}"),
        )
    }

    pub(crate) fn expect_rbracket(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RBracket(self.current_location()),
            &format!("Expected ']' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            self.error(format!("Expected identifier, found {}", self.peek()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_struct() {
        let source = "struct Point { int x; int y; };";
        let mut parser = Parser::new(source).unwrap();
        let program = parser.parse_program().unwrap();

        assert_eq!(program.decls.len(), 1);
        match &program.decls[0] {
            Decl::Compound(def) => {
                assert_eq!(def.name, "Point");
                assert_eq!(def.kind, CompoundKind::Struct);
                assert_eq!(def.fields.as_ref().map(|f| f.len()), Some(2));
            }
            _ => panic!("Expected struct definition"),
        }
    }

    #[test]
    fn test_parse_standalone_expression() {
        let mut parser = Parser::new("(*list).items[2]").unwrap();
        let expr = parser.parse_standalone_expression().unwrap();
        match expr {
            Expr::Index { base, index, .. } => {
                assert!(matches!(*base, Expr::Member { ref member, .. } if member == "items"));
                assert!(matches!(*index, Expr::IntLiteral(2, _)));
            }
            other => panic!("Expected index expression, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let mut parser = Parser::new("x y").unwrap();
        assert!(parser.parse_standalone_expression().is_err());
    }

    #[test]
    fn test_type_name_with_typedefs() {
        let mut names = FxHashSet::default();
        names.insert("Node".to_string());
        let mut parser = Parser::with_typedefs("Node **", names).unwrap();
        let ty = parser.parse_standalone_type_name().unwrap();
        assert_eq!(ty.to_string(), "Node **");
    }
}
