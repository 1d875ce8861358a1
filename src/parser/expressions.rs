//! Expression parsing implementation
//!
//! Handles the expressions a user types at the prompt and the expressions
//! that appear in global initializers.
//!
//! # Supported Expressions
//!
//! - Literals: integers, characters, floats, strings, `true`/`false`, `NULL`
//! - Identifiers
//! - Binary operators: `+`, `-`, `*`
//! - Unary operators: `-`, `+`, `&`, `*`
//! - Postfix: `[]`, `.`, `->`
//! - Type casts: `(type)expr`
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_additive()
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let loc = self.current_location();
            let op = if self.match_token(&Token::Plus(loc)) {
                BinOp::Add
            } else if self.match_token(&Token::Minus(loc)) {
                BinOp::Sub
            } else {
                break;
            };

            let right = Box::new(self.parse_multiplicative()?);
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse multiplicative (*)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_cast()?;

        loop {
            let loc = self.current_location();
            if !self.match_token(&Token::Star(loc)) {
                break;
            }
            let right = Box::new(self.parse_cast()?);
            left = Expr::Binary {
                op: BinOp::Mul,
                left: Box::new(left),
                right,
                location: loc,
            };
        }

        Ok(left)
    }

    /// Parse cast: (Type*)expr
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();
        if self.check(&Token::LParen(loc)) {
            let saved_pos = self.position;
            self.advance(); // consume '('

            if self.is_type_start() {
                let target_type = self.parse_type_name()?;
                self.expect_rparen("after cast type")?;
                let expr = Box::new(self.parse_cast()?);
                return Ok(Expr::Cast {
                    target_type,
                    expr,
                    location: loc,
                });
            }

            self.position = saved_pos;
        }

        self.parse_unary()
    }

    /// Parse unary (- + & *)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = if self.match_token(&Token::Minus(loc)) {
            UnOp::Neg
        } else if self.match_token(&Token::Amp(loc)) {
            UnOp::AddrOf
        } else if self.match_token(&Token::Star(loc)) {
            UnOp::Deref
        } else if self.match_token(&Token::Plus(loc)) {
            return self.parse_cast();
        } else {
            return self.parse_postfix();
        };

        let operand = Box::new(self.parse_cast()?);
        Ok(Expr::Unary {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix ([] . ->)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            if self.match_token(&Token::LBracket(loc)) {
                let index = Box::new(self.parse_expression()?);
                self.expect_rbracket("after array index")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index,
                    location: loc,
                };
            } else if self.match_token(&Token::Dot(loc)) {
                let member = self.expect_identifier()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else if self.match_token(&Token::Arrow(loc)) {
                let member = self.expect_identifier()?;
                expr = Expr::PointerMember {
                    object: Box::new(expr),
                    member,
                    location: loc,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Parse primary (literals, identifiers, parenthesized expressions)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::IntLiteral(n, loc) => {
                self.advance();
                Ok(Expr::IntLiteral(n, loc))
            }
            Token::CharLiteral(c, loc) => {
                self.advance();
                Ok(Expr::CharLiteral(c, loc))
            }
            Token::FloatLiteral(f, loc) => {
                self.advance();
                Ok(Expr::FloatLiteral(f, loc))
            }
            Token::StringLiteral(s, loc) => {
                self.advance();
                Ok(Expr::StringLiteral(s, loc))
            }
            Token::True(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(true, loc))
            }
            Token::False(loc) => {
                self.advance();
                Ok(Expr::BoolLiteral(false, loc))
            }
            Token::Null(location) => {
                self.advance();
                Ok(Expr::Null { location })
            }
            Token::Ident(name, loc) => {
                self.advance();
                Ok(Expr::Ident(name, loc))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            other => Err(ParseError {
                message: format!("Unexpected token: {}", other),
                location: loc,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;
    use rustc_hash::FxHashSet;

    fn expr(source: &str) -> Expr {
        Parser::new(source)
            .unwrap()
            .parse_standalone_expression()
            .unwrap()
    }

    #[test]
    fn test_deref_binds_looser_than_member() {
        match expr("*p->next") {
            Expr::Unary {
                op: UnOp::Deref,
                operand,
                ..
            } => assert!(matches!(*operand, Expr::PointerMember { ref member, .. } if member == "next")),
            other => panic!("Expected dereference, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        match expr("a + b * 2") {
            Expr::Binary {
                op: BinOp::Add,
                right,
                ..
            } => assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("Expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_cast_with_typedef_name() {
        let mut names = FxHashSet::default();
        names.insert("Node".to_string());
        let mut parser = Parser::with_typedefs("(Node *)0x10", names).unwrap();
        match parser.parse_standalone_expression().unwrap() {
            Expr::Cast {
                target_type, expr, ..
            } => {
                assert_eq!(target_type.to_string(), "Node *");
                assert!(matches!(*expr, Expr::IntLiteral(16, _)));
            }
            other => panic!("Expected cast, got {:?}", other),
        }
    }

    #[test]
    fn test_parenthesized_identifier_is_not_a_cast() {
        assert!(matches!(expr("(value)"), Expr::Ident(ref n, _) if n == "value"));
    }
}
