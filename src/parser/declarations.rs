//! Declaration parsing implementation
//!
//! This module handles the declaration side of the grammar:
//!
//! - Type specifiers: builtin types, `struct`/`union`/`enum` (with or without
//!   an inline body), typedef names
//! - Declarators: pointers, references, names, array dimensions, function
//!   prototypes
//! - Top-level declarations: typedefs, global variables with initializers,
//!   function prototypes, bare aggregate definitions and forward declarations
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= "typedef" specifier declarator ("," declarator)* ";"
//!                | specifier [declarator ["=" initializer] ("," ...)*] ";"
//! specifier    ::= qualifier* (builtin+ | aggregate | typedef-name)
//! aggregate    ::= ("struct" | "union") [tag] [":" bases] ["{" member* "}"]
//!                | "enum" [tag] ["{" enumerator ("," enumerator)* "}"]
//! declarator   ::= "*"* ["&"] identifier ("[" [int] "]")* ["(" params ")"]
//! initializer  ::= expression | "{" initializer ("," initializer)* [","] "}"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

/// Access specifiers accepted (and ignored) in base-class lists
const ACCESS_SPECIFIERS: [&str; 3] = ["public", "protected", "private"];

impl Parser {
    /// Parse one top-level declaration, which may declare several names
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Vec<Decl>, ParseError> {
        let loc = self.current_location();

        if self.match_token(&Token::Typedef(loc)) {
            return self.parse_typedef(loc);
        }

        if let Some(decl) = self.try_parse_forward_declaration()? {
            return Ok(vec![decl]);
        }

        let base = self.parse_type_specifier()?;

        // Bare definition: `struct Point { ... };`
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(Vec::new());
        }

        let mut decls = Vec::new();
        loop {
            let location = self.current_location();
            let (name, var_type) = self.parse_declarator(base.clone())?;

            if matches!(var_type, Type::Function { .. }) {
                decls.push(Decl::Function {
                    name,
                    func_type: var_type,
                    location,
                });
            } else {
                let init = if self.match_token(&Token::Eq(self.current_location())) {
                    Some(self.parse_initializer()?)
                } else {
                    None
                };
                decls.push(Decl::Global {
                    name,
                    var_type,
                    init,
                    location,
                });
            }

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_semicolon("after declaration")?;
        Ok(decls)
    }

    /// Parse `typedef <specifier> <declarator>, ...;` (the keyword is consumed)
    fn parse_typedef(&mut self, location: SourceLocation) -> Result<Vec<Decl>, ParseError> {
        let base = self.parse_type_specifier()?;

        let mut decls = Vec::new();
        loop {
            let (name, target) = self.parse_declarator(base.clone())?;
            self.typedef_names.insert(name.clone());
            decls.push(Decl::Typedef {
                name,
                target,
                location,
            });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_semicolon("after typedef")?;
        Ok(decls)
    }

    /// Recognise `struct Tag;` / `union Tag;` without consuming anything else
    fn try_parse_forward_declaration(&mut self) -> Result<Option<Decl>, ParseError> {
        let kind = match self.peek() {
            Token::Struct(_) => CompoundKind::Struct,
            Token::Union(_) => CompoundKind::Union,
            _ => return Ok(None),
        };

        let is_forward = matches!(self.tokens.get(self.position + 1), Some(Token::Ident(..)))
            && matches!(self.tokens.get(self.position + 2), Some(Token::Semicolon(_)));
        if !is_forward {
            return Ok(None);
        }

        let location = self.current_location();
        self.advance();
        let name = self.expect_identifier()?;
        self.expect_semicolon("after forward declaration")?;

        Ok(Some(Decl::Compound(CompoundDef {
            kind,
            name,
            bases: Vec::new(),
            fields: None,
            location,
        })))
    }

    /// Parse a type specifier: qualifiers, builtin keywords, an aggregate or a typedef name
    pub(crate) fn parse_type_specifier(&mut self) -> Result<Type, ParseError> {
        let start = self.current_location();
        let mut signed: Option<bool> = None;
        let mut longs = 0;
        let mut short = false;
        let mut saw_int = false;
        let mut base: Option<Type> = None;

        loop {
            let token = self.peek_token();
            let explicit = match token {
                Token::Const(_) | Token::Volatile(_) => None,
                Token::Signed(_) => {
                    signed = Some(true);
                    None
                }
                Token::Unsigned(_) => {
                    signed = Some(false);
                    None
                }
                Token::Short(_) => {
                    short = true;
                    None
                }
                Token::Long(_) => {
                    longs += 1;
                    None
                }
                Token::Int(_) => {
                    saw_int = true;
                    None
                }
                Token::Char(_) => Some(Type::char()),
                Token::Void(_) => Some(Type::Void),
                Token::Float(_) => Some(Type::Float),
                Token::Double(_) => Some(Type::Double),
                Token::Bool(_) => Some(Type::Bool),
                Token::Struct(_) | Token::Union(_) | Token::Enum(_) => {
                    if base.is_some() {
                        return self.error(format!("Unexpected {} in type specifier", token));
                    }
                    self.advance();
                    base = Some(match token {
                        Token::Struct(_) => self.parse_compound_specifier(CompoundKind::Struct)?,
                        Token::Union(_) => self.parse_compound_specifier(CompoundKind::Union)?,
                        _ => self.parse_enum_specifier()?,
                    });
                    continue;
                }
                Token::Ident(ref name, _)
                    if base.is_none()
                        && signed.is_none()
                        && longs == 0
                        && !short
                        && !saw_int
                        && self.typedef_names.contains(name) =>
                {
                    Some(Type::Named(name.clone()))
                }
                _ => break,
            };

            if let Some(ty) = explicit {
                if base.is_some() {
                    return self.error(format!("Unexpected {} in type specifier", token));
                }
                base = Some(ty);
            }
            self.advance();
        }

        let int_kind = if short {
            IntKind::Short
        } else {
            match longs {
                0 => IntKind::Int,
                1 => IntKind::Long,
                _ => IntKind::LongLong,
            }
        };

        match base {
            Some(Type::Char { .. }) => Ok(Type::Char {
                signed: signed.unwrap_or(true),
            }),
            Some(ty) => Ok(ty),
            None if saw_int || short || longs > 0 || signed.is_some() => Ok(Type::Int {
                kind: int_kind,
                signed: signed.unwrap_or(true),
            }),
            None => Err(ParseError {
                message: format!("Expected type, found {}", self.peek()),
                location: start,
            }),
        }
    }

    fn next_anonymous_tag(&mut self) -> String {
        let tag = format!("{}{}", ANONYMOUS_TAG_PREFIX, self.anonymous_count);
        self.anonymous_count += 1;
        tag
    }

    /// Parse the rest of `struct|union [Tag] [: Bases] [{ members }]`
    fn parse_compound_specifier(&mut self, kind: CompoundKind) -> Result<Type, ParseError> {
        let location = self.previous_location();

        let tag = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else {
            None
        };

        let mut bases = Vec::new();
        if self.match_token(&Token::Colon(self.current_location())) {
            loop {
                let mut base = self.expect_identifier()?;
                if ACCESS_SPECIFIERS.contains(&base.as_str()) {
                    base = self.expect_identifier()?;
                }
                bases.push(base);
                if !self.match_token(&Token::Comma(self.current_location())) {
                    break;
                }
            }
        }

        let has_body = self.match_token(&Token::LBrace(self.current_location()));
        let name = match (tag, has_body) {
            (Some(tag), _) => tag,
            (None, true) => self.next_anonymous_tag(),
            (None, false) => {
                return self.error(format!("Expected tag or '{{', found {}", self.peek()));
            }
        };

        if has_body {
            let mut fields = Vec::new();
            while !self.check(&Token::RBrace(self.current_location())) {
                if self.is_at_end() {
                    return self.error("Unterminated member list");
                }
                let member_base = self.parse_type_specifier()?;
                loop {
                    let (field_name, field_type) = self.parse_declarator(member_base.clone())?;
                    if matches!(field_type, Type::Function { .. }) {
                        return self.error(format!(
                            "Member functions are not supported ('{}')",
                            field_name
                        ));
                    }
                    fields.push(Field {
                        name: field_name,
                        field_type,
                    });
                    if !self.match_token(&Token::Comma(self.current_location())) {
                        break;
                    }
                }
                self.expect_semicolon("after member declaration")?;
            }
            self.expect_rbrace("after member list")?;

            self.pending.push(Decl::Compound(CompoundDef {
                kind,
                name: name.clone(),
                bases,
                fields: Some(fields),
                location,
            }));
        } else if !bases.is_empty() {
            return self.error("Base classes require a member list");
        }

        Ok(match kind {
            CompoundKind::Struct => Type::Struct(name),
            CompoundKind::Union => Type::Union(name),
        })
    }

    /// Parse the rest of `enum [Tag] [{ A, B = 3, ... }]`
    fn parse_enum_specifier(&mut self) -> Result<Type, ParseError> {
        let location = self.previous_location();

        let tag = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else {
            None
        };

        if !self.match_token(&Token::LBrace(self.current_location())) {
            return match tag {
                Some(tag) => Ok(Type::Enum(tag)),
                None => self.error(format!("Expected enum tag or '{{', found {}", self.peek())),
            };
        }

        let name = match tag {
            Some(tag) => tag,
            None => self.next_anonymous_tag(),
        };

        let mut variants = Vec::new();
        let mut next_value = 0i64;
        while !self.check(&Token::RBrace(self.current_location())) {
            let variant = self.expect_identifier()?;
            if self.match_token(&Token::Eq(self.current_location())) {
                next_value = self.parse_signed_constant()?;
            }
            variants.push((variant, next_value));
            next_value = next_value.wrapping_add(1);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rbrace("after enumerators")?;

        self.pending.push(Decl::Enum(EnumDef {
            name: name.clone(),
            variants,
            location,
        }));

        Ok(Type::Enum(name))
    }

    /// Integer constant with optional leading minus (enumerator values)
    fn parse_signed_constant(&mut self) -> Result<i64, ParseError> {
        let negative = self.match_token(&Token::Minus(self.current_location()));
        match self.peek_token() {
            Token::IntLiteral(n, _) => {
                self.advance();
                Ok(if negative { n.wrapping_neg() } else { n })
            }
            Token::CharLiteral(c, _) => {
                self.advance();
                Ok(if negative { -(c as i64) } else { c as i64 })
            }
            other => self.error(format!("Expected integer constant, found {}", other)),
        }
    }

    fn skip_qualifiers(&mut self) {
        while self.match_token(&Token::Const(self.current_location()))
            || self.match_token(&Token::Volatile(self.current_location()))
        {}
    }

    /// Parse `*`, `&` and the pointer qualifiers that precede a name
    fn parse_pointer_prefix(&mut self, mut ty: Type) -> Type {
        self.skip_qualifiers();
        while self.match_token(&Token::Star(self.current_location())) {
            ty = ty.pointer_to();
            self.skip_qualifiers();
        }
        if self.match_token(&Token::Amp(self.current_location())) {
            ty = ty.reference_to();
        }
        ty
    }

    /// Parse `[N]...` suffixes and wrap `elem` from the innermost dimension out
    fn parse_array_suffix(&mut self, elem: Type) -> Result<Type, ParseError> {
        let mut dims = Vec::new();
        while self.match_token(&Token::LBracket(self.current_location())) {
            if self.match_token(&Token::RBracket(self.current_location())) {
                dims.push(None);
                continue;
            }
            match self.peek_token() {
                Token::IntLiteral(n, _) if n >= 0 => {
                    self.advance();
                    dims.push(Some(n as usize));
                }
                _ => return self.error("Array size must be a constant integer"),
            }
            self.expect_rbracket("after array size")?;
        }

        Ok(dims
            .into_iter()
            .rev()
            .fold(elem, |ty, dim| ty.array_of(dim)))
    }

    /// Parse a named declarator on top of `base`
    pub(crate) fn parse_declarator(&mut self, base: Type) -> Result<(String, Type), ParseError> {
        let ty = self.parse_pointer_prefix(base);
        let name = self.expect_identifier()?;

        if self.match_token(&Token::LParen(self.current_location())) {
            let params = self.parse_parameter_types()?;
            self.expect_rparen("after parameters")?;
            return Ok((
                name,
                Type::Function {
                    ret: Box::new(ty),
                    params,
                },
            ));
        }

        let ty = self.parse_array_suffix(ty)?;
        Ok((name, ty))
    }

    /// Parse a type name with an abstract declarator (`struct node *`, `int [4]`)
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let base = self.parse_type_specifier()?;
        let ty = self.parse_pointer_prefix(base);
        self.parse_array_suffix(ty)
    }

    /// Parse prototype parameters: `(void)`, `()` or `(type [name], ...)`
    fn parse_parameter_types(&mut self) -> Result<Vec<Type>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        if self.check(&Token::Void(self.current_location()))
            && matches!(self.tokens.get(self.position + 1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let base = self.parse_type_specifier()?;
            let mut ty = self.parse_pointer_prefix(base);
            if let Token::Ident(_, _) = self.peek() {
                self.advance();
            }
            ty = match self.parse_array_suffix(ty)? {
                // Array parameters decay to pointers
                Type::Array(elem, _) => Type::Pointer(elem),
                other => other,
            };
            params.push(ty);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a global initializer (expression or brace list)
    pub(crate) fn parse_initializer(&mut self) -> Result<Initializer, ParseError> {
        let location = self.current_location();
        if !self.match_token(&Token::LBrace(location)) {
            return Ok(Initializer::Expr(self.parse_expression()?));
        }

        let mut items = Vec::new();
        while !self.check(&Token::RBrace(self.current_location())) {
            items.push(self.parse_initializer()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        self.expect_rbrace("after initializer list")?;

        Ok(Initializer::List(items, location))
    }
}
