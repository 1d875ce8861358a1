//! Expression evaluation against the image
//!
//! Evaluates the expressions typed at the prompt and in global initializers.
//!
//! # Evaluation rules
//!
//! - Identifiers name globals, functions or enumerators
//! - Integer literals are `int` when they fit, `long` otherwise
//! - `+ - *` on integers follow the usual promotions (to `int`, or `long`
//!   when either operand is 8 bytes wide); any float operand makes the
//!   result `double`
//! - `ptr ± n` is scaled by the pointee size; `ptr - ptr` counts elements
//! - Arrays decay to pointers in arithmetic
//! - String literals are `char [N]` rvalues; storing one into a `char *`
//!   interns it in read-only memory

use super::value::{scalar_kind, ImageValue, Place};
use super::{InspectError, ProgramImage};
use crate::explore::ValueHandle;
use crate::memory::value::{Address, Scalar, ScalarKind};
use crate::memory::{pointer_add, pointer_diff, sizeof_type};
use crate::parser::ast::{BinOp, Expr, IntKind, Type, UnOp};
use tracing::debug;

fn not_a_number() -> InspectError {
    InspectError::invalid("Argument to arithmetic operation not a number or boolean.")
}

fn is_char(ty: &Type) -> bool {
    matches!(ty, Type::Char { .. })
}

impl ProgramImage {
    /// Evaluate an expression typed by the user
    pub fn evaluate(&self, text: &str) -> Result<ImageValue, InspectError> {
        let mut parser = self.parser(text)?;
        let expr = parser.parse_standalone_expression()?;
        self.eval_expr(&expr)
    }

    /// `set var <lvalue> = <value>`; returns the updated lvalue
    pub fn assign(&self, lvalue: &str, value: &str) -> Result<ImageValue, InspectError> {
        let target = self.evaluate(lvalue)?;
        if target.address().is_none() {
            return Err(InspectError::invalid(
                "Left operand of assignment is not an lvalue.",
            ));
        }
        let value = self.evaluate(value)?;
        let bytes = self.coerce(&value, target.type_ref().ast())?;
        target.store(&bytes)?;
        debug!(lvalue, address = ?target.address(), "assigned");
        Ok(target)
    }

    /// Bytes of `value` converted for storage as `ty`
    pub(crate) fn coerce(&self, value: &ImageValue, ty: &Type) -> Result<Vec<u8>, InspectError> {
        let defs = self.defs();
        let target = defs.strip_typedefs(ty);
        let size = sizeof_type(ty, defs);
        let is_literal = matches!(value.place(), Place::Immediate(_));

        match (&target, value.type_ref().resolved()) {
            (Type::Array(to, _), Type::Array(from, _))
                if is_literal
                    && is_char(&defs.strip_typedefs(to))
                    && is_char(&defs.strip_typedefs(&from)) =>
            {
                let mut bytes = value.bytes()?;
                bytes.resize(size, 0);
                Ok(bytes)
            }
            (Type::Pointer(_), Type::Array(from, _))
                if is_literal && is_char(&defs.strip_typedefs(&from)) =>
            {
                let addr = self.intern_string(&value.bytes()?);
                Ok(Scalar::Pointer(addr).encode(ScalarKind::Pointer))
            }
            _ => value.cast(ty.clone())?.bytes(),
        }
    }

    /// Copy a string literal into read-only memory
    fn intern_string(&self, bytes: &[u8]) -> Address {
        self.inner
            .memory
            .borrow_mut()
            .allocate_rodata(".rodata", bytes)
    }

    fn int_value(&self, n: i64) -> Result<ImageValue, InspectError> {
        let ty = if i32::try_from(n).is_ok() {
            Type::int()
        } else {
            Type::long()
        };
        ImageValue::from_scalar(self, ty, Scalar::Int(n))
    }

    pub(crate) fn eval_expr(&self, expr: &Expr) -> Result<ImageValue, InspectError> {
        match expr {
            Expr::IntLiteral(n, _) => self.int_value(*n),
            Expr::CharLiteral(c, _) => {
                ImageValue::from_scalar(self, Type::char(), Scalar::Int(i64::from(*c)))
            }
            Expr::FloatLiteral(f, _) => ImageValue::from_scalar(self, Type::Double, Scalar::Float(*f)),
            Expr::BoolLiteral(b, _) => {
                ImageValue::from_scalar(self, Type::Bool, Scalar::Int(i64::from(*b)))
            }
            Expr::StringLiteral(s, _) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                let ty = Type::char().array_of(Some(bytes.len()));
                Ok(ImageValue::immediate(self, ty, bytes))
            }
            Expr::Null { .. } => {
                ImageValue::from_scalar(self, Type::Void.pointer_to(), Scalar::Pointer(0))
            }
            Expr::Ident(name, _) => self.eval_ident(name),
            Expr::Unary { op, operand, .. } => {
                let operand = self.eval_expr(operand)?;
                match op {
                    UnOp::Deref => operand.dereference(),
                    UnOp::AddrOf => operand.address_of(),
                    UnOp::Neg => self.negate(&operand),
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                self.binary(*op, &left, &right)
            }
            Expr::Index { base, index, .. } => {
                let base = self.eval_expr(base)?;
                let index = self.eval_expr(index)?;
                base.index(self.integer_operand(&index)?)
            }
            Expr::Member { object, member, .. } => self.eval_expr(object)?.member(member),
            Expr::PointerMember { object, member, .. } => {
                let object = self.eval_expr(object)?;
                match object.type_ref().resolved() {
                    Type::Pointer(_) => object.dereference()?.member(member),
                    _ => object.member(member),
                }
            }
            Expr::Cast {
                target_type, expr, ..
            } => {
                if !self.is_known(target_type) {
                    return Err(InspectError::UnknownType {
                        name: target_type.to_string(),
                    });
                }
                self.eval_expr(expr)?.cast(target_type.clone())
            }
        }
    }

    fn eval_ident(&self, name: &str) -> Result<ImageValue, InspectError> {
        if let Some(global) = self.global(name) {
            return Ok(ImageValue::at(self, global.ty.clone(), global.address));
        }
        if let Some(function) = self.function(name) {
            return Ok(ImageValue::at(self, function.ty.clone(), function.address));
        }
        if let Some((tag, value)) = self.defs().enumerator(name) {
            return ImageValue::from_scalar(self, Type::Enum(tag.to_string()), Scalar::Int(value));
        }
        Err(InspectError::NoSymbol {
            name: name.to_string(),
        })
    }

    /// Integer value of an index or pointer offset operand
    fn integer_operand(&self, value: &ImageValue) -> Result<i64, InspectError> {
        match value.type_ref().resolved() {
            Type::Float | Type::Double | Type::Pointer(_) => Err(not_a_number()),
            ty if scalar_kind(&ty).is_some() => Ok(value.scalar()?.as_i64()),
            _ => Err(not_a_number()),
        }
    }

    fn negate(&self, operand: &ImageValue) -> Result<ImageValue, InspectError> {
        match operand.type_ref().resolved() {
            Type::Float | Type::Double => ImageValue::from_scalar(
                self,
                Type::Double,
                Scalar::Float(-operand.scalar()?.as_f64()),
            ),
            _ => {
                let n = self.integer_operand(operand)?;
                let ty = promoted(&operand.type_ref().resolved(), &Type::int());
                ImageValue::from_scalar(self, ty, Scalar::Int(n.wrapping_neg()))
            }
        }
    }

    /// Pointee and base address of a pointer or decaying array operand
    fn pointer_operand(&self, value: &ImageValue) -> Result<Option<(Type, Address)>, InspectError> {
        match value.type_ref().resolved() {
            Type::Pointer(target) => Ok(Some((*target, value.scalar()?.as_bits()))),
            Type::Array(elem, _) => {
                let addr = value.address().ok_or_else(|| {
                    InspectError::invalid("Attempt to take address of value not located in memory.")
                })?;
                Ok(Some((*elem, addr)))
            }
            _ => Ok(None),
        }
    }

    fn binary(
        &self,
        op: BinOp,
        left: &ImageValue,
        right: &ImageValue,
    ) -> Result<ImageValue, InspectError> {
        let defs = self.defs();
        let offset_pointer = |target: Type, base: Address, offset: i64| {
            let addr = pointer_add(base, offset, &target, defs);
            ImageValue::from_scalar(self, target.pointer_to(), Scalar::Pointer(addr))
        };

        match (op, self.pointer_operand(left)?, self.pointer_operand(right)?) {
            (BinOp::Add, Some((target, base)), None) => {
                offset_pointer(target, base, self.integer_operand(right)?)
            }
            (BinOp::Add, None, Some((target, base))) => {
                offset_pointer(target, base, self.integer_operand(left)?)
            }
            (BinOp::Sub, Some((target, base)), None) => {
                offset_pointer(target, base, self.integer_operand(right)?.wrapping_neg())
            }
            (BinOp::Sub, Some((target, a)), Some((_, b))) => {
                let diff = pointer_diff(a, b, &target, defs);
                ImageValue::from_scalar(self, Type::long(), Scalar::Int(diff))
            }
            (_, None, None) => self.arithmetic(op, left, right),
            _ => Err(not_a_number()),
        }
    }

    fn arithmetic(
        &self,
        op: BinOp,
        left: &ImageValue,
        right: &ImageValue,
    ) -> Result<ImageValue, InspectError> {
        let lt = left.type_ref().resolved();
        let rt = right.type_ref().resolved();

        if matches!(lt, Type::Float | Type::Double) || matches!(rt, Type::Float | Type::Double) {
            for ty in [&lt, &rt] {
                if scalar_kind(ty).is_none() {
                    return Err(not_a_number());
                }
            }
            let (a, b) = (left.scalar()?.as_f64(), right.scalar()?.as_f64());
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
            };
            return ImageValue::from_scalar(self, Type::Double, Scalar::Float(result));
        }

        let (a, b) = (self.integer_operand(left)?, self.integer_operand(right)?);
        let result = match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
        };
        ImageValue::from_scalar(self, promoted(&lt, &rt), Scalar::Int(result))
    }
}

/// Result type of integer arithmetic on `a` and `b`
fn promoted(a: &Type, b: &Type) -> Type {
    let wide = |ty: &Type| {
        matches!(
            ty,
            Type::Int {
                kind: IntKind::Long | IntKind::LongLong,
                ..
            }
        )
    };
    if wide(a) || wide(b) {
        Type::long()
    } else {
        Type::int()
    }
}
