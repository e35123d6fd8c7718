//! Binary, unary, and conditional expressions, and the lowering that
//! preserves assignment-is-an-expression semantics.
//!
//! Compound assignments and increment/decrement have no expression form in
//! the target. In statement position (expression statements and for-loop
//! headers) they lower to a statement sequence; anywhere the result is read
//! they are wrapped in an immediately-invoked anonymous function returning
//! the appropriate value. A property-access left-hand side evaluates its
//! receiver exactly once, into a fresh identifier.

use super::Transpiler;
use crate::ast::{BinaryOp, Expr, ExprKind, Span, UnaryOp};
use crate::ast::types::Ty;
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

/// A lowered assignment-like expression: the statement sequence plus the
/// expression a value-position wrapper returns.
pub(super) struct LoweredAssignment {
    pub statements: Vec<String>,
    pub value: String,
}

impl Transpiler<'_> {
    // =========================================================================
    // Binary
    // =========================================================================

    pub(super) fn transpile_binary_expression(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> Result<String> {
        use BinaryOp::*;
        match op {
            EqEq | NotEq => Err(self.err(
                ErrorKind::LooseEquality,
                span,
                "loose equality is not supported; use strict equality",
            )),
            EqEqEq => self.native_binary(left, right, "=="),
            NotEqEq => self.native_binary(left, right, "~="),
            Lt => self.native_binary(left, right, "<"),
            Gt => self.native_binary(left, right, ">"),
            LtEq => self.native_binary(left, right, "<="),
            GtEq => self.native_binary(left, right, ">="),
            Plus => {
                let l = self.transpile_expression(left)?;
                let r = self.transpile_expression(right)?;
                Ok(Self::lower_addition(&left.ty, &right.ty, &l, &r))
            }
            Minus => self.native_binary(left, right, "-"),
            Star => self.native_binary(left, right, "*"),
            Slash => self.native_binary(left, right, "/"),
            Percent => self.native_binary(left, right, "%"),
            StarStar => self.native_binary(left, right, "^"),
            AmpAmp => self.native_binary(left, right, "and"),
            BarBar => self.native_binary(left, right, "or"),
            Bar => {
                let l = self.transpile_expression(left)?;
                if Self::is_zero_literal(right) {
                    // `x | 0` is the canonical integer-truncation idiom.
                    return Ok(format!("TS.round({l})"));
                }
                let r = self.transpile_expression(right)?;
                Ok(format!("TS.bor({l}, {r})"))
            }
            Amp => self.runtime_binary(left, right, "band"),
            Caret => self.runtime_binary(left, right, "bxor"),
            LtLt => self.runtime_binary(left, right, "blsh"),
            GtGt => self.runtime_binary(left, right, "brsh"),
            InstanceOf => self.transpile_instanceof(left, right),
            In => {
                let l = self.transpile_expression(left)?;
                let r = self.transpile_expression(right)?;
                Ok(format!("{r}[{l}] ~= nil"))
            }
            Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign | PercentAssign
            | StarStarAssign | BarAssign | AmpAssign | CaretAssign | LtLtAssign | GtGtAssign => {
                Err(self.err(
                    ErrorKind::Internal,
                    span,
                    "assignment operator reached the binary translator",
                ))
            }
        }
    }

    fn native_binary(&mut self, left: &Expr, right: &Expr, op: &str) -> Result<String> {
        let l = self.transpile_expression(left)?;
        let r = self.transpile_expression(right)?;
        Ok(format!("{l} {op} {r}"))
    }

    fn runtime_binary(&mut self, left: &Expr, right: &Expr, helper: &str) -> Result<String> {
        let l = self.transpile_expression(left)?;
        let r = self.transpile_expression(right)?;
        Ok(format!("TS.{helper}({l}, {r})"))
    }

    /// Addition dispatches on operand types: string concatenation when either
    /// side is a string, native `+` when both are numbers, and the runtime
    /// `add` helper otherwise (user-defined semantics on domain types).
    pub(super) fn lower_addition(left_ty: &Ty, right_ty: &Ty, l: &str, r: &str) -> String {
        if left_ty.is_string() || right_ty.is_string() {
            format!("({l}) .. {r}")
        } else if left_ty.is_number() && right_ty.is_number() {
            format!("{l} + {r}")
        } else {
            format!("TS.add({l}, {r})")
        }
    }

    fn is_zero_literal(e: &Expr) -> bool {
        match &e.kind {
            ExprKind::Number(text) => text.parse::<f64>() == Ok(0.0),
            _ => false,
        }
    }

    fn transpile_instanceof(&mut self, left: &Expr, right: &Expr) -> Result<String> {
        let l = self.transpile_expression(left)?;
        let class_name = right
            .symbol
            .as_ref()
            .map(|s| s.name.clone())
            .or_else(|| right.ty.name().map(str::to_string));

        if right.ty.inherits_from(lua::ENGINE_INSTANCE_ROOT) {
            if let Some(name) = class_name {
                return Ok(format!("TS.isA({l}, \"{name}\")"));
            }
        }
        if let Some(name) = &class_name {
            if lua::TAGGED_VALUE_TYPES.contains(name.as_str()) {
                return Ok(format!("(TS.typeof({l}) == \"{name}\")"));
            }
        }
        let r = self.transpile_expression(right)?;
        Ok(format!("TS.instanceof({l}, {r})"))
    }

    // =========================================================================
    // Unary
    // =========================================================================

    pub(super) fn transpile_prefix_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        span: Span,
    ) -> Result<String> {
        match op {
            UnaryOp::Not => {
                let text = self.transpile_expression(operand)?;
                Ok(format!("not {}", Self::maybe_paren(operand, text)))
            }
            UnaryOp::Minus => {
                let text = self.transpile_expression(operand)?;
                Ok(format!("-{}", Self::maybe_paren(operand, text)))
            }
            UnaryOp::Plus | UnaryOp::Tilde => Err(self.err(
                ErrorKind::BadPrefixOperator,
                span,
                "unsupported prefix operator",
            )),
            UnaryOp::PlusPlus | UnaryOp::MinusMinus => Err(self.err(
                ErrorKind::Internal,
                span,
                "increment reached the unary translator",
            )),
        }
    }

    // =========================================================================
    // Conditional
    // =========================================================================

    /// When the true branch's type admits false-like values the direct
    /// `and/or` form would mis-select; those lower to a two-thunk form.
    pub(super) fn transpile_conditional_expression(
        &mut self,
        cond: &Expr,
        when_true: &Expr,
        when_false: &Expr,
    ) -> Result<String> {
        let c = self.transpile_expression(cond)?;
        let t = self.transpile_expression(when_true)?;
        let f = self.transpile_expression(when_false)?;
        if when_true.ty.is_nullable() || when_true.ty.is_boolean() {
            Ok(format!(
                "({c} and function() return {t} end or function() return {f} end)()"
            ))
        } else {
            Ok(format!("({c} and {t} or {f})"))
        }
    }

    // =========================================================================
    // Assignment lowering
    // =========================================================================

    pub(super) fn assignment_iife(lowered: &LoweredAssignment) -> String {
        format!(
            "(function() {} return {}; end)()",
            lowered.statements.join(" "),
            lowered.value
        )
    }

    /// Indented statement-sequence form, for expression statements and
    /// for-loop headers.
    pub(super) fn assignment_statement_lines(&mut self, e: &Expr) -> Result<String> {
        let lowered = self.lower_assignment_expr(e, false)?;
        Ok(lowered
            .statements
            .iter()
            .map(|s| format!("{}{}\n", self.state.indent, s))
            .collect())
    }

    /// Lowers an assignment, compound assignment, or increment/decrement.
    /// `as_value` is true when the parent context reads the result.
    pub(super) fn lower_assignment_expr(
        &mut self,
        e: &Expr,
        as_value: bool,
    ) -> Result<LoweredAssignment> {
        match &e.kind {
            ExprKind::Binary { op, left, right } if *op == BinaryOp::Assign => {
                let rhs = self.transpile_expression(right)?;
                if !as_value {
                    // Single evaluation holds trivially; no capture needed.
                    let place = self.simple_place(left)?;
                    return Ok(LoweredAssignment {
                        statements: vec![format!("{place} = {rhs};")],
                        value: place,
                    });
                }
                let (mut statements, place) = self.lower_place(left)?;
                statements.push(format!("{place} = {rhs};"));
                Ok(LoweredAssignment {
                    statements,
                    value: place,
                })
            }
            ExprKind::Binary { op, left, right } if op.is_assignment() => {
                let rhs = self.transpile_expression(right)?;
                let (mut statements, place) = self.lower_place(left)?;
                let combined = self.combine_compound(*op, &place, &rhs, &left.ty, &right.ty, e.span)?;
                statements.push(format!("{place} = {combined};"));
                Ok(LoweredAssignment {
                    statements,
                    value: place,
                })
            }
            ExprKind::PrefixUnary { op, operand } => {
                let sym = match op {
                    UnaryOp::PlusPlus => "+",
                    UnaryOp::MinusMinus => "-",
                    _ => {
                        return Err(self.err(
                            ErrorKind::Internal,
                            e.span,
                            "non-increment prefix in assignment lowering",
                        ))
                    }
                };
                let (mut statements, place) = self.lower_place(operand)?;
                statements.push(format!("{place} = {place} {sym} 1;"));
                Ok(LoweredAssignment {
                    statements,
                    value: place,
                })
            }
            ExprKind::PostfixUnary { op, operand } => {
                let sym = match op {
                    crate::ast::PostfixOp::PlusPlus => "+",
                    crate::ast::PostfixOp::MinusMinus => "-",
                };
                let (mut statements, place) = self.lower_place(operand)?;
                if as_value {
                    // Capture the pre-value; the write still reads the place.
                    let pre = self.state.new_id();
                    statements.push(format!("local {pre} = {place};"));
                    statements.push(format!("{place} = {place} {sym} 1;"));
                    Ok(LoweredAssignment {
                        statements,
                        value: pre,
                    })
                } else {
                    statements.push(format!("{place} = {place} {sym} 1;"));
                    Ok(LoweredAssignment {
                        statements,
                        value: place,
                    })
                }
            }
            _ => Err(self.err(
                ErrorKind::Internal,
                e.span,
                "expression is not assignment-like",
            )),
        }
    }

    /// The place text for a left-hand side whose receiver needs no capture.
    fn simple_place(&mut self, lhs: &Expr) -> Result<String> {
        match &lhs.kind {
            ExprKind::Identifier(name) => {
                self.check_identifier(name, lhs.span)?;
                Ok(name.to_string())
            }
            ExprKind::PropertyAccess { expr, name } => {
                let recv = self.transpile_expression(expr)?;
                Ok(lua::safe_index(&recv, name))
            }
            ExprKind::ElementAccess { expr, index } => {
                let recv = self.transpile_expression(expr)?;
                let idx = self.element_index_text(expr, index)?;
                Ok(format!("{recv}[{idx}]"))
            }
            ExprKind::Parenthesized(inner) => self.simple_place(inner),
            _ => Err(self.err(
                ErrorKind::BadBinaryOperator,
                lhs.span,
                "invalid assignment target",
            )),
        }
    }

    /// The place for a left-hand side that is read and written: accesses
    /// capture their receiver (and index) into fresh identifiers so they are
    /// evaluated exactly once.
    fn lower_place(&mut self, lhs: &Expr) -> Result<(Vec<String>, String)> {
        match &lhs.kind {
            ExprKind::Identifier(name) => {
                self.check_identifier(name, lhs.span)?;
                Ok((Vec::new(), name.to_string()))
            }
            ExprKind::PropertyAccess { expr, name } => {
                let recv = self.transpile_expression(expr)?;
                let id = self.state.new_id();
                Ok((
                    vec![format!("local {id} = {recv};")],
                    lua::safe_index(&id, name),
                ))
            }
            ExprKind::ElementAccess { expr, index } => {
                let recv = self.transpile_expression(expr)?;
                let idx = self.element_index_text(expr, index)?;
                let recv_id = self.state.new_id();
                let idx_id = self.state.new_id();
                Ok((
                    vec![
                        format!("local {recv_id} = {recv};"),
                        format!("local {idx_id} = {idx};"),
                    ],
                    format!("{recv_id}[{idx_id}]"),
                ))
            }
            ExprKind::Parenthesized(inner) => self.lower_place(inner),
            _ => Err(self.err(
                ErrorKind::BadBinaryOperator,
                lhs.span,
                "invalid assignment target",
            )),
        }
    }

    fn combine_compound(
        &self,
        op: BinaryOp,
        read: &str,
        rhs: &str,
        left_ty: &Ty,
        right_ty: &Ty,
        span: Span,
    ) -> Result<String> {
        use BinaryOp::*;
        Ok(match op {
            PlusAssign => Self::lower_addition(left_ty, right_ty, read, rhs),
            MinusAssign => format!("{read} - {rhs}"),
            StarAssign => format!("{read} * {rhs}"),
            SlashAssign => format!("{read} / {rhs}"),
            PercentAssign => format!("{read} % {rhs}"),
            StarStarAssign => format!("{read} ^ {rhs}"),
            BarAssign => format!("TS.bor({read}, {rhs})"),
            AmpAssign => format!("TS.band({read}, {rhs})"),
            CaretAssign => format!("TS.bxor({read}, {rhs})"),
            LtLtAssign => format!("TS.blsh({read}, {rhs})"),
            GtGtAssign => format!("TS.brsh({read}, {rhs})"),
            _ => {
                return Err(self.err(
                    ErrorKind::Internal,
                    span,
                    "unrecognized compound assignment operator",
                ))
            }
        })
    }
}
