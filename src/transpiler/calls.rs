//! Call expressions and the receiver-type-directed method-call classifier.

use super::Transpiler;
use crate::ast::{Expr, ExprKind, Span};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

const MAP_TYPES: &[&str] = &["Map", "ReadonlyMap", "WeakMap"];
const SET_TYPES: &[&str] = &["Set", "ReadonlySet", "WeakSet"];
const MATH_MACRO_METHODS: &[&str] = &["add", "sub", "mul", "div"];

impl Transpiler<'_> {
    pub(super) fn transpile_call_expression(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> Result<String> {
        // `super(...)` forwards to the base constructor.
        if matches!(callee.kind, ExprKind::Super) {
            let base = self.super_class_name(span)?;
            let args = self.transpile_call_args(args)?;
            if args.is_empty() {
                return Ok(format!("{base}.constructor(self)"));
            }
            return Ok(format!("{base}.constructor(self, {args})"));
        }

        if let ExprKind::PropertyAccess { expr, name } = &callee.kind {
            return self.transpile_method_call(callee, expr, name, args);
        }

        let callee_text = self.transpile_expression(callee)?;
        let args = self.transpile_call_args(args)?;
        Ok(format!("{callee_text}({args})"))
    }

    /// Classifies `receiver.method(args)` by the receiver's static type.
    fn transpile_method_call(
        &mut self,
        callee: &Expr,
        receiver: &Expr,
        method: &str,
        args: &[Expr],
    ) -> Result<String> {
        if let Some(symbol) = &callee.symbol {
            self.check_api_context(symbol, callee.span)?;
        }

        // `super.m(...)` cannot colon-call; it reads the base prototype.
        if matches!(receiver.kind, ExprKind::Super) {
            let base = self.super_class_name(callee.span)?;
            let args = self.transpile_call_args(args)?;
            if args.is_empty() {
                return Ok(format!("{base}.__index.{method}(self)"));
            }
            return Ok(format!("{base}.__index.{method}(self, {args})"));
        }

        if receiver.ty.is_array() {
            let recv = self.transpile_expression(receiver)?;
            let args = self.transpile_call_args(args)?;
            return Ok(if args.is_empty() {
                format!("TS.array_{method}({recv})")
            } else {
                format!("TS.array_{method}({recv}, {args})")
            });
        }

        if receiver.ty.is_string() {
            let recv = self.transpile_expression(receiver)?;
            let args = self.transpile_call_args(args)?;
            let joined = if args.is_empty() {
                recv
            } else {
                format!("{recv}, {args}")
            };
            return Ok(if lua::STRING_MACRO_METHODS.contains(method) {
                format!("string.{method}({joined})")
            } else {
                format!("TS.string_{method}({joined})")
            });
        }

        if receiver.ty.name() == Some("Promise") && method == "then" {
            let recv = self.transpile_expression(receiver)?;
            let args = self.transpile_call_args(args)?;
            return Ok(format!("{recv}:andThen({args})"));
        }

        // `Symbol.for` collides with a reserved target keyword.
        if matches!(&receiver.kind, ExprKind::Identifier(name) if name == "Symbol") && method == "for"
        {
            let args = self.transpile_call_args(args)?;
            return Ok(format!("TS.Symbol.getFor({args})"));
        }

        if let Some(name) = receiver.ty.name() {
            if MAP_TYPES.contains(&name) {
                return self.runtime_method_call("map", method, receiver, args);
            }
            if SET_TYPES.contains(&name) {
                return self.runtime_method_call("set", method, receiver, args);
            }
        }

        if matches!(&receiver.kind, ExprKind::Identifier(name) if name == "Object") {
            let args = self.transpile_call_args(args)?;
            return Ok(format!("TS.Object_{method}({args})"));
        }

        // Math-like value types inline add/sub/mul/div to operators.
        if let Some(name) = receiver.ty.name() {
            if lua::MATH_VALUE_TYPES.contains(name) && MATH_MACRO_METHODS.contains(&method) {
                let op = match method {
                    "add" => "+",
                    "sub" => "-",
                    "mul" => "*",
                    _ => "/",
                };
                let recv = self.transpile_expression(receiver)?;
                let arg = args.first().ok_or_else(|| {
                    self.err(
                        ErrorKind::Internal,
                        callee.span,
                        format!("`{method}` expects one argument"),
                    )
                })?;
                let arg = self.transpile_expression(arg)?;
                return Ok(format!("({recv} {op} {arg})"));
            }
        }

        let recv = self.transpile_expression(receiver)?;
        let args = self.transpile_call_args(args)?;
        let is_method = callee.symbol.as_ref().is_some_and(|s| s.is_method());
        if is_method {
            Ok(format!("{recv}:{method}({args})"))
        } else {
            Ok(format!("{}({args})", lua::safe_index(&recv, method)))
        }
    }

    fn runtime_method_call(
        &mut self,
        family: &str,
        method: &str,
        receiver: &Expr,
        args: &[Expr],
    ) -> Result<String> {
        let recv = self.transpile_expression(receiver)?;
        let args = self.transpile_call_args(args)?;
        Ok(if args.is_empty() {
            format!("TS.{family}_{method}({recv})")
        } else {
            format!("TS.{family}_{method}({recv}, {args})")
        })
    }

    /// Whether an expression statement would lower to a math-macro inlining,
    /// which has no statement form.
    pub(super) fn is_math_macro_call(e: &Expr) -> bool {
        if let ExprKind::Call { callee, .. } = &e.kind {
            if let ExprKind::PropertyAccess { expr, name } = &callee.kind {
                if let Some(type_name) = expr.ty.name() {
                    return lua::MATH_VALUE_TYPES.contains(type_name)
                        && MATH_MACRO_METHODS.contains(&name.as_str());
                }
            }
        }
        false
    }

    pub(super) fn transpile_call_args(&mut self, args: &[Expr]) -> Result<String> {
        let parts = args
            .iter()
            .map(|a| self.transpile_expression(a))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(", "))
    }

    pub(super) fn transpile_new_expression(
        &mut self,
        callee: &Expr,
        args: Option<&[Expr]>,
        span: Span,
    ) -> Result<String> {
        let Some(args) = args else {
            return Err(self.err(
                ErrorKind::NewWithoutParentheses,
                span,
                "`new` requires parentheses",
            ));
        };
        if let ExprKind::Identifier(name) = &callee.kind {
            match name.as_str() {
                "Array" => return Ok("{}".to_string()),
                "Map" => {
                    let args = self.transpile_call_args(args)?;
                    return Ok(format!("TS.map_new({args})"));
                }
                "Set" => {
                    let args = self.transpile_call_args(args)?;
                    return Ok(format!("TS.set_new({args})"));
                }
                _ => {}
            }
        }
        let callee_text = self.transpile_expression(callee)?;
        let args = self.transpile_call_args(args)?;
        Ok(format!("{callee_text}.new({args})"))
    }
}
