//! Property and element access.

use super::Transpiler;
use crate::ast::types::ConstValue;
use crate::ast::{Expr, ExprKind};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;
use crate::options::ScriptContext;

impl Transpiler<'_> {
    pub(super) fn transpile_property_access(
        &mut self,
        node: &Expr,
        receiver: &Expr,
        name: &str,
    ) -> Result<String> {
        if let Some(symbol) = &node.symbol {
            self.check_api_context(symbol, node.span)?;

            // Const-enum members inline to their compile-time value.
            if let Some(value) = symbol.const_enum_value() {
                return Ok(match value {
                    ConstValue::Number(n) => Self::format_number(*n),
                    ConstValue::String(s) => format!("\"{}\"", lua::escape_string(s)),
                });
            }
        }

        // `super.x` checks the base class's getter table and falls back to
        // the plain field on `self`.
        if matches!(receiver.kind, ExprKind::Super) {
            let base = self.super_class_name(node.span)?;
            let getter = lua::safe_index(&format!("{base}._getters"), name);
            let field = lua::safe_index("self", name);
            return Ok(format!("({getter} and {getter}(self) or {field})"));
        }

        if let Some(recv_symbol) = &receiver.symbol {
            if recv_symbol.is_function_like() {
                return Err(self.err(
                    ErrorKind::IndexingFunctionValue,
                    node.span,
                    format!("cannot index a function value with `{name}`"),
                ));
            }
            if name == "prototype" && recv_symbol.is_class() {
                return Err(self.err(
                    ErrorKind::PrototypeAccess,
                    node.span,
                    "`prototype` is not accessible on classes",
                ));
            }
        }

        let recv = self.transpile_expression(receiver)?;
        if name == "length" && (receiver.ty.is_string() || receiver.ty.is_array()) {
            return Ok(format!("#{}", Self::maybe_paren(receiver, recv)));
        }
        Ok(lua::safe_index(&recv, name))
    }

    pub(super) fn transpile_element_access(
        &mut self,
        receiver: &Expr,
        index: &Expr,
    ) -> Result<String> {
        // A call returning a tuple is multi-return; pick one value out.
        if receiver.ty.is_tuple() && matches!(receiver.kind, ExprKind::Call { .. }) {
            let call = self.transpile_expression(receiver)?;
            let idx = self.offset_index_text(index)?;
            return Ok(format!("(select({idx}, {call}))"));
        }

        let recv = self.transpile_expression(receiver)?;
        let recv = if Self::needs_receiver_parens(receiver) {
            format!("({recv})")
        } else {
            recv
        };

        if receiver.ty.is_array() || receiver.ty.is_tuple() {
            let idx = self.offset_index_text(index)?;
            return Ok(format!("{recv}[{idx}]"));
        }
        let idx = self.transpile_expression(index)?;
        Ok(format!("{recv}[{idx}]"))
    }

    /// The bracketed index text for `receiver[index]`, offset by one when the
    /// receiver is 1-based (array or tuple typed).
    pub(super) fn element_index_text(&mut self, receiver: &Expr, index: &Expr) -> Result<String> {
        if receiver.ty.is_array() || receiver.ty.is_tuple() {
            self.offset_index_text(index)
        } else {
            self.transpile_expression(index)
        }
    }

    /// `index + 1`, folding the addition for numeric literals.
    fn offset_index_text(&mut self, index: &Expr) -> Result<String> {
        if let ExprKind::Number(text) = &index.kind {
            if let Ok(value) = text.parse::<f64>() {
                return Ok(Self::format_number(value + 1.0));
            }
        }
        let idx = self.transpile_expression(index)?;
        Ok(format!("{idx} + 1"))
    }

    /// Array literals and array constructor-calls must be parenthesized for
    /// indexing to bind.
    fn needs_receiver_parens(receiver: &Expr) -> bool {
        match &receiver.kind {
            ExprKind::Array(_) => true,
            ExprKind::New { callee, .. } => {
                matches!(&callee.kind, ExprKind::Identifier(name) if name == "Array")
            }
            _ => false,
        }
    }

    /// JSDoc-directed cross-context gate: under the Server context touching a
    /// client-only symbol is fatal, and symmetrically for Client. Disabled by
    /// the `no_heuristics` option.
    pub(super) fn check_api_context(
        &self,
        symbol: &crate::ast::types::Symbol,
        span: crate::ast::Span,
    ) -> Result<()> {
        if self.options.no_heuristics {
            return Ok(());
        }
        match self.state.script_context {
            ScriptContext::Server if symbol.has_doc_tag("@rbx-client") => Err(self.err(
                ErrorKind::ClientOnlyApi,
                span,
                format!("`{}` is a client-only API", symbol.name),
            )),
            ScriptContext::Client if symbol.has_doc_tag("@rbx-server") => Err(self.err(
                ErrorKind::ServerOnlyApi,
                span,
                format!("`{}` is a server-only API", symbol.name),
            )),
            _ => Ok(()),
        }
    }

    pub(super) fn super_class_name(&self, span: crate::ast::Span) -> Result<String> {
        self.current_super.clone().ok_or_else(|| {
            self.err(
                ErrorKind::Internal,
                span,
                "`super` used outside a derived class",
            )
        })
    }
}
