//! Function declarations and function/arrow expressions.

use super::Transpiler;
use crate::ast::{Expr, FunctionBody, FunctionDecl, FunctionExpr, Param, Span, Stmt};
use crate::diagnostics::Result;

/// Borrowed view over the two body shapes a function can carry.
pub(super) enum BodyRef<'a> {
    Block(&'a [Stmt]),
    Expr(&'a Expr),
}

impl Transpiler<'_> {
    /// Function declarations hoist their name and assign a function
    /// expression, permitting forward reference and mutual recursion.
    pub(super) fn transpile_function_declaration(
        &mut self,
        decl: &FunctionDecl,
        span: Span,
    ) -> Result<String> {
        let export_target = if decl.exported {
            Some(self.mark_exported(span)?)
        } else {
            None
        };
        self.check_identifier(&decl.name, span)?;
        self.state.hoist(&decl.name);

        let indent = self.state.indent.clone();
        let func = self.emit_function(
            &decl.params,
            BodyRef::Block(&decl.body),
            decl.is_async,
            decl.returns_tuple,
            false,
            span,
        )?;

        if let Some(target) = export_target {
            let exported = if decl.default_export {
                "_default"
            } else {
                decl.name.as_str()
            };
            self.state
                .push_export_line(format!("{target}.{exported} = {};", decl.name));
        }
        Ok(format!("{indent}{} = {func};\n", decl.name))
    }

    pub(super) fn transpile_function_expression(&mut self, f: &FunctionExpr) -> Result<String> {
        let body = match &f.body {
            FunctionBody::Block(stmts) => BodyRef::Block(stmts),
            FunctionBody::Expr(e) => BodyRef::Expr(e),
        };
        self.emit_function(
            &f.params,
            body,
            f.is_async,
            f.returns_tuple,
            false,
            Span::default(),
        )
    }

    /// Emits a `function(...) … end` expression at the current indent, with
    /// parameter defaults and initializers woven into the body head. Async
    /// functions wrap in the runtime scheduler.
    pub(super) fn emit_function(
        &mut self,
        params: &[Param],
        body: BodyRef<'_>,
        is_async: bool,
        returns_tuple: bool,
        include_self: bool,
        span: Span,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        self.state.push_indent();
        self.state.push_scope();
        let prev_returns = self.returns_tuple;
        let prev_in_ctor = self.in_constructor;
        let prev_in_try = self.in_try;
        let prev_in_switch = self.in_switch;
        self.returns_tuple = returns_tuple;
        self.in_constructor = false;
        self.in_try = false;
        self.in_switch = false;

        let inner = self.emit_function_inner(params, body, include_self, span);

        self.in_switch = prev_in_switch;
        self.in_try = prev_in_try;
        self.in_constructor = prev_in_ctor;
        self.returns_tuple = prev_returns;
        let frame = self.state.pop_scope();
        let inner = inner.map(|(list, body)| (list, self.assemble_scope(frame, body)));
        self.state.pop_indent();
        let (list, body) = inner?;

        let text = format!("function({list})\n{body}{indent}end");
        Ok(if is_async {
            format!("TS.async({text})")
        } else {
            text
        })
    }

    fn emit_function_inner(
        &mut self,
        params: &[Param],
        body: BodyRef<'_>,
        include_self: bool,
        span: Span,
    ) -> Result<(String, String)> {
        let indent = self.state.indent.clone();
        let lowered = self.lower_parameters(params, include_self, span)?;
        let mut lines = String::new();
        for line in lowered.defaults.iter().chain(lowered.initializers.iter()) {
            lines.push_str(&format!("{indent}{line}\n"));
        }
        match body {
            BodyRef::Block(stmts) => lines.push_str(&self.transpile_statement_list(stmts)?),
            BodyRef::Expr(e) => {
                let ret = self.return_text(Some(e))?;
                lines.push_str(&format!("{indent}{ret}\n"));
            }
        }
        Ok((lowered.list_text(), lines))
    }
}
