//! Statement translators: blocks, variable declarations, control flow,
//! `switch`, `try`, and the `continue` simulation.

use super::Transpiler;
use crate::ast::{
    BindingName, CatchClause, Expr, ExprKind, ForBinding, ForInit, PatternKind, Span, Stmt,
    StmtKind, SwitchCase, VarKind, VariableStatement,
};
use crate::diagnostics::{ErrorKind, Result};

/// Leaf identifiers of a binding pattern, in declaration order.
fn pattern_leaf_names(pattern: &crate::ast::BindingPattern, out: &mut Vec<String>) {
    for element in pattern.elements.iter().flatten() {
        match &element.name {
            BindingName::Id(name) => out.push(name.clone()),
            BindingName::Pattern(nested) => pattern_leaf_names(nested, out),
        }
    }
}

impl Transpiler<'_> {
    pub(super) fn transpile_block_statement(&mut self, stmts: &[Stmt]) -> Result<String> {
        let indent = self.state.indent.clone();
        self.state.push_indent();
        let body = self.transpile_scoped_statements(stmts);
        self.state.pop_indent();
        let body = body?;
        Ok(format!("{indent}do\n{body}{indent}end;\n"))
    }

    /// Expression statements must be calls, `new`, `await`, assignments, or
    /// increment/decrement; anything else has no effect and is rejected.
    pub(super) fn transpile_expression_statement(&mut self, e: &Expr) -> Result<String> {
        let mut target = e;
        while let ExprKind::Parenthesized(inner) = &target.kind {
            target = &**inner;
        }
        match &target.kind {
            ExprKind::Binary { op, .. } if op.is_assignment() => {
                self.assignment_statement_lines(target)
            }
            ExprKind::PrefixUnary { op, .. }
                if matches!(
                    op,
                    crate::ast::UnaryOp::PlusPlus | crate::ast::UnaryOp::MinusMinus
                ) =>
            {
                self.assignment_statement_lines(target)
            }
            ExprKind::PostfixUnary { .. } => self.assignment_statement_lines(target),
            ExprKind::Call { .. } => {
                if Self::is_math_macro_call(target) {
                    return Err(self.err(
                        ErrorKind::MathMacroStatement,
                        target.span,
                        "arithmetic method macros cannot stand as statements",
                    ));
                }
                let text = self.transpile_expression(target)?;
                Ok(format!("{}{text};\n", self.state.indent))
            }
            ExprKind::New { .. } | ExprKind::Await(_) => {
                let text = self.transpile_expression(target)?;
                Ok(format!("{}{text};\n", self.state.indent))
            }
            _ => Err(self.err(
                ErrorKind::InvalidExpressionStatement,
                target.span,
                "expression statement must be a call, new, await, assignment, or increment",
            )),
        }
    }

    // =========================================================================
    // Variable declarations
    // =========================================================================

    pub(super) fn transpile_variable_statement(
        &mut self,
        decl: &VariableStatement,
        span: Span,
    ) -> Result<String> {
        if decl.kind == VarKind::Var {
            return Err(self.err(
                ErrorKind::VarKeyword,
                span,
                "`var` is not supported; use `let` or `const`",
            ));
        }
        let export_target = if decl.exported {
            Some(self.mark_exported(span)?)
        } else {
            None
        };
        let indent = self.state.indent.clone();
        let mut out = String::new();
        let mut declared: Vec<String> = Vec::new();

        // A single flat array pattern of identifiers destructuring a
        // tuple-returning call consumes the tuple directly as one
        // multi-assignment.
        if let [single] = decl.declarations.as_slice() {
            if let (BindingName::Pattern(pattern), Some(init)) = (&single.name, &single.init) {
                let flat_ids: Option<Vec<&str>> = pattern
                    .elements
                    .iter()
                    .map(|e| match e {
                        Some(el)
                            if !el.rest && el.default.is_none() && el.property_name.is_none() =>
                        {
                            match &el.name {
                                BindingName::Id(name) => Some(name.as_str()),
                                BindingName::Pattern(_) => None,
                            }
                        }
                        _ => None,
                    })
                    .collect();
                if pattern.kind == PatternKind::Array
                    && init.ty.is_tuple()
                    && matches!(init.kind, ExprKind::Call { .. })
                {
                    if let Some(names) = flat_ids.filter(|names| !names.is_empty()) {
                        let call = self.transpile_expression(init)?;
                        out.push_str(&format!(
                            "{indent}local {} = {call};\n",
                            names.join(", ")
                        ));
                        declared.extend(names.iter().map(|s| s.to_string()));
                        self.push_export_bindings(&export_target, &declared);
                        return Ok(out);
                    }
                }
            }
        }

        for declaration in &decl.declarations {
            match &declaration.name {
                BindingName::Id(name) => {
                    self.check_identifier(name, span)?;
                    declared.push(name.clone());
                    match &declaration.init {
                        None => out.push_str(&format!("{indent}local {name};\n")),
                        Some(init)
                            if matches!(&init.kind, ExprKind::Identifier(id) if id == "undefined") =>
                        {
                            // Trailing nil initializers are truncated.
                            out.push_str(&format!("{indent}local {name};\n"));
                        }
                        Some(init)
                            if init.ty.is_tuple()
                                && matches!(init.kind, ExprKind::Call { .. }) =>
                        {
                            // Collapse the multi-return into a one-element
                            // group bound to the single identifier.
                            let call = self.transpile_expression(init)?;
                            out.push_str(&format!("{indent}local {name} = {{ {call} }};\n"));
                        }
                        Some(init) => {
                            let text = self.transpile_expression(init)?;
                            out.push_str(&format!("{indent}local {name} = {text};\n"));
                        }
                    }
                }
                BindingName::Pattern(pattern) => {
                    let Some(init) = &declaration.init else {
                        return Err(self.err(
                            ErrorKind::Internal,
                            span,
                            "destructuring declaration without initializer",
                        ));
                    };
                    out.push_str(&self.transpile_binding_declaration(pattern, init, span)?);
                    pattern_leaf_names(pattern, &mut declared);
                }
            }
        }
        self.push_export_bindings(&export_target, &declared);
        Ok(out)
    }

    fn push_export_bindings(&mut self, target: &Option<String>, names: &[String]) {
        if let Some(target) = target {
            for name in names {
                self.state
                    .push_export_line(format!("{target}.{name} = {name};"));
            }
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    pub(super) fn transpile_return_statement(
        &mut self,
        e: Option<&Expr>,
        span: Span,
    ) -> Result<String> {
        if self.in_constructor {
            return Err(self.err(
                ErrorKind::ReturnInConstructor,
                span,
                "constructors cannot contain `return`",
            ));
        }
        let indent = self.state.indent.clone();
        Ok(format!("{indent}{}\n", self.return_text(e)?))
    }

    /// The `return ...;` text, honoring tuple multi-return conventions.
    pub(super) fn return_text(&mut self, e: Option<&Expr>) -> Result<String> {
        let Some(e) = e else {
            return Ok("return;".to_string());
        };
        if self.returns_tuple {
            if let ExprKind::Array(elements) = &e.kind {
                let flat = !elements
                    .iter()
                    .any(|el| matches!(el.kind, ExprKind::Spread(_)));
                if flat {
                    if elements.is_empty() {
                        return Ok("return;".to_string());
                    }
                    let parts = elements
                        .iter()
                        .map(|el| self.transpile_expression(el))
                        .collect::<Result<Vec<_>>>()?;
                    return Ok(format!("return {};", parts.join(", ")));
                }
            }
            if e.ty.is_tuple() {
                let text = self.transpile_expression(e)?;
                // Calls are already multi-return; stored tuples are tables
                // and must be unpacked.
                if matches!(e.kind, ExprKind::Call { .. }) {
                    return Ok(format!("return {text};"));
                }
                return Ok(format!("return unpack({text});"));
            }
        }
        let text = self.transpile_expression(e)?;
        Ok(format!("return {text};"))
    }

    pub(super) fn transpile_if_statement(&mut self, stmt: &Stmt) -> Result<String> {
        let indent = self.state.indent.clone();
        let mut out = String::new();
        let mut current = stmt;
        let mut first = true;
        loop {
            let StmtKind::If {
                cond,
                then,
                otherwise,
            } = &current.kind
            else {
                return Err(self.err(ErrorKind::Internal, stmt.span, "expected if statement"));
            };
            let cond = self.transpile_expression(cond)?;
            let keyword = if first { "if" } else { "elseif" };
            out.push_str(&format!("{indent}{keyword} {cond} then\n"));
            self.state.push_indent();
            let body = self.transpile_nested_statement(then);
            self.state.pop_indent();
            out.push_str(&body?);
            match otherwise.as_deref() {
                Some(next @ Stmt {
                    kind: StmtKind::If { .. },
                    ..
                }) => {
                    first = false;
                    current = next;
                }
                Some(other) => {
                    out.push_str(&format!("{indent}else\n"));
                    self.state.push_indent();
                    let body = self.transpile_nested_statement(other);
                    self.state.pop_indent();
                    out.push_str(&body?);
                    break;
                }
                None => break,
            }
        }
        out.push_str(&format!("{indent}end;\n"));
        Ok(out)
    }

    pub(super) fn transpile_while_statement(&mut self, cond: &Expr, body: &Stmt) -> Result<String> {
        let indent = self.state.indent.clone();
        let cond = self.transpile_expression(cond)?;
        self.state.push_indent();
        let body = self.transpile_loop_body(body, None);
        self.state.pop_indent();
        Ok(format!("{indent}while {cond} do\n{}{indent}end;\n", body?))
    }

    pub(super) fn transpile_do_while_statement(
        &mut self,
        body: &Stmt,
        cond: &Expr,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        self.state.push_indent();
        let body = self.transpile_loop_body(body, None);
        self.state.pop_indent();
        let body = body?;
        let cond = self.transpile_expression(cond)?;
        Ok(format!("{indent}repeat\n{body}{indent}until not ({cond});\n"))
    }

    pub(super) fn transpile_for_statement(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        inc: Option<&Expr>,
        body: &Stmt,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        self.state.push_indent();
        self.state.push_scope();
        let inner = self.for_statement_inner(init, cond, inc, body);
        let frame = self.state.pop_scope();
        let inner = inner.map(|b| self.assemble_scope(frame, b));
        self.state.pop_indent();
        Ok(format!("{indent}do\n{}{indent}end;\n", inner?))
    }

    fn for_statement_inner(
        &mut self,
        init: Option<&ForInit>,
        cond: Option<&Expr>,
        inc: Option<&Expr>,
        body: &Stmt,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        let mut out = String::new();
        match init {
            Some(ForInit::Variable(decl)) => {
                out.push_str(&self.transpile_variable_statement(decl, Span::default())?);
            }
            Some(ForInit::Expr(e)) => out.push_str(&self.transpile_expression_statement(e)?),
            None => {}
        }
        let cond = match cond {
            Some(c) => self.transpile_expression(c)?,
            None => "true".to_string(),
        };
        out.push_str(&format!("{indent}while {cond} do\n"));
        self.state.push_indent();
        let body = self.transpile_loop_body(body, inc);
        self.state.pop_indent();
        out.push_str(&body?);
        out.push_str(&format!("{indent}end;\n"));
        Ok(out)
    }

    pub(super) fn transpile_for_in_statement(
        &mut self,
        left: &ForBinding,
        expr: &Expr,
        body: &Stmt,
        span: Span,
    ) -> Result<String> {
        if left.kind == VarKind::Var {
            return Err(self.err(ErrorKind::VarKeyword, span, "`var` is not supported"));
        }
        if left.init.is_some() {
            return Err(self.err(
                ErrorKind::InitializerInForIn,
                span,
                "for…in variable cannot have an initializer",
            ));
        }
        let BindingName::Id(key) = &left.name else {
            return Err(self.err(
                ErrorKind::BindingPatternInForIn,
                span,
                "for…in key cannot be a binding pattern",
            ));
        };
        self.check_identifier(key, span)?;
        let indent = self.state.indent.clone();
        let expr = self.transpile_expression(expr)?;
        self.state.push_indent();
        let body = self.transpile_loop_body(body, None);
        self.state.pop_indent();
        Ok(format!(
            "{indent}for {key} in pairs({expr}) do\n{}{indent}end;\n",
            body?
        ))
    }

    pub(super) fn transpile_for_of_statement(
        &mut self,
        left: &ForBinding,
        expr: &Expr,
        body: &Stmt,
        span: Span,
    ) -> Result<String> {
        if left.kind == VarKind::Var {
            return Err(self.err(ErrorKind::VarKeyword, span, "`var` is not supported"));
        }
        let indent = self.state.indent.clone();
        let expr = self.transpile_expression(expr)?;

        let (value_name, expansion) = match &left.name {
            BindingName::Id(name) => {
                self.check_identifier(name, span)?;
                (name.clone(), None)
            }
            BindingName::Pattern(pattern) => {
                let id = self.state.new_id();
                (id, Some(pattern))
            }
        };

        self.state.push_indent();
        let inner = (|| -> Result<String> {
            let mut out = String::new();
            if let Some(pattern) = expansion {
                let inner_indent = self.state.indent.clone();
                let mut data = super::bindings::BindingData::default();
                self.get_binding_data(pattern, &value_name, &mut data, span)?;
                for line in &data.pre_statements {
                    out.push_str(&format!("{inner_indent}{line}\n"));
                }
                if !data.names.is_empty() {
                    out.push_str(&format!(
                        "{inner_indent}local {} = {};\n",
                        data.names.join(", "),
                        data.values.join(", ")
                    ));
                }
                for line in &data.post_statements {
                    out.push_str(&format!("{inner_indent}{line}\n"));
                }
            }
            out.push_str(&self.transpile_loop_body(body, None)?);
            Ok(out)
        })();
        self.state.pop_indent();
        Ok(format!(
            "{indent}for _, {value_name} in pairs({expr}) do\n{}{indent}end;\n",
            inner?
        ))
    }

    pub(super) fn transpile_break_statement(
        &mut self,
        label: Option<&str>,
        span: Span,
    ) -> Result<String> {
        if label.is_some() {
            return Err(self.err(
                ErrorKind::LabeledStatement,
                span,
                "labeled break is not supported",
            ));
        }
        // Inside a try region the loop's break target sits outside the
        // protected-call closure; only a switch's own repeat can absorb the
        // jump there.
        if self.in_try && !self.in_switch {
            return Err(self.err(
                ErrorKind::JumpInTry,
                span,
                "`break` cannot cross a try boundary",
            ));
        }
        Ok(format!("{}break;\n", self.state.indent))
    }

    pub(super) fn transpile_continue_statement(
        &mut self,
        label: Option<&str>,
        span: Span,
    ) -> Result<String> {
        if label.is_some() {
            return Err(self.err(
                ErrorKind::LabeledStatement,
                span,
                "labeled continue is not supported",
            ));
        }
        if self.in_try {
            return Err(self.err(
                ErrorKind::JumpInTry,
                span,
                "`continue` cannot cross a try boundary",
            ));
        }
        if self.state.continue_id < 0 {
            return Err(self.err(ErrorKind::Internal, span, "`continue` outside a loop"));
        }
        let indent = &self.state.indent;
        let flag = format!("_continue_{}", self.state.continue_id);
        Ok(format!("{indent}{flag} = true;\n{indent}break;\n"))
    }

    pub(super) fn transpile_throw_statement(&mut self, e: &Expr) -> Result<String> {
        let text = self.transpile_expression(e)?;
        Ok(format!("{}TS.error({text});\n", self.state.indent))
    }

    // =========================================================================
    // Continue simulation
    // =========================================================================

    /// Emits a loop body at the current indent, wrapping it in the
    /// `repeat … until true` continue simulation when the body contains a
    /// `continue` for this loop. `trailing` is the for-loop incrementor; it
    /// runs after the propagated-break check so `break` skips it and
    /// `continue` does not.
    pub(super) fn transpile_loop_body(
        &mut self,
        body: &Stmt,
        trailing: Option<&Expr>,
    ) -> Result<String> {
        // The loop is a fresh jump target; enclosing try/switch context does
        // not reach past it.
        let prev_in_try = self.in_try;
        let prev_in_switch = self.in_switch;
        self.in_try = false;
        self.in_switch = false;
        let result = if Self::stmt_has_continue(body) {
            self.state.continue_id += 1;
            let result = self.continue_simulated_body(body, trailing);
            self.state.continue_id -= 1;
            result
        } else {
            self.plain_loop_body(body, trailing)
        };
        self.in_switch = prev_in_switch;
        self.in_try = prev_in_try;
        result
    }

    fn plain_loop_body(&mut self, body: &Stmt, trailing: Option<&Expr>) -> Result<String> {
        let mut out = self.transpile_nested_statement(body)?;
        if let Some(inc) = trailing {
            out.push_str(&self.transpile_expression_statement(inc)?);
        }
        Ok(out)
    }

    fn continue_simulated_body(&mut self, body: &Stmt, trailing: Option<&Expr>) -> Result<String> {
        let indent = self.state.indent.clone();
        let flag = format!("_continue_{}", self.state.continue_id);
        let mut out = String::new();
        out.push_str(&format!("{indent}local {flag} = false;\n"));
        out.push_str(&format!("{indent}repeat\n"));
        self.state.push_indent();
        let inner_indent = self.state.indent.clone();
        let inner = self.transpile_nested_statement(body);
        self.state.pop_indent();
        out.push_str(&inner?);
        out.push_str(&format!("{inner_indent}{flag} = true;\n"));
        out.push_str(&format!("{indent}until true;\n"));
        out.push_str(&format!("{indent}if not {flag} then\n"));
        out.push_str(&format!("{indent}\tbreak;\n"));
        out.push_str(&format!("{indent}end;\n"));
        if let Some(inc) = trailing {
            out.push_str(&self.transpile_expression_statement(inc)?);
        }
        Ok(out)
    }

    /// Whether a loop body transitively contains a `continue` belonging to
    /// this loop. Nested loops own their own `continue`s; function bodies
    /// and try regions cannot carry one out, so neither is descended into.
    fn stmt_has_continue(stmt: &Stmt) -> bool {
        match &stmt.kind {
            StmtKind::Continue { .. } => true,
            StmtKind::Block(stmts) => stmts.iter().any(Self::stmt_has_continue),
            StmtKind::If {
                then, otherwise, ..
            } => {
                Self::stmt_has_continue(then)
                    || otherwise.as_deref().is_some_and(Self::stmt_has_continue)
            }
            StmtKind::Switch { cases, .. } => cases
                .iter()
                .flat_map(|c| c.statements.iter())
                .any(Self::stmt_has_continue),
            _ => false,
        }
    }

    // =========================================================================
    // Try and switch
    // =========================================================================

    /// The try body becomes a protected-call closure, so `break`/`continue`
    /// anywhere in the construct cannot reach an enclosing loop and are
    /// rejected unless a nested loop (or, for `break`, a nested switch)
    /// provides its own target.
    pub(super) fn transpile_try_statement(
        &mut self,
        block: &[Stmt],
        catch: Option<&CatchClause>,
        finally: Option<&[Stmt]>,
    ) -> Result<String> {
        let prev_in_try = self.in_try;
        let prev_in_switch = self.in_switch;
        self.in_try = true;
        self.in_switch = false;
        let result = self.try_statement_inner(block, catch, finally);
        self.in_switch = prev_in_switch;
        self.in_try = prev_in_try;
        result
    }

    fn try_statement_inner(
        &mut self,
        block: &[Stmt],
        catch: Option<&CatchClause>,
        finally: Option<&[Stmt]>,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        let ok_id = self.state.new_id();
        let err_id = self.state.new_id();
        let mut out = String::new();

        out.push_str(&format!(
            "{indent}local {ok_id}, {err_id} = pcall(function()\n"
        ));
        self.state.push_indent();
        let body = self.transpile_scoped_statements(block);
        self.state.pop_indent();
        out.push_str(&body?);
        out.push_str(&format!("{indent}end);\n"));

        if let Some(catch) = catch {
            out.push_str(&format!("{indent}if not {ok_id} then\n"));
            self.state.push_indent();
            let inner = (|| -> Result<String> {
                let mut s = String::new();
                if let Some(var) = &catch.var {
                    self.check_identifier(var, Span::default())?;
                    s.push_str(&format!(
                        "{}local {var} = TS.decodeError({err_id});\n",
                        self.state.indent
                    ));
                }
                s.push_str(&self.transpile_scoped_statements(&catch.block)?);
                Ok(s)
            })();
            self.state.pop_indent();
            out.push_str(&inner?);
            out.push_str(&format!("{indent}end;\n"));
        }

        if let Some(finally) = finally {
            out.push_str(&self.transpile_scoped_statements(finally)?);
        }
        Ok(out)
    }

    pub(super) fn transpile_switch_statement(
        &mut self,
        disc: &Expr,
        cases: &[SwitchCase],
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        let prev_in_switch = self.in_switch;
        self.in_switch = true;
        self.state.push_indent();
        self.state.push_scope();
        let inner = self.switch_inner(disc, cases);
        let frame = self.state.pop_scope();
        let inner = inner.map(|b| self.assemble_scope(frame, b));
        self.state.pop_indent();
        self.in_switch = prev_in_switch;
        let mut out = format!("{indent}repeat\n{}{indent}until true;\n", inner?);

        // A `continue` inside a case breaks out of this repeat, not the
        // loop; re-break on the flag so it keeps propagating outward
        // (through nested switches) until it reaches the loop's own check.
        if self.state.continue_id >= 0
            && cases
                .iter()
                .flat_map(|c| c.statements.iter())
                .any(Self::stmt_has_continue)
        {
            let flag = format!("_continue_{}", self.state.continue_id);
            out.push_str(&format!(
                "{indent}if {flag} then\n{indent}\tbreak;\n{indent}end;\n"
            ));
        }
        Ok(out)
    }

    fn switch_inner(&mut self, disc: &Expr, cases: &[SwitchCase]) -> Result<String> {
        let indent = self.state.indent.clone();
        let mut out = String::new();

        let disc_text = self.transpile_expression(disc)?;
        let disc_id = self.state.new_id();
        out.push_str(&format!("{indent}local {disc_id} = {disc_text};\n"));

        let has_tests = cases.iter().any(|c| c.test.is_some());
        let fall_id = if has_tests {
            let id = self.state.new_id();
            out.push_str(&format!("{indent}local {id} = false;\n"));
            Some(id)
        } else {
            None
        };

        for case in cases {
            match &case.test {
                Some(test) => {
                    let fall = fall_id.as_deref().unwrap_or_default();
                    let test = self.transpile_expression(test)?;
                    out.push_str(&format!("{indent}if {fall} or {disc_id} == ({test}) then\n"));
                    self.state.push_indent();
                    let body = self.transpile_statement_list(&case.statements);
                    let inner_indent = self.state.indent.clone();
                    self.state.pop_indent();
                    out.push_str(&body?);
                    // The fall-through flag carries into the next case unless
                    // this one ends in a jump.
                    if !Self::ends_with_jump(&case.statements) {
                        out.push_str(&format!("{inner_indent}{fall} = true;\n"));
                    }
                    out.push_str(&format!("{indent}end;\n"));
                }
                None => {
                    out.push_str(&self.transpile_statement_list(&case.statements)?);
                }
            }
        }
        Ok(out)
    }

    fn ends_with_jump(stmts: &[Stmt]) -> bool {
        matches!(
            stmts.last().map(|s| &s.kind),
            Some(StmtKind::Break { label: None })
                | Some(StmtKind::Continue { label: None })
                | Some(StmtKind::Return(_))
        )
    }
}
