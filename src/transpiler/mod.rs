//! The transpiler: one stateful translator instance bound to one compilation
//! unit at a time.
//!
//! The driver walks top-level statements; statement translators recursively
//! invoke expression translators; translators return target-language text
//! that the caller weaves together with indentation. Specialized translators
//! live in the submodules and are implemented as `impl` blocks on
//! [`Transpiler`], one file per syntactic family.

mod access;
mod bindings;
mod calls;
mod classes;
mod enums;
mod expressions;
mod functions;
mod literals;
mod modules;
mod namespaces;
mod statements;

use tracing::debug;

use crate::ast::{Expr, ExprKind, SourceFile, Span, Stmt, UnaryOp};
use crate::context::{EmitState, ScopeFrame};
use crate::diagnostics::{ErrorKind, Result, TranspileError};
use crate::host::CompilerHost;
use crate::options::{CompilerOptions, ScriptContext, ScriptType};

pub struct Transpiler<'h> {
    options: CompilerOptions,
    host: &'h dyn CompilerHost,
    state: EmitState,
    file_path: String,
    script_type: ScriptType,
    /// Base-class name while translating members of a derived class.
    current_super: Option<String>,
    /// Set while translating a constructor body; explicit `return` is
    /// rejected there.
    in_constructor: bool,
    /// Set while translating a `try` region with no intervening loop or
    /// function; `break`/`continue` are rejected there because the try body
    /// is a protected-call closure.
    in_try: bool,
    /// Set while translating `switch` cases; a `break` here is absorbed by
    /// the switch's own `repeat` and stays legal even under `try`.
    in_switch: bool,
    /// Whether the enclosing function's declared return type is a tuple.
    returns_tuple: bool,
}

impl<'h> Transpiler<'h> {
    pub fn new(options: CompilerOptions, host: &'h dyn CompilerHost) -> Transpiler<'h> {
        Transpiler {
            options,
            host,
            state: EmitState::new(ScriptContext::None),
            file_path: String::new(),
            script_type: ScriptType::Script,
            current_super: None,
            in_constructor: false,
            in_try: false,
            in_switch: false,
            returns_tuple: false,
        }
    }

    /// The emission context. Exposed for invariant checks.
    pub fn state(&self) -> &EmitState {
        &self.state
    }

    /// Translates one source file to a target-language string.
    ///
    /// Emission state is reset per file. On error the partial output is
    /// discarded and the context stacks are left structurally empty, matching
    /// their pre-translation values.
    pub fn transpile_source_file(&mut self, file: &SourceFile) -> Result<String> {
        self.state.reset(self.host.script_context(&file.path));
        self.file_path = file.path.clone();
        self.script_type = self.host.script_type(&file.path);
        self.current_super = None;
        self.in_constructor = false;
        self.in_try = false;
        self.in_switch = false;
        self.returns_tuple = false;
        debug!(file = %file.path, "transpiling source file");

        self.state.push_scope();
        let body = self.transpile_statement_list(&file.statements);
        let scope = self.state.pop_scope();
        let body = body?;

        if self.script_type == ScriptType::Module && !self.state.is_module {
            return Err(self.err(
                ErrorKind::ModuleWithoutExports,
                Span::default(),
                "module script has no exports",
            ));
        }

        let mut out = String::new();
        out.push_str("-- luacheck: ignore\n");
        out.push_str(&format!(
            "local TS = require({});\n",
            self.options.runtime_lib_path
        ));
        if self.state.is_module {
            out.push_str("local _exports = {};\n");
        }
        out.push_str(&self.assemble_scope(scope, body));
        if self.state.is_module {
            out.push_str("return _exports;\n");
        }
        Ok(out)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub(crate) fn transpile_statement_list(&mut self, stmts: &[Stmt]) -> Result<String> {
        let mut out = String::new();
        for stmt in stmts {
            out.push_str(&self.transpile_statement(stmt)?);
        }
        Ok(out)
    }

    /// Translates the statements of one statemented scope, weaving in its
    /// hoist line and export lines.
    pub(crate) fn transpile_scoped_statements(&mut self, stmts: &[Stmt]) -> Result<String> {
        self.state.push_scope();
        let body = self.transpile_statement_list(stmts);
        let scope = self.state.pop_scope();
        Ok(self.assemble_scope(scope, body?))
    }

    /// Translates the body of a control construct at the current indent.
    /// Braced bodies get their own scope frames; single statements share the
    /// enclosing scope.
    pub(crate) fn transpile_nested_statement(&mut self, stmt: &Stmt) -> Result<String> {
        match &stmt.kind {
            crate::ast::StmtKind::Block(stmts) => self.transpile_scoped_statements(stmts),
            _ => self.transpile_statement(stmt),
        }
    }

    pub(crate) fn assemble_scope(&self, frame: ScopeFrame, body: String) -> String {
        let mut out = String::new();
        if !frame.hoisted.is_empty() {
            out.push_str(&format!(
                "{}local {};\n",
                self.state.indent,
                frame.hoisted.join(", ")
            ));
        }
        out.push_str(&body);
        for line in frame.exports {
            out.push_str(&format!("{}{}\n", self.state.indent, line));
        }
        out
    }

    pub(crate) fn transpile_statement(&mut self, stmt: &Stmt) -> Result<String> {
        use crate::ast::StmtKind::*;
        match &stmt.kind {
            Block(stmts) => self.transpile_block_statement(stmts),
            Expression(e) => self.transpile_expression_statement(e),
            Variable(decl) => self.transpile_variable_statement(decl, stmt.span),
            Return(e) => self.transpile_return_statement(e.as_ref(), stmt.span),
            If { .. } => self.transpile_if_statement(stmt),
            While { cond, body } => self.transpile_while_statement(cond, body),
            DoWhile { body, cond } => self.transpile_do_while_statement(body, cond),
            For {
                init,
                cond,
                inc,
                body,
            } => self.transpile_for_statement(init.as_ref(), cond.as_ref(), inc.as_ref(), body),
            ForIn { left, expr, body } => self.transpile_for_in_statement(left, expr, body, stmt.span),
            ForOf { left, expr, body } => self.transpile_for_of_statement(left, expr, body, stmt.span),
            Break { label } => self.transpile_break_statement(label.as_deref(), stmt.span),
            Continue { label } => self.transpile_continue_statement(label.as_deref(), stmt.span),
            Throw(e) => self.transpile_throw_statement(e),
            Try {
                block,
                catch,
                finally,
            } => self.transpile_try_statement(block, catch.as_ref(), finally.as_deref()),
            Switch { disc, cases } => self.transpile_switch_statement(disc, cases),
            Function(decl) => self.transpile_function_declaration(decl, stmt.span),
            Class(decl) => self.transpile_class_declaration(decl, stmt.span),
            Namespace(decl) => self.transpile_namespace_declaration(decl, stmt.span),
            Enum(decl) => self.transpile_enum_declaration(decl, stmt.span),
            Import(decl) => self.transpile_import_declaration(decl, stmt.span),
            ExportNamed(decl) => self.transpile_export_named(decl, stmt.span),
            ExportAll { specifier } => self.transpile_export_all(specifier, stmt.span),
            ExportAssignment(e) => self.transpile_export_assignment(e, stmt.span),
            TypeOnly | Empty => Ok(String::new()),
            Labeled { .. } => Err(self.err(
                ErrorKind::LabeledStatement,
                stmt.span,
                "labeled statements are not supported",
            )),
        }
    }

    pub(crate) fn transpile_expression(&mut self, e: &Expr) -> Result<String> {
        use crate::ast::ExprKind::*;
        match &e.kind {
            Identifier(name) => self.transpile_identifier(name, e.span),
            Number(text) => Ok(Self::transpile_numeric_literal(text)),
            Str(text) => Ok(Self::transpile_string_literal(text)),
            Template { head, spans } => self.transpile_template_expression(head, spans),
            True => Ok("true".to_string()),
            False => Ok("false".to_string()),
            Null => Err(self.err(
                ErrorKind::NullLiteral,
                e.span,
                "`null` is not supported; use `undefined`",
            )),
            This => Ok("self".to_string()),
            Super => Err(self.err(
                ErrorKind::Internal,
                e.span,
                "`super` outside call or property access",
            )),
            Array(elements) => self.transpile_array_literal(elements),
            Object(props) => self.transpile_object_literal(props),
            Binary { op, .. } if op.is_assignment() => {
                let lowered = self.lower_assignment_expr(e, true)?;
                Ok(Self::assignment_iife(&lowered))
            }
            Binary { op, left, right } => self.transpile_binary_expression(*op, left, right, e.span),
            PrefixUnary { op, operand } => match op {
                UnaryOp::PlusPlus | UnaryOp::MinusMinus => {
                    let lowered = self.lower_assignment_expr(e, true)?;
                    Ok(Self::assignment_iife(&lowered))
                }
                _ => self.transpile_prefix_unary(*op, operand, e.span),
            },
            PostfixUnary { .. } => {
                let lowered = self.lower_assignment_expr(e, true)?;
                Ok(Self::assignment_iife(&lowered))
            }
            Conditional {
                cond,
                when_true,
                when_false,
            } => self.transpile_conditional_expression(cond, when_true, when_false),
            Call { callee, args } => self.transpile_call_expression(callee, args, e.span),
            New { callee, args } => self.transpile_new_expression(callee, args.as_deref(), e.span),
            PropertyAccess { expr, name } => self.transpile_property_access(e, expr, name),
            ElementAccess { expr, index } => self.transpile_element_access(expr, index),
            Await(inner) => {
                let inner = self.transpile_expression(inner)?;
                Ok(format!("TS.await({inner})"))
            }
            TypeOf(inner) => {
                let inner = self.transpile_expression(inner)?;
                Ok(format!("TS.typeof({inner})"))
            }
            Spread(inner) => {
                let inner = self.transpile_expression(inner)?;
                Ok(format!("unpack({inner})"))
            }
            Parenthesized(inner) => {
                let inner = self.transpile_expression(inner)?;
                Ok(format!("({inner})"))
            }
            Function(f) => self.transpile_function_expression(f),
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(crate) fn err(&self, kind: ErrorKind, span: Span, message: impl Into<String>) -> TranspileError {
        TranspileError::new(kind, span, message)
    }

    /// Whether emission currently targets the file level rather than a
    /// namespace body.
    pub(crate) fn at_file_level(&self) -> bool {
        self.state.namespace_stack.is_empty()
    }

    /// Records that the current statement exports a binding, returning the
    /// object the binding installs into. Flips the module flag for file-level
    /// exports; rejects them in non-module scripts.
    pub(crate) fn mark_exported(&mut self, span: Span) -> Result<String> {
        if self.at_file_level() {
            if self.script_type == ScriptType::Script {
                return Err(self.err(
                    ErrorKind::ExportInScript,
                    span,
                    "cannot export from a non-module script",
                ));
            }
            self.state.is_module = true;
            Ok("_exports".to_string())
        } else {
            Ok(self.state.export_target().to_string())
        }
    }

    /// Wraps an expression in parentheses unless it is already atomic enough
    /// to stand as a prefix of an access or operator.
    pub(crate) fn maybe_paren(e: &Expr, text: String) -> String {
        match &e.kind {
            ExprKind::Identifier(_)
            | ExprKind::PropertyAccess { .. }
            | ExprKind::ElementAccess { .. }
            | ExprKind::Call { .. }
            | ExprKind::Parenthesized(_)
            | ExprKind::This => text,
            _ => format!("({text})"),
        }
    }
}
