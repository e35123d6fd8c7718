//! Namespace lowering.
//!
//! A namespace whose transitive body is type-level only emits nothing.
//! Otherwise it becomes `local N = {} do … end` with a fresh synthetic
//! identifier bound to the namespace object; nested exports install into
//! that synthetic while it sits on the namespace stack.

use tracing::trace;

use super::Transpiler;
use crate::ast::{NamespaceDecl, Span, Stmt, StmtKind};
use crate::diagnostics::Result;

impl Transpiler<'_> {
    pub(super) fn transpile_namespace_declaration(
        &mut self,
        decl: &NamespaceDecl,
        span: Span,
    ) -> Result<String> {
        if is_type_only(&decl.statements) {
            return Ok(String::new());
        }
        trace!(namespace = %decl.name, "lowering namespace");
        let export_target = if decl.exported {
            Some(self.mark_exported(span)?)
        } else {
            None
        };
        self.check_identifier(&decl.name, span)?;
        let indent = self.state.indent.clone();
        let name = &decl.name;

        self.state.push_indent();
        self.state.push_scope();
        let ns_id = self.state.new_id();
        self.state.namespace_stack.push(ns_id.clone());
        let body = self.transpile_statement_list(&decl.statements);
        self.state.namespace_stack.pop();
        let frame = self.state.pop_scope();
        let inner = body.map(|b| {
            format!(
                "{}local {ns_id} = {name};\n{}",
                self.state.indent,
                self.assemble_scope(frame, b)
            )
        });
        self.state.pop_indent();
        let inner = inner?;

        if let Some(target) = export_target {
            self.state
                .push_export_line(format!("{target}.{name} = {name};"));
        }
        Ok(format!("{indent}local {name} = {{}} do\n{inner}{indent}end;\n"))
    }
}

/// Whether the statements hold only type-level declarations: type aliases,
/// interfaces, ambient declarations, empty statements, or nested namespaces
/// that are themselves type-only.
fn is_type_only(stmts: &[Stmt]) -> bool {
    stmts.iter().all(|s| match &s.kind {
        StmtKind::TypeOnly | StmtKind::Empty => true,
        StmtKind::Namespace(n) => is_type_only(&n.statements),
        _ => false,
    })
}
