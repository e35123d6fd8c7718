//! Imports, exports, and re-exports.

use super::Transpiler;
use crate::ast::{Expr, ExportNamedDecl, ImportDecl, Span};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

impl Transpiler<'_> {
    fn resolve_import(&self, specifier: &str, span: Span) -> Result<String> {
        self.host
            .import_path(&self.file_path, specifier)
            .ok_or_else(|| {
                self.err(
                    ErrorKind::MissingModuleFile,
                    span,
                    format!("could not find module file for \"{specifier}\""),
                )
            })
    }

    /// Import bindings read fields off the required module table. When more
    /// than one binding shares the module, the table is cached in a synthetic
    /// local.
    pub(super) fn transpile_import_declaration(
        &mut self,
        decl: &ImportDecl,
        span: Span,
    ) -> Result<String> {
        let path = self.resolve_import(&decl.specifier, span)?;
        let require = format!("require({path})");
        let indent = self.state.indent.clone();

        let binding_count = usize::from(decl.default_name.is_some())
            + usize::from(decl.namespace_name.is_some())
            + decl.named.len();

        // Side-effect import.
        if binding_count == 0 {
            return Ok(format!("{indent}{require};\n"));
        }

        if binding_count == 1 {
            if let Some(name) = &decl.default_name {
                self.check_identifier(name, span)?;
                return Ok(format!("{indent}local {name} = {require}._default;\n"));
            }
            if let Some(name) = &decl.namespace_name {
                self.check_identifier(name, span)?;
                return Ok(format!("{indent}local {name} = {require};\n"));
            }
            let spec = &decl.named[0];
            let bound = spec.alias.as_deref().unwrap_or(&spec.name);
            self.check_identifier(bound, span)?;
            return Ok(format!(
                "{indent}local {bound} = {};\n",
                lua::safe_index(&require, &spec.name)
            ));
        }

        let id = self.state.new_id();
        let mut out = format!("{indent}local {id} = {require};\n");
        if let Some(name) = &decl.default_name {
            self.check_identifier(name, span)?;
            out.push_str(&format!("{indent}local {name} = {id}._default;\n"));
        }
        if let Some(name) = &decl.namespace_name {
            self.check_identifier(name, span)?;
            out.push_str(&format!("{indent}local {name} = {id};\n"));
        }
        for spec in &decl.named {
            let bound = spec.alias.as_deref().unwrap_or(&spec.name);
            self.check_identifier(bound, span)?;
            out.push_str(&format!(
                "{indent}local {bound} = {};\n",
                lua::safe_index(&id, &spec.name)
            ));
        }
        Ok(out)
    }

    /// `export { a, b as c }` installs bindings at scope end; with a module
    /// specifier the bindings are read off the required module immediately.
    pub(super) fn transpile_export_named(
        &mut self,
        decl: &ExportNamedDecl,
        span: Span,
    ) -> Result<String> {
        let target = self.mark_exported(span)?;
        let Some(specifier) = &decl.specifier else {
            for binding in &decl.bindings {
                let exported = binding.alias.as_deref().unwrap_or(&binding.name);
                self.state.push_export_line(format!(
                    "{} = {};",
                    lua::safe_index(&target, exported),
                    binding.name
                ));
            }
            return Ok(String::new());
        };

        let path = self.resolve_import(specifier, span)?;
        let require = format!("require({path})");
        let indent = self.state.indent.clone();

        if let [binding] = decl.bindings.as_slice() {
            let exported = binding.alias.as_deref().unwrap_or(&binding.name);
            return Ok(format!(
                "{indent}{} = {};\n",
                lua::safe_index(&target, exported),
                lua::safe_index(&require, &binding.name)
            ));
        }

        let id = self.state.new_id();
        let mut out = format!("{indent}local {id} = {require};\n");
        for binding in &decl.bindings {
            let exported = binding.alias.as_deref().unwrap_or(&binding.name);
            out.push_str(&format!(
                "{indent}{} = {};\n",
                lua::safe_index(&target, exported),
                lua::safe_index(&id, &binding.name)
            ));
        }
        Ok(out)
    }

    pub(super) fn transpile_export_all(&mut self, specifier: &str, span: Span) -> Result<String> {
        let target = self.mark_exported(span)?;
        let path = self.resolve_import(specifier, span)?;
        Ok(format!(
            "{}TS.exportNamespace(require({path}), {target});\n",
            self.state.indent
        ))
    }

    pub(super) fn transpile_export_assignment(&mut self, e: &Expr, span: Span) -> Result<String> {
        self.mark_exported(span)?;
        let value = self.transpile_expression(e)?;
        Ok(format!("{}_exports = {value};\n", self.state.indent))
    }
}
