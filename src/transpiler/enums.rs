//! Enum lowering.
//!
//! Const enums emit nothing; their uses inline at property-access sites.
//! Non-const enums emit an idempotent `N = N or {}` and a `do … end` block of
//! member assignments, with a reverse mapping for numeric members.
//! Uninitialized members auto-increment from the last numeric value,
//! starting at 0.

use super::Transpiler;
use crate::ast::{EnumDecl, EnumInit, Span};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

impl Transpiler<'_> {
    pub(super) fn transpile_enum_declaration(
        &mut self,
        decl: &EnumDecl,
        span: Span,
    ) -> Result<String> {
        if decl.is_const {
            return Ok(String::new());
        }
        let export_target = if decl.exported {
            Some(self.mark_exported(span)?)
        } else {
            None
        };
        self.check_identifier(&decl.name, span)?;
        self.state.hoist(&decl.name);

        let indent = self.state.indent.clone();
        let name = &decl.name;
        let mut out = format!("{indent}{name} = {name} or {{}};\n{indent}do\n");

        self.state.push_indent();
        let members = self.enum_members(decl, span);
        self.state.pop_indent();
        out.push_str(&members?);
        out.push_str(&format!("{indent}end;\n"));

        if let Some(target) = export_target {
            self.state
                .push_export_line(format!("{target}.{name} = {name};"));
        }
        Ok(out)
    }

    fn enum_members(&mut self, decl: &EnumDecl, span: Span) -> Result<String> {
        let indent = self.state.indent.clone();
        let name = &decl.name;
        let mut out = String::new();
        // Start below zero so the first auto-increment lands on 0.
        let mut last_numeric: Option<f64> = Some(-1.0);

        for member in &decl.members {
            let key = lua::safe_index(name, &member.name);
            match &member.init {
                None => {
                    let Some(prev) = last_numeric else {
                        return Err(self.err(
                            ErrorKind::UnsupportedConstruct,
                            span,
                            format!(
                                "enum member `{}` requires an initializer",
                                member.name
                            ),
                        ));
                    };
                    let value = prev + 1.0;
                    last_numeric = Some(value);
                    let value = Self::format_number(value);
                    out.push_str(&format!("{indent}{key} = {value};\n"));
                    out.push_str(&format!(
                        "{indent}{name}[{value}] = \"{}\";\n",
                        member.name
                    ));
                }
                Some(EnumInit::Number(n)) => {
                    last_numeric = Some(*n);
                    let value = Self::format_number(*n);
                    out.push_str(&format!("{indent}{key} = {value};\n"));
                    out.push_str(&format!(
                        "{indent}{name}[{value}] = \"{}\";\n",
                        member.name
                    ));
                }
                Some(EnumInit::Str(s)) => {
                    last_numeric = None;
                    out.push_str(&format!(
                        "{indent}{key} = \"{}\";\n",
                        lua::escape_string(s)
                    ));
                }
                Some(EnumInit::Expr(e)) => {
                    last_numeric = None;
                    let value = self.transpile_expression(e)?;
                    out.push_str(&format!("{indent}{key} = {value};\n"));
                }
            }
        }
        Ok(out)
    }
}
