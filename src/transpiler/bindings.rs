//! Binding-pattern and parameter lowering.
//!
//! A pattern is walked recursively, accumulating three fragments in order:
//! pre-statements (temporaries for nested patterns), a flat declaration of
//! all leaf identifiers paired with their index expressions against the
//! root, and post-statements (default values). Array patterns index with
//! 1-based numeric keys, object patterns with string keys.

use super::Transpiler;
use crate::ast::{BindingName, BindingPattern, Expr, ExprKind, Param, PatternKind, Span};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

#[derive(Debug, Default)]
pub(super) struct BindingData {
    pub pre_statements: Vec<String>,
    pub names: Vec<String>,
    pub values: Vec<String>,
    pub post_statements: Vec<String>,
}

/// Lowered parameter list: the target parameter names, default-application
/// statements, and initializer statements (rest collection, `this` captures,
/// pattern expansions).
#[derive(Debug, Default)]
pub(super) struct LoweredParams {
    pub list: Vec<String>,
    pub defaults: Vec<String>,
    pub initializers: Vec<String>,
}

impl LoweredParams {
    pub fn list_text(&self) -> String {
        self.list.join(", ")
    }
}

impl Transpiler<'_> {
    pub(super) fn get_binding_data(
        &mut self,
        pattern: &BindingPattern,
        root: &str,
        out: &mut BindingData,
        span: Span,
    ) -> Result<()> {
        for (i, element) in pattern.elements.iter().enumerate() {
            let Some(element) = element else {
                continue; // array hole
            };
            if element.rest {
                return Err(self.err(
                    ErrorKind::SpreadInBindingPattern,
                    span,
                    "spread is not supported in binding patterns",
                ));
            }
            let value = match pattern.kind {
                PatternKind::Array => format!("{root}[{}]", i + 1),
                PatternKind::Object => {
                    let key = match (&element.property_name, &element.name) {
                        (Some(property), _) => property.as_str(),
                        (None, BindingName::Id(name)) => name.as_str(),
                        (None, BindingName::Pattern(_)) => {
                            return Err(self.err(
                                ErrorKind::Internal,
                                span,
                                "nested object pattern without a property name",
                            ))
                        }
                    };
                    lua::safe_index(root, key)
                }
            };
            match &element.name {
                BindingName::Id(name) => {
                    self.check_identifier(name, span)?;
                    out.names.push(name.clone());
                    out.values.push(value);
                    if let Some(default) = &element.default {
                        let default = self.transpile_expression(default)?;
                        out.post_statements
                            .push(format!("if {name} == nil then {name} = {default}; end;"));
                    }
                }
                BindingName::Pattern(nested) => {
                    let id = self.state.new_id();
                    out.pre_statements.push(format!("local {id} = {value};"));
                    self.get_binding_data(nested, &id, out, span)?;
                }
            }
        }
        Ok(())
    }

    /// Emits the statement lines declaring a destructured variable.
    pub(super) fn transpile_binding_declaration(
        &mut self,
        pattern: &BindingPattern,
        init: &Expr,
        span: Span,
    ) -> Result<String> {
        let indent = self.state.indent.clone();
        let mut out = String::new();

        // Non-identifier initializers are evaluated once into a root
        // temporary.
        let root = match &init.kind {
            ExprKind::Identifier(name) => self.transpile_identifier(name, init.span)?,
            _ => {
                let init_text = self.transpile_expression(init)?;
                let id = self.state.new_id();
                out.push_str(&format!("{indent}local {id} = {init_text};\n"));
                id
            }
        };

        let mut data = BindingData::default();
        self.get_binding_data(pattern, &root, &mut data, span)?;
        for line in &data.pre_statements {
            out.push_str(&format!("{indent}{line}\n"));
        }
        if !data.names.is_empty() {
            out.push_str(&format!(
                "{indent}local {} = {};\n",
                data.names.join(", "),
                data.values.join(", ")
            ));
        }
        for line in &data.post_statements {
            out.push_str(&format!("{indent}{line}\n"));
        }
        Ok(out)
    }

    /// Lowers a parameter list. `include_self` prepends the receiver
    /// parameter for methods and constructors.
    pub(super) fn lower_parameters(
        &mut self,
        params: &[Param],
        include_self: bool,
        span: Span,
    ) -> Result<LoweredParams> {
        let mut out = LoweredParams::default();
        if include_self {
            out.list.push("self".to_string());
        }
        for param in params {
            if param.rest {
                let BindingName::Id(name) = &param.name else {
                    return Err(self.err(
                        ErrorKind::SpreadInBindingPattern,
                        span,
                        "rest parameter cannot be a binding pattern",
                    ));
                };
                self.check_identifier(name, span)?;
                out.list.push("...".to_string());
                out.initializers.push(format!("local {name} = {{ ... }};"));
                continue;
            }
            match &param.name {
                BindingName::Id(name) => {
                    self.check_identifier(name, span)?;
                    out.list.push(name.clone());
                    if let Some(default) = &param.default {
                        let default = self.transpile_expression(default)?;
                        out.defaults
                            .push(format!("if {name} == nil then {name} = {default}; end;"));
                    }
                    if param.this_capture {
                        out.initializers.push(format!("self.{name} = {name};"));
                    }
                }
                BindingName::Pattern(pattern) => {
                    let id = self.state.new_id();
                    out.list.push(id.clone());
                    if let Some(default) = &param.default {
                        let default = self.transpile_expression(default)?;
                        out.defaults
                            .push(format!("if {id} == nil then {id} = {default}; end;"));
                    }
                    let mut data = BindingData::default();
                    self.get_binding_data(pattern, &id, &mut data, span)?;
                    out.initializers.extend(data.pre_statements);
                    if !data.names.is_empty() {
                        out.initializers.push(format!(
                            "local {} = {};",
                            data.names.join(", "),
                            data.values.join(", ")
                        ));
                    }
                    out.initializers.extend(data.post_statements);
                }
            }
        }
        Ok(out)
    }
}
