//! Class lowering.
//!
//! A class becomes a scoped block that assembles a class table (statics), a
//! prototype table at `Cls.__index` (instance methods), metamethod
//! trampolines, a `new` factory, a `constructor` function, static property
//! assignments, and accessor dispatch tables. Single inheritance is
//! reconstructed with metatable chains; getters and setters replace
//! `__index`/`__newindex` with dispatching functions.

use tracing::trace;

use super::functions::BodyRef;
use super::Transpiler;
use crate::ast::{ClassDecl, ClassMember, Expr, ExprKind, Param, Span, Stmt, StmtKind};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

/// One method-shaped table entry.
struct MethodEntry<'a> {
    name: &'a str,
    params: &'a [Param],
    body: &'a [Stmt],
    is_async: bool,
    returns_tuple: bool,
}

impl Transpiler<'_> {
    pub(super) fn transpile_class_declaration(
        &mut self,
        decl: &ClassDecl,
        span: Span,
    ) -> Result<String> {
        trace!(class = %decl.name, "lowering class declaration");
        let export_target = if decl.exported {
            Some(self.mark_exported(span)?)
        } else {
            None
        };
        self.check_identifier(&decl.name, span)?;

        for member in &decl.members {
            if let ClassMember::Method { name, .. } = member {
                if lua::RESERVED_METAMETHODS.contains(name.as_str()) {
                    return Err(self.err(
                        ErrorKind::ReservedMetamethod,
                        span,
                        format!("`{name}` is reserved by the class lowering"),
                    ));
                }
            }
            if let ClassMember::Getter { is_static: true, .. }
            | ClassMember::Setter { is_static: true, .. } = member
            {
                return Err(self.err(
                    ErrorKind::UnsupportedConstruct,
                    span,
                    "static accessors are not supported",
                ));
            }
        }

        self.state.hoist(&decl.name);
        let indent = self.state.indent.clone();

        let prev_super = self.current_super.clone();
        self.current_super = decl.extends.as_ref().map(|h| h.name.clone());
        self.state.push_indent();
        let body = self.class_body(decl, span);
        self.state.pop_indent();
        self.current_super = prev_super;
        let body = body?;

        if let Some(target) = export_target {
            let exported = if decl.default_export {
                "_default"
            } else {
                decl.name.as_str()
            };
            self.state
                .push_export_line(format!("{target}.{exported} = {};", decl.name));
        }
        Ok(format!("{indent}do\n{body}{indent}end;\n"))
    }

    fn class_body(&mut self, decl: &ClassDecl, span: Span) -> Result<String> {
        let indent = self.state.indent.clone();
        let name = &decl.name;
        let base = decl.extends.as_ref();
        let mut out = String::new();

        let static_methods: Vec<MethodEntry> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Method {
                    name,
                    params,
                    body,
                    is_static: true,
                    is_async,
                    is_abstract: false,
                    returns_tuple,
                } => Some(MethodEntry {
                    name: name.as_str(),
                    params,
                    body,
                    is_async: *is_async,
                    returns_tuple: *returns_tuple,
                }),
                _ => None,
            })
            .collect();
        let instance_methods: Vec<MethodEntry> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Method {
                    name,
                    params,
                    body,
                    is_static: false,
                    is_async,
                    is_abstract: false,
                    returns_tuple,
                } => Some(MethodEntry {
                    name: name.as_str(),
                    params,
                    body,
                    is_async: *is_async,
                    returns_tuple: *returns_tuple,
                }),
                _ => None,
            })
            .collect();

        // 1. The class table holds static methods; a metatable chains static
        // lookup to the base when any ancestor has statics.
        let static_table = self.method_table(&static_methods, false, span)?;
        match base {
            Some(heritage) if heritage.info.chain_has_statics() => {
                out.push_str(&format!(
                    "{indent}{name} = setmetatable({static_table}, {{ __index = {} }});\n",
                    heritage.name
                ));
            }
            _ => out.push_str(&format!("{indent}{name} = {static_table};\n")),
        }

        // 2. The prototype table holds instance methods.
        let proto_table = self.method_table(&instance_methods, true, span)?;
        match base {
            Some(heritage) if heritage.info.chain_has_instance_members() => {
                out.push_str(&format!(
                    "{indent}{name}.__index = setmetatable({proto_table}, {{ __index = {}.__index }});\n",
                    heritage.name
                ));
            }
            _ => out.push_str(&format!("{indent}{name}.__index = {proto_table};\n")),
        }

        // 3. Metamethod trampolines: instances carry the class table as their
        // metatable, so a method with a metamethod name needs a stub there.
        for entry in &instance_methods {
            if lua::METAMETHODS.contains(entry.name) {
                let mm = entry.name;
                out.push_str(&format!(
                    "{indent}{name}.{mm} = function(self, ...) return self:{mm}(...); end;\n"
                ));
            }
        }

        // 4. Factory.
        if !decl.is_abstract {
            out.push_str(&format!("{indent}{name}.new = function(...)\n"));
            out.push_str(&format!(
                "{indent}\treturn {name}.constructor(setmetatable({{}}, {name}), ...);\n"
            ));
            out.push_str(&format!("{indent}end;\n"));
        }

        // 5. Constructor.
        out.push_str(&self.class_constructor(decl, span)?);

        // 6. Static properties.
        for member in &decl.members {
            if let ClassMember::Property {
                name: prop,
                init: Some(init),
                is_static: true,
            } = member
            {
                let value = self.transpile_expression(init)?;
                out.push_str(&format!(
                    "{indent}{} = {value};\n",
                    lua::safe_index(name, prop)
                ));
            }
        }

        // 7/8. Accessor dispatch.
        out.push_str(&self.class_accessors(decl, span)?);
        Ok(out)
    }

    /// A brace table of `name = function(...) … end,` entries, or `{}`.
    fn method_table(
        &mut self,
        methods: &[MethodEntry],
        include_self: bool,
        span: Span,
    ) -> Result<String> {
        if methods.is_empty() {
            return Ok("{}".to_string());
        }
        let indent = self.state.indent.clone();
        self.state.push_indent();
        let entries = (|| -> Result<String> {
            let entry_indent = self.state.indent.clone();
            let mut out = String::new();
            for entry in methods {
                let func = self.emit_function(
                    entry.params,
                    BodyRef::Block(entry.body),
                    entry.is_async,
                    entry.returns_tuple,
                    include_self,
                    span,
                )?;
                let key = if lua::is_valid_identifier(entry.name) {
                    entry.name.to_string()
                } else {
                    format!("[\"{}\"]", lua::escape_string(entry.name))
                };
                out.push_str(&format!("{entry_indent}{key} = {func},\n"));
            }
            Ok(out)
        })();
        self.state.pop_indent();
        Ok(format!("{{\n{}{indent}}}", entries?))
    }

    // =========================================================================
    // Constructor
    // =========================================================================

    /// Constructor body order: parameter defaults, the super-call when it is
    /// textually first in the source body, parameter initializers (captures
    /// and pattern expansions), instance-property initializers in declaration
    /// order, the remaining user statements, and finally `return self`.
    fn class_constructor(&mut self, decl: &ClassDecl, span: Span) -> Result<String> {
        let indent = self.state.indent.clone();
        let name = &decl.name;

        let ctor = decl.members.iter().find_map(|m| match m {
            ClassMember::Constructor { params, body } => Some((params.as_slice(), body.as_slice())),
            _ => None,
        });

        let Some((params, body)) = ctor else {
            let mut out = String::new();
            if let Some(heritage) = &decl.extends {
                out.push_str(&format!("{indent}{name}.constructor = function(self, ...)\n"));
                out.push_str(&format!(
                    "{indent}\t{}.constructor(self, ...);\n",
                    heritage.name
                ));
            } else {
                out.push_str(&format!("{indent}{name}.constructor = function(self)\n"));
            }
            self.state.push_indent();
            let inits = self.instance_property_initializers(decl);
            self.state.pop_indent();
            out.push_str(&inits?);
            out.push_str(&format!("{indent}\treturn self;\n"));
            out.push_str(&format!("{indent}end;\n"));
            return Ok(out);
        };

        self.state.push_indent();
        self.state.push_scope();
        let prev_in_ctor = self.in_constructor;
        let prev_returns = self.returns_tuple;
        let prev_in_try = self.in_try;
        let prev_in_switch = self.in_switch;
        self.in_constructor = true;
        self.returns_tuple = false;
        self.in_try = false;
        self.in_switch = false;

        let inner = self.class_constructor_inner(decl, params, body, span);

        self.in_switch = prev_in_switch;
        self.in_try = prev_in_try;
        self.returns_tuple = prev_returns;
        self.in_constructor = prev_in_ctor;
        let frame = self.state.pop_scope();
        let inner = inner.map(|(list, body)| (list, self.assemble_scope(frame, body)));
        self.state.pop_indent();
        let (list, body) = inner?;

        Ok(format!(
            "{indent}{name}.constructor = function({list})\n{body}{indent}end;\n"
        ))
    }

    fn class_constructor_inner(
        &mut self,
        decl: &ClassDecl,
        params: &[Param],
        body: &[Stmt],
        span: Span,
    ) -> Result<(String, String)> {
        let indent = self.state.indent.clone();
        let lowered = self.lower_parameters(params, true, span)?;
        let mut lines = String::new();

        for line in &lowered.defaults {
            lines.push_str(&format!("{indent}{line}\n"));
        }

        let (super_first, rest) = match body.first() {
            Some(first) if is_super_call_statement(first) => (Some(first), &body[1..]),
            _ => (None, body),
        };
        if let Some(stmt) = super_first {
            lines.push_str(&self.transpile_statement(stmt)?);
        }
        for line in &lowered.initializers {
            lines.push_str(&format!("{indent}{line}\n"));
        }
        lines.push_str(&self.instance_property_initializers(decl)?);
        lines.push_str(&self.transpile_statement_list(rest)?);
        lines.push_str(&format!("{indent}return self;\n"));
        Ok((lowered.list_text(), lines))
    }

    fn instance_property_initializers(&mut self, decl: &ClassDecl) -> Result<String> {
        let indent = self.state.indent.clone();
        let mut out = String::new();
        for member in &decl.members {
            if let ClassMember::Property {
                name,
                init: Some(init),
                is_static: false,
            } = member
            {
                let value = self.transpile_expression(init)?;
                out.push_str(&format!(
                    "{indent}{} = {value};\n",
                    lua::safe_index("self", name)
                ));
            }
        }
        Ok(out)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    fn class_accessors(&mut self, decl: &ClassDecl, span: Span) -> Result<String> {
        let indent = self.state.indent.clone();
        let name = &decl.name;
        let base = decl.extends.as_ref();
        let mut out = String::new();

        let getters: Vec<(&str, &[Stmt])> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Getter {
                    name,
                    body,
                    is_static: false,
                } => Some((name.as_str(), body.as_slice())),
                _ => None,
            })
            .collect();
        let getter_ancestor = base.filter(|h| h.info.chain_has_getters());

        if !getters.is_empty() || getter_ancestor.is_some() {
            match (getters.is_empty(), getter_ancestor) {
                (true, Some(heritage)) => {
                    // No own getters: share the base table by reference.
                    out.push_str(&format!(
                        "{indent}{name}._getters = {}._getters;\n",
                        heritage.name
                    ));
                }
                _ => {
                    let entries: Vec<MethodEntry> = getters
                        .iter()
                        .map(|&(gname, gbody)| MethodEntry {
                            name: gname,
                            params: &[],
                            body: gbody,
                            is_async: false,
                            returns_tuple: false,
                        })
                        .collect();
                    let table = self.method_table(&entries, true, span)?;
                    if let Some(heritage) = getter_ancestor {
                        out.push_str(&format!(
                            "{indent}{name}._getters = setmetatable({table}, {{ __index = {}._getters }});\n",
                            heritage.name
                        ));
                    } else {
                        out.push_str(&format!("{indent}{name}._getters = {table};\n"));
                    }
                }
            }
            let proto_id = self.state.new_id();
            out.push_str(&format!("{indent}local {proto_id} = {name}.__index;\n"));
            out.push_str(&format!("{indent}{name}.__index = function(self, index)\n"));
            out.push_str(&format!(
                "{indent}\tlocal getter = {name}._getters[index];\n"
            ));
            out.push_str(&format!("{indent}\tif getter ~= nil then\n"));
            out.push_str(&format!("{indent}\t\treturn getter(self);\n"));
            out.push_str(&format!("{indent}\tend;\n"));
            out.push_str(&format!("{indent}\treturn {proto_id}[index];\n"));
            out.push_str(&format!("{indent}end;\n"));
        }

        let setters: Vec<(&str, Param, &[Stmt])> = decl
            .members
            .iter()
            .filter_map(|m| match m {
                ClassMember::Setter {
                    name,
                    param,
                    body,
                    is_static: false,
                } => Some((name.as_str(), Param::id(param), body.as_slice())),
                _ => None,
            })
            .collect();
        let setter_ancestor = base.filter(|h| h.info.chain_has_setters());

        if !setters.is_empty() || setter_ancestor.is_some() {
            match (setters.is_empty(), setter_ancestor) {
                (true, Some(heritage)) => {
                    out.push_str(&format!(
                        "{indent}{name}._setters = {}._setters;\n",
                        heritage.name
                    ));
                }
                _ => {
                    let entries: Vec<MethodEntry> = setters
                        .iter()
                        .map(|(sname, param, sbody)| MethodEntry {
                            name: *sname,
                            params: std::slice::from_ref(param),
                            body: *sbody,
                            is_async: false,
                            returns_tuple: false,
                        })
                        .collect();
                    let table = self.method_table(&entries, true, span)?;
                    if let Some(heritage) = setter_ancestor {
                        out.push_str(&format!(
                            "{indent}{name}._setters = setmetatable({table}, {{ __index = {}._setters }});\n",
                            heritage.name
                        ));
                    } else {
                        out.push_str(&format!("{indent}{name}._setters = {table};\n"));
                    }
                }
            }
            out.push_str(&format!(
                "{indent}{name}.__newindex = function(self, index, value)\n"
            ));
            out.push_str(&format!(
                "{indent}\tlocal setter = {name}._setters[index];\n"
            ));
            out.push_str(&format!("{indent}\tif setter ~= nil then\n"));
            out.push_str(&format!("{indent}\t\tsetter(self, value);\n"));
            out.push_str(&format!("{indent}\telse\n"));
            out.push_str(&format!("{indent}\t\trawset(self, index, value);\n"));
            out.push_str(&format!("{indent}\tend;\n"));
            out.push_str(&format!("{indent}end;\n"));
        }
        Ok(out)
    }
}

/// Whether a statement is a bare `super(...)` call.
fn is_super_call_statement(stmt: &Stmt) -> bool {
    if let StmtKind::Expression(Expr {
        kind: ExprKind::Call { callee, .. },
        ..
    }) = &stmt.kind
    {
        return matches!(callee.kind, ExprKind::Super);
    }
    false
}
