//! Identifiers and literal forms.

use super::Transpiler;
use crate::ast::{Expr, ExprKind, ObjectProp, Span, TemplateSpan};
use crate::diagnostics::{ErrorKind, Result};
use crate::lua;

/// Global identifiers that resolve to runtime-library classes.
const RUNTIME_GLOBALS: &[&str] = &["Promise", "Symbol"];

impl Transpiler<'_> {
    pub(super) fn transpile_identifier(&self, name: &str, span: Span) -> Result<String> {
        if name == "undefined" {
            return Ok("nil".to_string());
        }
        if RUNTIME_GLOBALS.contains(&name) {
            return Ok(format!("TS.{name}"));
        }
        self.check_identifier(name, span)?;
        Ok(name.to_string())
    }

    /// Rejects identifiers that collide with target-language keywords.
    pub(super) fn check_identifier(&self, name: &str, span: Span) -> Result<()> {
        if lua::RESERVED_WORDS.contains(name) {
            return Err(self.err(
                ErrorKind::ReservedKeyword,
                span,
                format!("`{name}` is a reserved word in the target language"),
            ));
        }
        Ok(())
    }

    /// Scientific notation passes through verbatim; every other notation is
    /// normalized to the canonical decimal form of the parsed value.
    pub(super) fn transpile_numeric_literal(text: &str) -> String {
        let lower = text.to_ascii_lowercase();
        let is_radix = lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b");
        if !is_radix && (text.contains('e') || text.contains('E')) {
            return text.to_string();
        }
        let value = if is_radix {
            let radix = match &lower[..2] {
                "0x" => 16,
                "0o" => 8,
                _ => 2,
            };
            match i64::from_str_radix(&lower[2..], radix) {
                Ok(v) => v as f64,
                Err(_) => return text.to_string(),
            }
        } else {
            match text.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return text.to_string(),
            }
        };
        Self::format_number(value)
    }

    pub(super) fn format_number(value: f64) -> String {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        }
    }

    /// Quote-delimited forms pass through; backtick-delimited forms are
    /// rewritten to double quotes with internal double quotes escaped.
    pub(super) fn transpile_string_literal(text: &str) -> String {
        if let Some(inner) = text.strip_prefix('`').and_then(|t| t.strip_suffix('`')) {
            format!("\"{}\"", inner.replace('"', "\\\""))
        } else {
            text.to_string()
        }
    }

    /// Lowers a template with substitutions to a `..` concatenation of quoted
    /// fragments and `tostring(expr)` segments. Empty fragments are elided.
    pub(super) fn transpile_template_expression(
        &mut self,
        head: &str,
        spans: &[TemplateSpan],
    ) -> Result<String> {
        let mut parts: Vec<String> = Vec::new();
        if !head.is_empty() {
            parts.push(format!("\"{}\"", lua::escape_string(head)));
        }
        for span in spans {
            let expr = self.transpile_expression(&span.expr)?;
            parts.push(format!("tostring({expr})"));
            if !span.literal.is_empty() {
                parts.push(format!("\"{}\"", lua::escape_string(&span.literal)));
            }
        }
        if parts.is_empty() {
            return Ok("\"\"".to_string());
        }
        Ok(parts.join(" .. "))
    }

    /// Flat array literals become a brace list; any spread element switches
    /// to a runtime concatenation of interleaved inline groups and spread
    /// expressions.
    pub(super) fn transpile_array_literal(&mut self, elements: &[Expr]) -> Result<String> {
        let has_spread = elements
            .iter()
            .any(|e| matches!(e.kind, ExprKind::Spread(_)));
        if !has_spread {
            if elements.is_empty() {
                return Ok("{}".to_string());
            }
            let items = elements
                .iter()
                .map(|e| self.transpile_expression(e))
                .collect::<Result<Vec<_>>>()?;
            return Ok(format!("{{ {} }}", items.join(", ")));
        }

        let mut segments: Vec<String> = Vec::new();
        let mut group: Vec<String> = Vec::new();
        for element in elements {
            if let ExprKind::Spread(inner) = &element.kind {
                if !group.is_empty() {
                    segments.push(format!("{{ {} }}", group.join(", ")));
                    group.clear();
                }
                segments.push(self.transpile_expression(inner)?);
            } else {
                group.push(self.transpile_expression(element)?);
            }
        }
        if !group.is_empty() {
            segments.push(format!("{{ {} }}", group.join(", ")));
        }
        Ok(format!("TS.array_concat({})", segments.join(", ")))
    }

    fn object_key(key: &str) -> String {
        if key.parse::<f64>().is_ok() {
            format!("[{key}]")
        } else if lua::is_valid_identifier(key) {
            key.to_string()
        } else {
            format!("[\"{}\"]", lua::escape_string(key))
        }
    }

    /// Keys are bare identifiers when valid in the target, indexed string or
    /// numeric form otherwise. Spread assignments split the literal into
    /// segments merged by the runtime; a leading spread gets an empty table
    /// prepended so the merge writes into a fresh target.
    pub(super) fn transpile_object_literal(&mut self, props: &[ObjectProp]) -> Result<String> {
        let has_spread = props.iter().any(|p| matches!(p, ObjectProp::Spread(_)));

        if !has_spread {
            if props.is_empty() {
                return Ok("{}".to_string());
            }
            let mut items = Vec::new();
            for prop in props {
                items.push(self.transpile_object_prop(prop)?);
            }
            return Ok(format!("{{ {} }}", items.join(", ")));
        }

        let mut segments: Vec<String> = Vec::new();
        let mut group: Vec<String> = Vec::new();
        for prop in props {
            if let ObjectProp::Spread(inner) = prop {
                if !group.is_empty() {
                    segments.push(format!("{{ {} }}", group.join(", ")));
                    group.clear();
                }
                segments.push(self.transpile_expression(inner)?);
            } else {
                group.push(self.transpile_object_prop(prop)?);
            }
        }
        if !group.is_empty() {
            segments.push(format!("{{ {} }}", group.join(", ")));
        }
        if !segments.first().is_some_and(|s| s.starts_with('{')) {
            segments.insert(0, "{}".to_string());
        }
        Ok(format!("TS.Object_assign({})", segments.join(", ")))
    }

    fn transpile_object_prop(&mut self, prop: &ObjectProp) -> Result<String> {
        match prop {
            ObjectProp::KeyValue { key, value } => {
                let value = self.transpile_expression(value)?;
                Ok(format!("{} = {}", Self::object_key(key), value))
            }
            ObjectProp::Shorthand { name } => {
                let value = self.transpile_identifier(name, Span::default())?;
                Ok(format!("{} = {}", Self::object_key(name), value))
            }
            ObjectProp::Computed { key, value } => {
                let key = self.transpile_expression(key)?;
                let value = self.transpile_expression(value)?;
                Ok(format!("[{key}] = {value}"))
            }
            ObjectProp::Spread(_) => unreachable!("spread handled by the segment splitter"),
        }
    }
}
