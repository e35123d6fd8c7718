//! Emission context: the mutable state one transpiler instance owns while
//! translating a single file.
//!
//! Statemented scopes (source file, block, namespace body, switch body,
//! function body) follow a scoped acquisition pattern: entry pushes a fresh
//! id-counter frame, hoist frame, and export frame; exit pops all three and
//! the scope's translator weaves the popped hoist names (one `local` line at
//! the scope head) and export lines (appended after the body) into its
//! output. Every push is matched by a pop on every exit path, including
//! error propagation.

use crate::options::ScriptContext;

/// Hoist and export frames handed back by [`EmitState::pop_scope`].
#[derive(Debug, Default)]
pub struct ScopeFrame {
    /// Identifiers to declare in one `local` line at the scope head.
    pub hoisted: Vec<String>,
    /// Export-binding statements to append after the scope body.
    pub exports: Vec<String>,
}

/// Per-file emission state.
#[derive(Debug)]
pub struct EmitState {
    /// Current indentation prefix (tabs).
    pub indent: String,
    /// Per-scope identifiers declared at the head of the enclosing block.
    pub hoist_stack: Vec<Vec<String>>,
    /// Per-scope export-binding statements flushed at scope end.
    pub export_stack: Vec<Vec<String>>,
    /// Synthetic identifiers naming enclosing namespace objects. Empty means
    /// file level.
    pub namespace_stack: Vec<String>,
    /// Per-scope id counters; a synthetic identifier is `_<n>` with `n` the
    /// sum of all counters, and allocation increments the top counter. This
    /// yields monotone-unique names at any nesting depth.
    pub id_stack: Vec<u32>,
    /// Cursor of the nearest enclosing loop that simulates `continue`;
    /// `-1` when none.
    pub continue_id: i32,
    /// Set the first time a file-level export is emitted; transitions only
    /// false to true, and switches the file epilogue.
    pub is_module: bool,
    /// Ambient capability context of the current file.
    pub script_context: ScriptContext,
}

impl EmitState {
    pub fn new(script_context: ScriptContext) -> EmitState {
        EmitState {
            indent: String::new(),
            hoist_stack: Vec::new(),
            export_stack: Vec::new(),
            namespace_stack: Vec::new(),
            id_stack: Vec::new(),
            continue_id: -1,
            is_module: false,
            script_context,
        }
    }

    pub fn reset(&mut self, script_context: ScriptContext) {
        self.indent.clear();
        self.hoist_stack.clear();
        self.export_stack.clear();
        self.namespace_stack.clear();
        self.id_stack.clear();
        self.continue_id = -1;
        self.is_module = false;
        self.script_context = script_context;
    }

    pub fn push_indent(&mut self) {
        self.indent.push('\t');
    }

    pub fn pop_indent(&mut self) {
        self.indent.pop();
    }

    pub fn push_scope(&mut self) {
        self.id_stack.push(0);
        self.hoist_stack.push(Vec::new());
        self.export_stack.push(Vec::new());
    }

    pub fn pop_scope(&mut self) -> ScopeFrame {
        self.id_stack.pop();
        ScopeFrame {
            hoisted: self.hoist_stack.pop().unwrap_or_default(),
            exports: self.export_stack.pop().unwrap_or_default(),
        }
    }

    /// Allocates a fresh synthetic identifier.
    pub fn new_id(&mut self) -> String {
        let n: u32 = self.id_stack.iter().sum();
        if let Some(top) = self.id_stack.last_mut() {
            *top += 1;
        }
        format!("_{n}")
    }

    /// Pushes `name` onto the current hoist frame.
    pub fn hoist(&mut self, name: &str) {
        if let Some(frame) = self.hoist_stack.last_mut() {
            frame.push(name.to_string());
        }
    }

    /// Pushes a finished export-binding statement onto the current export
    /// frame.
    pub fn push_export_line(&mut self, line: String) {
        if let Some(frame) = self.export_stack.last_mut() {
            frame.push(line);
        }
    }

    /// The object receiving exports at the current nesting: the innermost
    /// namespace object, or the file-level export table.
    pub fn export_target(&self) -> &str {
        self.namespace_stack
            .last()
            .map(String::as_str)
            .unwrap_or("_exports")
    }
}
