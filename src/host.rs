//! The compiler collaborator the transpiler calls back into.
//!
//! Module-path resolution and per-file ambient classification live outside
//! the core; this trait is the whole surface the transpiler consumes. A
//! table-driven implementation is provided for tests and benchmarks.

use rustc_hash::FxHashMap;

use crate::options::{ScriptContext, ScriptType};

pub trait CompilerHost {
    /// The ambient capability context of a file.
    fn script_context(&self, file: &str) -> ScriptContext;

    /// Whether a file is a module or a plain script.
    fn script_type(&self, file: &str) -> ScriptType;

    /// Resolves an import specifier to an expression usable in `require(...)`
    /// position, already formatted. `None` when the module file is missing.
    fn import_path(&self, from_file: &str, specifier: &str) -> Option<String>;
}

/// Table-driven host: explicit per-file classifications and a specifier map.
#[derive(Debug, Default)]
pub struct MapHost {
    pub contexts: FxHashMap<String, ScriptContext>,
    pub types: FxHashMap<String, ScriptType>,
    pub paths: FxHashMap<String, String>,
}

impl MapHost {
    pub fn new() -> MapHost {
        MapHost::default()
    }

    pub fn with_context(mut self, file: &str, context: ScriptContext) -> MapHost {
        self.contexts.insert(file.to_string(), context);
        self
    }

    pub fn with_type(mut self, file: &str, ty: ScriptType) -> MapHost {
        self.types.insert(file.to_string(), ty);
        self
    }

    pub fn with_path(mut self, specifier: &str, path: &str) -> MapHost {
        self.paths.insert(specifier.to_string(), path.to_string());
        self
    }
}

impl CompilerHost for MapHost {
    fn script_context(&self, file: &str) -> ScriptContext {
        self.contexts.get(file).copied().unwrap_or_default()
    }

    fn script_type(&self, file: &str) -> ScriptType {
        self.types.get(file).copied().unwrap_or_default()
    }

    fn import_path(&self, _from_file: &str, specifier: &str) -> Option<String> {
        self.paths.get(specifier).cloned()
    }
}
