//! Compiler options and per-file ambient classifications.

use serde::{Deserialize, Serialize};

/// Ambient capability context of a file: which side of the client/server
/// boundary its code runs on. Drives API-visibility checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptContext {
    Server,
    Client,
    #[default]
    None,
}

/// Whether a file is a module (returns its exports) or a plain script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    #[default]
    Script,
    Module,
}

/// Options for a transpiler instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Disables the JSDoc-directed cross-context API checks.
    pub no_heuristics: bool,
    /// Expression placed in `require(...)` position to load the runtime
    /// library at the top of every emitted file.
    pub runtime_lib_path: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            no_heuristics: false,
            runtime_lib_path: "game.ReplicatedStorage.RobloxTS.Include.RuntimeLib".to_string(),
        }
    }
}
