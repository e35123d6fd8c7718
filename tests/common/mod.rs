//! Shared harness for transpiler integration tests: a table-driven host,
//! one-call transpile helpers, and output trimming.

#![allow(dead_code)]

use tslua::ast::{SourceFile, Stmt};
use tslua::host::MapHost;
use tslua::{CompilerOptions, ScriptType, Transpiler, TranspileError};

pub const PREAMBLE: &str =
    "-- luacheck: ignore\nlocal TS = require(game.ReplicatedStorage.RobloxTS.Include.RuntimeLib);\n";

pub fn test_host() -> MapHost {
    MapHost::new().with_path("./m", "game.Mod")
}

pub fn module_host() -> MapHost {
    test_host().with_type("main.ts", ScriptType::Module)
}

pub fn transpile(stmts: Vec<Stmt>) -> String {
    let host = test_host();
    let mut transpiler = Transpiler::new(CompilerOptions::default(), &host);
    transpiler
        .transpile_source_file(&SourceFile::new("main.ts", stmts))
        .expect("transpile should succeed")
}

pub fn transpile_module(stmts: Vec<Stmt>) -> String {
    let host = module_host();
    let mut transpiler = Transpiler::new(CompilerOptions::default(), &host);
    transpiler
        .transpile_source_file(&SourceFile::new("main.ts", stmts))
        .expect("transpile should succeed")
}

pub fn transpile_err(stmts: Vec<Stmt>) -> TranspileError {
    let host = test_host();
    let mut transpiler = Transpiler::new(CompilerOptions::default(), &host);
    transpiler
        .transpile_source_file(&SourceFile::new("main.ts", stmts))
        .expect_err("transpile should fail")
}

pub fn transpile_module_err(stmts: Vec<Stmt>) -> TranspileError {
    let host = module_host();
    let mut transpiler = Transpiler::new(CompilerOptions::default(), &host);
    transpiler
        .transpile_source_file(&SourceFile::new("main.ts", stmts))
        .expect_err("transpile should fail")
}

/// Output with the two-line preamble stripped.
pub fn body(output: &str) -> &str {
    output
        .strip_prefix(PREAMBLE)
        .expect("output should start with the preamble")
}

/// Collapses all whitespace runs to single spaces, for layout-insensitive
/// containment checks.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
