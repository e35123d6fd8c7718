//! Type-aware TypeScript-to-Lua transpiler core.
//!
//! This crate walks a fully typed AST of a statically-typed, curly-brace,
//! object-oriented source language and emits textual Lua source. It provides:
//! - Syntax-directed translation for expressions, statements, and declarations
//! - A class-lowering protocol (inheritance, accessors, constructors) for a
//!   target with no native classes
//! - Destructuring/binding-pattern lowering
//! - Faithful short-circuit, increment/decrement, and compound-assignment
//!   semantics in a statement-oriented target
//! - `continue` simulation for a target that lacks it
//!
//! The AST provider (parser/checker), CLI, file discovery, and the emitted
//! code's runtime library (`TS`) are external collaborators; this crate
//! defines only the data model it consumes from them ([`ast`]) and the
//! interfaces it calls back into ([`host`]).

pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod host;
pub mod lua;
pub mod options;
pub mod transpiler;

pub use diagnostics::{ErrorKind, TranspileError};
pub use options::{CompilerOptions, ScriptContext, ScriptType};
pub use transpiler::Transpiler;
