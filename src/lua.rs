//! Facts about the target language.
//!
//! Reserved words, identifier validity, safe indexing, string escaping, and
//! the fixed name sets the lowerings consult (string stdlib macros, Lua
//! metamethods, host-engine value types).

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Keywords of the target language. Input identifiers that collide are
/// rejected.
pub static RESERVED_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in",
        "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
    ]
    .into_iter()
    .collect()
});

/// String methods forwarded directly to the target's `string` stdlib.
pub static STRING_MACRO_METHODS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "byte", "find", "format", "gmatch", "gsub", "len", "lower", "match", "rep", "reverse",
        "sub", "upper",
    ]
    .into_iter()
    .collect()
});

/// Metamethod names installable on a class table via a trampoline.
pub static METAMETHODS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "__add",
        "__sub",
        "__mul",
        "__div",
        "__mod",
        "__pow",
        "__unm",
        "__concat",
        "__len",
        "__eq",
        "__lt",
        "__le",
        "__call",
        "__tostring",
    ]
    .into_iter()
    .collect()
});

/// Metamethod names the class-lowering protocol reserves for itself; a class
/// method with one of these names is rejected.
pub static RESERVED_METAMETHODS: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| ["__index", "__newindex", "__mode"].into_iter().collect());

/// Host-engine value types whose `add`/`sub`/`mul`/`div` methods inline to
/// arithmetic operators.
pub static MATH_VALUE_TYPES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "CFrame",
        "UDim",
        "UDim2",
        "Vector2",
        "Vector2int16",
        "Vector3",
        "Vector3int16",
    ]
    .into_iter()
    .collect()
});

/// Host-engine value types carrying a `typeof` tag; `instanceof` against one
/// of these lowers to a tag-equality check.
pub static TAGGED_VALUE_TYPES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "CFrame",
        "UDim",
        "UDim2",
        "Vector2",
        "Vector2int16",
        "Vector3",
        "Vector3int16",
        "RBXScriptConnection",
        "RBXScriptSignal",
    ]
    .into_iter()
    .collect()
});

/// The root of the host engine's object hierarchy. `instanceof` against a
/// descendant lowers to a runtime `isA` check on the class tag.
pub const ENGINE_INSTANCE_ROOT: &str = "Rbx_Instance";

/// Whether `s` is usable as a bare identifier in the target language.
pub fn is_valid_identifier(s: &str) -> bool {
    if s.is_empty() || RESERVED_WORDS.contains(s) {
        return false;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `obj.key` when `key` is a valid identifier, `obj["key"]` otherwise.
pub fn safe_index(obj: &str, key: &str) -> String {
    if is_valid_identifier(key) {
        format!("{obj}.{key}")
    } else {
        format!("{obj}[\"{}\"]", escape_string(key))
    }
}

/// Escapes `s` for inclusion between double quotes.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
