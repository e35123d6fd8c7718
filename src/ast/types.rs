//! Static types, symbols, and class heritage summaries.
//!
//! The transpiler is type-directed: additions dispatch on operand types,
//! element accesses offset indices only for array/tuple receivers, method
//! calls are classified by the receiver's declared type, and `instanceof`
//! picks its lowering from the right-hand side's heritage. The checker that
//! computes these types is an external collaborator; this module is the shape
//! of the answers the transpiler consumes.

use std::rc::Rc;

/// A resolved static type attached to every expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Ty {
    /// Unknown or unconstrained.
    Any,
    /// The absent value.
    Undefined,
    /// Numbers, with the literal value when the type is a literal type.
    Number(Option<f64>),
    /// Strings, with the literal value when the type is a literal type.
    String(Option<String>),
    /// Booleans, with the literal value when the type is a literal type.
    Boolean(Option<bool>),
    /// Homogeneous array.
    Array(Box<Ty>),
    /// Fixed-shape tuple. Tuples are multi-return values in the target.
    Tuple(Vec<Ty>),
    /// Union of alternatives.
    Union(Vec<Ty>),
    /// A named (nominal) type with its base types.
    Named(Rc<NamedTy>),
}

/// A nominal type: interfaces, classes, and host-engine types.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTy {
    pub name: String,
    pub bases: Vec<Ty>,
}

impl Ty {
    pub fn named(name: &str) -> Ty {
        Ty::Named(Rc::new(NamedTy {
            name: name.to_string(),
            bases: Vec::new(),
        }))
    }

    pub fn named_with_bases(name: &str, bases: Vec<Ty>) -> Ty {
        Ty::Named(Rc::new(NamedTy {
            name: name.to_string(),
            bases,
        }))
    }

    pub fn number() -> Ty {
        Ty::Number(None)
    }

    pub fn string() -> Ty {
        Ty::String(None)
    }

    pub fn boolean() -> Ty {
        Ty::Boolean(None)
    }

    pub fn array_of(element: Ty) -> Ty {
        Ty::Array(Box::new(element))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Ty::String(_))
    }

    pub fn is_string_literal(&self) -> bool {
        matches!(self, Ty::String(Some(_)))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Ty::Number(_))
    }

    pub fn is_number_literal(&self) -> bool {
        matches!(self, Ty::Number(Some(_)))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Ty::Boolean(_))
    }

    pub fn is_boolean_literal(&self) -> bool {
        matches!(self, Ty::Boolean(Some(_)))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Ty::Array(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Ty::Tuple(_))
    }

    /// Whether the type admits the absent value.
    pub fn is_nullable(&self) -> bool {
        match self {
            Ty::Undefined => true,
            Ty::Union(parts) => parts.iter().any(Ty::is_nullable),
            _ => false,
        }
    }

    /// The nominal name, when this is a named type.
    pub fn name(&self) -> Option<&str> {
        match self {
            Ty::Named(n) => Some(&n.name),
            _ => None,
        }
    }

    /// Whether this named type transitively inherits from `name`.
    pub fn inherits_from(&self, name: &str) -> bool {
        match self {
            Ty::Named(n) => {
                n.name == name || n.bases.iter().any(|b| b.inherits_from(name))
            }
            _ => false,
        }
    }
}

/// A compile-time constant value carried by a const-enum member declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Number(f64),
    String(String),
}

/// The syntactic category of a symbol's declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    Function,
    Method,
    Property,
    GetAccessor,
    SetAccessor,
    Class,
    Namespace,
    Variable,
    Parameter,
    /// Enum member; carries its compile-time value when the enum is const.
    EnumMember(Option<ConstValue>),
}

/// One declaration site of a symbol, with its JSDoc text when present.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub kind: DeclKind,
    pub doc: Option<String>,
}

impl Declaration {
    pub fn new(kind: DeclKind) -> Self {
        Declaration { kind, doc: None }
    }

    pub fn with_doc(kind: DeclKind, doc: &str) -> Self {
        Declaration {
            kind,
            doc: Some(doc.to_string()),
        }
    }
}

/// A resolved symbol: a name plus its declaration sites.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub declarations: Vec<Declaration>,
}

impl Symbol {
    pub fn new(name: &str, kind: DeclKind) -> Rc<Symbol> {
        Rc::new(Symbol {
            name: name.to_string(),
            declarations: vec![Declaration::new(kind)],
        })
    }

    /// The declaration that defines the symbol's value, by convention the
    /// first declaration site.
    pub fn value_declaration(&self) -> Option<&Declaration> {
        self.declarations.first()
    }

    pub fn is_method(&self) -> bool {
        matches!(
            self.value_declaration().map(|d| &d.kind),
            Some(DeclKind::Method)
        )
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self.value_declaration().map(|d| &d.kind),
            Some(DeclKind::Function | DeclKind::Method)
        )
    }

    pub fn is_class(&self) -> bool {
        matches!(
            self.value_declaration().map(|d| &d.kind),
            Some(DeclKind::Class)
        )
    }

    /// The compile-time value when this is a const-enum member.
    pub fn const_enum_value(&self) -> Option<&ConstValue> {
        match self.value_declaration().map(|d| &d.kind) {
            Some(DeclKind::EnumMember(Some(v))) => Some(v),
            _ => None,
        }
    }

    /// Whether any declaration's JSDoc text carries the given tag.
    pub fn has_doc_tag(&self, tag: &str) -> bool {
        self.declarations
            .iter()
            .any(|d| d.doc.as_deref().is_some_and(|doc| doc.contains(tag)))
    }
}

/// Heritage summary of a class, supplied by the AST provider for every
/// `extends` clause. Answers the membership questions class lowering asks
/// about ancestors without re-walking their declarations.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub has_statics: bool,
    pub has_instance_members: bool,
    pub has_getters: bool,
    pub has_setters: bool,
    pub base: Option<Rc<ClassInfo>>,
}

impl ClassInfo {
    pub fn leaf(name: &str) -> Rc<ClassInfo> {
        Rc::new(ClassInfo {
            name: name.to_string(),
            has_statics: false,
            has_instance_members: false,
            has_getters: false,
            has_setters: false,
            base: None,
        })
    }

    /// This class or any ancestor declares static members.
    pub fn chain_has_statics(&self) -> bool {
        self.has_statics || self.base.as_ref().is_some_and(|b| b.chain_has_statics())
    }

    /// This class or any ancestor declares instance members.
    pub fn chain_has_instance_members(&self) -> bool {
        self.has_instance_members
            || self
                .base
                .as_ref()
                .is_some_and(|b| b.chain_has_instance_members())
    }

    /// This class or any ancestor declares getters.
    pub fn chain_has_getters(&self) -> bool {
        self.has_getters || self.base.as_ref().is_some_and(|b| b.chain_has_getters())
    }

    /// This class or any ancestor declares setters.
    pub fn chain_has_setters(&self) -> bool {
        self.has_setters || self.base.as_ref().is_some_and(|b| b.chain_has_setters())
    }
}
