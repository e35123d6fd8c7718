//! The typed AST the transpiler consumes.
//!
//! Nodes are plain sum types dispatched by exhaustive `match`, so adding a
//! kind is a localized exhaustiveness failure rather than a missed virtual
//! override. Every expression carries its resolved static type and, when the
//! checker bound one, a symbol. The tree is immutable to the transpiler.
//!
//! The provider that builds these trees (parser + checker) is external; the
//! constructor helpers here exist so tests and benchmarks can assemble typed
//! trees directly.

pub mod types;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use self::types::{ClassInfo, Symbol, Ty};

/// A span of source, as byte offsets. Half-open: `[start, end)`.
/// Synthetic nodes use the default (empty) span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

/// One compilation unit.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: String,
    pub statements: Vec<Stmt>,
}

impl SourceFile {
    pub fn new(path: &str, statements: Vec<Stmt>) -> Self {
        SourceFile {
            path: path.to_string(),
            statements,
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression node: kind, resolved type, optional symbol, source span.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Ty,
    pub symbol: Option<Rc<Symbol>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Identifier(String),
    /// Numeric literal; the source text is preserved for notation-sensitive
    /// lowering (scientific notation passes through verbatim).
    Number(String),
    /// String literal, source text including its delimiters.
    Str(String),
    /// Template with substitutions: head fragment plus (expression, literal
    /// fragment) spans.
    Template {
        head: String,
        spans: Vec<TemplateSpan>,
    },
    True,
    False,
    /// The input language's `null` literal. Rejected by the transpiler.
    Null,
    This,
    Super,
    Array(Vec<Expr>),
    Object(Vec<ObjectProp>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    PrefixUnary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    PostfixUnary {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `new C(...)`. `args` is `None` for the parenthesis-less form, which is
    /// rejected.
    New {
        callee: Box<Expr>,
        args: Option<Vec<Expr>>,
    },
    PropertyAccess {
        expr: Box<Expr>,
        name: String,
    },
    ElementAccess {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
    Await(Box<Expr>),
    TypeOf(Box<Expr>),
    Spread(Box<Expr>),
    Parenthesized(Box<Expr>),
    Function(Box<FunctionExpr>),
}

#[derive(Clone, Debug)]
pub struct TemplateSpan {
    pub expr: Expr,
    pub literal: String,
}

#[derive(Clone, Debug)]
pub enum ObjectProp {
    KeyValue { key: String, value: Expr },
    Shorthand { name: String },
    Computed { key: Expr, value: Expr },
    Spread(Expr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `==`, rejected.
    EqEq,
    /// `!=`, rejected.
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    StarStar,
    AmpAmp,
    BarBar,
    Bar,
    Amp,
    Caret,
    LtLt,
    GtGt,
    InstanceOf,
    In,
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    StarStarAssign,
    BarAssign,
    AmpAssign,
    CaretAssign,
    LtLtAssign,
    GtGtAssign,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::PlusAssign
                | BinaryOp::MinusAssign
                | BinaryOp::StarAssign
                | BinaryOp::SlashAssign
                | BinaryOp::PercentAssign
                | BinaryOp::StarStarAssign
                | BinaryOp::BarAssign
                | BinaryOp::AmpAssign
                | BinaryOp::CaretAssign
                | BinaryOp::LtLtAssign
                | BinaryOp::GtGtAssign
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Minus,
    /// Unary plus, rejected.
    Plus,
    /// Bitwise not, rejected.
    Tilde,
    PlusPlus,
    MinusMinus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostfixOp {
    PlusPlus,
    MinusMinus,
}

// =============================================================================
// Bindings and parameters
// =============================================================================

#[derive(Clone, Debug)]
pub enum BindingName {
    Id(String),
    Pattern(BindingPattern),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Object,
    Array,
}

/// An object or array destructuring pattern. Array patterns may contain holes
/// (`None` elements).
#[derive(Clone, Debug)]
pub struct BindingPattern {
    pub kind: PatternKind,
    pub elements: Vec<Option<BindingElement>>,
}

#[derive(Clone, Debug)]
pub struct BindingElement {
    /// Object patterns: the source property when the binding is aliased.
    pub property_name: Option<String>,
    pub name: BindingName,
    pub default: Option<Expr>,
    /// `...rest`, rejected inside binding patterns.
    pub rest: bool,
}

impl BindingElement {
    pub fn id(name: &str) -> Option<BindingElement> {
        Some(BindingElement {
            property_name: None,
            name: BindingName::Id(name.to_string()),
            default: None,
            rest: false,
        })
    }
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: BindingName,
    pub default: Option<Expr>,
    pub rest: bool,
    /// Constructor scope-keyword parameter, captured onto `this`.
    pub this_capture: bool,
}

impl Param {
    pub fn id(name: &str) -> Param {
        Param {
            name: BindingName::Id(name.to_string()),
            default: None,
            rest: false,
            this_capture: false,
        }
    }
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Block(Vec<Stmt>),
    Expression(Expr),
    Variable(VariableStatement),
    Return(Option<Expr>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Option<ForInit>,
        cond: Option<Expr>,
        inc: Option<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        left: ForBinding,
        expr: Expr,
        body: Box<Stmt>,
    },
    ForOf {
        left: ForBinding,
        expr: Expr,
        body: Box<Stmt>,
    },
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Throw(Expr),
    Try {
        block: Vec<Stmt>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Switch {
        disc: Expr,
        cases: Vec<SwitchCase>,
    },
    Function(FunctionDecl),
    Class(ClassDecl),
    Namespace(NamespaceDecl),
    Enum(EnumDecl),
    Import(ImportDecl),
    /// `export { a, b as c }`, optionally re-exporting from another module.
    ExportNamed(ExportNamedDecl),
    /// `export * from "..."`.
    ExportAll {
        specifier: String,
    },
    /// `export = expr`.
    ExportAssignment(Expr),
    /// Interfaces, type aliases, ambient declarations. Emits nothing.
    TypeOnly,
    Empty,
    /// Labeled statement, rejected.
    Labeled {
        label: String,
        stmt: Box<Stmt>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarKind {
    /// Rejected; only block-scoped declarations are allowed.
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug)]
pub struct VariableStatement {
    pub kind: VarKind,
    pub declarations: Vec<VariableDeclaration>,
    pub exported: bool,
}

#[derive(Clone, Debug)]
pub struct VariableDeclaration {
    pub name: BindingName,
    pub init: Option<Expr>,
}

#[derive(Clone, Debug)]
pub enum ForInit {
    Variable(VariableStatement),
    Expr(Expr),
}

/// The loop variable of `for…in` / `for…of`.
#[derive(Clone, Debug)]
pub struct ForBinding {
    pub kind: VarKind,
    pub name: BindingName,
    /// An initializer here is a grammar accident; rejected in `for…in`.
    pub init: Option<Expr>,
}

impl ForBinding {
    pub fn id(name: &str) -> ForBinding {
        ForBinding {
            kind: VarKind::Const,
            name: BindingName::Id(name.to_string()),
            init: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CatchClause {
    pub var: Option<String>,
    pub block: Vec<Stmt>,
}

/// One `case`/`default` clause. `test` is `None` for `default`.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub statements: Vec<Stmt>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    /// Whether the declared return type is a tuple (multi-return).
    pub returns_tuple: bool,
    pub exported: bool,
    pub default_export: bool,
}

#[derive(Clone, Debug)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    /// Concise arrow body.
    Expr(Expr),
}

#[derive(Clone, Debug)]
pub struct FunctionExpr {
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_async: bool,
    pub returns_tuple: bool,
}

/// An `extends` clause: the base identifier as written, plus the provider's
/// heritage summary of the base class.
#[derive(Clone, Debug)]
pub struct Heritage {
    pub name: String,
    pub info: Rc<ClassInfo>,
}

#[derive(Clone, Debug)]
pub struct ClassDecl {
    pub name: String,
    pub extends: Option<Heritage>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
    pub exported: bool,
    pub default_export: bool,
}

#[derive(Clone, Debug)]
pub enum ClassMember {
    Constructor {
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    Method {
        name: String,
        params: Vec<Param>,
        body: Vec<Stmt>,
        is_static: bool,
        is_async: bool,
        is_abstract: bool,
        returns_tuple: bool,
    },
    Property {
        name: String,
        init: Option<Expr>,
        is_static: bool,
    },
    Getter {
        name: String,
        body: Vec<Stmt>,
        is_static: bool,
    },
    Setter {
        name: String,
        param: String,
        body: Vec<Stmt>,
        is_static: bool,
    },
}

#[derive(Clone, Debug)]
pub struct NamespaceDecl {
    pub name: String,
    pub statements: Vec<Stmt>,
    pub exported: bool,
}

#[derive(Clone, Debug)]
pub struct EnumDecl {
    pub name: String,
    pub members: Vec<EnumMember>,
    pub is_const: bool,
    pub exported: bool,
}

#[derive(Clone, Debug)]
pub struct EnumMember {
    pub name: String,
    pub init: Option<EnumInit>,
}

#[derive(Clone, Debug)]
pub enum EnumInit {
    Number(f64),
    Str(String),
    Expr(Expr),
}

#[derive(Clone, Debug)]
pub struct ImportDecl {
    pub specifier: String,
    pub default_name: Option<String>,
    pub namespace_name: Option<String>,
    pub named: Vec<ImportSpecifier>,
}

/// Shared by imports (`name` from the module, bound as `alias`) and exports
/// (local `name`, exported as `alias`).
#[derive(Clone, Debug)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportSpecifier {
    pub fn plain(name: &str) -> ImportSpecifier {
        ImportSpecifier {
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn aliased(name: &str, alias: &str) -> ImportSpecifier {
        ImportSpecifier {
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportNamedDecl {
    pub specifier: Option<String>,
    pub bindings: Vec<ImportSpecifier>,
}

// =============================================================================
// Constructor helpers
// =============================================================================

impl Expr {
    pub fn new(kind: ExprKind, ty: Ty) -> Expr {
        Expr {
            kind,
            ty,
            symbol: None,
            span: Span::default(),
        }
    }

    pub fn with_ty(mut self, ty: Ty) -> Expr {
        self.ty = ty;
        self
    }

    pub fn with_symbol(mut self, symbol: Rc<Symbol>) -> Expr {
        self.symbol = Some(symbol);
        self
    }

    pub fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Identifier(name.to_string()), Ty::Any)
    }

    pub fn num(value: f64) -> Expr {
        let text = if value.fract() == 0.0 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        };
        Expr::new(ExprKind::Number(text), Ty::Number(Some(value)))
    }

    pub fn num_text(text: &str) -> Expr {
        Expr::new(ExprKind::Number(text.to_string()), Ty::number())
    }

    pub fn str(content: &str) -> Expr {
        Expr::new(
            ExprKind::Str(format!("\"{content}\"")),
            Ty::String(Some(content.to_string())),
        )
    }

    pub fn bool(value: bool) -> Expr {
        let kind = if value { ExprKind::True } else { ExprKind::False };
        Expr::new(kind, Ty::Boolean(Some(value)))
    }

    pub fn this() -> Expr {
        Expr::new(ExprKind::This, Ty::Any)
    }

    pub fn array(elements: Vec<Expr>) -> Expr {
        Expr::new(ExprKind::Array(elements), Ty::array_of(Ty::Any))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            Ty::Any,
        )
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(callee),
                args,
            },
            Ty::Any,
        )
    }

    pub fn prop(expr: Expr, name: &str) -> Expr {
        Expr::new(
            ExprKind::PropertyAccess {
                expr: Box::new(expr),
                name: name.to_string(),
            },
            Ty::Any,
        )
    }

    pub fn index(expr: Expr, index: Expr) -> Expr {
        Expr::new(
            ExprKind::ElementAccess {
                expr: Box::new(expr),
                index: Box::new(index),
            },
            Ty::Any,
        )
    }
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            span: Span::default(),
        }
    }

    pub fn expr(e: Expr) -> Stmt {
        Stmt::new(StmtKind::Expression(e))
    }

    pub fn ret(e: Option<Expr>) -> Stmt {
        Stmt::new(StmtKind::Return(e))
    }

    /// `const <name> = <init>;`
    pub fn local(name: &str, init: Expr) -> Stmt {
        Stmt::new(StmtKind::Variable(VariableStatement {
            kind: VarKind::Const,
            declarations: vec![VariableDeclaration {
                name: BindingName::Id(name.to_string()),
                init: Some(init),
            }],
            exported: false,
        }))
    }

    pub fn block(statements: Vec<Stmt>) -> Stmt {
        Stmt::new(StmtKind::Block(statements))
    }
}
