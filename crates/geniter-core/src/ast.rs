//! Typed Java AST for the generator-to-iterator transformation.
//!
//! The tree is closed and value-like: every rewriter reconstructs nodes
//! rather than mutating them. The only transformation-specific payload is
//! the yield-id tag on [`Stmt::Yield`], assigned by the numbering pass and
//! preserved by every later rewrite because it travels with the value.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub type Symbol = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub package: Option<Symbol>,
    pub imports: Vec<Import>,
    pub types: Vec<ClassDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub path: Symbol,
    pub is_static: bool,
    pub on_demand: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Symbol,
    pub modifiers: Vec<Symbol>,
    pub type_params: Vec<Symbol>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Ctor(CtorDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub modifiers: Vec<Symbol>,
    pub ty: TypeRef,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Symbol,
    pub modifiers: Vec<Symbol>,
    pub ret: TypeRef,
    pub params: SmallVec<[Param; 4]>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtorDecl {
    pub name: Symbol,
    pub modifiers: Vec<Symbol>,
    pub params: SmallVec<[Param; 4]>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub modifiers: Vec<Symbol>,
    pub ty: TypeRef,
    pub name: Symbol,
}

/// One variable in a field or local declaration: `name[]..[] = init`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarator {
    pub name: Symbol,
    pub dims: u32,
    pub init: Option<Expr>,
}

impl Declarator {
    pub fn named(name: impl Into<Symbol>) -> Self {
        Declarator {
            name: name.into(),
            dims: 0,
            init: None,
        }
    }

    pub fn with_init(name: impl Into<Symbol>, init: Expr) -> Self {
        Declarator {
            name: name.into(),
            dims: 0,
            init: Some(init),
        }
    }
}

/// A (possibly generic) type reference. Primitives, scoped names and array
/// types all travel as their source text in `name`; only type arguments are
/// structured, because the for-each desugaring builds `Iterator<T>` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: Symbol,
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn simple(name: impl Into<Symbol>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<Symbol>, args: Vec<TypeRef>) -> Self {
        TypeRef {
            name: name.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Empty,
    Block(Vec<Stmt>),
    /// A local variable declaration. None survive hoisting inside the
    /// generator body; pass-through members may still contain them.
    LocalVar {
        modifiers: Vec<Symbol>,
        ty: TypeRef,
        declarators: Vec<Declarator>,
    },
    Assign {
        lhs: Expr,
        op: AssignOp,
        rhs: Expr,
    },
    Expr(Expr),
    Return(Option<Expr>),
    Break,
    Continue,
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        /// `None` is the distinguished absent branch; the printer skips it.
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    ForEach {
        ty: TypeRef,
        var: Symbol,
        iterable: Expr,
        body: Box<Stmt>,
    },
    /// Three-part `for`. Parsed so that pass-through members print, rejected
    /// by the hoister inside the generator body.
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Stmt>,
        body: Box<Stmt>,
    },
    Switch {
        scrutinee: Expr,
        cases: Vec<SwitchCase>,
    },
    /// A suspension point: a statement-level receiver-less `yield(e)` call.
    /// `id` is `None` until the numbering pass runs.
    Yield {
        value: Expr,
        id: Option<u32>,
    },
}

impl Stmt {
    /// Assignment statement `lhs = rhs`, the shape every synthesized
    /// assignment in this tool takes.
    pub fn assign(lhs: Expr, rhs: Expr) -> Stmt {
        Stmt::Assign {
            lhs,
            op: AssignOp::Assign,
            rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub labels: Vec<CaseLabel>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseLabel {
    Expr(Expr),
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A name reference. May still contain dots as delivered by the parser;
    /// the hoister splits those into explicit field accesses.
    Name(Symbol),
    /// A literal, carried as its raw source token (`0`, `true`, `"s"`, …).
    Literal(Symbol),
    FieldAccess {
        target: Box<Expr>,
        name: Symbol,
    },
    Call {
        target: Option<Box<Expr>>,
        name: Symbol,
        args: Vec<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn name(name: impl Into<Symbol>) -> Expr {
        Expr::Name(name.into())
    }

    pub fn literal(text: impl Into<Symbol>) -> Expr {
        Expr::Literal(text.into())
    }

    pub fn field_access(target: Expr, name: impl Into<Symbol>) -> Expr {
        Expr::FieldAccess {
            target: Box::new(target),
            name: name.into(),
        }
    }

    pub fn call_on(target: Expr, name: impl Into<Symbol>, args: Vec<Expr>) -> Expr {
        Expr::Call {
            target: Some(Box::new(target)),
            name: name.into(),
            args,
        }
    }

    /// True when the expression is the bare literal `true`. Drives the
    /// degenerate `while (true)` / `if (true)` collapses in the rewriter.
    pub fn is_true_literal(&self) -> bool {
        matches!(self, Expr::Literal(text) if text == "true")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    UShr,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Rem,
            "&=" => AssignOp::And,
            "|=" => AssignOp::Or,
            "^=" => AssignOp::Xor,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            ">>>=" => AssignOp::UShr,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Rem,
            "==" => BinOp::Eq,
            "!=" => BinOp::NotEq,
            "<" => BinOp::Lt,
            "<=" => BinOp::LtEq,
            ">" => BinOp::Gt,
            ">=" => BinOp::GtEq,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "<<" => BinOp::Shl,
            ">>" => BinOp::Shr,
            ">>>" => BinOp::UShr,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::PreIncrement | UnaryOp::PostIncrement => "++",
            UnaryOp::PreDecrement | UnaryOp::PostDecrement => "--",
        }
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostIncrement | UnaryOp::PostDecrement)
    }
}
