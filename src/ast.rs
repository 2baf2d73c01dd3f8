//! Syntax tree data model consumed by the analyzer.
//!
//! A frontend hands the analyzer one [`Unit`] per translation unit, holding
//! one fully typed expression tree per function. The shape mirrors what a
//! C-like frontend produces after gimplification: statement lists, binding
//! scopes with explicit declaration lists, and conditionals whose static
//! type distinguishes statement from value position. Trees serialize as
//! JSON, so units can be produced by any tooling that can emit the format
//! (see `tests/fixtures/` for examples).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Numeric identifier of a goto/label target, unique within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(pub u32);

/// Static type of a conditional expression.
///
/// A `Void` conditional is a statement (`if`/`else`) and lowers to real
/// branch nodes; a `Value` conditional (ternary in value position) only
/// contributes reads to the node under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ty {
    Void,
    Value,
}

/// Binary operators the frontend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Truncating integer division.
    TruncDiv,
    /// Short-circuit logical and.
    AndIf,
    /// Short-circuit logical or.
    OrIf,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinOp {
    /// Short mnemonic used as CFG node info.
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::TruncDiv => "trunc_div",
            BinOp::AndIf => "and_if",
            BinOp::OrIf => "or_if",
            BinOp::And => "bit_and",
            BinOp::Or => "bit_or",
            BinOp::Lt => "lt",
            BinOp::Le => "le",
            BinOp::Gt => "gt",
            BinOp::Ge => "ge",
            BinOp::Eq => "eq",
            BinOp::Ne => "ne",
        }
    }
}

/// Unary operators the frontend emits.
///
/// Increment and decrement read their operand; the write side is folded
/// away by the frontend and is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnOp {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    /// Integer-to-float conversion.
    Float,
}

impl UnOp {
    /// Short mnemonic used as CFG node info.
    pub fn as_str(self) -> &'static str {
        match self {
            UnOp::PostInc => "post_inc",
            UnOp::PostDec => "post_dec",
            UnOp::PreInc => "pre_inc",
            UnOp::PreDec => "pre_dec",
            UnOp::Float => "float",
        }
    }
}

/// A local variable declared by a binding scope, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decl {
    pub name: String,
}

/// One node of a function body tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Ordered sequence of statements.
    Stmts(Vec<Expr>),
    /// Lexical scope: the names it declares plus the scoped body.
    Bind { decls: Vec<Decl>, body: Box<Expr> },
    /// Declaration statement. Only declarations carrying an initializer
    /// have an effect; the bare ones are already listed by their `Bind`.
    Decl {
        name: String,
        init: Option<Box<Expr>>,
    },
    /// Assignment, `target = value`.
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// Conditional. Branches are absent when the source omitted them.
    Cond {
        ty: Ty,
        cond: Box<Expr>,
        then_branch: Option<Box<Expr>>,
        else_branch: Option<Box<Expr>>,
    },
    /// Call to a named function.
    Call { callee: String, args: Vec<Expr> },
    /// Return, with an optional returned value.
    Return { value: Option<Box<Expr>> },
    /// Comma expression: evaluate `first`, then `rest`.
    Seq { first: Box<Expr>, rest: Box<Expr> },
    /// Switch over `cond`; case labels live inside `body`.
    Switch { cond: Box<Expr>, body: Box<Expr> },
    /// Unconditional jump to a label.
    Goto { target: LabelId },
    /// Jump target.
    Label { id: LabelId },
    /// Case label inside a switch body. `default` marks the default case.
    Case { default: bool },
    /// Unary operation.
    Unary { op: UnOp, operand: Box<Expr> },
    /// Binary operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Implicit conversion wrapper; transparent to lowering.
    Convert(Box<Expr>),
    /// Address-of wrapper; transparent to lowering.
    AddrOf(Box<Expr>),
    /// Reference to a variable or parameter.
    Name(String),
    /// Integer literal; carries no variables.
    Int(i64),
}

impl Expr {
    /// Shorthand for a variable reference.
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    /// Shorthand for an integer literal.
    pub fn int(value: i64) -> Self {
        Expr::Int(value)
    }

    /// Shorthand for an assignment.
    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Shorthand for a declaration statement.
    pub fn decl(name: impl Into<String>, init: Option<Expr>) -> Self {
        Expr::Decl {
            name: name.into(),
            init: init.map(Box::new),
        }
    }

    /// Shorthand for a call.
    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }

    /// Shorthand for a return.
    pub fn ret(value: Option<Expr>) -> Self {
        Expr::Return {
            value: value.map(Box::new),
        }
    }

    /// Shorthand for a statement list.
    pub fn stmts(stmts: Vec<Expr>) -> Self {
        Expr::Stmts(stmts)
    }

    /// Shorthand for a binding scope declaring `decls`.
    pub fn bind(decls: &[&str], body: Expr) -> Self {
        Expr::Bind {
            decls: decls
                .iter()
                .map(|name| Decl {
                    name: (*name).to_string(),
                })
                .collect(),
            body: Box::new(body),
        }
    }
}

/// One function of a translation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Source-level function name, used verbatim in reports.
    pub name: String,
    /// The lowered function body, normally a root `Bind`.
    pub body: Expr,
}

/// A translation unit: every function definition, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub functions: Vec<FunctionDef>,
}

impl Unit {
    /// Parse a unit from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ColdreadError::Serde`] when the text is not valid
    /// JSON or does not match the tree schema.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize a unit to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
