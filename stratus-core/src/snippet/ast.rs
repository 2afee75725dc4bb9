use serde_json::Number;

/// A parsed snippet: statements in execution order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

/// `target = expr` or a bare expression evaluated for its effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Binding assigned by the statement, if any.
    pub target: Option<String>,
    pub expr: Expr,
    /// 1-based source line the statement starts on.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    Attribute {
        base: Box<Expr>,
        name: String,
    },
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Number(Number),
    Str(String),
}

impl Expr {
    /// Dotted rendering of a name/attribute chain, e.g. `compute_client.disks.list`.
    ///
    /// Returns `None` for anything that is not a plain chain.
    #[must_use]
    pub fn dotted_path(&self) -> Option<String> {
        match self {
            Self::Name(name) => Some(name.clone()),
            Self::Attribute { base, name } => base.dotted_path().map(|b| format!("{b}.{name}")),
            _ => None,
        }
    }
}
