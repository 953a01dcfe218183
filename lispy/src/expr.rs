use crate::{
    env::{Env, EnvRef},
    eval::EvalError,
    prelude::*,
    stack::ensure_sufficient_stack,
};
use std::{cell::RefCell, fmt, rc::Rc};
use thiserror::Error;
use variantly::Variantly;

/// Platform integer backing every number.
pub type Int = i64;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ExprError {
    #[error("Not a List!")]
    NotAList,
    #[error("Not a Number!")]
    NotANum,
    #[error("Not a Symbol!")]
    NotASym,
    #[error("Empty List!")]
    EmptyList,
}

type UnaryFn = fn(&Expression) -> Result<Expression, EvalError>;
type BinaryFn = fn(&Expression, &Expression) -> Result<Expression, EvalError>;
type VariadicFn = fn(&[Expression]) -> Result<Expression, EvalError>;

/// The native body of a primitive; its shape fixes the arity.
#[derive(Copy, Clone)]
enum ProcFn {
    Unary(UnaryFn),
    Binary(BinaryFn),
    Variadic(VariadicFn),
}

/// A native procedure, arity-checked before its body runs.
#[derive(Copy, Clone)]
pub struct Proc {
    pub name: &'static str,
    func: ProcFn,
}

impl Proc {
    pub const fn unary(name: &'static str, func: UnaryFn) -> Self {
        Self {
            name,
            func: ProcFn::Unary(func),
        }
    }

    pub const fn binary(name: &'static str, func: BinaryFn) -> Self {
        Self {
            name,
            func: ProcFn::Binary(func),
        }
    }

    pub const fn variadic(name: &'static str, func: VariadicFn) -> Self {
        Self {
            name,
            func: ProcFn::Variadic(func),
        }
    }

    /// Required argument count, `None` when any count is accepted.
    pub fn arity(&self) -> Option<usize> {
        match self.func {
            ProcFn::Unary(_) => Some(1),
            ProcFn::Binary(_) => Some(2),
            ProcFn::Variadic(_) => None,
        }
    }

    pub fn call(&self, args: &[Expression]) -> Result<Expression, EvalError> {
        match (self.func, args) {
            (ProcFn::Unary(f), [x]) => f(x),
            (ProcFn::Binary(f), [x, y]) => f(x, y),
            (ProcFn::Variadic(f), args) => f(args),
            (_, args) => Err(EvalError::WrongArgCount {
                required: self.arity().unwrap_or_default(),
                passed: args.len(),
            }),
        }
    }
}

impl fmt::Debug for Proc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proc")
            .field("name", &self.name)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

// primitives are unique by name in the global frame
impl PartialEq for Proc {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Proc {}

/// A user-defined procedure closing over the frame it was created in.
#[derive(Clone)]
pub struct Lambda {
    pub params: Rc<[String]>,
    pub body: Rc<Expression>,
    pub env: EnvRef,
}

impl Lambda {
    pub fn new(params: Vec<String>, body: Expression, env: EnvRef) -> Self {
        Self {
            params: params.into(),
            body: Rc::new(body),
            env,
        }
    }

    /// Creates the call frame: a child of the captured frame with every
    /// parameter bound positionally.
    pub fn bind(&self, args: &[Expression]) -> Result<EnvRef, EvalError> {
        let passed = args.len();
        let required = self.params.len();
        if passed != required {
            return Err(EvalError::WrongArgCount { required, passed });
        }
        let mut frame = Env::child(self.env.clone());
        for (name, val) in self.params.iter().zip(args) {
            frame.set(name, val.clone());
        }
        Ok(frame.pipe(RefCell::new).pipe(Rc::new))
    }
}

// the captured frame usually holds this very closure, so it is left out
impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Closures are equal only when they are the same closure.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.params, &other.params)
            && Rc::ptr_eq(&self.body, &other.body)
            && Rc::ptr_eq(&self.env, &other.env)
    }
}

impl Eq for Lambda {}

/// Syntax tree node and runtime value at once: a quoted list is just data.
#[derive(Variantly, Debug, Clone, Eq, PartialEq)]
pub enum Expression {
    Number(Int),
    Symbol(String),
    Bool(bool),
    List(Vec<Expression>),
    Proc(Proc),
    Lambda(Lambda),
    /// Result of `define`, `set!`, an empty `begin` or an `if` without alternative.
    Void,
}

impl Expression {
    pub fn sym(s: &str) -> Self {
        Self::Symbol(s.to_owned())
    }

    pub fn num(i: Int) -> Self {
        Self::Number(i)
    }

    pub fn new_list() -> Self {
        Self::List(vec![])
    }

    /// Only `#f` and the no-value result are false; `0` and `()` are true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Bool(false) | Self::Void)
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Self::Proc(_) | Self::Lambda(_))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(i) => write!(f, "{i}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Bool(true) => f.write_str("#t"),
            Self::Bool(false) => f.write_str("#f"),
            Self::List(l) => ensure_sufficient_stack(|| write!(f, "({})", l.iter().join(" "))),
            Self::Proc(p) => write!(f, "#<procedure:{}>", p.name),
            Self::Lambda(_) => f.write_str("#<procedure>"),
            Self::Void => f.write_str("[No output]"),
        }
    }
}

/// Renders an evaluated value back into source-like text.
pub fn stringify(exp: &Expression) -> String {
    exp.to_string()
}

impl From<Int> for Expression {
    fn from(value: Int) -> Self {
        Expression::Number(value)
    }
}

impl TryFrom<Expression> for Int {
    type Error = ExprError;

    fn try_from(value: Expression) -> Result<Self, Self::Error> {
        value.number_or(ExprError::NotANum)
    }
}

impl TryFrom<&Expression> for Int {
    type Error = ExprError;

    fn try_from(value: &Expression) -> Result<Self, Self::Error> {
        value.number_ref_or(ExprError::NotANum).map(|x| *x)
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::Bool(value)
    }
}

impl From<Lambda> for Expression {
    fn from(value: Lambda) -> Self {
        Expression::Lambda(value)
    }
}

// non-copy types
macro_rules! impl_from {
    ($type:ty, $body:expr, $unwrap_or:ident, $err:expr) => {
        impl From<$type> for Expression {
            fn from(value: $type) -> Self {
                $body(value)
            }
        }

        impl TryFrom<Expression> for $type {
            type Error = ExprError;

            fn try_from(value: Expression) -> Result<Self, Self::Error> {
                value.$unwrap_or($err)
            }
        }
    };
}

impl_from!(
    Vec<Expression>,
    Expression::List,
    list_or,
    ExprError::NotAList
);

impl_from!(String, Expression::Symbol, symbol_or, ExprError::NotASym);

/// Creates a [`Expression::List`] like `vec!`.
///
/// A thin wrapper around `vec!`, expands to `Expression::List(vec![/*...*/])`.
/// - Create a [`Expression::List`] containing a given list of elements:
///
/// ```
/// # use lispy::expr::{list, Expression};
/// let l = list![Expression::num(1), Expression::sym("2")].unwrap_list();
/// assert_eq!(l[0], Expression::num(1));
/// assert_eq!(l[1], Expression::sym("2"));
/// ```
#[macro_export]
macro_rules! list {
    [] => (
        $crate::expr::Expression::new_list()
    );
    [$elem:expr; $n:expr] => (
        $crate::expr::Expression::List(vec![$elem; $n])
    );
    [$($x:expr),+ $(,)?] => (
        $crate::expr::Expression::List(vec![$($x),+])
    );
}

pub use list;
