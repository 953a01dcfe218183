use crate::{
    env::{Env, EnvRef},
    eval::{self, EvalError},
    expr::Expression,
    parser::{self, ParseError, MAX_PARSE_DEPTH},
};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    ParseErr(#[from] ParseError),
    #[error(transparent)]
    EvalErr(#[from] EvalError),
    #[error(transparent)]
    IOErr(#[from] io::Error),
}

pub type Result<T = Expression> = std::result::Result<T, Error>;

/// Evaluates every top-level form of `code` in `env`.
pub fn eval_with_env(code: &str, env: &EnvRef) -> Result {
    let ast = parser::parse_script(code)?;
    Ok(eval::eval_script(&ast, env)?)
}

/// Owns one global environment; definitions persist between calls.
#[derive(Debug)]
pub struct Interpreter {
    env: EnvRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self {
            env: Env::new_global_rc(),
        }
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(&self) -> &EnvRef {
        &self.env
    }

    /// Parses the first form of `code`, evaluates it and prints the result.
    /// Text after the first form is ignored.
    pub fn run(&self, code: &str) -> Result<String> {
        let exp = parser::parse_expr(code)?;
        let value = eval::eval(&exp, &self.env)?;
        Ok(value.to_string())
    }

    /// Evaluates all forms of `code`, returning the last value.
    pub fn eval(&self, code: &str) -> Result {
        eval_with_env(code, &self.env)
    }

    pub fn run_source(&self, mut source: impl io::Read) -> Result {
        let code = {
            let mut s = String::new();
            source.read_to_string(&mut s)?;
            s
        };
        self.eval(&code)
    }
}

/// Reads exactly one top-level form; trailing text is ignored.
pub fn parse(text: &str) -> std::result::Result<Expression, ParseError> {
    parser::parse_expr(text)
}

pub fn evaluate(exp: &Expression, env: &EnvRef) -> std::result::Result<Expression, EvalError> {
    eval::eval(exp, env)
}

/// `parse`, `evaluate` and print in a fresh global environment.
pub fn run(text: &str) -> Result<String> {
    Interpreter::default().run(text)
}
