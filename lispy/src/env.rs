use crate::{builtins, eval::EvalError, expr::Expression};
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use tracing::debug;

/// Shared handle to a frame; closures and call frames hold these, never copies.
pub type EnvRef = Rc<RefCell<Env>>;

/// One scope frame: its own bindings plus a link to the enclosing frame.
#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, Expression>,
    outer: Option<EnvRef>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(outer: EnvRef) -> Self {
        Self {
            vars: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Root frame with every primitive of [`builtins::PRIMITIVES`] bound by name.
    pub fn new_global() -> Self {
        let mut env = Self::new();
        for proc in builtins::PRIMITIVES {
            env.set(proc.name, Expression::Proc(*proc));
        }
        debug!(primitives = env.vars.len(), "created global environment");
        env
    }

    pub fn new_global_rc() -> EnvRef {
        Rc::new(RefCell::new(Self::new_global()))
    }

    /// Nearest frame, starting at `env` itself, that binds `sym`.
    pub fn find(env: &EnvRef, sym: &str) -> Result<EnvRef, EvalError> {
        let mut frame = Rc::clone(env);
        loop {
            if frame.borrow().vars.contains_key(sym) {
                return Ok(frame);
            }
            let outer = frame.borrow().outer.clone();
            match outer {
                Some(outer) => frame = outer,
                None => return Err(EvalError::UnboundSymbol(sym.to_owned())),
            }
        }
    }

    /// [`Env::find`] followed by [`Env::get`] on the frame found.
    pub fn lookup(env: &EnvRef, sym: &str) -> Result<Expression, EvalError> {
        let frame = Self::find(env, sym)?;
        let val = frame.borrow().get(sym);
        val.ok_or_else(|| EvalError::UnboundSymbol(sym.to_owned()))
    }

    /// Looks at this frame only.
    pub fn get(&self, name: &str) -> Option<Expression> {
        self.vars.get(name).cloned()
    }

    /// Binds in this frame only, shadowing any outer binding.
    pub fn set(&mut self, name: &str, val: Expression) -> Option<Expression> {
        self.vars.insert(name.to_owned(), val)
    }
}
