use crate::{
    env::{Env, EnvRef},
    expr::{ExprError, Expression, Lambda},
    stack::ensure_sufficient_stack,
};
use thiserror::Error;
use tracing::trace;

/// Deepest nesting of evaluations before giving up with [`EvalError::RecursionLimit`].
pub const MAX_EVAL_DEPTH: usize = 10_000;

/// Enum representing evaluation errors.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum EvalError {
    #[error("Unbound symbol: {0}!")]
    UnboundSymbol(String),
    #[error("Argument length mismatch, expected {required} but received {passed}!")]
    WrongArgCount { required: usize, passed: usize },
    #[error("Not a procedure: {0}!")]
    NotCallable(String),
    #[error("Ill-formed special form: {0}!")]
    IllFormed(&'static str),
    #[error("Cannot apply an empty list!")]
    EmptyApplication,
    #[error("Division by zero!")]
    DivisionByZero,
    #[error("Integer overflow in {0}!")]
    Overflow(&'static str),
    #[error("Recursion limit of {0} exceeded!")]
    RecursionLimit(usize),
    #[error(transparent)]
    ExprErr(#[from] ExprError),
}

/// special forms that require different evaluation than normal procedures
pub mod special {
    use std::str::FromStr;

    use super::*;

    #[derive(Debug, Copy, Clone, Eq, PartialEq)]
    pub enum SpecialForm {
        Quote,
        If,
        Set,
        Define,
        Lambda,
        Begin,
    }

    impl FromStr for SpecialForm {
        type Err = (); // no need for more here for now

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Ok(match s {
                "quote" => Self::Quote,
                "if" => Self::If,
                "set!" => Self::Set,
                "define" => Self::Define,
                "lambda" => Self::Lambda,
                "begin" => Self::Begin,
                _ => return Err(()),
            })
        }
    }

    impl SpecialForm {
        pub fn keyword(self) -> &'static str {
            match self {
                Self::Quote => "quote",
                Self::If => "if",
                Self::Set => "set!",
                Self::Define => "define",
                Self::Lambda => "lambda",
                Self::Begin => "begin",
            }
        }

        fn ill_formed(self) -> EvalError {
            EvalError::IllFormed(self.keyword())
        }
    }

    pub(super) fn eval_special(
        form: SpecialForm,
        rest: &[Expression],
        env: &EnvRef,
        depth: usize,
    ) -> Result<Expression, EvalError> {
        trace!(form = form.keyword(), "special form");
        match form {
            SpecialForm::Quote => eval_quote(rest),
            SpecialForm::If => eval_if(rest, env, depth),
            SpecialForm::Set => eval_set(rest, env, depth),
            SpecialForm::Define => eval_define(rest, env, depth),
            SpecialForm::Lambda => eval_lambda(rest, env),
            SpecialForm::Begin => eval_begin(rest, env, depth),
        }
    }

    fn eval_quote(rest: &[Expression]) -> Result<Expression, EvalError> {
        let [datum] = rest else {
            return Err(SpecialForm::Quote.ill_formed());
        };
        Ok(datum.clone())
    }

    /// Anything but `#f` and the no-value result selects the consequent.
    fn eval_if(rest: &[Expression], env: &EnvRef, depth: usize) -> Result<Expression, EvalError> {
        let (cond, consequent, alternative) = match rest {
            [cond, consequent] => (cond, consequent, None),
            [cond, consequent, alternative] => (cond, consequent, Some(alternative)),
            _ => return Err(SpecialForm::If.ill_formed()),
        };
        if eval_at(cond, env, depth)?.is_truthy() {
            eval_at(consequent, env, depth)
        } else {
            alternative.map_or(Ok(Expression::Void), |alt| eval_at(alt, env, depth))
        }
    }

    fn eval_set(rest: &[Expression], env: &EnvRef, depth: usize) -> Result<Expression, EvalError> {
        let [Expression::Symbol(name), exp] = rest else {
            return Err(SpecialForm::Set.ill_formed());
        };
        let val = eval_at(exp, env, depth)?;
        Env::find(env, name)?.borrow_mut().set(name, val);
        Ok(Expression::Void)
    }

    fn eval_define(
        rest: &[Expression],
        env: &EnvRef,
        depth: usize,
    ) -> Result<Expression, EvalError> {
        let [Expression::Symbol(name), exp] = rest else {
            return Err(SpecialForm::Define.ill_formed());
        };
        let val = eval_at(exp, env, depth)?;
        env.borrow_mut().set(name, val);
        Ok(Expression::Void)
    }

    fn eval_lambda(rest: &[Expression], env: &EnvRef) -> Result<Expression, EvalError> {
        let [Expression::List(params), body] = rest else {
            return Err(SpecialForm::Lambda.ill_formed());
        };
        let params = params
            .iter()
            .map(|p| match p {
                Expression::Symbol(s) => Ok(s.clone()),
                _ => Err(SpecialForm::Lambda.ill_formed()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Lambda::new(params, body.clone(), env.clone()).into())
    }

    fn eval_begin(rest: &[Expression], env: &EnvRef, depth: usize) -> Result<Expression, EvalError> {
        rest.iter()
            .try_fold(Expression::Void, |_, exp| eval_at(exp, env, depth))
    }
}

fn eval_list(list: &[Expression], env: &EnvRef, depth: usize) -> Result<Expression, EvalError> {
    let [head, args @ ..] = list else {
        return Err(EvalError::EmptyApplication);
    };

    // special forms are decided by the literal head symbol, before any evaluation
    if let Expression::Symbol(sym) = head {
        if let Ok(form) = sym.parse() {
            return special::eval_special(form, args, env, depth);
        }
    }

    let values = list
        .iter()
        .map(|exp| eval_at(exp, env, depth))
        .collect::<Result<Vec<_>, _>>()?;
    let (op, args) = values
        .split_first()
        .ok_or(EvalError::EmptyApplication)?;
    apply_at(op, args, depth)
}

fn apply_at(op: &Expression, args: &[Expression], depth: usize) -> Result<Expression, EvalError> {
    match op {
        Expression::Proc(proc) => proc.call(args),
        Expression::Lambda(lambda) => {
            trace!(params = lambda.params.len(), "applying closure");
            let frame = lambda.bind(args)?;
            eval_at(&lambda.body, &frame, depth)
        }
        other => Err(EvalError::NotCallable(other.to_string())),
    }
}

fn eval_at(exp: &Expression, env: &EnvRef, depth: usize) -> Result<Expression, EvalError> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(EvalError::RecursionLimit(MAX_EVAL_DEPTH));
    }
    match exp {
        Expression::Symbol(sym) => Env::lookup(env, sym),
        Expression::List(l) => ensure_sufficient_stack(|| eval_list(l, env, depth + 1)),
        other => Ok(other.clone()),
    }
}

/// Evaluates `exp` against `env`, usually the global frame or a child of it.
pub fn eval(exp: &Expression, env: &EnvRef) -> Result<Expression, EvalError> {
    eval_at(exp, env, 0)
}

/// Applies a procedure value to already evaluated arguments.
pub fn apply(op: &Expression, args: &[Expression]) -> Result<Expression, EvalError> {
    apply_at(op, args, 0)
}

/// Evaluates every expression in order, returning the value of the last one.
pub fn eval_script(exps: &[Expression], env: &EnvRef) -> Result<Expression, EvalError> {
    exps.iter()
        .try_fold(Expression::Void, |_, exp| eval(exp, env))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{expr::list, parser};
    use anyhow::Result;

    fn test_eval(code: &str) -> Result<Expression> {
        let exps = parser::parse_script(code)?;
        Ok(eval_script(&exps, &Env::new_global_rc())?)
    }

    fn test_eval_err(code: &str) -> EvalError {
        let exps = parser::parse_script(code).expect("test code should parse");
        eval_script(&exps, &Env::new_global_rc()).expect_err("evaluation should fail")
    }

    /// macro to setup test boilerplate for evaluating scripts and printing the result
    macro_rules! eval_test {
        ($fn_name:ident, $code:literal, $expected:literal) => {
            #[test]
            fn $fn_name() -> Result<()> {
                let result = test_eval($code)?;
                assert_eq!(result.to_string(), $expected);
                Ok(())
            }
        };
    }

    mod atoms {
        use super::*;

        eval_test!(number, "42", "42");

        eval_test!(negative_number, "-7", "-7");

        eval_test!(primitive, "car", "#<procedure:car>");

        #[test]
        fn unbound() {
            assert_eq!(
                test_eval_err("foo"),
                EvalError::UnboundSymbol("foo".to_owned())
            );
        }
    }

    mod special_forms {
        use super::*;

        eval_test!(quote_list, "(quote (1 2 3))", "(1 2 3)");

        eval_test!(quote_symbol, "(quote foo)", "foo");

        eval_test!(quote_code, "(quote (+ 1 2))", "(+ 1 2)");

        eval_test!(if_true, "(if (< 1 2) 10 20)", "10");

        eval_test!(if_false, "(if (> 1 2) 10 20)", "20");

        eval_test!(if_zero_is_truthy, "(if 0 1 2)", "1");

        eval_test!(if_empty_list_is_truthy, "(if (quote ()) 1 2)", "1");

        eval_test!(if_without_alternative, "(if (= 1 2) 1)", "[No output]");

        eval_test!(if_only_evaluates_taken_branch, "(if 1 2 (undefined))", "2");

        eval_test!(define_yields_nothing, "(define x 5)", "[No output]");

        eval_test!(define_then_read, "(define x 5) x", "5");

        eval_test!(define_overwrites, "(define x 5) (define x 6) x", "6");

        eval_test!(set_mutates, "(define x 5) (set! x (+ x 1)) x", "6");

        eval_test!(begin, "(begin (define x 1) (set! x 2) x)", "2");

        eval_test!(empty_begin, "(begin)", "[No output]");

        eval_test!(lambda_value, "(lambda (x) x)", "#<procedure>");

        eval_test!(lambda_call, "((lambda (x y) (+ x y)) 3 4)", "7");

        eval_test!(lambda_no_params, "((lambda () 9))", "9");

        eval_test!(
            shadowed_special_form_name,
            "(define if 3) (if if 1 2)",
            "1"
        );

        #[test]
        fn set_unbound() {
            assert_eq!(
                test_eval_err("(set! y 1)"),
                EvalError::UnboundSymbol("y".to_owned())
            );
        }

        #[test]
        fn ill_formed() {
            for (code, form) in [
                ("(quote)", "quote"),
                ("(quote 1 2)", "quote"),
                ("(if)", "if"),
                ("(if 1 2 3 4)", "if"),
                ("(define 1 2)", "define"),
                ("(define x)", "define"),
                ("(set! (x) 2)", "set!"),
                ("(lambda x x)", "lambda"),
                ("(lambda (1) 1)", "lambda"),
                ("(lambda (x))", "lambda"),
            ] {
                assert_eq!(test_eval_err(code), EvalError::IllFormed(form), "{code}");
            }
        }
    }

    mod scoping {
        use super::*;

        eval_test!(
            closure_captures_frame,
            "(define make-adder (lambda (n) (lambda (x) (+ x n))))
             (define add5 (make-adder 5))
             (add5 10)",
            "15"
        );

        eval_test!(
            closure_observes_set,
            "(define x 5)
             (define get-x (lambda () x))
             (set! x (+ x 1))
             (get-x)",
            "6"
        );

        eval_test!(
            set_reaches_outer_frame,
            "(define counter 0)
             (define bump (lambda () (set! counter (+ counter 1))))
             (bump) (bump) (bump)
             counter",
            "3"
        );

        eval_test!(
            define_in_body_shadows,
            "(define x 1)
             (define f (lambda () (begin (define x 2) x)))
             (f)
             x",
            "1"
        );

        eval_test!(
            params_shadow_globals,
            "(define x 1) ((lambda (x) (* x 10)) 7)",
            "70"
        );

        eval_test!(
            private_state,
            "(define make-counter
               (lambda ()
                 (begin
                   (define n 0)
                   (lambda () (begin (set! n (+ n 1)) n)))))
             (define c1 (make-counter))
             (define c2 (make-counter))
             (c1) (c1) (c2)
             (list (c1) (c2))",
            "(3 2)"
        );

        eval_test!(
            recursion,
            "(define fact (lambda (n) (if (<= n 1) 1 (* n (fact (- n 1))))))
             (fact 10)",
            "3628800"
        );

        eval_test!(
            higher_order,
            "(define map (lambda (f l)
               (if (null? l) (quote ()) (cons (f (car l)) (map f (cdr l))))))
             (map (lambda (x) (* x x)) (list 1 2 3))",
            "(1 4 9)"
        );
    }

    mod application {
        use super::*;

        eval_test!(nested, "(* (+ 1 2) (+ 5 3))", "24");

        eval_test!(computed_operator, "((if 1 + -) 5 3)", "8");

        #[test]
        fn undefined_operator() {
            assert_eq!(
                test_eval_err("(foo)"),
                EvalError::UnboundSymbol("foo".to_owned())
            );
        }

        #[test]
        fn not_callable() {
            assert_eq!(test_eval_err("(1 2)"), EvalError::NotCallable("1".to_owned()));
            assert_eq!(
                test_eval_err("((quote (1 2)))"),
                EvalError::NotCallable("(1 2)".to_owned())
            );
        }

        #[test]
        fn empty_application() {
            assert_eq!(test_eval_err("()"), EvalError::EmptyApplication);
        }

        #[test]
        fn closure_arity() {
            for code in [
                "((lambda (x) x))",
                "((lambda (x) x) 1 2)",
                "((lambda () (undefined)) 1)",
            ] {
                assert!(
                    matches!(test_eval_err(code), EvalError::WrongArgCount { .. }),
                    "{code}"
                );
            }
        }

        #[test]
        fn primitive_arity() {
            assert_eq!(
                test_eval_err("(+ 1 2 3)"),
                EvalError::WrongArgCount {
                    required: 2,
                    passed: 3
                }
            );
        }

        #[test]
        fn apply_directly() -> Result<()> {
            let env = Env::new_global_rc();
            let plus = Env::lookup(&env, "+")?;
            let result = apply(&plus, &[Expression::num(2), Expression::num(3)])?;
            assert_eq!(result, Expression::num(5));
            assert_eq!(
                apply(&list![], &[]),
                Err(EvalError::NotCallable("()".to_owned()))
            );
            Ok(())
        }

        #[test]
        fn runaway_recursion() {
            assert_eq!(
                test_eval_err("(define f (lambda (n) (f n))) (f 1)"),
                EvalError::RecursionLimit(MAX_EVAL_DEPTH)
            );
        }
    }
}
