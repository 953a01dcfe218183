use crate::{
    eval::EvalError,
    expr::{ExprError, Expression, Int, Proc},
    prelude::*,
};

/// Every primitive bound in the global frame.
pub const PRIMITIVES: &[Proc] = &[
    Proc::binary("+", math::add),
    Proc::binary("-", math::sub),
    Proc::binary("*", math::mul),
    Proc::binary("/", math::div),
    Proc::unary("not", logic::not),
    Proc::binary("=", logic::equal),
    Proc::binary("eq?", logic::equal),
    Proc::binary("equal?", logic::equal),
    Proc::binary("<", math::lt),
    Proc::binary(">", math::gt),
    Proc::binary("<=", math::le),
    Proc::binary(">=", math::ge),
    Proc::unary("length", lists::length),
    Proc::binary("cons", lists::cons),
    Proc::unary("car", lists::car),
    Proc::unary("cdr", lists::cdr),
    Proc::variadic("list", lists::list),
    Proc::unary("list?", lists::is_list),
    Proc::unary("null?", lists::is_null),
    Proc::unary("symbol?", lists::is_symbol),
];

/// NOTE: arithmetic is checked, overflow is an error rather than wrapping
pub mod math {
    use super::*;

    fn numbers(x: &Expression, y: &Expression) -> Result<(Int, Int), ExprError> {
        Ok((x.try_into()?, y.try_into()?))
    }

    fn checked(
        x: &Expression,
        y: &Expression,
        op: &'static str,
        f: fn(Int, Int) -> Option<Int>,
    ) -> Result<Expression, EvalError> {
        let (x, y) = numbers(x, y)?;
        f(x, y).map(Expression::Number).ok_or(EvalError::Overflow(op))
    }

    pub fn add(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        checked(x, y, "+", Int::checked_add)
    }

    pub fn sub(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        checked(x, y, "-", Int::checked_sub)
    }

    pub fn mul(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        checked(x, y, "*", Int::checked_mul)
    }

    /// Integer division, truncating toward zero.
    pub fn div(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        let (x, y) = numbers(x, y)?;
        if y == 0 {
            return Err(EvalError::DivisionByZero);
        }
        x.checked_div(y)
            .map(Expression::Number)
            .ok_or(EvalError::Overflow("/"))
    }

    fn compare(
        x: &Expression,
        y: &Expression,
        f: fn(&Int, &Int) -> bool,
    ) -> Result<Expression, EvalError> {
        let (x, y) = numbers(x, y)?;
        Ok(f(&x, &y).into())
    }

    pub fn lt(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        compare(x, y, Int::lt)
    }

    pub fn gt(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        compare(x, y, Int::gt)
    }

    pub fn le(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        compare(x, y, Int::le)
    }

    pub fn ge(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        compare(x, y, Int::ge)
    }
}

pub mod logic {
    use super::*;

    pub fn not(x: &Expression) -> Result<Expression, EvalError> {
        Ok((!x.is_truthy()).into())
    }

    /// Backs `=`, `eq?` and `equal?` alike: structural for data, identity for closures.
    pub fn equal(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        Ok((x == y).into())
    }
}

pub mod lists {
    use super::*;
    use std::slice;

    fn list_arg(exp: &Expression) -> Result<&[Expression], ExprError> {
        exp.list_ref_or(ExprError::NotAList).map(Vec::as_slice)
    }

    /// A list spreads into its elements, anything else stands for itself.
    fn spread(exp: &Expression) -> slice::Iter<'_, Expression> {
        match exp {
            Expression::List(l) => l.iter(),
            other => slice::from_ref(other).iter(),
        }
    }

    pub fn length(l: &Expression) -> Result<Expression, EvalError> {
        let len = list_arg(l)?.len();
        Int::try_from(len)
            .map(Expression::Number)
            .map_err(|_| EvalError::Overflow("length"))
    }

    /// `(cons 1 (list 2 3))` is `(1 2 3)`; list operands on either side are flattened one level.
    pub fn cons(x: &Expression, y: &Expression) -> Result<Expression, EvalError> {
        Ok(spread(x)
            .chain(spread(y))
            .cloned()
            .collect_vec()
            .pipe(Expression::List))
    }

    pub fn car(l: &Expression) -> Result<Expression, EvalError> {
        list_arg(l)?
            .first()
            .cloned()
            .ok_or_else(|| ExprError::EmptyList.into())
    }

    pub fn cdr(l: &Expression) -> Result<Expression, EvalError> {
        let rest = list_arg(l)?
            .split_first()
            .map_or(&[][..], |(_, rest)| rest);
        Ok(rest.to_vec().into())
    }

    pub fn list(args: &[Expression]) -> Result<Expression, EvalError> {
        Ok(args.to_vec().into())
    }

    pub fn is_list(x: &Expression) -> Result<Expression, EvalError> {
        Ok(x.is_list().into())
    }

    pub fn is_null(x: &Expression) -> Result<Expression, EvalError> {
        Ok(matches!(x, Expression::List(l) if l.is_empty()).into())
    }

    pub fn is_symbol(x: &Expression) -> Result<Expression, EvalError> {
        Ok(x.is_symbol().into())
    }
}
