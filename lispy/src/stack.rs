//! Stack growth for the recursive reader and evaluator.
//!
//! Deeply nested lists recurse once per level in both [`crate::parser`] and
//! [`crate::eval`], so both wrap their recursive step in
//! [`ensure_sufficient_stack`].

/// If less than this remains, the stack is grown before recursing.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
