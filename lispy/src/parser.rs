// this lisp parser somehow evolved into poor man's parser combinators
use crate::{
    expr::{Expression, Int},
    lexer::{self, Token},
    stack::ensure_sufficient_stack,
};
use thiserror::Error;
use tracing::debug;

/// Enum representing parser errors.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    #[error("Unexpected EOF while reading a list!")]
    UnclosedList,
    #[error("Unexpected EOF!")]
    UnexpectedEOF,
    #[error("Mismatched paren error!")]
    UnexpectedRParen,
    #[error("Integer literal out of range: {0}!")]
    IntegerOverflow(String),
    #[error("Lists nested deeper than {0} levels!")]
    TooDeep(usize),
}

/// Deepest list nesting the reader accepts.
///
/// Cloning, comparing and dropping a tree all recurse once per level, so no
/// tree deeper than this is ever built.
pub const MAX_PARSE_DEPTH: usize = 1_000;

type PResult<'tok, T, E = ParseError> = Result<(T, &'tok [Token]), E>;

/// Classifies an atom token: a leading integer makes a number, anything else is a symbol.
///
/// The integer parse is lenient: an optional sign and at least one digit are
/// enough, trailing characters are dropped, so `12abc` reads as `12`.
pub fn atom(token: &str) -> Result<Expression, ParseError> {
    match integer_prefix(token) {
        Some(digits) => digits
            .parse::<Int>()
            .map(Expression::Number)
            .map_err(|_| ParseError::IntegerOverflow(token.to_owned())),
        None => Ok(Expression::Symbol(token.to_owned())),
    }
}

fn integer_prefix(token: &str) -> Option<&str> {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let sign = token.len() - unsigned.len();
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0).then(|| &token[..sign + digits])
}

/// module dedicated to parsing a singular Expression
mod single_expr {
    use super::*;
    #[derive(Error, Debug, Clone)]
    /// implementation error representing `parse` errors
    pub enum Error {
        #[error("Empty slice!")]
        EmptySlice,
        #[error(transparent)]
        ParseErr(#[from] ParseError),
    }

    impl Error {
        pub fn on_empty(self, slice_alt: ParseError) -> ParseError {
            match self {
                Error::EmptySlice => slice_alt,
                Error::ParseErr(e) => e,
            }
        }
    }

    /// Recursively parse the tokens until an [`Expression`] is parsed,
    /// the [`Token::RParen`] is hit or an error occurs.
    /// `depth` counts the lists already open around `tokens`.
    pub fn parse(tokens: &[Token], depth: usize) -> PResult<Option<Expression>, Error> {
        let (first, mut rest) = tokens.split_first().ok_or(Error::EmptySlice)?;
        let result = match first {
            Token::RParen => None,
            Token::Atom(a) => Some(atom(a)?),
            Token::LParen => {
                if depth >= MAX_PARSE_DEPTH {
                    return Err(ParseError::TooDeep(MAX_PARSE_DEPTH).into());
                }
                let l = ensure_sufficient_stack(|| parse_list(rest, depth + 1))?;
                rest = l.1;
                Some(Expression::List(l.0))
            }
        };
        Ok((result, rest))
    }

    #[inline]
    /// Parses the body of a list, the opening paren already consumed.
    fn parse_list(mut tokens: &[Token], depth: usize) -> PResult<Vec<Expression>> {
        let mut list: Vec<Expression> = vec![];
        loop {
            let (maybe_exp, rest) =
                parse(tokens, depth).map_err(|e| e.on_empty(ParseError::UnclosedList))?;
            let Some(exp) = maybe_exp else {
                return Ok((list, rest));
            };
            list.push(exp);
            tokens = rest;
        }
    }
}

pub fn parse_tokens(tokens: &[Token]) -> PResult<Expression> {
    let (res, rest) =
        single_expr::parse(tokens, 0).map_err(|e| e.on_empty(ParseError::UnexpectedEOF))?;
    let Some(exp) = res else {
        return Err(ParseError::UnexpectedRParen);
    };
    Ok((exp, rest))
}

/// Parses the first expression of `source`; any tokens after it are ignored.
pub fn parse_expr(source: &str) -> Result<Expression, ParseError> {
    let tokens = lexer::tokenize(source);
    let (exp, rest) = parse_tokens(&tokens)?;
    debug!(%exp, ignored = rest.len(), "parsed expression");
    Ok(exp)
}

/// Parses every top-level expression of `source`.
pub fn parse_script(source: &str) -> Result<Vec<Expression>, ParseError> {
    let tokens = lexer::tokenize(source);
    let mut expressions = vec![];
    let mut unparsed: &[Token] = &tokens;

    while !unparsed.is_empty() {
        let (exp, rest) = parse_tokens(unparsed)?;
        expressions.push(exp);
        unparsed = rest;
    }

    debug!(count = expressions.len(), "parsed script");
    Ok(expressions)
}
