#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Token {
    /// (
    LParen,
    /// )
    RParen,
    /// Any other group of characters, classified later by [`crate::parser::atom`]
    Atom(String),
}

impl Token {
    pub fn atom(s: &str) -> Self {
        Self::Atom(s.to_owned())
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        match s {
            "(" => Token::LParen,
            ")" => Token::RParen,
            x => Token::atom(x),
        }
    }
}

/// Splits source text into parentheses and whitespace separated atoms.
///
/// There are no string literals, comments or escapes; empty input yields no tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    source
        .replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(Token::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// macro to setup test boilerplate for lexer::tokenize
    macro_rules! lexer_test {
        ($fn_name:ident, $code:literal, $expected:expr) => {
            #[test]
            fn $fn_name() {
                let tokens = tokenize($code);
                assert_eq!(tokens, $expected);
            }
        };
    }

    lexer_test!(empty, "", vec![]);

    lexer_test!(whitespace_only, " \n\t  ", vec![]);

    lexer_test!(symbol, "test", vec![Token::atom("test")]);

    lexer_test!(integer, "42", vec![Token::atom("42")]);

    lexer_test!(
        empty_nested_lists,
        "(())",
        vec![Token::LParen, Token::LParen, Token::RParen, Token::RParen,]
    );

    lexer_test!(
        glued_parens,
        "(car(list 1))",
        vec![
            Token::LParen,
            Token::atom("car"),
            Token::LParen,
            Token::atom("list"),
            Token::atom("1"),
            Token::RParen,
            Token::RParen,
        ]
    );

    lexer_test!(
        multiplication,
        "(* (+ 1 2) (- 5 3))",
        vec![
            Token::LParen,
            Token::atom("*"),
            Token::LParen,
            Token::atom("+"),
            Token::atom("1"),
            Token::atom("2"),
            Token::RParen,
            Token::LParen,
            Token::atom("-"),
            Token::atom("5"),
            Token::atom("3"),
            Token::RParen,
            Token::RParen,
        ]
    );

    lexer_test!(
        factorial,
        "(define fact (lambda (n)
    (if (= n 0 )
        1
        (* n (fact (- n 1))))))",
        vec![
            Token::LParen,
            Token::atom("define"),
            Token::atom("fact"),
            Token::LParen,
            Token::atom("lambda"),
            Token::LParen,
            Token::atom("n"),
            Token::RParen,
            Token::LParen,
            Token::atom("if"),
            Token::LParen,
            Token::atom("="),
            Token::atom("n"),
            Token::atom("0"),
            Token::RParen,
            Token::atom("1"),
            Token::LParen,
            Token::atom("*"),
            Token::atom("n"),
            Token::LParen,
            Token::atom("fact"),
            Token::LParen,
            Token::atom("-"),
            Token::atom("n"),
            Token::atom("1"),
            Token::RParen,
            Token::RParen,
            Token::RParen,
            Token::RParen,
            Token::RParen,
            Token::RParen,
        ]
    );
}
