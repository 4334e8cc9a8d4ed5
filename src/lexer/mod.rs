mod token;

pub use token::{Token, TokenKind};

use crate::error::{EvalError, EvalResult};
use log::{debug, trace};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression.pest"] // Link to the grammar file
struct TokenGrammar;

const FRAGMENT_LEN: usize = 16;

/// Splits `input` into tokens, dropping whitespace.
///
/// At every offset the rules of the grammar are tried in declaration order
/// and the first one that matches is taken. Empty input yields no tokens.
pub fn tokenize(input: &str) -> EvalResult<Vec<Token>> {
    debug!("Tokenizing expression: {}", input);
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < input.len() {
        let rest = &input[offset..];
        let pair = TokenGrammar::parse(Rule::token, rest)
            .ok()
            .and_then(|mut pairs| pairs.next())
            .and_then(|token| token.into_inner().next())
            .ok_or_else(|| lexical_error(offset, rest))?;

        let lexeme = pair.as_str();
        if lexeme.is_empty() {
            return Err(lexical_error(offset, rest));
        }
        offset += lexeme.len();

        let kind = match pair.as_rule() {
            Rule::whitespace => continue,
            Rule::float => TokenKind::Float,
            Rule::integer => TokenKind::Integer,
            Rule::boolean => TokenKind::Boolean,
            Rule::string => TokenKind::String,
            Rule::operator => TokenKind::Operator,
            Rule::l_paren => TokenKind::LParen,
            Rule::r_paren => TokenKind::RParen,
            Rule::l_bracket => TokenKind::LBracket,
            Rule::r_bracket => TokenKind::RBracket,
            Rule::l_brace => TokenKind::LBrace,
            Rule::r_brace => TokenKind::RBrace,
            Rule::comma => TokenKind::Comma,
            Rule::colon => TokenKind::Colon,
            Rule::ident => TokenKind::Ident,
            _ => return Err(lexical_error(offset - lexeme.len(), rest)),
        };
        trace!("token {:?} {:?}", kind, lexeme);
        tokens.push(Token::new(kind, lexeme));
    }

    debug!("Tokenized into {} tokens", tokens.len());
    Ok(tokens)
}

fn lexical_error(offset: usize, rest: &str) -> EvalError {
    EvalError::Lexical {
        offset,
        fragment: rest.chars().take(FRAGMENT_LEN).collect(),
    }
}
