use crate::ast::{ASTNode, LiteralKind, Operator};
use crate::error::{EvalError, EvalResult};
use crate::lexer::{tokenize, Token, TokenKind};
use log::{debug, trace};

type Tier<'a> = fn(&mut ExpressionParser<'a>) -> EvalResult<ASTNode>;

/// Deepest nesting accepted by the parser. Groups, array and object
/// literals, calls, `!` and every chained binary operator each count as one
/// level, so this also bounds the depth of the resulting tree.
pub const MAX_DEPTH: usize = 64;

/// Recursive-descent parser over a token slice.
///
/// ```text
/// or      = and ( "||" and )*
/// and     = compare ( "&&" compare )*
/// compare = add ( ("===" | "!==" | "==" | "!=") add )*
/// add     = mul ( ("+" | "-" | ".") mul )*
/// mul     = not ( ("*" | "/" | "%") not )*
/// not     = "!" not | value
/// value   = INTEGER | FLOAT | STRING | BOOLEAN | array | object | "(" or ")" | call
/// ```
///
/// Every operator is turned into a [`ASTNode::FunctionCall`] on its reserved
/// identifier, so operators and functions resolve the same way.
pub struct ExpressionParser<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
}

impl<'a> ExpressionParser<'a> {
    pub fn parse_expression(input: &str) -> EvalResult<ASTNode> {
        debug!("Parsing expression: {}", input);
        let tokens = tokenize(input)?;
        ExpressionParser::parse_tokens(&tokens)
    }

    /// Parses a complete expression. Fails on an empty token stream and on
    /// tokens left over after the top-level expression.
    pub fn parse_tokens(tokens: &'a [Token]) -> EvalResult<ASTNode> {
        if tokens.is_empty() {
            return Err(EvalError::syntax(0, "empty expression"));
        }

        let mut parser = ExpressionParser {
            tokens,
            position: 0,
            depth: 0,
        };
        let root = parser.build_or_expression()?;

        if let Some(token) = parser.peek() {
            return Err(EvalError::syntax(
                parser.position,
                format!("unexpected trailing token {}", token),
            ));
        }

        debug!("Parse result: {} nodes", root.node_count());
        trace!("{:#?}", root);
        Ok(root)
    }

    fn build_or_expression(&mut self) -> EvalResult<ASTNode> {
        self.build_binary(&["||"], Self::build_and_expression)
    }

    fn build_and_expression(&mut self) -> EvalResult<ASTNode> {
        self.build_binary(&["&&"], Self::build_comparison_expression)
    }

    fn build_comparison_expression(&mut self) -> EvalResult<ASTNode> {
        self.build_binary(
            &["===", "!==", "==", "!="],
            Self::build_arithmetic_expression,
        )
    }

    fn build_arithmetic_expression(&mut self) -> EvalResult<ASTNode> {
        self.build_binary(&["+", "-", "."], Self::build_term)
    }

    fn build_term(&mut self) -> EvalResult<ASTNode> {
        self.build_binary(&["*", "/", "%"], Self::build_not_expression)
    }

    /// Left-associative tier: `operand (op operand)*`.
    fn build_binary(&mut self, symbols: &[&str], operand: Tier<'a>) -> EvalResult<ASTNode> {
        let mut node = operand(self)?;
        let depth = self.depth;

        while let Some(operator) = self.next_operator(symbols) {
            trace!("Binary operator {:?} at token {}", operator, self.position - 1);
            self.descend()?;
            let right = operand(self)?;
            node = ASTNode::call(operator.function_name(), vec![node, right]);
        }

        self.depth = depth;
        Ok(node)
    }

    fn build_not_expression(&mut self) -> EvalResult<ASTNode> {
        if self.next_operator(&["!"]).is_some() {
            self.descend()?;
            let inner = self.build_not_expression()?;
            self.depth -= 1;
            return Ok(ASTNode::call(Operator::Not.function_name(), vec![inner]));
        }
        self.build_value()
    }

    fn build_value(&mut self) -> EvalResult<ASTNode> {
        let token = self
            .peek()
            .ok_or_else(|| EvalError::syntax(self.position, "unexpected end of expression"))?;

        let literal = match token.kind {
            TokenKind::Integer => Some(LiteralKind::Integer),
            TokenKind::Float => Some(LiteralKind::Float),
            TokenKind::String => Some(LiteralKind::String),
            TokenKind::Boolean => Some(LiteralKind::Boolean),
            _ => None,
        };
        if let Some(kind) = literal {
            let node = ASTNode::literal(kind, token.lexeme.as_str());
            self.position += 1;
            return Ok(node);
        }

        self.descend()?;
        let node = match token.kind {
            TokenKind::LBracket => self.build_array(),
            TokenKind::LBrace => self.build_object(),
            TokenKind::LParen => {
                self.position += 1;
                let inner = self.build_or_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Ident => self.build_function_call(),
            _ => Err(EvalError::syntax(
                self.position,
                format!("unexpected token {}", token),
            )),
        }?;
        self.depth -= 1;
        Ok(node)
    }

    fn descend(&mut self) -> EvalResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::syntax(
                self.position,
                format!("expression nested deeper than {} levels", MAX_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn build_array(&mut self) -> EvalResult<ASTNode> {
        self.expect(TokenKind::LBracket, "'['")?;
        let items = self.build_list(TokenKind::RBracket, "']'")?;
        Ok(ASTNode::Array(items))
    }

    fn build_object(&mut self) -> EvalResult<ASTNode> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut entries = Vec::new();

        if self.consume(TokenKind::RBrace) {
            return Ok(ASTNode::Object(entries));
        }

        loop {
            let key = self.expect(TokenKind::String, "string object key")?;
            let key = ASTNode::literal(LiteralKind::String, key.lexeme.as_str());
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.build_or_expression()?;
            entries.push((key, value));

            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(ASTNode::Object(entries))
    }

    fn build_function_call(&mut self) -> EvalResult<ASTNode> {
        let name = self.expect(TokenKind::Ident, "function name")?.lexeme.clone();
        self.expect(TokenKind::LParen, "'('")?;
        let args = self.build_list(TokenKind::RParen, "')'")?;
        trace!("Function call {}({} args)", name, args.len());
        Ok(ASTNode::call(name, args))
    }

    /// Comma-separated expressions up to and including `close`.
    fn build_list(&mut self, close: TokenKind, what: &str) -> EvalResult<Vec<ASTNode>> {
        let mut items = Vec::new();

        if self.consume(close) {
            return Ok(items);
        }

        loop {
            items.push(self.build_or_expression()?);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        self.expect(close, what)?;
        Ok(items)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(token) if token.is(kind) => {
                self.position += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> EvalResult<&'a Token> {
        match self.peek() {
            Some(token) if token.is(kind) => {
                self.position += 1;
                Ok(token)
            }
            Some(token) => Err(EvalError::syntax(
                self.position,
                format!("expected {}, found {}", what, token),
            )),
            None => Err(EvalError::syntax(
                self.position,
                format!("expected {}, found end of expression", what),
            )),
        }
    }

    fn next_operator(&mut self, symbols: &[&str]) -> Option<Operator> {
        let token = self.peek()?;
        if !symbols.iter().any(|symbol| token.is_operator(symbol)) {
            return None;
        }
        let operator = Operator::try_from(token.lexeme.as_str()).ok()?;
        self.position += 1;
        Some(operator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(text: &str) -> ASTNode {
        ASTNode::literal(LiteralKind::Integer, text)
    }

    fn parse(input: &str) -> EvalResult<ASTNode> {
        ExpressionParser::parse_expression(input)
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("1").unwrap(), int("1"));
        assert_eq!(
            parse("1.5").unwrap(),
            ASTNode::literal(LiteralKind::Float, "1.5")
        );
        assert_eq!(
            parse("'a'").unwrap(),
            ASTNode::literal(LiteralKind::String, "'a'")
        );
        assert_eq!(
            parse("FALSE").unwrap(),
            ASTNode::literal(LiteralKind::Boolean, "FALSE")
        );
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 - 4 => (1 + (2 * 3)) - 4
        let expected = ASTNode::call(
            "__sub",
            vec![
                ASTNode::call(
                    "__add",
                    vec![int("1"), ASTNode::call("__mul", vec![int("2"), int("3")])],
                ),
                int("4"),
            ],
        );
        assert_eq!(parse("1 + 2 * 3 - 4").unwrap(), expected);
    }

    #[test]
    fn test_grouping_overrides_precedence() {
        let expected = ASTNode::call(
            "__mul",
            vec![
                ASTNode::call("__add", vec![int("1"), int("2")]),
                int("3"),
            ],
        );
        assert_eq!(parse("(1 + 2) * 3").unwrap(), expected);
    }

    #[test]
    fn test_comparisons_chain_left() {
        let expected = ASTNode::call(
            "__equal",
            vec![
                ASTNode::call("__equal", vec![int("1"), int("2")]),
                int("3"),
            ],
        );
        assert_eq!(parse("1 == 2 == 3").unwrap(), expected);
    }

    #[test]
    fn test_logical_tiers() {
        // a || b && c => a || (b && c)
        let expected = ASTNode::call(
            "__or",
            vec![
                int("1"),
                ASTNode::call("__and", vec![int("2"), int("3")]),
            ],
        );
        assert_eq!(parse("1 || 2 && 3").unwrap(), expected);

        let strict = parse("1 === 2 !== 3").unwrap();
        match strict {
            ASTNode::FunctionCall { name, args } => {
                assert_eq!(name, "__not_equal_strict");
                assert!(matches!(&args[0], ASTNode::FunctionCall { name, .. } if name == "__equal_strict"));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_not_nests() {
        let expected = ASTNode::call(
            "__not",
            vec![ASTNode::call("__not", vec![int("1")])],
        );
        assert_eq!(parse("!!1").unwrap(), expected);

        // `!` binds tighter than `*`.
        let expected = ASTNode::call(
            "__mul",
            vec![ASTNode::call("__not", vec![int("1")]), int("2")],
        );
        assert_eq!(parse("!1 * 2").unwrap(), expected);
    }

    #[test]
    fn test_concat_is_additive() {
        let expected = ASTNode::call(
            "__concat",
            vec![
                ASTNode::literal(LiteralKind::String, "'a'"),
                ASTNode::call("__mul", vec![int("1"), int("2")]),
            ],
        );
        assert_eq!(parse("'a' . 1 * 2").unwrap(), expected);
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(parse("hoge()").unwrap(), ASTNode::call("hoge", vec![]));
        assert_eq!(
            parse("hoge(1, fuga(2))").unwrap(),
            ASTNode::call("hoge", vec![int("1"), ASTNode::call("fuga", vec![int("2")])])
        );
    }

    #[test]
    fn test_array_and_object() {
        assert_eq!(parse("[]").unwrap(), ASTNode::Array(vec![]));
        assert_eq!(
            parse("[1, 2]").unwrap(),
            ASTNode::Array(vec![int("1"), int("2")])
        );
        assert_eq!(parse("{}").unwrap(), ASTNode::Object(vec![]));
        assert_eq!(
            parse("{'a': 1, \"a\": 2}").unwrap(),
            ASTNode::Object(vec![
                (ASTNode::literal(LiteralKind::String, "'a'"), int("1")),
                (ASTNode::literal(LiteralKind::String, "\"a\""), int("2")),
            ])
        );
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "",
            "1 + ",
            "(",
            "(( 1 )",
            "(( 1 )))",
            "hoge(1",
            "hoge(1,)",
            "[1, 2",
            "{1: 2}",
            "{'a' 2}",
            "{'a': 1,}",
            "1 2",
            "-1",
            "foo",
        ] {
            assert!(
                matches!(parse(input), Err(EvalError::Syntax { .. })),
                "expected syntax error for {input:?}"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(parse(&nested(MAX_DEPTH - 1)).unwrap(), int("1"));

        for input in [
            nested(MAX_DEPTH + 1),
            nested(10_000),
            format!("{}1", "!".repeat(10_000)),
            format!("{}1{}", "f(".repeat(10_000), ")".repeat(10_000)),
            format!("{}{}", "[".repeat(10_000), "]".repeat(10_000)),
            format!("1{}", " + 1".repeat(10_000)),
        ] {
            assert!(
                matches!(parse(&input), Err(EvalError::Syntax { .. })),
                "expected nesting error for input of {} bytes",
                input.len()
            );
        }
    }

    #[test]
    fn test_long_operator_chain_within_limit() {
        let input = format!("1{}", " + 1".repeat(MAX_DEPTH - 1));
        let ast = parse(&input).unwrap();
        assert_eq!(ast.node_count(), 2 * MAX_DEPTH - 1);
    }

    #[test]
    fn test_trailing_token_position() {
        match parse("(( 1 )))") {
            Err(EvalError::Syntax { position, .. }) => assert_eq!(position, 5),
            other => panic!("unexpected result {other:?}"),
        }
    }
}
