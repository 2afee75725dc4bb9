//! Recursive-descent parser producing a [`Script`].

use serde_json::Number;

use super::ast::{Expr, Literal, Script, Statement};
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::CoreError;

/// Deepest expression nesting accepted before parsing gives up.
pub const MAX_NESTING: usize = 100;

/// Parses snippet source into statements.
///
/// # Errors
/// Returns [`CoreError::Syntax`] with the position of the first offending token.
pub fn parse(source: &str) -> Result<Script, CoreError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    parser.script()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The lexer always terminates the stream with `Eof`.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error_at(token: &Token, reason: impl Into<String>) -> CoreError {
        CoreError::Syntax {
            line: token.line,
            column: token.column,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Token, CoreError> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(Self::error_at(self.peek(), format!("expected {what}")))
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn script(&mut self) -> Result<Script, CoreError> {
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::End => {
                    self.advance();
                }
                _ => statements.push(self.statement()?),
            }
        }
        Ok(Script { statements })
    }

    fn statement(&mut self) -> Result<Statement, CoreError> {
        let start = self.peek().clone();
        let expr = self.expression()?;

        let statement = if self.peek_kind() == &TokenKind::Equals {
            let equals = self.advance();
            let Expr::Name(target) = expr else {
                return Err(Self::error_at(&equals, "cannot assign to expression"));
            };
            let value = self.expression()?;
            Statement { target: Some(target), expr: value, line: start.line }
        } else {
            Statement { target: None, expr, line: start.line }
        };

        match self.peek_kind() {
            TokenKind::End | TokenKind::Eof => Ok(statement),
            _ => Err(Self::error_at(self.peek(), "unexpected token after statement")),
        }
    }

    /// Charge one level against the nesting budget.
    fn nest(&mut self) -> Result<(), CoreError> {
        if self.depth >= MAX_NESTING {
            return Err(Self::error_at(self.peek(), "too many nested expressions"));
        }
        self.depth += 1;
        Ok(())
    }

    fn expression(&mut self) -> Result<Expr, CoreError> {
        let depth = self.depth;
        let expr = self.nest().and_then(|()| self.postfix());
        self.depth = depth;
        expr
    }

    /// A primary followed by `.name`, `(...)` and `[...]` suffixes. Every
    /// suffix wraps the expression one level deeper, so each is charged
    /// against the nesting budget.
    fn postfix(&mut self) -> Result<Expr, CoreError> {
        let mut expr = self.primary()?;
        loop {
            if matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LParen | TokenKind::LBracket) {
                self.nest()?;
            }
            match self.peek_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let token = self.advance();
                    let TokenKind::Name(name) = token.kind else {
                        return Err(Self::error_at(&token, "expected attribute name after '.'"));
                    };
                    expr = Expr::Attribute { base: Box::new(expr), name };
                }
                TokenKind::LParen => {
                    self.advance();
                    let (args, kwargs) = self.arguments()?;
                    expr = Expr::Call { callee: Box::new(expr), args, kwargs };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(&TokenKind::RBracket, "']'")?;
                    expr = Expr::Subscript { base: Box::new(expr), index: Box::new(index) };
                }
                _ => return Ok(expr),
            }
        }
    }

    fn arguments(&mut self) -> Result<(Vec<Expr>, Vec<(String, Expr)>), CoreError> {
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Expr)> = Vec::new();
        while self.peek_kind() != &TokenKind::RParen {
            let is_keyword = matches!(self.peek_kind(), TokenKind::Name(_))
                && self.tokens.get(self.pos + 1).map(|t| &t.kind) == Some(&TokenKind::Equals);

            if is_keyword {
                let token = self.advance();
                let TokenKind::Name(name) = token.kind.clone() else {
                    return Err(Self::error_at(&token, "expected keyword name"));
                };
                if kwargs.iter().any(|(existing, _)| *existing == name) {
                    return Err(Self::error_at(&token, format!("keyword argument repeated: {name}")));
                }
                self.advance();
                kwargs.push((name, self.expression()?));
            } else {
                if !kwargs.is_empty() {
                    return Err(Self::error_at(self.peek(), "positional argument follows keyword argument"));
                }
                args.push(self.expression()?);
            }

            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen, "')'")?;
        Ok((args, kwargs))
    }

    fn primary(&mut self) -> Result<Expr, CoreError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Name(name) => Ok(match name.as_str() {
                "None" => Expr::Literal(Literal::None),
                "True" => Expr::Literal(Literal::Bool(true)),
                "False" => Expr::Literal(Literal::Bool(false)),
                _ => Expr::Name(name),
            }),
            TokenKind::Str(mut text) => {
                // Adjacent literals concatenate.
                while let TokenKind::Str(next) = self.peek_kind() {
                    text.push_str(next);
                    self.advance();
                }
                Ok(Expr::Literal(Literal::Str(text)))
            }
            TokenKind::Int(value) => Ok(Expr::Literal(Literal::Number(value.into()))),
            TokenKind::Float(value) => float_literal(&token, value),
            TokenKind::Minus => match self.advance() {
                Token { kind: TokenKind::Int(value), .. } => {
                    Ok(Expr::Literal(Literal::Number((-value).into())))
                }
                Token { kind: TokenKind::Float(value), .. } => float_literal(&token, -value),
                other => Err(Self::error_at(&other, "expected number after '-'")),
            },
            TokenKind::LParen => {
                let expr = self.expression()?;
                self.expect(&TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while self.peek_kind() != &TokenKind::RBracket {
                    items.push(self.expression()?);
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBracket, "']'")?;
                Ok(Expr::List(items))
            }
            TokenKind::LBrace => {
                let mut entries = Vec::new();
                while self.peek_kind() != &TokenKind::RBrace {
                    let key = self.expression()?;
                    self.expect(&TokenKind::Colon, "':'")?;
                    entries.push((key, self.expression()?));
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RBrace, "'}'")?;
                Ok(Expr::Dict(entries))
            }
            TokenKind::End | TokenKind::Eof => Err(Self::error_at(&token, "unexpected end of statement")),
            _ => Err(Self::error_at(&token, "unexpected token")),
        }
    }
}

fn float_literal(token: &Token, value: f64) -> Result<Expr, CoreError> {
    Number::from_f64(value)
        .map(|n| Expr::Literal(Literal::Number(n)))
        .ok_or_else(|| Parser::error_at(token, "float literal is not finite"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Script {
        match parse(source) {
            Ok(script) => script,
            Err(e) => panic!("parse of {source:?} failed: {e}"),
        }
    }

    #[test]
    fn parses_client_call_assignment() {
        let script = parse_ok("result = resource_client.resource_groups.list()");
        assert_eq!(script.statements.len(), 1);
        let statement = &script.statements[0];
        assert_eq!(statement.target.as_deref(), Some("result"));
        match &statement.expr {
            Expr::Call { callee, args, kwargs } => {
                assert_eq!(callee.dotted_path().as_deref(), Some("resource_client.resource_groups.list"));
                assert!(args.is_empty());
                assert!(kwargs.is_empty());
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn parses_positional_and_keyword_arguments() {
        let script = parse_ok("vm = compute_client.virtual_machines.get('rg', vm_name=\"web-1\",)");
        let Expr::Call { args, kwargs, .. } = &script.statements[0].expr else {
            panic!("expected call");
        };
        assert_eq!(args, &vec![Expr::Literal(Literal::Str("rg".to_owned()))]);
        assert_eq!(kwargs.len(), 1);
        assert_eq!(kwargs[0].0, "vm_name");
    }

    #[test]
    fn parses_multiple_statements_and_literals() {
        let script = parse_ok(
            "params = {'location': 'westeurope', 'tags': {'env': 'dev'}}; n = -3\nflag = True\nnothing = None\nitems = [1, 2.5, 'x']",
        );
        assert_eq!(script.statements.len(), 5);
        assert_eq!(script.statements[1].expr, Expr::Literal(Literal::Number((-3).into())));
        assert_eq!(script.statements[2].expr, Expr::Literal(Literal::Bool(true)));
        assert_eq!(script.statements[3].expr, Expr::Literal(Literal::None));
        assert_eq!(script.statements[4].line, 4);
    }

    #[test]
    fn parses_subscripts_and_chained_attributes() {
        let script = parse_ok("result = groups[0].name");
        let Expr::Attribute { base, name } = &script.statements[0].expr else {
            panic!("expected attribute");
        };
        assert_eq!(name, "name");
        assert!(matches!(**base, Expr::Subscript { .. }));
    }

    #[test]
    fn empty_and_comment_only_sources_have_no_statements() {
        assert!(parse_ok("").statements.is_empty());
        assert!(parse_ok("# nothing to do\n\n").statements.is_empty());
    }

    #[test]
    fn rejects_assignment_to_attribute() {
        let err = parse("a.b = 1").err();
        assert!(
            matches!(err, Some(CoreError::Syntax { ref reason, .. }) if reason.contains("cannot assign")),
            "got {err:?}"
        );
    }

    #[test]
    fn rejects_positional_after_keyword() {
        assert!(parse("f(a=1, 2)").is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse("result = 1 2").err();
        assert!(
            matches!(err, Some(CoreError::Syntax { line: 1, column: 12, .. })),
            "got {err:?}"
        );
    }

    #[test]
    fn syntax_error_display_includes_position() {
        let err = match parse("x = (1") {
            Err(e) => e,
            Ok(script) => panic!("expected error, got {script:?}"),
        };
        assert!(err.to_string().starts_with("invalid syntax (line 1"), "got {err}");
    }

    #[test]
    fn long_suffix_chains_are_a_syntax_error() {
        let chains = [
            format!("result = x{}", ".a".repeat(MAX_NESTING)),
            format!("result = x{}", "()".repeat(200_000)),
            format!("result = x{}", "[0]".repeat(MAX_NESTING)),
        ];
        for source in &chains {
            let err = parse(source).err();
            assert!(
                matches!(&err, Some(CoreError::Syntax { reason, .. }) if reason == "too many nested expressions"),
                "got {err:?}"
            );
        }

        let short = format!("result = x{}", ".a".repeat(MAX_NESTING - 2));
        assert!(parse(&short).is_ok());
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let shallow = format!("x = {}1{}", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
        assert!(parse(&shallow).is_ok());

        let deep = format!("x = {}1{}", "[".repeat(10_000), "]".repeat(10_000));
        let err = parse(&deep).err();
        assert!(
            matches!(&err, Some(CoreError::Syntax { reason, .. }) if reason == "too many nested expressions"),
            "got {err:?}"
        );
    }
}
