//! EFX expression recursive descent parser

use crate::common::{Span, TranslateError, TranslateResult};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Binding power of the postfix predicates (`is present`, `in`, `like`)
const PREDICATE_PRECEDENCE: u8 = 3;

/// Expression parser
pub struct ExprParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> ExprParser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
        }
    }

    /// Parser whose spans are shifted by `offset` into the enclosing source
    pub fn with_offset(source: &'a str, offset: usize) -> Self {
        Self {
            lexer: Lexer::with_offset(source, offset),
        }
    }

    /// Parse a complete expression; trailing tokens are an error
    pub fn parse(&mut self) -> TranslateResult<Expr> {
        let expr = self.parse_expr()?;
        let token = self.lexer.next_token()?;
        if !matches!(token.kind, TokenKind::Eof) {
            return Err(TranslateError::syntax(
                format!("unexpected {} after expression", token.kind),
                token.span,
            ));
        }
        Ok(expr)
    }

    /// Parse the inside of a context declaration:
    /// `[/][ctx::]id[pred] (, hint:$name = expr)*`
    pub fn parse_context_decl(&mut self) -> TranslateResult<ContextDecl> {
        let start = self.lexer.peek()?.span;
        let absolute = self.match_token(&TokenKind::Slash)?;
        let reference = self.parse_reference(absolute, start)?;

        let mut variables = Vec::new();
        while self.match_token(&TokenKind::Comma)? {
            let (hint, decl_start) = self.expect_identifier()?;
            self.expect(TokenKind::Colon)?;
            let name = self.expect_variable()?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            let span = decl_start.merge(value.span);
            variables.push(VariableDecl {
                hint,
                name,
                value,
                span,
            });
        }

        let token = self.lexer.next_token()?;
        if !matches!(token.kind, TokenKind::Eof) {
            return Err(TranslateError::syntax(
                format!("unexpected {} in context declaration", token.kind),
                token.span,
            ));
        }
        let end = variables.last().map_or(reference.span, |v| v.span);
        let span = reference.span.merge(end);
        Ok(ContextDecl {
            reference,
            variables,
            span,
        })
    }

    // ==================== Expressions ====================

    fn parse_expr(&mut self) -> TranslateResult<Expr> {
        match self.lexer.peek()?.kind {
            TokenKind::If => self.parse_conditional(),
            TokenKind::For => self.parse_iteration(IterationKind::For),
            TokenKind::Some => self.parse_iteration(IterationKind::Some),
            TokenKind::Every => self.parse_iteration(IterationKind::Every),
            _ => self.parse_expr_with_precedence(0),
        }
    }

    fn parse_conditional(&mut self) -> TranslateResult<Expr> {
        let start = self.expect(TokenKind::If)?.span;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let else_branch = self.parse_expr()?;
        let span = start.merge(else_branch.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    fn parse_iteration(&mut self, kind: IterationKind) -> TranslateResult<Expr> {
        let start = self.lexer.next_token()?.span;
        let mut iterators = vec![self.parse_iterator()?];
        while self.match_token(&TokenKind::Comma)? {
            iterators.push(self.parse_iterator()?);
        }

        let body_keyword = match kind {
            IterationKind::For => TokenKind::Return,
            IterationKind::Some | IterationKind::Every => TokenKind::Satisfies,
        };
        self.expect(body_keyword)?;
        let body = self.parse_expr()?;
        let span = start.merge(body.span);
        Ok(Expr::new(
            ExprKind::Iteration {
                kind,
                iterators,
                body: Box::new(body),
            },
            span,
        ))
    }

    /// `text:$x in <source>`
    fn parse_iterator(&mut self) -> TranslateResult<IteratorDecl> {
        let (hint, start) = self.expect_identifier()?;
        self.expect(TokenKind::Colon)?;
        let name = self.expect_variable()?;
        self.expect(TokenKind::In)?;
        let source = self.parse_expr_with_precedence(0)?;
        let span = start.merge(source.span);
        Ok(IteratorDecl {
            hint,
            name,
            source,
            span,
        })
    }

    fn parse_expr_with_precedence(&mut self, min_prec: u8) -> TranslateResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        loop {
            if min_prec <= PREDICATE_PRECEDENCE {
                if let Some(expr) = self.parse_predicate_suffix(&left)? {
                    left = expr;
                    continue;
                }
            }

            let Some(op) = self.peek_binary_op()? else {
                break;
            };
            let prec = precedence(op);
            if prec < min_prec {
                break;
            }

            self.lexer.next_token()?;
            let right = self.parse_expr_with_precedence(prec + 1)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn peek_binary_op(&mut self) -> TranslateResult<Option<BinOp>> {
        Ok(match &self.lexer.peek()?.kind {
            TokenKind::Or => Some(BinOp::Or),
            TokenKind::And => Some(BinOp::And),
            TokenKind::EqEq | TokenKind::Eq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::NotEq),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::LtEq => Some(BinOp::LtEq),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::GtEq => Some(BinOp::GtEq),
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            TokenKind::Percent => Some(BinOp::Mod),
            _ => None,
        })
    }

    /// `is [not] present|empty`, `[not] in (...)`, `[not] like '...'`
    fn parse_predicate_suffix(&mut self, operand: &Expr) -> TranslateResult<Option<Expr>> {
        let next = self.lexer.peek()?.kind.clone();
        match next {
            TokenKind::Is => {
                self.lexer.next_token()?;
                let negated = self.match_token(&TokenKind::Not)?;
                let token = self.lexer.next_token()?;
                let span = operand.span.merge(token.span);
                let operand = Box::new(operand.clone());
                let kind = match token.kind {
                    TokenKind::Present => ExprKind::Presence { operand, negated },
                    TokenKind::Empty => ExprKind::Emptiness { operand, negated },
                    other => {
                        return Err(TranslateError::syntax(
                            format!("expected 'present' or 'empty', found {}", other),
                            token.span,
                        ));
                    }
                };
                Ok(Some(Expr::new(kind, span)))
            }
            TokenKind::In | TokenKind::Like => self.parse_membership_or_like(operand, false),
            TokenKind::Not => {
                let follows = self.lexer.check_lookahead(&TokenKind::In)?
                    || self.lexer.check_lookahead(&TokenKind::Like)?;
                if !follows {
                    return Ok(None);
                }
                self.lexer.next_token()?;
                self.parse_membership_or_like(operand, true)
            }
            _ => Ok(None),
        }
    }

    fn parse_membership_or_like(
        &mut self,
        operand: &Expr,
        negated: bool,
    ) -> TranslateResult<Option<Expr>> {
        let keyword = self.lexer.next_token()?;
        if matches!(keyword.kind, TokenKind::Like) {
            let token = self.lexer.next_token()?;
            let TokenKind::StringLiteral(pattern) = token.kind else {
                return Err(TranslateError::syntax(
                    format!("expected a pattern string after 'like', found {}", token.kind),
                    token.span,
                ));
            };
            let span = operand.span.merge(token.span);
            return Ok(Some(Expr::new(
                ExprKind::Like {
                    operand: Box::new(operand.clone()),
                    pattern,
                    negated,
                },
                span,
            )));
        }

        self.expect(TokenKind::LParen)?;
        let list = if matches!(self.lexer.peek()?.kind, TokenKind::Identifier(_))
            && self.lexer.check_lookahead(&TokenKind::RParen)?
        {
            let (id, span) = self.expect_identifier()?;
            ListSource::Codelist { id, span }
        } else {
            let mut values = vec![self.parse_expr()?];
            while self.match_token(&TokenKind::Comma)? {
                values.push(self.parse_expr()?);
            }
            ListSource::Values(values)
        };
        let end = self.expect(TokenKind::RParen)?.span;
        Ok(Some(Expr::new(
            ExprKind::Membership {
                operand: Box::new(operand.clone()),
                list,
                negated,
            },
            operand.span.merge(end),
        )))
    }

    fn parse_unary_expr(&mut self) -> TranslateResult<Expr> {
        if self.check(&TokenKind::Minus)? {
            let start = self.lexer.next_token()?.span;
            let operand = self.parse_unary_expr()?;
            let span = start.merge(operand.span);
            return Ok(Expr::new(ExprKind::Negate(Box::new(operand)), span));
        }
        self.parse_primary_expr()
    }

    fn parse_primary_expr(&mut self) -> TranslateResult<Expr> {
        let token = self.lexer.peek()?.clone();
        match token.kind {
            TokenKind::StringLiteral(value) => self.literal(Literal::String(value)),
            TokenKind::NumberLiteral(value) => self.literal(Literal::Number(value)),
            TokenKind::DateLiteral(value) => self.literal(Literal::Date(value)),
            TokenKind::TimeLiteral(value) => self.literal(Literal::Time(value)),
            TokenKind::DurationLiteral(value) => self.literal(Literal::Duration(value)),
            TokenKind::True => self.literal(Literal::Boolean(true)),
            TokenKind::False => self.literal(Literal::Boolean(false)),

            TokenKind::Variable(name) => {
                self.lexer.next_token()?;
                Ok(Expr::new(ExprKind::Variable(name), token.span))
            }

            TokenKind::LParen => self.parse_parenthesized(),

            TokenKind::Not => {
                self.lexer.next_token()?;
                self.expect(TokenKind::LParen)?;
                let operand = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(Expr::new(
                    ExprKind::Not(Box::new(operand)),
                    token.span.merge(end),
                ))
            }

            TokenKind::Identifier(name) => {
                self.lexer.next_token()?;
                self.parse_call(name, token.span)
            }

            TokenKind::Slash => {
                self.lexer.next_token()?;
                self.parse_reference(true, token.span)
            }
            TokenKind::FieldId(_) | TokenKind::NodeId(_) => {
                self.parse_reference(false, token.span)
            }

            TokenKind::BtId(id) => Err(TranslateError::syntax(
                format!("'{}' names a business term, not a field", id),
                token.span,
            )),

            other => Err(TranslateError::syntax(
                format!("expected expression, found {}", other),
                token.span,
            )),
        }
    }

    fn literal(&mut self, literal: Literal) -> TranslateResult<Expr> {
        let token = self.lexer.next_token()?;
        Ok(Expr::new(ExprKind::Literal(literal), token.span))
    }

    /// `(e)` or a sequence `(a, b, ...)`; `()` is the empty sequence
    fn parse_parenthesized(&mut self) -> TranslateResult<Expr> {
        let start = self.expect(TokenKind::LParen)?.span;
        if self.check(&TokenKind::RParen)? {
            let end = self.lexer.next_token()?.span;
            return Ok(Expr::new(ExprKind::Sequence(Vec::new()), start.merge(end)));
        }

        let first = self.parse_expr()?;
        if self.check(&TokenKind::RParen)? {
            let end = self.lexer.next_token()?.span;
            return Ok(Expr::new(ExprKind::Paren(Box::new(first)), start.merge(end)));
        }

        let mut items = vec![first];
        while self.match_token(&TokenKind::Comma)? {
            items.push(self.parse_expr()?);
        }
        let end = self.expect(TokenKind::RParen)?.span;
        Ok(Expr::new(ExprKind::Sequence(items), start.merge(end)))
    }

    fn parse_call(&mut self, name: String, start: Span) -> TranslateResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen)? {
            args.push(self.parse_expr()?);
            while self.match_token(&TokenKind::Comma)? {
                args.push(self.parse_expr()?);
            }
        }
        let end = self.expect(TokenKind::RParen)?.span;
        Ok(Expr::new(ExprKind::Call { name, args }, start.merge(end)))
    }

    fn parse_reference(&mut self, absolute: bool, start: Span) -> TranslateResult<Expr> {
        let first = self.expect_asset()?;
        let (context, target) = if self.match_token(&TokenKind::ColonColon)? {
            if absolute {
                return Err(TranslateError::syntax(
                    "an absolute reference cannot have a context override",
                    first.span,
                ));
            }
            (Some(first), self.expect_asset()?)
        } else {
            (None, first)
        };

        let mut end = target.span;
        let predicate = if self.match_token(&TokenKind::LBracket)? {
            let predicate = self.parse_expr()?;
            end = self.expect(TokenKind::RBracket)?.span;
            Some(Box::new(predicate))
        } else {
            None
        };

        let span = start.merge(end);
        Ok(Expr::new(
            ExprKind::Reference(Reference {
                target,
                absolute,
                context,
                predicate,
                span,
            }),
            span,
        ))
    }

    // ==================== Helpers ====================

    fn check(&mut self, expected: &TokenKind) -> TranslateResult<bool> {
        self.lexer.check(expected)
    }

    fn match_token(&mut self, expected: &TokenKind) -> TranslateResult<bool> {
        self.lexer.match_token(expected)
    }

    fn expect(&mut self, expected: TokenKind) -> TranslateResult<Token> {
        self.lexer.expect(expected)
    }

    fn expect_identifier(&mut self) -> TranslateResult<(String, Span)> {
        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(TranslateError::syntax(
                format!("expected identifier, found {}", other),
                token.span,
            )),
        }
    }

    fn expect_variable(&mut self) -> TranslateResult<String> {
        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::Variable(name) => Ok(name),
            other => Err(TranslateError::syntax(
                format!("expected variable, found {}", other),
                token.span,
            )),
        }
    }

    fn expect_asset(&mut self) -> TranslateResult<AssetRef> {
        let token = self.lexer.next_token()?;
        match token.kind {
            TokenKind::FieldId(id) => Ok(AssetRef::field(id, token.span)),
            TokenKind::NodeId(id) => Ok(AssetRef::node(id, token.span)),
            other => Err(TranslateError::syntax(
                format!("expected field or node identifier, found {}", other),
                token.span,
            )),
        }
    }
}

fn precedence(op: BinOp) -> u8 {
    match op {
        BinOp::Or => 1,
        BinOp::And => 2,
        BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
            PREDICATE_PRECEDENCE
        }
        BinOp::Add | BinOp::Sub => 4,
        BinOp::Mul | BinOp::Div | BinOp::Mod => 5,
    }
}

/// Parse a standalone expression
pub fn parse_expression(source: &str) -> TranslateResult<Expr> {
    ExprParser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Expr {
        parse_expression(source).unwrap()
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3 == 7 and TRUE");
        let ExprKind::Binary { op: BinOp::And, left, .. } = expr.kind else {
            panic!("expected and at the top");
        };
        let ExprKind::Binary { op: BinOp::Eq, left, .. } = left.kind else {
            panic!("expected comparison");
        };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_reference_forms() {
        let expr = parse("ND-Root::BT-00-Code[BT-00-Indicator == TRUE]");
        let ExprKind::Reference(reference) = expr.kind else {
            panic!("expected reference");
        };
        assert!(!reference.absolute);
        assert_eq!(reference.context.as_ref().map(|c| c.id.as_str()), Some("ND-Root"));
        assert_eq!(reference.target.id, "BT-00-Code");
        assert_eq!(reference.target.kind, AssetKind::Field);
        assert!(reference.predicate.is_some());

        let expr = parse("/BT-00-Code");
        assert!(matches!(expr.kind, ExprKind::Reference(Reference { absolute: true, .. })));
    }

    #[test]
    fn test_presence_and_membership() {
        let expr = parse("BT-00-Text is not present and BT-00-Code not in (accessibility)");
        let ExprKind::Binary { left, right, .. } = expr.kind else {
            panic!("expected and");
        };
        assert!(matches!(left.kind, ExprKind::Presence { negated: true, .. }));
        assert!(matches!(
            right.kind,
            ExprKind::Membership { negated: true, list: ListSource::Codelist { ref id, .. }, .. }
                if id == "accessibility"
        ));
    }

    #[test]
    fn test_membership_values() {
        let expr = parse("BT-00-Text in ('a', 'b')");
        assert!(matches!(
            expr.kind,
            ExprKind::Membership { negated: false, list: ListSource::Values(ref values), .. }
                if values.len() == 2
        ));
    }

    #[test]
    fn test_like() {
        let expr = parse("BT-00-Text like '[0-9]+'");
        assert!(matches!(
            expr.kind,
            ExprKind::Like { ref pattern, negated: false, .. } if pattern == "[0-9]+"
        ));
    }

    #[test]
    fn test_iteration() {
        let expr = parse("for text:$x in BT-00-Text, number:$y in BT-00-Number return $x");
        let ExprKind::Iteration { kind, iterators, body } = expr.kind else {
            panic!("expected iteration");
        };
        assert_eq!(kind, IterationKind::For);
        assert_eq!(iterators.len(), 2);
        assert_eq!(iterators[0].hint, "text");
        assert_eq!(iterators[1].name, "y");
        assert!(matches!(body.kind, ExprKind::Variable(ref name) if name == "x"));
    }

    #[test]
    fn test_quantifier_and_conditional() {
        let expr = parse("every number:$n in BT-00-Number satisfies $n > 0");
        assert!(matches!(expr.kind, ExprKind::Iteration { kind: IterationKind::Every, .. }));

        let expr = parse("if BT-00-Indicator then 'yes' else 'no'");
        assert!(matches!(expr.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn test_not_and_parens() {
        let expr = parse("not(1 == 2) and (2 == 2)");
        let ExprKind::Binary { left, right, .. } = expr.kind else {
            panic!("expected and");
        };
        assert!(matches!(left.kind, ExprKind::Not(_)));
        assert!(matches!(right.kind, ExprKind::Paren(_)));
    }

    #[test]
    fn test_call_and_sequence() {
        let expr = parse("count(('a', 'b'))");
        let ExprKind::Call { name, args } = expr.kind else {
            panic!("expected call");
        };
        assert_eq!(name, "count");
        assert!(matches!(args[0].kind, ExprKind::Sequence(ref items) if items.len() == 2));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(parse_expression("1 2"), Err(TranslateError::Syntax { .. })));
        assert!(matches!(parse_expression("BT-01"), Err(TranslateError::Syntax { .. })));
    }

    #[test]
    fn test_context_decl() {
        let decl = ExprParser::with_offset("ND-Root", 1).parse_context_decl().unwrap();
        assert_eq!(decl.reference.span, Span::new(1, 8));
        assert!(decl.variables.is_empty());
        assert!(ExprParser::new("BT-00-Text + 1").parse_context_decl().is_err());
    }

    #[test]
    fn test_context_decl_with_variables() {
        let decl = ExprParser::new("BT-00-Text, text:$x = 'a', number:$y = 1 + 2")
            .parse_context_decl()
            .unwrap();
        assert_eq!(decl.variables.len(), 2);
        assert_eq!(decl.variables[0].name, "x");
        assert_eq!(decl.variables[1].hint, "number");
        assert!(matches!(decl.variables[1].value.kind, ExprKind::Binary { op: BinOp::Add, .. }));
    }
}
