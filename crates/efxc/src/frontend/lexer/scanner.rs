//! Expression lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{Span, TranslateError, TranslateResult};
use logos::Logos;

/// Lexer for EFX expressions
///
/// Expressions are usually cut out of a template line, so every span is
/// shifted by `offset` to point back into the full template source.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    offset: usize,
    /// Buffer for peeked tokens
    peeked: Vec<Token>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_offset(source, 0)
    }

    pub fn with_offset(source: &'a str, offset: usize) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            offset,
            peeked: Vec::new(),
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> TranslateResult<Token> {
        if !self.peeked.is_empty() {
            return Ok(self.peeked.remove(0));
        }
        self.scan_token()
    }

    fn scan_token(&mut self) -> TranslateResult<Token> {
        if self.at_eof {
            return Ok(Token::new(TokenKind::Eof, self.eof_span()));
        }

        match self.inner.next() {
            Some(Ok(kind)) => Ok(Token::new(kind, self.current_span())),
            Some(Err(())) => Err(TranslateError::syntax(
                format!("unexpected character '{}'", self.inner.slice()),
                self.current_span(),
            )),
            None => {
                self.at_eof = true;
                Ok(Token::new(TokenKind::Eof, self.eof_span()))
            }
        }
    }

    fn current_span(&self) -> Span {
        let span = self.inner.span();
        Span::new(span.start + self.offset, span.end + self.offset)
    }

    fn eof_span(&self) -> Span {
        let end = self.inner.source().len() + self.offset;
        Span::new(end, end)
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> TranslateResult<&Token> {
        self.peek_at(0)
    }

    /// Peek at the token at offset (0 = next, 1 = after next, etc.)
    pub fn peek_at(&mut self, offset: usize) -> TranslateResult<&Token> {
        while self.peeked.len() <= offset {
            let token = self.scan_token()?;
            self.peeked.push(token);
        }
        Ok(&self.peeked[offset])
    }

    /// Check if the next token matches the expected kind
    pub fn check(&mut self, expected: &TokenKind) -> TranslateResult<bool> {
        Ok(std::mem::discriminant(&self.peek()?.kind) == std::mem::discriminant(expected))
    }

    /// Check the token after the next one (2-token lookahead)
    pub fn check_lookahead(&mut self, expected: &TokenKind) -> TranslateResult<bool> {
        let token = self.peek_at(1)?;
        Ok(std::mem::discriminant(&token.kind) == std::mem::discriminant(expected))
    }

    /// Consume the next token if it matches, return true if consumed
    pub fn match_token(&mut self, expected: &TokenKind) -> TranslateResult<bool> {
        if self.check(expected)? {
            self.next_token()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Expect a specific token kind, error if not found
    pub fn expect(&mut self, expected: TokenKind) -> TranslateResult<Token> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(&expected) {
            Ok(token)
        } else {
            Err(TranslateError::syntax(
                format!("expected {}, found {}", expected, token.kind),
                token.span,
            ))
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(mut self) -> TranslateResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = matches!(token.kind, TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
