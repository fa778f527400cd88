//! Keys parser.
//!
//! Parses user-entered keys into a [`KeyExpression`] using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! keys     → or_expr
//! or_expr  → and_expr ("OR" and_expr)*
//! and_expr → unary+
//! unary    → "-" unary | primary
//! primary  → TERM | PHRASE | "(" or_expr ")"
//! ```
//!
//! Adjacent keys combine with the caller's default conjunction; an explicit
//! `OR` always produces an OR group.

use std::mem;

use crate::{
    ast::Conjunction,
    error::{ParseError, QueryError},
    keys::{KeyExpression, KeyGroup, ParseMode},
    lexer::{Spanned, Token, tokenize_spanned},
};

/// Recursive descent parser for keys.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Spanned>,
    /// Current position in token stream.
    position: usize,
    /// Conjunction used between adjacent keys.
    default_conjunction: Conjunction,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Spanned>, default_conjunction: Conjunction) -> Self {
        Self {
            tokens,
            position: 0,
            default_conjunction,
        }
    }

    /// Parses the token stream into a key expression.
    fn parse(mut self) -> Result<Option<KeyExpression>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_or_expr()?;

        if let Some(spanned) = self.tokens.get(self.position) {
            return Err(ParseError::new(
                format!("unexpected token: {:?}", spanned.token),
                Some(spanned.offset),
            ));
        }

        Ok(Some(expr))
    }

    /// Parses: or_expr → and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<KeyExpression, ParseError> {
        let mut alternatives = vec![self.parse_and_expr()?];

        while self.check(&Token::Or) {
            self.advance();
            alternatives.push(self.parse_and_expr()?);
        }

        Ok(combine(Conjunction::Or, alternatives))
    }

    /// Parses: and_expr → unary+
    fn parse_and_expr(&mut self) -> Result<KeyExpression, ParseError> {
        let mut exprs = vec![self.parse_unary()?];

        while self.can_start_unary() {
            exprs.push(self.parse_unary()?);
        }

        Ok(combine(self.default_conjunction, exprs))
    }

    /// Checks if the current token can start a unary expression.
    fn can_start_unary(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Term(_) | Token::Phrase(_) | Token::Not | Token::LParen)
        )
    }

    /// Parses: unary → "-" unary | primary
    fn parse_unary(&mut self) -> Result<KeyExpression, ParseError> {
        if self.check(&Token::Not) {
            self.advance();
            return Ok(self.parse_unary()?.negated());
        }

        self.parse_primary()
    }

    /// Parses: primary → TERM | PHRASE | "(" or_expr ")"
    fn parse_primary(&mut self) -> Result<KeyExpression, ParseError> {
        let offset = self.offset();
        match self.peek().cloned() {
            Some(Token::Term(text) | Token::Phrase(text)) => {
                self.advance();
                Ok(KeyExpression::Term(text))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_or_expr()?;
                if !self.check(&Token::RParen) {
                    return Err(ParseError::new(
                        "expected closing parenthesis",
                        Some(self.offset().unwrap_or_else(|| self.end_offset())),
                    ));
                }
                self.advance();
                // A parenthesized single term still forms its own group.
                Ok(match inner {
                    term @ KeyExpression::Term(_) => {
                        KeyExpression::group(self.default_conjunction, false, vec![term])
                    }
                    group => group,
                })
            }
            Some(Token::RParen) => Err(ParseError::new("unexpected closing parenthesis", offset)),
            Some(Token::Or) => Err(ParseError::new(
                "unexpected OR (needs keys before it)",
                offset,
            )),
            Some(Token::Not) => Err(ParseError::new("unexpected negation", offset)),
            None => Err(ParseError::new(
                "unexpected end of keys",
                Some(self.end_offset()),
            )),
        }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|s| &s.token)
    }

    /// Returns the byte offset of the current token.
    fn offset(&self) -> Option<usize> {
        self.tokens.get(self.position).map(|s| s.offset)
    }

    /// Returns a byte offset just past the last token.
    fn end_offset(&self) -> usize {
        self.tokens.last().map_or(0, |s| s.offset + 1)
    }

    /// Checks if the current token matches the given token kind.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Combines sibling expressions under a conjunction.
///
/// A single expression is returned unchanged; non-negated groups with the same
/// conjunction are flattened into the parent.
fn combine(conjunction: Conjunction, exprs: Vec<KeyExpression>) -> KeyExpression {
    if exprs.len() == 1 {
        return exprs.into_iter().next().unwrap_or_else(|| KeyExpression::term(""));
    }

    let mut children = Vec::with_capacity(exprs.len());
    for expr in exprs {
        match expr {
            KeyExpression::Group(g)
                if !g.negation && !g.escaped && g.conjunction == conjunction =>
            {
                children.extend(g.children);
            }
            other => children.push(other),
        }
    }

    KeyExpression::Group(KeyGroup {
        conjunction,
        negation: false,
        escaped: false,
        children,
    })
}

/// Parses user-entered keys for the given parse mode.
///
/// - `Terms` and `Edismax` parse words, quoted phrases, `-` negation, `OR` and
///   parentheses. The result is always a group.
/// - `Phrase` keeps the whole trimmed input as a single key.
/// - `Direct` returns the raw input as a scalar term.
///
/// Returns `Ok(None)` for empty input.
pub fn parse_keys(
    input: &str,
    mode: ParseMode,
    conjunction: Conjunction,
) -> Result<Option<KeyExpression>, QueryError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match mode {
        ParseMode::Direct => Ok(Some(KeyExpression::term(trimmed))),
        ParseMode::Phrase => Ok(Some(KeyExpression::terms(conjunction, [trimmed]))),
        ParseMode::Terms | ParseMode::Edismax => {
            let tokens = tokenize_spanned(input).map_err(QueryError::from)?;
            let parsed = Parser::new(tokens, conjunction)
                .parse()
                .map_err(|e| QueryError::from(e).with_input(input))?;
            Ok(parsed.map(|expr| match expr {
                term @ KeyExpression::Term(_) => {
                    KeyExpression::group(conjunction, false, vec![term])
                }
                group => group,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn term(s: &str) -> KeyExpression {
        KeyExpression::term(s)
    }

    fn and(children: Vec<KeyExpression>) -> KeyExpression {
        KeyExpression::group(Conjunction::And, false, children)
    }

    fn or(children: Vec<KeyExpression>) -> KeyExpression {
        KeyExpression::group(Conjunction::Or, false, children)
    }

    fn not(children: Vec<KeyExpression>) -> KeyExpression {
        KeyExpression::group(Conjunction::And, true, children)
    }

    fn terms(input: &str) -> Option<KeyExpression> {
        parse_keys(input, ParseMode::Terms, Conjunction::And).unwrap()
    }

    #[test]
    fn empty_keys() {
        assert_eq!(terms(""), None);
        assert_eq!(terms("   "), None);
        assert_eq!(
            parse_keys("  ", ParseMode::Direct, Conjunction::And).unwrap(),
            None
        );
    }

    #[test]
    fn single_term_is_wrapped_in_group() {
        assert_eq!(terms("rust"), Some(and(vec![term("rust")])));
    }

    #[test]
    fn adjacent_terms_use_default_conjunction() {
        assert_eq!(
            terms("rust async"),
            Some(and(vec![term("rust"), term("async")]))
        );
        assert_eq!(
            parse_keys("rust async", ParseMode::Terms, Conjunction::Or).unwrap(),
            Some(or(vec![term("rust"), term("async")]))
        );
    }

    #[test]
    fn phrase_is_one_term() {
        assert_eq!(
            terms("rust \"error handling\""),
            Some(and(vec![term("rust"), term("error handling")]))
        );
    }

    #[test]
    fn explicit_or() {
        assert_eq!(
            terms("rust async OR golang"),
            Some(or(vec![and(vec![term("rust"), term("async")]), term("golang")]))
        );
    }

    #[test]
    fn chained_or_flattens() {
        assert_eq!(
            terms("a OR b OR c"),
            Some(or(vec![term("a"), term("b"), term("c")]))
        );
    }

    #[test]
    fn negation_creates_negated_group() {
        assert_eq!(
            terms("rust -deprecated"),
            Some(and(vec![term("rust"), not(vec![term("deprecated")])]))
        );
    }

    #[test]
    fn negated_parenthesized_group() {
        assert_eq!(
            terms("-(a b) c"),
            Some(and(vec![
                KeyExpression::group(Conjunction::And, true, vec![term("a"), term("b")]),
                term("c")
            ]))
        );
    }

    #[test]
    fn parenthesized_or_stays_nested() {
        assert_eq!(
            terms("(a OR b) c"),
            Some(and(vec![or(vec![term("a"), term("b")]), term("c")]))
        );
    }

    #[test]
    fn phrase_mode_keeps_input_whole() {
        assert_eq!(
            parse_keys(" error handling ", ParseMode::Phrase, Conjunction::And).unwrap(),
            Some(and(vec![term("error handling")]))
        );
    }

    #[test]
    fn direct_mode_is_scalar() {
        assert_eq!(
            parse_keys("title:(a OR b)", ParseMode::Direct, Conjunction::And).unwrap(),
            Some(term("title:(a OR b)"))
        );
    }

    #[test]
    fn error_unclosed_paren() {
        let err = parse_keys("(rust async", ParseMode::Terms, Conjunction::And).unwrap_err();
        assert!(err.message().contains("closing parenthesis"));
        assert_eq!(err.input.as_deref(), Some("(rust async"));
    }

    #[test]
    fn error_unexpected_rparen() {
        let err = parse_keys("rust)", ParseMode::Terms, Conjunction::And).unwrap_err();
        assert!(err.message().contains("unexpected"));
        assert_eq!(err.position(), Some(4));
    }

    #[test]
    fn error_or_at_start() {
        let err = parse_keys("OR rust", ParseMode::Terms, Conjunction::And).unwrap_err();
        assert!(err.message().contains("OR"));
    }

    #[test]
    fn error_or_at_end() {
        let err = parse_keys("rust OR", ParseMode::Terms, Conjunction::And).unwrap_err();
        assert!(err.message().contains("end of keys"));
    }

    #[test]
    fn error_unclosed_quote() {
        let err = parse_keys("\"unclosed", ParseMode::Edismax, Conjunction::And).unwrap_err();
        assert!(err.message().contains("unclosed"));
    }

    #[test]
    fn performance_many_keys() {
        let inputs = [
            "rust",
            "rust async await",
            "\"error handling\"",
            "-deprecated",
            "rust OR golang OR python",
            "(a b) OR (c d)",
            "((a OR b) c) OR ((d OR e) f) -g",
        ];

        let start = Instant::now();
        for _ in 0..1000 {
            for input in &inputs {
                let _ = parse_keys(input, ParseMode::Terms, Conjunction::And).unwrap();
            }
        }
        assert!(
            start.elapsed().as_millis() < 1000,
            "parsing 7,000 inputs took {:?}",
            start.elapsed()
        );
    }
}
