//! Recursive descent stylesheet parser.
//!
//! Parses stylesheet text into a [`StyleDocument`]. Uses the logos-based
//! tokenizer from [`crate::css::tokenizer`].

use logos::Logos;

use crate::css::model::*;
use crate::css::tokenizer::Token;
use crate::dom::node::InteractionState;

/// Errors from stylesheet parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// A positioned token with byte-level span information for whitespace detection.
#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    /// Index in the token stream (for error reporting).
    pos: usize,
    byte_start: usize,
    byte_end: usize,
}

/// Strip block comments (`/* ... */`), replacing each with a single space.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        result.push_str(&rest[..start]);
        result.push(' ');
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            // Unterminated comment: consume the rest of the input.
            None => rest = "",
        }
    }
    result.push_str(rest);
    result
}

/// Tokenize input using logos with span information preserved.
fn tokenize_with_spans(input: &str) -> Vec<PToken> {
    let lexer = Token::lexer(input);
    let mut tokens = Vec::new();

    for (result, span) in lexer.spanned() {
        if let Ok(token) = result {
            tokens.push(PToken {
                text: input[span.clone()].to_string(),
                token,
                pos: tokens.len(),
                byte_start: span.start,
                byte_end: span.end,
            });
        }
    }

    tokens
}

/// Parse stylesheet text into a [`StyleDocument`].
pub fn parse_stylesheet(input: &str) -> Result<StyleDocument, ParseError> {
    let source = strip_comments(input);
    let tokens = tokenize_with_spans(&source);

    let mut parser = Parser { tokens, cursor: 0, source: &source };

    let mut items = Vec::new();
    while !parser.is_eof() {
        items.push(parser.parse_item()?);
    }

    Ok(StyleDocument { items })
}

/// Parse the value part of a single declaration (`2 4`, `#ff0000`, ...).
///
/// Used for property values that arrive as plain text, e.g. from a tree
/// description document.
pub fn parse_values(input: &str) -> Result<Vec<DeclarationValue>, ParseError> {
    let tokens = tokenize_with_spans(input);
    let mut parser = Parser { tokens, cursor: 0, source: input };
    let mut values = Vec::new();
    while !parser.is_eof() {
        values.push(parser.parse_declaration_value()?);
    }
    Ok(values)
}

/// Recursive descent parser state.
struct Parser<'a> {
    tokens: Vec<PToken>,
    cursor: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn peek_is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(unexpected(&tok, &format!("expected {expected:?}"))),
            None => Err(ParseError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == Token::Ident => Ok(tok),
            Some(tok) => Err(unexpected(&tok, &format!("expected {what}"))),
            None => Err(ParseError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Returns `true` if the current token immediately follows the previous
    /// one with no whitespace in between.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = &self.tokens[self.cursor - 1];
        match self.peek() {
            Some(curr) => curr.byte_start == prev.byte_end,
            None => false,
        }
    }

    /// A palette block or a rule block.
    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.peek() {
            Some(t) if t.token == Token::AtKeyword => {
                let at = self.advance().ok_or_else(|| ParseError::UnexpectedEof("at-rule".into()))?;
                if at.text != "@palette" {
                    return Err(unexpected(&at, "unknown at-rule"));
                }
                let name = self.expect_ident("palette name")?.text;
                self.expect(&Token::BraceOpen)?;
                let declarations = self.parse_declarations()?;
                self.expect(&Token::BraceClose)?;
                Ok(Item::Palette(PaletteBlock { name, declarations }))
            }
            _ => self.parse_rule().map(Item::Rule),
        }
    }

    /// Parse `selector[, selector] [extends base] { declarations }`.
    fn parse_rule(&mut self) -> Result<RuleBlock, ParseError> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek_is(&Token::Comma) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }

        let mut extends = None;
        if self.peek().is_some_and(|t| t.token == Token::Ident && t.text == "extends") {
            let kw = self.advance().ok_or_else(|| ParseError::UnexpectedEof("extends".into()))?;
            let plain_class = matches!(
                selectors.as_slice(),
                [Selector { target: SelectorTarget::Class(_), states }] if states.is_empty()
            );
            if !plain_class {
                return Err(unexpected(&kw, "only a single plain class selector can extend"));
            }
            extends = Some(self.expect_ident("base class name")?.text);
        }

        self.expect(&Token::BraceOpen)?;
        let declarations = self.parse_declarations()?;
        self.expect(&Token::BraceClose)?;

        Ok(RuleBlock { selectors, extends, declarations })
    }

    /// Parse a selector: `Type`, `.class` or `#id`, followed by adjacent
    /// `:state` suffixes.
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let first = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected selector".into()))?;

        let target = match first.token {
            Token::Ident => SelectorTarget::Type(first.text),
            Token::Dot => {
                if !self.is_adjacent() {
                    return Err(unexpected(&first, "expected class name after '.'"));
                }
                SelectorTarget::Class(self.expect_ident("class name")?.text)
            }
            Token::Hash => {
                if !self.is_adjacent() {
                    return Err(unexpected(&first, "expected id after '#'"));
                }
                SelectorTarget::Id(self.expect_ident("id")?.text)
            }
            // Ids made only of hex digits (`#fade`) lex as colours.
            Token::HexColor => SelectorTarget::Id(first.text[1..].to_string()),
            _ => return Err(unexpected(&first, "expected selector")),
        };

        let mut selector = Selector::new(target);
        while self.is_adjacent() && self.peek_is(&Token::PseudoClass) {
            let tok = self.advance().ok_or_else(|| ParseError::UnexpectedEof("state".into()))?;
            let state = InteractionState::from_name(&tok.text[1..])
                .ok_or_else(|| unexpected(&tok, "unknown interaction state"))?;
            selector.states.insert(state);
        }

        Ok(selector)
    }

    /// Parse declarations between `{` and `}`.
    fn parse_declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();

        while self.peek().is_some_and(|t| t.token != Token::BraceClose) {
            declarations.push(self.parse_declaration()?);
        }

        Ok(declarations)
    }

    /// Parse a single declaration: `property: value1 value2;`
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let property = self.expect_ident("property name")?.text;
        let mut values = Vec::new();

        match self.advance() {
            Some(t) if t.token == Token::Colon => {}
            // `color:red` lexes the colon and the first value as a state suffix.
            Some(t) if t.token == Token::PseudoClass => {
                values.push(DeclarationValue::Ident(t.text[1..].to_string()));
            }
            Some(t) => return Err(unexpected(&t, "expected ':'")),
            None => return Err(ParseError::UnexpectedEof("expected ':'".into())),
        }

        while let Some(t) = self.peek() {
            if matches!(t.token, Token::Semicolon | Token::BraceClose) {
                break;
            }
            values.push(self.parse_declaration_value()?);
        }

        if values.is_empty() {
            return Err(ParseError::UnexpectedToken {
                position: self.current_pos(),
                message: format!("missing value for '{property}'"),
            });
        }

        if self.peek_is(&Token::Semicolon) {
            self.advance();
        }

        Ok(Declaration { property, values })
    }

    /// Parse a single declaration value token into a [`DeclarationValue`].
    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let tok = self
            .advance()
            .ok_or_else(|| ParseError::UnexpectedEof("expected declaration value".into()))?;

        match &tok.token {
            Token::Number => {
                let n: f64 = tok.text.parse().map_err(|_| unexpected(&tok, "invalid number"))?;
                Ok(DeclarationValue::Number(n))
            }
            Token::Percentage => {
                let n: f64 = tok.text[..tok.text.len() - 1]
                    .parse()
                    .map_err(|_| unexpected(&tok, "invalid percentage"))?;
                Ok(DeclarationValue::Percent(n))
            }
            Token::Ident if self.is_adjacent() && self.peek_is(&Token::ParenOpen) => {
                self.parse_function(&tok)
            }
            Token::Ident => Ok(DeclarationValue::Ident(tok.text.clone())),
            Token::HexColor => Ok(DeclarationValue::Color(tok.text[1..].to_string())),
            Token::StringLiteral | Token::StringLiteralSingle => {
                let inner = &tok.text[1..tok.text.len() - 1];
                Ok(DeclarationValue::String(inner.to_string()))
            }
            Token::Variable => Ok(DeclarationValue::Variable(tok.text[1..].to_string())),
            _ => Err(unexpected(&tok, "unexpected token in declaration value")),
        }
    }

    /// Consume `( ... )` after a function name and keep the call as source text.
    fn parse_function(&mut self, name: &PToken) -> Result<DeclarationValue, ParseError> {
        self.expect(&Token::ParenOpen)?;
        let mut depth = 1usize;
        loop {
            let tok = self
                .advance()
                .ok_or_else(|| ParseError::UnexpectedEof(format!("unclosed '{}('", name.text)))?;
            match tok.token {
                Token::ParenOpen => depth += 1,
                Token::ParenClose => {
                    depth -= 1;
                    if depth == 0 {
                        let text = &self.source[name.byte_start..tok.byte_end];
                        return Ok(DeclarationValue::Function(text.to_string()));
                    }
                }
                Token::Semicolon | Token::BraceClose => {
                    return Err(unexpected(&tok, "unclosed function call"));
                }
                _ => {}
            }
        }
    }
}

fn unexpected(tok: &PToken, message: &str) -> ParseError {
    ParseError::UnexpectedToken {
        position: tok.pos,
        message: format!("{message}, got {:?} '{}'", tok.token, tok.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::StateSet;

    // ── Helper ───────────────────────────────────────────────────────

    fn parse(input: &str) -> StyleDocument {
        parse_stylesheet(input).unwrap_or_else(|e| panic!("parse failed: {e}"))
    }

    fn first_rule(input: &str) -> RuleBlock {
        match parse(input).items.into_iter().next() {
            Some(Item::Rule(rule)) => rule,
            other => panic!("expected a rule, got {other:?}"),
        }
    }

    // ── Selectors ────────────────────────────────────────────────────

    #[test]
    fn parse_type_rule() {
        let rule = first_rule("Slider { color: red; }");
        assert_eq!(rule.selectors, vec![Selector::new(SelectorTarget::Type("Slider".into()))]);
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.declarations[0].values, vec![DeclarationValue::Ident("red".into())]);
    }

    #[test]
    fn parse_class_with_states() {
        let rule = first_rule(".knob:hover:pressed { color: blue; }");
        let sel = &rule.selectors[0];
        assert_eq!(sel.target, SelectorTarget::Class("knob".into()));
        let mut expected = StateSet::empty();
        expected.insert(InteractionState::Hover);
        expected.insert(InteractionState::Pressed);
        assert_eq!(sel.states, expected);
    }

    #[test]
    fn parse_id_selectors() {
        let rule = first_rule("#gain { caption: \"Gain\"; }");
        assert_eq!(rule.selectors[0].target, SelectorTarget::Id("gain".into()));

        let rule = first_rule("#fade { size: 1; }");
        assert_eq!(rule.selectors[0].target, SelectorTarget::Id("fade".into()));
    }

    #[test]
    fn parse_selector_list() {
        let rule = first_rule("Slider, .knob, #gain { size: 10; }");
        assert_eq!(rule.selectors.len(), 3);
    }

    #[test]
    fn unknown_state_is_an_error() {
        assert!(parse_stylesheet(".knob:wobble { size: 1; }").is_err());
    }

    #[test]
    fn detached_dot_is_an_error() {
        assert!(parse_stylesheet(". knob { size: 1; }").is_err());
    }

    // ── extends ──────────────────────────────────────────────────────

    #[test]
    fn parse_extends() {
        let rule = first_rule(".big extends knob { size: 40; }");
        assert_eq!(rule.extends.as_deref(), Some("knob"));
        assert_eq!(rule.selectors[0].target, SelectorTarget::Class("big".into()));
    }

    #[test]
    fn extends_requires_plain_class() {
        assert!(parse_stylesheet("Slider extends knob { }").is_err());
        assert!(parse_stylesheet(".a:hover extends b { }").is_err());
    }

    // ── Palettes ─────────────────────────────────────────────────────

    #[test]
    fn parse_palette() {
        let doc = parse("@palette dark { accent: #ff8000; panel: grey; }");
        match &doc.items[0] {
            Item::Palette(p) => {
                assert_eq!(p.name, "dark");
                assert_eq!(p.declarations.len(), 2);
                assert_eq!(
                    p.declarations[0].values,
                    vec![DeclarationValue::Color("ff8000".into())]
                );
            }
            other => panic!("expected palette, got {other:?}"),
        }
    }

    #[test]
    fn unknown_at_rule_is_an_error() {
        assert!(parse_stylesheet("@media x { }").is_err());
    }

    // ── Declarations ─────────────────────────────────────────────────

    #[test]
    fn parse_value_kinds() {
        let rule = first_rule(
            ".x { margin: 2 4; pos-x: 50%; color: $accent; caption: 'Hi'; flag: true; }",
        );
        let values: Vec<&Vec<DeclarationValue>> =
            rule.declarations.iter().map(|d| &d.values).collect();
        assert_eq!(
            values[0],
            &vec![DeclarationValue::Number(2.0), DeclarationValue::Number(4.0)]
        );
        assert_eq!(values[1], &vec![DeclarationValue::Percent(50.0)]);
        assert_eq!(values[2], &vec![DeclarationValue::Variable("accent".into())]);
        assert_eq!(values[3], &vec![DeclarationValue::String("Hi".into())]);
        assert_eq!(values[4], &vec![DeclarationValue::Ident("true".into())]);
    }

    #[test]
    fn parse_function_value() {
        let rule = first_rule(".x { background-gradient: linear-gradient(90, red 0, blue 1); }");
        assert_eq!(
            rule.declarations[0].values,
            vec![DeclarationValue::Function("linear-gradient(90, red 0, blue 1)".into())]
        );
    }

    #[test]
    fn parse_colon_without_space() {
        let rule = first_rule(".x { color:red; }");
        assert_eq!(rule.declarations[0].values, vec![DeclarationValue::Ident("red".into())]);
    }

    #[test]
    fn declaration_without_trailing_semicolon() {
        let rule = first_rule(".x { size: 1; color: red }");
        assert_eq!(rule.declarations.len(), 2);
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_stylesheet(".x { size: ; }").is_err());
    }

    #[test]
    fn missing_brace_is_an_error() {
        assert!(matches!(
            parse_stylesheet(".x { size: 1;"),
            Err(ParseError::UnexpectedEof(_))
        ));
    }

    // ── Comments ─────────────────────────────────────────────────────

    #[test]
    fn comments_are_ignored() {
        let doc = parse("/* header */ .x { /* inner */ size: 1; } /* unterminated");
        assert_eq!(doc.items.len(), 1);
    }

    #[test]
    fn strip_comments_replaces_with_space() {
        assert_eq!(strip_comments("a/*x*/b"), "a b");
        assert_eq!(strip_comments("a /* open"), "a  ");
        assert_eq!(strip_comments("plain"), "plain");
    }

    // ── parse_values ─────────────────────────────────────────────────

    #[test]
    fn parse_values_standalone() {
        assert_eq!(
            parse_values("1 2 3").unwrap(),
            vec![
                DeclarationValue::Number(1.0),
                DeclarationValue::Number(2.0),
                DeclarationValue::Number(3.0)
            ]
        );
        assert_eq!(parse_values("#00ff00").unwrap(), vec![DeclarationValue::Color("00ff00".into())]);
        assert!(parse_values("").unwrap().is_empty());
    }
}
