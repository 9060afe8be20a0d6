//! logos-based stylesheet tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `#fff` as HexColor beats `#` as Hash)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `#ff00aa` matches [`Token::HexColor`], not `Hash` + `Ident`
//! - `50%` matches [`Token::Percentage`], not `Number` + garbage
//! - `:hover` matches [`Token::PseudoClass`], not `Colon` + `Ident`
//! - `@palette` matches [`Token::AtKeyword`]

use logos::Logos;

/// Stylesheet token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// At-rule keyword: `@palette`.
    #[regex(r"@[a-zA-Z][a-zA-Z0-9_-]*")]
    AtKeyword,

    /// Hex colour: `#fff`, `#ff00aa`, `#ff00aa80` (3-8 hex digits).
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// Percentage: `50%`, `-12.5%`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?%")]
    Percentage,

    /// State suffix: `:hover`, `:selected`, etc.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoClass,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Palette reference: `$accent`, `$panel-bg`.
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_-]*")]
    Variable,

    /// Number: integer or float, possibly negative.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, selector names, colour names, keywords.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `#`
    #[token("#")]
    Hash,
}

/// Tokenize a stylesheet string into `(Token, text)` pairs.
///
/// Input that fails to lex is skipped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, input[span].to_string())))
        .collect()
}
