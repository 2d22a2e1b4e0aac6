//! Lexical analysis of Jack source: byte stream to token stream.
//!
//! The whole source is scanned up front into a `Vec<Token>` (simpler than
//! streaming line-by-line, and the full file easily fits in memory for the
//! class-sized inputs this toolchain targets). [`Tokenizer`] then walks that
//! vector with a single-token lookahead, which is all the compilation engine
//! ever needs (see spec §4.3's term-disambiguation rule).

use crate::error::LexError;
use crate::token::{Keyword, Token, TokenKind};

const MAX_INT: u32 = 32767;

/// Scan `source` into tokens, stripping `//`, `/* */`, and `/** */` comments
/// along the way. Comments inside string literals are left alone.
pub fn scan(source: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Line comment.
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        // Block comment (covers both `/*` and `/**`).
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start_line = line;
            i += 2;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '\n' {
                    line += 1;
                }
                if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                    i += 2;
                    closed = true;
                    break;
                }
                i += 1;
            }
            if !closed {
                return Err(LexError::UnterminatedComment { line: start_line });
            }
            continue;
        }

        // String literal: longest-match precedence over everything else.
        if c == '"' {
            let start_line = line;
            i += 1;
            let start = i;
            while i < chars.len() && chars[i] != '"' && chars[i] != '\n' {
                i += 1;
            }
            if i >= chars.len() || chars[i] != '"' {
                return Err(LexError::UnterminatedString { line: start_line });
            }
            let text: String = chars[start..i].iter().collect();
            i += 1; // consume closing quote
            tokens.push(Token::new(TokenKind::StringConst(text), start_line));
            continue;
        }

        // Symbol.
        if crate::token::SYMBOLS.contains(&c) {
            tokens.push(Token::new(TokenKind::Symbol(c), line));
            i += 1;
            continue;
        }

        // Integer constant.
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let value: u32 = text.parse().unwrap_or(u32::MAX);
            if value > MAX_INT {
                return Err(LexError::IntOutOfRange { line, text });
            }
            tokens.push(Token::new(TokenKind::IntConst(value as u16), line));
            continue;
        }

        // Keyword or identifier.
        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let kind = match Keyword::parse(&text) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(text),
            };
            tokens.push(Token::new(kind, line));
            continue;
        }

        // Anything else (stray punctuation) is silently skipped; the parser
        // will fail on the resulting malformed token stream with a precise
        // diagnostic rather than the tokenizer guessing at recovery.
        i += 1;
    }

    Ok(tokens)
}

/// Walks a pre-scanned token stream with one-token lookahead.
pub struct Tokenizer {
    tokens: Vec<Token>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Result<Tokenizer, LexError> {
        let tokens = scan(source)?;
        Ok(Tokenizer { tokens, pos: 0 })
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }

    /// Advance to the next token, returning it.
    pub fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// The current token (the one most recently returned by `advance`).
    pub fn current(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Peek at the token after the current one, without consuming it.
    pub fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn strips_line_comments() {
        let toks = kinds("let x = 1; // trailing\n// whole line\nlet y = 2;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("x".into()),
                TokenKind::Symbol('='),
                TokenKind::IntConst(1),
                TokenKind::Symbol(';'),
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("y".into()),
                TokenKind::Symbol('='),
                TokenKind::IntConst(2),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn strips_block_and_doc_comments_spanning_lines() {
        let toks = kinds("/** doc\n   comment */\nvar int x;\n/* one line */ var int y;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Identifier("x".into()),
                TokenKind::Symbol(';'),
                TokenKind::Keyword(Keyword::Var),
                TokenKind::Keyword(Keyword::Int),
                TokenKind::Identifier("y".into()),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let err = scan("/* never closed").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedComment { .. }));
    }

    #[test]
    fn string_literal_does_not_treat_slashes_as_comments() {
        let toks = kinds(r#"let s = "http://example.com";"#);
        assert_eq!(
            toks,
            vec![
                TokenKind::Keyword(Keyword::Let),
                TokenKind::Identifier("s".into()),
                TokenKind::Symbol('='),
                TokenKind::StringConst("http://example.com".into()),
                TokenKind::Symbol(';'),
            ]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        let err = scan("\"abc").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn max_int_accepted_next_rejected() {
        assert_eq!(kinds("32767"), vec![TokenKind::IntConst(32767)]);
        let err = scan("32768").unwrap_err();
        assert!(matches!(err, LexError::IntOutOfRange { .. }));
    }

    #[test]
    fn identifiers_allow_leading_underscore_and_digits() {
        assert_eq!(
            kinds("_foo1 bar_2"),
            vec![
                TokenKind::Identifier("_foo1".into()),
                TokenKind::Identifier("bar_2".into()),
            ]
        );
    }

    #[test]
    fn tokenizer_peek_does_not_consume() {
        let mut t = Tokenizer::new("let x;").unwrap();
        t.advance();
        assert_eq!(t.current().unwrap().keyword(), Some(Keyword::Let));
        assert_eq!(t.peek_next().unwrap().identifier(), Some("x"));
        t.advance();
        assert_eq!(t.current().unwrap().identifier(), Some("x"));
    }
}
