//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It turns source text into a sequence of [`Token`]s, skipping whitespace and
//! comments, and emitting exactly one `EOF` token at the end. It is a
//! `FusedIterator`, so it chains safely with other iterator adapters.
//!
//! Errors (unexpected characters, unterminated strings) are yielded in place
//! of a token; scanning resumes with the next byte so a single pass reports
//! every lexical problem in the file.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// Single pass scanner over a borrowed source string.
pub struct Scanner<'a> {
    src: &'a str,
    start: usize,               // byte index of the first byte of the current lexeme
    curr: usize,                // byte index one past the last byte examined
    line: usize,                // 1‑based
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
            finished: false,
        }
    }

    /// Scan the whole input, splitting tokens from lexical errors.
    pub fn scan_all(self) -> (Vec<Token>, Vec<LoxError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for item in self {
            match item {
                Ok(token) => tokens.push(token),
                Err(e) => errors.push(e),
            }
        }

        (tokens, errors)
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it. Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes().get(self.curr).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.curr += 1;
            true
        } else {
            false
        }
    }

    fn either(&mut self, expected: u8, matched: TokenType, otherwise: TokenType) -> TokenType {
        if self.match_byte(expected) {
            matched
        } else {
            otherwise
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan one lexeme starting at `self.curr`. Whitespace and comments leave
    /// `pending` empty.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        let kind = match b {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b' ' | b'\r' | b'\t' => return Ok(()),

            b'\n' => {
                self.line += 1;
                return Ok(());
            }

            b'/' => {
                if !self.match_byte(b'/') {
                    TokenType::SLASH
                } else {
                    // Jump to the next newline; it is consumed (and counted)
                    // by the following call.
                    self.curr = match memchr(b'\n', &self.bytes()[self.curr..]) {
                        Some(pos) => self.curr + pos,
                        None => self.src.len(),
                    };
                    return Ok(());
                }
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Skip the rest of a multi-byte character so slicing stays on
                // a char boundary.
                while !self.src.is_char_boundary(self.curr) {
                    self.curr += 1;
                }

                let unexpected = &self.src[self.start..self.curr];

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", unexpected),
                ));
            }
        };

        self.pending = Some(kind);

        Ok(())
    }

    /// `self.start` points at the opening quote; on success `self.curr` is
    /// past the closing one.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance();

        let contents = &self.src[self.start + 1..self.curr - 1];

        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Digits and at most one interior dot always parse.
        let n: f64 = self.src[self.start..self.curr].parse().unwrap_or(0.0);

        TokenType::NUMBER(n)
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.is_at_end() {
                self.finished = true;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                let lexeme = &self.src[self.start..self.curr];

                return Some(Ok(Token::new(tt, lexeme, self.line)));
            }
        }
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
