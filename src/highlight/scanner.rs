//! Shared single-pass scanning core.

use super::languages::{LanguageSpec, StringDelimiter};
use super::{Token, TokenKind};

pub(super) struct Scanner<'a> {
    spec: &'static LanguageSpec,
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub(super) const fn new(spec: &'static LanguageSpec, src: &'a str) -> Self {
        Self {
            spec,
            src,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub(super) fn run(mut self) -> Vec<Token> {
        while self.pos < self.src.len() {
            let start = self.pos;
            let kind = self.scan_one();
            debug_assert!(self.pos > start, "scanner must always advance");
            self.push(start, kind);
        }
        self.tokens
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn push(&mut self, start: usize, kind: TokenKind) {
        let text = &self.src[start..self.pos];
        // Whitespace and stray characters merge into one plain run.
        if kind == TokenKind::Plain {
            if let Some(last) = self.tokens.last_mut() {
                if last.kind == TokenKind::Plain {
                    last.text.push_str(text);
                    return;
                }
            }
        }
        self.tokens.push(Token::new(text, kind));
    }

    fn scan_one(&mut self) -> TokenKind {
        let Some(ch) = self.peek() else {
            self.pos = self.src.len();
            return TokenKind::Plain;
        };

        if ch.is_whitespace() {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            return TokenKind::Plain;
        }

        // Block openers may extend a line marker (Lua `--[[`), so check them first.
        if self.at_block_comment() {
            self.scan_block_comment();
            return TokenKind::Comment;
        }

        if self.at_line_comment() {
            self.skip_to_line_end();
            return TokenKind::Comment;
        }

        if let Some(delim) = self.string_at_cursor() {
            self.scan_string(delim);
            return TokenKind::String;
        }

        if ch == '\'' && self.spec.char_literals {
            if self.scan_char_literal() {
                return TokenKind::String;
            }
            self.bump();
            return TokenKind::Punctuation;
        }

        if ch.is_ascii_digit() {
            self.scan_number();
            return TokenKind::Number;
        }

        if self.is_ident_start(ch) {
            return self.scan_word();
        }

        if is_operator(ch) {
            self.bump();
            while self.peek().is_some_and(is_operator) && !self.at_comment() {
                self.bump();
            }
            return TokenKind::Punctuation;
        }

        self.bump();
        if ch.is_ascii_punctuation() {
            TokenKind::Punctuation
        } else {
            TokenKind::Plain
        }
    }

    fn at_line_comment(&self) -> bool {
        let rest = self.rest();
        self.spec
            .line_comments
            .iter()
            .any(|marker| rest.starts_with(marker))
    }

    fn at_block_comment(&self) -> bool {
        self.spec
            .block_comment
            .as_ref()
            .is_some_and(|block| self.rest().starts_with(block.open))
    }

    fn at_comment(&self) -> bool {
        self.at_line_comment() || self.at_block_comment()
    }

    fn skip_to_line_end(&mut self) {
        let rest = self.rest();
        self.pos += rest.find('\n').unwrap_or(rest.len());
    }

    /// Consume a block comment. Unterminated comments run to end of input.
    fn scan_block_comment(&mut self) {
        let Some(block) = self.spec.block_comment.as_ref() else {
            return;
        };
        self.pos += block.open.len();
        let mut depth = 1usize;
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with(block.close) {
                self.pos += block.close.len();
                depth -= 1;
                if depth == 0 {
                    return;
                }
            } else if block.nested && rest.starts_with(block.open) {
                self.pos += block.open.len();
                depth += 1;
            } else {
                self.bump();
            }
        }
    }

    fn string_at_cursor(&self) -> Option<&'static StringDelimiter> {
        let rest = self.rest();
        self.spec
            .strings
            .iter()
            .find(|delim| rest.starts_with(delim.open))
    }

    /// Consume a string starting at its opening delimiter.
    ///
    /// Single-line strings stop before an unescaped newline; multiline
    /// strings run to end of input when unterminated.
    fn scan_string(&mut self, delim: &StringDelimiter) {
        self.pos += delim.open.len();
        while self.pos < self.src.len() {
            let rest = self.rest();
            if delim.escapes && rest.starts_with('\\') {
                self.pos += 1;
                self.bump();
                continue;
            }
            if rest.starts_with(delim.close) {
                self.pos += delim.close.len();
                return;
            }
            if !delim.multiline && rest.starts_with('\n') {
                return;
            }
            self.bump();
        }
    }

    /// Consume the `#`-fenced body of a raw string after its prefix.
    /// Returns false, consuming nothing, when no quote follows the fence.
    /// Unterminated raw strings run to end of input.
    fn scan_raw_string(&mut self) -> bool {
        let rest = self.rest();
        let hashes = rest.len() - rest.trim_start_matches('#').len();
        if !rest[hashes..].starts_with('"') {
            return false;
        }
        let close = format!("\"{}", "#".repeat(hashes));
        let body = self.pos + hashes + 1;
        self.pos = self.src[body..]
            .find(&close)
            .map_or(self.src.len(), |end| body + end + close.len());
        true
    }

    /// Try `'x'` or `'\n'` style literals; a lone quote is a lifetime or label.
    fn scan_char_literal(&mut self) -> bool {
        let body_len = match (self.peek_nth(1), self.peek_nth(2)) {
            (Some('\\'), _) => {
                let rest = &self.rest()[1..];
                match rest.char_indices().skip(2).take(10).find(|(_, c)| *c == '\'' || *c == '\n') {
                    Some((idx, '\'')) => Some(idx),
                    _ => None,
                }
            }
            (Some(c), Some('\'')) if c != '\'' && c != '\n' => Some(c.len_utf8()),
            _ => None,
        };
        match body_len {
            Some(len) => {
                // opening quote + body + closing quote
                self.pos += 1 + len + 1;
                true
            }
            None => false,
        }
    }

    fn scan_number(&mut self) {
        let radix_prefix = matches!(
            (self.peek(), self.peek_nth(1)),
            (Some('0'), Some('x' | 'X' | 'b' | 'B' | 'o' | 'O'))
        );
        if radix_prefix {
            self.pos += 2;
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                self.bump();
            }
            return;
        }

        self.digits();
        if self.peek() == Some('.') && self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_follows = match self.peek_nth(1) {
                Some('+' | '-') => self.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.digits();
            }
        }
        // Type or unit suffix: u32, 10f, 1L, 12px
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.bump();
        }
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn is_ident_start(&self, ch: char) -> bool {
        // Only sigils may start a word; `-`, `?` and `!` only continue one.
        ch.is_alphabetic()
            || ch == '_'
            || (matches!(ch, '$' | '@') && self.spec.ident_extra.contains(&ch))
    }

    fn is_ident_continue(&self, ch: char) -> bool {
        ch.is_alphanumeric() || ch == '_' || self.spec.ident_extra.contains(&ch)
    }

    fn scan_word(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(|c| self.is_ident_continue(c)) {
            self.bump();
        }
        let word = &self.src[start..self.pos];

        if self.spec.raw_string_prefixes.contains(&word) && self.scan_raw_string() {
            return TokenKind::String;
        }

        if self.is_string_prefix(word) {
            if let Some(delim) = self.string_at_cursor() {
                self.scan_string(delim);
                return TokenKind::String;
            }
        }

        if self.is_keyword(word) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }

    fn is_string_prefix(&self, word: &str) -> bool {
        self.spec
            .string_prefixes
            .iter()
            .any(|prefix| prefix.eq_ignore_ascii_case(word))
    }

    fn is_keyword(&self, word: &str) -> bool {
        if self.spec.case_insensitive {
            self.spec
                .keywords
                .iter()
                .any(|kw| kw.eq_ignore_ascii_case(word))
        } else {
            self.spec.keywords.contains(&word)
        }
    }
}

const fn is_operator(ch: char) -> bool {
    matches!(
        ch,
        '+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|' | '^' | '~' | '?' | ':' | '.'
    )
}
