//! Source tokenizing for code images.
//!
//! A single linear scan classifies text into a flat token stream using
//! per-language tables (see [`languages`]). There is no grammar and no
//! failure mode: any input produces tokens, and concatenating the token
//! texts always reproduces the input exactly.
//!
//! When delimiters nest, the construct that opens first wins. Inside a
//! comment or string nothing else is recognised apart from that string's
//! escape character, so `"/* not a comment */"` is one string token and
//! `// "quoted"` is one comment token.

mod languages;
mod scanner;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use languages::{BlockComment, LanguageSpec, StringDelimiter, languages, lookup};

/// Token classes that a theme assigns colors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    String,
    Comment,
    Number,
    Identifier,
    Punctuation,
    Plain,
}

impl TokenKind {
    /// Every kind, in palette order.
    pub const ALL: [Self; 7] = [
        Self::Keyword,
        Self::String,
        Self::Comment,
        Self::Number,
        Self::Identifier,
        Self::Punctuation,
        Self::Plain,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Comment => "comment",
            Self::Number => "number",
            Self::Identifier => "identifier",
            Self::Punctuation => "punctuation",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified slice of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Normalised language name as supplied by the caller.
///
/// Tags are free-form: anything that does not match a known language,
/// alias or file extension tokenizes as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_ascii_lowercase())
    }

    /// Tag for untokenized plain text.
    pub fn plain() -> Self {
        Self("plaintext".to_string())
    }

    /// Guess the language from a file extension, falling back to plain text.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(lookup)
            .map_or_else(Self::plain, |spec| Self::new(spec.name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Language table for this tag, if one is registered.
    pub fn spec(&self) -> Option<&'static LanguageSpec> {
        lookup(&self.0)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Source text plus its language. Owned by the caller, immutable per render.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    pub code: String,
    pub language: LanguageTag,
}

impl SourceDocument {
    pub fn new(code: impl Into<String>, language: impl Into<LanguageTag>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }

    pub fn tokenize(&self) -> Vec<Token> {
        tokenize(&self.code, &self.language)
    }
}

/// Split `code` into classified tokens.
///
/// Unknown languages yield a single `plain` token covering the input.
/// Unterminated strings run to the end of their line (or to the end of the
/// input for multiline strings); unterminated block comments run to the
/// end of the input. Both keep their intended kind.
pub fn tokenize(code: &str, language: &LanguageTag) -> Vec<Token> {
    let _scope = crate::perf::scope("highlight.tokenize");
    if code.is_empty() {
        return Vec::new();
    }
    match language.spec() {
        Some(spec) => scanner::Scanner::new(spec, code).run(),
        None => vec![Token::new(code, TokenKind::Plain)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(code: &str, lang: &str) -> Vec<(String, TokenKind)> {
        tokenize(code, &LanguageTag::new(lang))
            .into_iter()
            .map(|t| (t.text, t.kind))
            .collect()
    }

    fn kind_of(code: &str, lang: &str, text: &str) -> Option<TokenKind> {
        tokenize(code, &LanguageTag::new(lang))
            .into_iter()
            .find(|t| t.text == text)
            .map(|t| t.kind)
    }

    fn concat(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_rust_keywords_identifiers_and_numbers() {
        let code = "fn main() { let x = 42; }";
        assert_eq!(kind_of(code, "rust", "fn"), Some(TokenKind::Keyword));
        assert_eq!(kind_of(code, "rust", "let"), Some(TokenKind::Keyword));
        assert_eq!(kind_of(code, "rust", "main"), Some(TokenKind::Identifier));
        assert_eq!(kind_of(code, "rust", "42"), Some(TokenKind::Number));
        assert_eq!(kind_of(code, "rust", "{"), Some(TokenKind::Punctuation));
    }

    #[test]
    fn test_unknown_language_is_single_plain_token() {
        let code = "fn main() {}\n// not a comment here";
        let tokens = tokenize(code, &LanguageTag::new("klingon"));
        assert_eq!(tokens, vec![Token::new(code, TokenKind::Plain)]);
    }

    #[test]
    fn test_empty_input_yields_no_tokens() {
        assert!(tokenize("", &LanguageTag::new("rust")).is_empty());
    }

    #[test]
    fn test_unterminated_string_runs_to_end_of_line() {
        let tokens = kinds_of("let s = \"open\nlet t = 1;", "javascript");
        assert!(tokens.contains(&("\"open".to_string(), TokenKind::String)));
        assert!(tokens.contains(&("let".to_string(), TokenKind::Keyword)));
        assert!(tokens.contains(&("1".to_string(), TokenKind::Number)));
    }

    #[test]
    fn test_unterminated_block_comment_runs_to_end_of_input() {
        let code = "x = 1 /* open\nstill comment\n";
        let tokens = tokenize(code, &LanguageTag::new("javascript"));
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Comment);
        assert_eq!(last.text, "/* open\nstill comment\n");
    }

    #[test]
    fn test_unterminated_triple_quote_runs_to_end_of_input() {
        let code = "s = \"\"\"doc\nmore";
        let tokens = tokenize(code, &LanguageTag::new("python"));
        assert_eq!(tokens.last().unwrap().text, "\"\"\"doc\nmore");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::String);
    }

    #[test]
    fn test_comment_marker_inside_string_stays_string() {
        let code = "let url = \"http://example.com\";";
        assert_eq!(
            kind_of(code, "rust", "\"http://example.com\""),
            Some(TokenKind::String)
        );
    }

    #[test]
    fn test_string_inside_comment_stays_comment() {
        let code = "# say \"hi\"\nx = 1";
        assert_eq!(kind_of(code, "python", "# say \"hi\""), Some(TokenKind::Comment));
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let code = r#"x = "a\"b" + c"#;
        assert_eq!(kind_of(code, "javascript", r#""a\"b""#), Some(TokenKind::String));
    }

    #[test]
    fn test_nested_block_comments_in_rust() {
        let code = "/* a /* b */ c */ d";
        let tokens = kinds_of(code, "rust");
        assert_eq!(tokens[0], ("/* a /* b */ c */".to_string(), TokenKind::Comment));
        assert!(tokens.contains(&("d".to_string(), TokenKind::Identifier)));
    }

    #[test]
    fn test_rust_strings_span_lines() {
        let code = "let s = \"a\nb\";\nlet t = 1;";
        let tokens = kinds_of(code, "rust");
        assert!(tokens.contains(&("\"a\nb\"".to_string(), TokenKind::String)));
        assert!(tokens.contains(&(";".to_string(), TokenKind::Punctuation)));
        assert_eq!(
            tokens.iter().filter(|(_, kind)| *kind == TokenKind::String).count(),
            1
        );
    }

    #[test]
    fn test_rust_raw_strings() {
        let code = r###"let s = r#"a"b"#; let p = r"C:\"; let q = br##"x"#y"##;"###;
        let tokens = kinds_of(code, "rust");
        let strings: Vec<_> = tokens
            .iter()
            .filter(|(_, kind)| *kind == TokenKind::String)
            .map(|(text, _)| text.as_str())
            .collect();
        assert_eq!(strings, vec![r##"r#"a"b"#"##, r#"r"C:\""#, r###"br##"x"#y"##"###]);
        assert_eq!(concat(&tokenize(code, &LanguageTag::new("rust"))), code);
        assert_eq!(kind_of("let r = 1;", "rust", "r"), Some(TokenKind::Identifier));
    }

    #[test]
    fn test_rust_lifetime_is_not_a_string() {
        let code = "fn f<'a>(s: &'a str) -> char { 'x' }";
        assert_eq!(kind_of(code, "rust", "'x'"), Some(TokenKind::String));
        assert_eq!(kind_of(code, "rust", "str"), Some(TokenKind::Keyword));
        let strings: Vec<_> = tokenize(code, &LanguageTag::new("rust"))
            .into_iter()
            .filter(|t| t.kind == TokenKind::String)
            .collect();
        assert_eq!(strings.len(), 1);
    }

    #[test]
    fn test_python_string_prefix_joins_string() {
        let code = "name = f\"{user}\"";
        assert_eq!(kind_of(code, "python", "f\"{user}\""), Some(TokenKind::String));
    }

    #[test]
    fn test_sql_keywords_are_case_insensitive() {
        let code = "select id FROM users";
        assert_eq!(kind_of(code, "sql", "select"), Some(TokenKind::Keyword));
        assert_eq!(kind_of(code, "sql", "FROM"), Some(TokenKind::Keyword));
        assert_eq!(kind_of(code, "sql", "users"), Some(TokenKind::Identifier));
    }

    #[test]
    fn test_number_shapes() {
        for (code, lang) in [
            ("0xFF", "c"),
            ("1_000_000", "rust"),
            ("3.14e-2", "python"),
            ("10px", "css"),
            ("0b1010", "java"),
        ] {
            assert_eq!(kind_of(code, lang, code), Some(TokenKind::Number), "{code}");
        }
    }

    #[test]
    fn test_whitespace_is_plain() {
        let tokens = kinds_of("a  \n\tb", "go");
        assert_eq!(tokens[1], ("  \n\t".to_string(), TokenKind::Plain));
    }

    #[test]
    fn test_operator_run_stops_at_comment() {
        let code = "a =// note";
        let tokens = kinds_of(code, "javascript");
        assert!(tokens.contains(&("=".to_string(), TokenKind::Punctuation)));
        assert!(tokens.contains(&("// note".to_string(), TokenKind::Comment)));
    }

    #[test]
    fn test_non_ascii_text_round_trips() {
        let code = "let café = \"naïve ☕\"; // ünïcode\n😀";
        let tokens = tokenize(code, &LanguageTag::new("rust"));
        assert_eq!(concat(&tokens), code);
        assert_eq!(kind_of(code, "rust", "café"), Some(TokenKind::Identifier));
    }

    #[test]
    fn test_language_tag_normalises_case_and_aliases() {
        assert_eq!(LanguageTag::new(" Rust ").as_str(), "rust");
        assert_eq!(LanguageTag::new("rs").spec().map(|s| s.name), Some("rust"));
        assert_eq!(LanguageTag::new("JS").spec().map(|s| s.name), Some("javascript"));
        assert!(LanguageTag::plain().spec().is_none());
    }

    #[test]
    fn test_language_tag_from_path() {
        assert_eq!(LanguageTag::from_path(Path::new("src/main.rs")).as_str(), "rust");
        assert_eq!(LanguageTag::from_path(Path::new("query.SQL")).as_str(), "sql");
        assert_eq!(LanguageTag::from_path(Path::new("README")).as_str(), "plaintext");
    }

    #[test]
    fn test_every_language_tokenizes_a_mixed_sample() {
        let sample = "// c\n# h\n-- d\n/* b */ {- e -} <!-- x -->\n\"s\" 's' `t` 12 id + (x);\n\"open";
        for spec in languages() {
            let tokens = tokenize(sample, &LanguageTag::new(spec.name));
            assert_eq!(concat(&tokens), sample, "{}", spec.name);
            assert!(tokens.iter().all(|t| !t.text.is_empty()), "{}", spec.name);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tokenize_reproduces_input_for_every_language(code in "\\PC{0,200}") {
                for spec in languages() {
                    let tokens = tokenize(&code, &LanguageTag::new(spec.name));
                    prop_assert_eq!(concat(&tokens), code.clone());
                }
            }

            #[test]
            fn tokenize_reproduces_delimiter_heavy_input(
                code in "[\"'`/*#<!\\-{}()\\\\\n a1.x]{0,120}"
            ) {
                for spec in languages() {
                    let tokens = tokenize(&code, &LanguageTag::new(spec.name));
                    prop_assert_eq!(concat(&tokens), code.clone());
                    prop_assert!(tokens.iter().all(|t| !t.text.is_empty()));
                }
            }
        }
    }
}
