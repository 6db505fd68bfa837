//! Per-language lexical tables.

/// A block comment delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockComment {
    pub open: &'static str,
    pub close: &'static str,
    /// Whether an inner `open` increases nesting depth.
    pub nested: bool,
}

/// A string literal delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringDelimiter {
    pub open: &'static str,
    pub close: &'static str,
    /// Multiline strings run to end of input when unterminated;
    /// single-line ones stop at the end of their line.
    pub multiline: bool,
    /// Backslash escapes the following character.
    pub escapes: bool,
}

/// Lexical description of one language family member.
#[derive(Debug)]
pub struct LanguageSpec {
    pub name: &'static str,
    /// Alternative names and file extensions.
    pub aliases: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub case_insensitive: bool,
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<BlockComment>,
    /// Checked in order, so longer openers must come first.
    pub strings: &'static [StringDelimiter],
    /// Identifiers that glue onto a following string (`f"..."`, `b'..'`).
    pub string_prefixes: &'static [&'static str],
    /// Prefixes that open a hash-fenced raw string (`r#"..."#`): no
    /// escapes, closed by a quote and as many `#` as opened it.
    pub raw_string_prefixes: &'static [&'static str],
    /// `'x'` is a character literal while a lone `'` is punctuation.
    pub char_literals: bool,
    /// Characters allowed in identifiers besides alphanumerics and `_`;
    /// of these only `$` and `@` may start one.
    pub ident_extra: &'static [char],
}

impl LanguageSpec {
    fn matches(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(tag))
    }
}

/// Find a language by name, alias or file extension (case-insensitive).
pub fn lookup(tag: &str) -> Option<&'static LanguageSpec> {
    let tag = tag.trim().trim_start_matches('.');
    LANGUAGES.iter().find(|spec| spec.matches(tag))
}

/// All registered languages.
pub fn languages() -> &'static [LanguageSpec] {
    LANGUAGES
}

const fn string(open: &'static str, close: &'static str) -> StringDelimiter {
    StringDelimiter {
        open,
        close,
        multiline: false,
        escapes: true,
    }
}

const fn multiline(open: &'static str, close: &'static str) -> StringDelimiter {
    StringDelimiter {
        open,
        close,
        multiline: true,
        escapes: true,
    }
}

const fn raw(open: &'static str, close: &'static str) -> StringDelimiter {
    StringDelimiter {
        open,
        close,
        multiline: false,
        escapes: false,
    }
}

const C_BLOCK: Option<BlockComment> = Some(BlockComment {
    open: "/*",
    close: "*/",
    nested: false,
});

const NESTED_C_BLOCK: Option<BlockComment> = Some(BlockComment {
    open: "/*",
    close: "*/",
    nested: true,
});

const QUOTES: &[StringDelimiter] = &[string("\"", "\""), string("'", "'")];
const DOUBLE_QUOTE: &[StringDelimiter] = &[string("\"", "\"")];

static LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec {
        name: "rust",
        aliases: &["rs"],
        keywords: &[
            "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
            "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
            "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
            "trait", "true", "type", "unsafe", "use", "where", "while", "bool", "char", "str",
            "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128",
            "isize", "f32", "f64",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: NESTED_C_BLOCK,
        strings: &[multiline("\"", "\"")],
        string_prefixes: &["b", "c"],
        raw_string_prefixes: &["r", "br", "cr"],
        char_literals: true,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "python",
        aliases: &["py", "pyi", "python3"],
        keywords: &[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "match", "case", "nonlocal", "not",
            "or", "pass", "raise", "return", "try", "while", "with", "yield", "self",
        ],
        case_insensitive: false,
        line_comments: &["#"],
        block_comment: None,
        strings: &[
            multiline("\"\"\"", "\"\"\""),
            multiline("'''", "'''"),
            string("\"", "\""),
            string("'", "'"),
        ],
        string_prefixes: &["f", "r", "b", "u", "rb", "br", "fr", "rf"],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "javascript",
        aliases: &["js", "jsx", "mjs", "cjs", "node"],
        keywords: JS_KEYWORDS,
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: &[string("\"", "\""), string("'", "'"), multiline("`", "`")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['$'],
    },
    LanguageSpec {
        name: "typescript",
        aliases: &["ts", "tsx", "mts"],
        keywords: TS_KEYWORDS,
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: &[string("\"", "\""), string("'", "'"), multiline("`", "`")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['$'],
    },
    LanguageSpec {
        name: "go",
        aliases: &["golang"],
        keywords: &[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
            "package", "range", "return", "select", "struct", "switch", "type", "var", "true",
            "false", "nil", "iota",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: &[string("\"", "\""), string("'", "'"), StringDelimiter {
            open: "`",
            close: "`",
            multiline: true,
            escapes: false,
        }],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "c",
        aliases: &["h"],
        keywords: C_KEYWORDS,
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: QUOTES,
        string_prefixes: &["L", "u", "U", "u8"],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "cpp",
        aliases: &["c++", "cc", "cxx", "hpp", "hh", "hxx"],
        keywords: CPP_KEYWORDS,
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: QUOTES,
        string_prefixes: &["L", "u", "U", "u8", "R"],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "java",
        aliases: &[],
        keywords: &[
            "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
            "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
            "finally", "float", "for", "if", "implements", "import", "instanceof", "int",
            "interface", "long", "native", "new", "package", "private", "protected", "public",
            "return", "short", "static", "super", "switch", "synchronized", "this", "throw",
            "throws", "try", "void", "volatile", "while", "var", "record", "true", "false",
            "null",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: &[multiline("\"\"\"", "\"\"\""), string("\"", "\""), string("'", "'")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "csharp",
        aliases: &["cs", "c#"],
        keywords: &[
            "abstract", "as", "async", "await", "base", "bool", "break", "case", "catch",
            "class", "const", "continue", "decimal", "default", "delegate", "do", "double",
            "else", "enum", "event", "false", "finally", "float", "for", "foreach", "get", "if",
            "in", "int", "interface", "internal", "is", "long", "namespace", "new", "null",
            "object", "out", "override", "private", "protected", "public", "readonly", "record",
            "ref", "return", "sealed", "set", "static", "string", "struct", "switch", "this",
            "throw", "true", "try", "using", "var", "virtual", "void", "while",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: QUOTES,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "kotlin",
        aliases: &["kt", "kts"],
        keywords: &[
            "as", "break", "class", "continue", "data", "do", "else", "false", "for", "fun",
            "if", "import", "in", "interface", "is", "null", "object", "override", "package",
            "private", "return", "sealed", "super", "this", "throw", "true", "try", "typealias",
            "val", "var", "when", "while", "suspend",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: NESTED_C_BLOCK,
        strings: &[multiline("\"\"\"", "\"\"\""), string("\"", "\""), string("'", "'")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "swift",
        aliases: &[],
        keywords: &[
            "as", "associatedtype", "break", "case", "catch", "class", "continue", "default",
            "defer", "do", "else", "enum", "extension", "false", "fileprivate", "for", "func",
            "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil",
            "open", "private", "protocol", "public", "repeat", "return", "self", "Self",
            "static", "struct", "subscript", "super", "switch", "throw", "throws", "true", "try",
            "var", "where", "while", "async", "await",
        ],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: NESTED_C_BLOCK,
        strings: &[multiline("\"\"\"", "\"\"\""), string("\"", "\"")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "ruby",
        aliases: &["rb"],
        keywords: &[
            "alias", "and", "begin", "break", "case", "class", "def", "do", "else", "elsif",
            "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not", "or",
            "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef",
            "unless", "until", "when", "while", "yield", "require", "attr_accessor",
        ],
        case_insensitive: false,
        line_comments: &["#"],
        block_comment: Some(BlockComment {
            open: "=begin",
            close: "=end",
            nested: false,
        }),
        strings: QUOTES,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['?', '!', '@'],
    },
    LanguageSpec {
        name: "php",
        aliases: &[],
        keywords: &[
            "abstract", "array", "as", "break", "case", "catch", "class", "const", "continue",
            "default", "do", "echo", "else", "elseif", "extends", "false", "final", "finally",
            "fn", "for", "foreach", "function", "if", "implements", "include", "interface",
            "namespace", "new", "null", "private", "protected", "public", "require", "return",
            "static", "switch", "this", "throw", "true", "try", "use", "while",
        ],
        case_insensitive: false,
        line_comments: &["//", "#"],
        block_comment: C_BLOCK,
        strings: QUOTES,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['$'],
    },
    LanguageSpec {
        name: "bash",
        aliases: &["sh", "shell", "zsh", "console"],
        keywords: &[
            "if", "then", "else", "elif", "fi", "for", "while", "until", "do", "done", "case",
            "esac", "in", "function", "return", "local", "export", "readonly", "set", "unset",
            "echo", "exit", "source",
        ],
        case_insensitive: false,
        line_comments: &["#"],
        block_comment: None,
        strings: &[multiline("\"", "\""), raw("'", "'")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['$'],
    },
    LanguageSpec {
        name: "sql",
        aliases: &["postgres", "mysql", "sqlite", "psql"],
        keywords: &[
            "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "INSERT", "INTO", "VALUES", "UPDATE",
            "SET", "DELETE", "CREATE", "TABLE", "DROP", "ALTER", "INDEX", "JOIN", "LEFT",
            "RIGHT", "INNER", "OUTER", "ON", "AS", "GROUP", "BY", "ORDER", "HAVING", "LIMIT",
            "OFFSET", "DISTINCT", "UNION", "ALL", "NULL", "IS", "IN", "LIKE", "BETWEEN", "CASE",
            "WHEN", "THEN", "ELSE", "END", "PRIMARY", "KEY", "FOREIGN", "REFERENCES", "DEFAULT",
            "TRUE", "FALSE", "WITH", "RETURNING",
        ],
        case_insensitive: true,
        line_comments: &["--"],
        block_comment: C_BLOCK,
        strings: &[raw("'", "'"), raw("\"", "\"")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "json",
        aliases: &["jsonc", "json5"],
        keywords: &["true", "false", "null"],
        case_insensitive: false,
        line_comments: &["//"],
        block_comment: C_BLOCK,
        strings: DOUBLE_QUOTE,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "yaml",
        aliases: &["yml"],
        keywords: &["true", "false", "null", "yes", "no", "on", "off"],
        case_insensitive: false,
        line_comments: &["#"],
        block_comment: None,
        strings: &[string("\"", "\""), raw("'", "'")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['-'],
    },
    LanguageSpec {
        name: "toml",
        aliases: &[],
        keywords: &["true", "false"],
        case_insensitive: false,
        line_comments: &["#"],
        block_comment: None,
        strings: &[
            multiline("\"\"\"", "\"\"\""),
            StringDelimiter {
                open: "'''",
                close: "'''",
                multiline: true,
                escapes: false,
            },
            string("\"", "\""),
            raw("'", "'"),
        ],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['-'],
    },
    LanguageSpec {
        name: "css",
        aliases: &["scss", "less"],
        keywords: &[
            "important", "inherit", "initial", "unset", "none", "auto", "media", "import",
            "keyframes", "from", "to",
        ],
        case_insensitive: true,
        line_comments: &[],
        block_comment: C_BLOCK,
        strings: QUOTES,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['-'],
    },
    LanguageSpec {
        name: "html",
        aliases: &["htm", "xml", "svg", "xhtml", "vue"],
        keywords: &["DOCTYPE", "html"],
        case_insensitive: true,
        line_comments: &[],
        block_comment: Some(BlockComment {
            open: "<!--",
            close: "-->",
            nested: false,
        }),
        strings: &[raw("\"", "\"")],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &['-'],
    },
    LanguageSpec {
        name: "lua",
        aliases: &[],
        keywords: &[
            "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto",
            "if", "in", "local", "nil", "not", "or", "repeat", "return", "then", "true",
            "until", "while",
        ],
        case_insensitive: false,
        line_comments: &["--"],
        block_comment: Some(BlockComment {
            open: "--[[",
            close: "]]",
            nested: false,
        }),
        strings: &[
            StringDelimiter {
                open: "[[",
                close: "]]",
                multiline: true,
                escapes: false,
            },
            string("\"", "\""),
            string("'", "'"),
        ],
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: false,
        ident_extra: &[],
    },
    LanguageSpec {
        name: "haskell",
        aliases: &["hs"],
        keywords: &[
            "case", "class", "data", "default", "deriving", "do", "else", "if", "import", "in",
            "infix", "infixl", "infixr", "instance", "let", "module", "newtype", "of", "then",
            "type", "where", "True", "False",
        ],
        case_insensitive: false,
        line_comments: &["--"],
        block_comment: Some(BlockComment {
            open: "{-",
            close: "-}",
            nested: true,
        }),
        strings: DOUBLE_QUOTE,
        string_prefixes: &[],
        raw_string_prefixes: &[],
        char_literals: true,
        ident_extra: &[],
    },
];

const JS_KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for", "from",
    "function", "if", "import", "in", "instanceof", "let", "new", "null", "of", "return",
    "static", "super", "switch", "this", "throw", "true", "try", "typeof", "undefined", "var",
    "void", "while", "yield",
];

const TS_KEYWORDS: &[&str] = &[
    "abstract", "any", "as", "async", "await", "boolean", "break", "case", "catch", "class",
    "const", "continue", "declare", "default", "delete", "do", "else", "enum", "export",
    "extends", "false", "finally", "for", "from", "function", "if", "implements", "import",
    "in", "instanceof", "interface", "keyof", "let", "namespace", "never", "new", "null",
    "number", "of", "private", "protected", "public", "readonly", "return", "static",
    "string", "super", "switch", "this", "throw", "true", "try", "type", "typeof",
    "undefined", "unknown", "var", "void", "while", "yield",
];

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "while", "NULL", "true", "false", "bool",
];

const CPP_KEYWORDS: &[&str] = &[
    "auto", "bool", "break", "case", "catch", "char", "class", "const", "constexpr",
    "continue", "default", "delete", "do", "double", "else", "enum", "explicit", "extern",
    "false", "float", "for", "friend", "if", "inline", "int", "long", "namespace", "new",
    "noexcept", "nullptr", "operator", "override", "private", "protected", "public",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "template", "this",
    "throw", "true", "try", "typedef", "typename", "union", "unsigned", "using", "virtual",
    "void", "volatile", "while",
];
