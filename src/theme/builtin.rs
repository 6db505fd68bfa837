//! Built-in palettes.

use super::{Color, Theme};
use crate::highlight::TokenKind;

struct Palette {
    name: &'static str,
    background: u32,
    foreground: u32,
    keyword: u32,
    string: u32,
    comment: u32,
    number: u32,
    identifier: u32,
    punctuation: u32,
}

const PALETTES: &[Palette] = &[
    Palette {
        name: "dracula",
        background: 0x282a36,
        foreground: 0xf8f8f2,
        keyword: 0xff79c6,
        string: 0xf1fa8c,
        comment: 0x6272a4,
        number: 0xbd93f9,
        identifier: 0x50fa7b,
        punctuation: 0xf8f8f2,
    },
    Palette {
        name: "monokai",
        background: 0x272822,
        foreground: 0xf8f8f2,
        keyword: 0xf92672,
        string: 0xe6db74,
        comment: 0x75715e,
        number: 0xae81ff,
        identifier: 0xa6e22e,
        punctuation: 0xf8f8f2,
    },
    Palette {
        name: "one-dark",
        background: 0x282c34,
        foreground: 0xabb2bf,
        keyword: 0xc678dd,
        string: 0x98c379,
        comment: 0x5c6370,
        number: 0xd19a66,
        identifier: 0xe06c75,
        punctuation: 0xabb2bf,
    },
    Palette {
        name: "nord",
        background: 0x2e3440,
        foreground: 0xd8dee9,
        keyword: 0x81a1c1,
        string: 0xa3be8c,
        comment: 0x616e88,
        number: 0xb48ead,
        identifier: 0x88c0d0,
        punctuation: 0xeceff4,
    },
    Palette {
        name: "night-owl",
        background: 0x011627,
        foreground: 0xd6deeb,
        keyword: 0xc792ea,
        string: 0xecc48d,
        comment: 0x637777,
        number: 0xf78c6c,
        identifier: 0x82aaff,
        punctuation: 0x7fdbca,
    },
    Palette {
        name: "github-light",
        background: 0xffffff,
        foreground: 0x24292e,
        keyword: 0xd73a49,
        string: 0x032f62,
        comment: 0x6a737d,
        number: 0x005cc5,
        identifier: 0x6f42c1,
        punctuation: 0x24292e,
    },
    Palette {
        name: "solarized-dark",
        background: 0x002b36,
        foreground: 0x839496,
        keyword: 0x859900,
        string: 0x2aa198,
        comment: 0x586e75,
        number: 0xd33682,
        identifier: 0x268bd2,
        punctuation: 0x93a1a1,
    },
    Palette {
        name: "solarized-light",
        background: 0xfdf6e3,
        foreground: 0x657b83,
        keyword: 0x859900,
        string: 0x2aa198,
        comment: 0x93a1a1,
        number: 0xd33682,
        identifier: 0x268bd2,
        punctuation: 0x586e75,
    },
    Palette {
        name: "vercel",
        background: 0x000000,
        foreground: 0xededed,
        keyword: 0xf75f8f,
        string: 0x62c073,
        comment: 0xa1a1a1,
        number: 0x52a8ff,
        identifier: 0xbf7af0,
        punctuation: 0xededed,
    },
];

pub(super) fn themes() -> Vec<Theme> {
    PALETTES
        .iter()
        .map(|p| {
            Theme::new(
                p.name,
                Color::hex(p.background),
                Color::hex(p.foreground),
                [
                    (TokenKind::Keyword, Color::hex(p.keyword)),
                    (TokenKind::String, Color::hex(p.string)),
                    (TokenKind::Comment, Color::hex(p.comment)),
                    (TokenKind::Number, Color::hex(p.number)),
                    (TokenKind::Identifier, Color::hex(p.identifier)),
                    (TokenKind::Punctuation, Color::hex(p.punctuation)),
                    (TokenKind::Plain, Color::hex(p.foreground)),
                ],
            )
        })
        .collect()
}
