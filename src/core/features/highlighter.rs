//! Regex-layered syntax highlighting for code entries
//!
//! The whole input starts in the default colour. A fixed list of passes then
//! recolours every match, and a later pass overwrites an earlier one where they
//! overlap. Pass order is therefore priority order, lowest first: keywords,
//! numbers, types, attributes, tags, strings, comments. Strings must follow the
//! token passes so quoted keywords read as strings, and comments run last so
//! nothing inside a comment keeps another colour.

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Colour slot assigned to a run of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenColor {
    Default,
    Keyword,
    /// Numbers, and markup tags which share the slot
    Number,
    Type,
    Attribute,
    String,
    Comment,
}

/// Font family of the base style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    Monospace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    /// Byte range into the highlighted source
    pub range: Range<usize>,
    pub color: TokenColor,
}

/// Highlighted code: contiguous, non-overlapping spans covering the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedCode {
    source: String,
    spans: Vec<StyledSpan>,
}

impl HighlightedCode {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn spans(&self) -> &[StyledSpan] {
        &self.spans
    }

    pub fn font(&self) -> FontFamily {
        FontFamily::Monospace
    }

    /// `(text, colour)` pairs in source order
    pub fn segments(&self) -> impl Iterator<Item = (&str, TokenColor)> + '_ {
        self.spans
            .iter()
            .map(move |span| (&self.source[span.range.clone()], span.color))
    }

    /// Colour at byte offset `index`, if in range
    pub fn color_at(&self, index: usize) -> Option<TokenColor> {
        self.spans
            .iter()
            .find(|span| span.range.contains(&index))
            .map(|span| span.color)
    }
}

/// Hex colours for each slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub default: &'static str,
    pub keyword: &'static str,
    pub number: &'static str,
    pub type_name: &'static str,
    pub attribute: &'static str,
    pub string: &'static str,
    pub comment: &'static str,
}

impl Palette {
    pub const DARK: Palette = Palette {
        default: "#FFFFFF",
        keyword: "#FF375F",
        number: "#0A84FF",
        type_name: "#40C8E0",
        attribute: "#FF9F0A",
        string: "#FF453A",
        comment: "#98989D",
    };

    pub const LIGHT: Palette = Palette {
        default: "#000000",
        keyword: "#FF2D55",
        number: "#007AFF",
        type_name: "#30B0C7",
        attribute: "#FF9500",
        string: "#FF3B30",
        comment: "#8E8E93",
    };

    pub fn color(&self, token: TokenColor) -> &'static str {
        match token {
            TokenColor::Default => self.default,
            TokenColor::Keyword => self.keyword,
            TokenColor::Number => self.number,
            TokenColor::Type => self.type_name,
            TokenColor::Attribute => self.attribute,
            TokenColor::String => self.string,
            TokenColor::Comment => self.comment,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::DARK
    }
}

/// Union of Swift, Python, JS/TS and C-like keywords
const KEYWORDS: &[&str] = &[
    // Swift
    "func", "var", "let", "if", "else", "return", "struct", "class", "enum", "import", "extension",
    "protocol", "init", "guard", "switch", "case", "default", "break", "continue", "try", "catch",
    "throw", "throws", "async", "await", "self", "super",
    // Python
    "def", "print", "from", "elif", "while", "for", "in", "with", "as", "pass", "lambda", "global",
    "nonlocal", "yield", "except", "finally", "raise",
    // JS/TS
    "const", "function", "export", "typeof", "instanceof", "new", "this", "console", "window",
    "document", "null", "undefined",
    // C-like
    "void", "int", "float", "double", "bool", "char", "public", "private", "protected", "static",
    "final", "true", "false", "nil",
];

struct Pass {
    pattern: Regex,
    color: TokenColor,
}

/// Passes in application order. Do not reorder.
fn passes() -> &'static [Pass] {
    static PASSES: OnceLock<Vec<Pass>> = OnceLock::new();
    PASSES.get_or_init(|| {
        let keyword_pattern = format!(r"\b(?:{})\b", KEYWORDS.join("|"));
        let table: [(&str, TokenColor); 8] = [
            (&keyword_pattern, TokenColor::Keyword),
            (r"\b\d+(?:\.\d+)?\b", TokenColor::Number),
            (r"\b[A-Z][a-zA-Z0-9_]*\b", TokenColor::Type),
            (r"@\w+", TokenColor::Attribute),
            (r"</?[a-zA-Z0-9]+", TokenColor::Number),
            (r">", TokenColor::Number),
            (r#""[^"]*"|'[^']*'"#, TokenColor::String),
            (r"//.*|#.*|/\*[\s\S]*?\*/|<!--[\s\S]*?-->", TokenColor::Comment),
        ];

        table
            .into_iter()
            .map(|(pattern, color)| Pass {
                pattern: Regex::new(pattern).expect("Invalid highlighter regex"),
                color,
            })
            .collect()
    })
}

/// Highlight a code string
pub fn highlight(code: &str) -> HighlightedCode {
    let mut colors = vec![TokenColor::Default; code.len()];

    for pass in passes() {
        for found in pass.pattern.find_iter(code) {
            colors[found.range()].fill(pass.color);
        }
    }

    HighlightedCode {
        source: code.to_string(),
        spans: collapse(&colors),
    }
}

/// Merge per-byte colours into runs. Runs start only at match boundaries, which
/// are always char boundaries.
fn collapse(colors: &[TokenColor]) -> Vec<StyledSpan> {
    let mut spans: Vec<StyledSpan> = Vec::new();

    for (index, &color) in colors.iter().enumerate() {
        match spans.last_mut() {
            Some(last) if last.color == color => last.range.end = index + 1,
            _ => spans.push(StyledSpan {
                range: index..index + 1,
                color,
            }),
        }
    }

    spans
}
