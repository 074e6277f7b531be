//! Content classifier
//!
//! Pure, total heuristic deciding whether copied text is a link, code, or plain
//! text. The rule order is fixed: URL first, then code signals, then text.

use url::Url;

use crate::shared::types::ContentKind;

/// Substrings that hint the content is source code
const CODE_SIGNALS: &[&str] = &[
    "func ", "var ", "let ", "const ", "import ", "class ", "struct ", "def ", "return",
    "print(", "console.log", "=>", "UI", "NS", ";", "{", "}", "()", "//", "#include",
];

/// Distinct signals needed to call something code on signal count alone
const SIGNAL_THRESHOLD: usize = 2;

const INDENT: &str = "    ";

/// Classify copied text. Never fails; anything unrecognised is `Text`.
pub fn classify(content: &str) -> ContentKind {
    if is_url(content) {
        return ContentKind::Url;
    }

    if looks_like_code(content) {
        return ContentKind::Code;
    }

    ContentKind::Text
}

/// The whole trimmed string must be one URI with both a scheme and a host.
/// Prose that merely contains a link is not a URL.
fn is_url(content: &str) -> bool {
    let trimmed = content.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return false;
    }

    match Url::parse(trimmed) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

fn looks_like_code(content: &str) -> bool {
    let signal_count = CODE_SIGNALS
        .iter()
        .filter(|signal| content.contains(*signal))
        .count();

    signal_count >= SIGNAL_THRESHOLD
        || (content.contains('{') && content.contains('}'))
        || is_indented(content)
}

fn is_indented(content: &str) -> bool {
    content.contains(INDENT) || content.lines().any(|line| line.starts_with('\t'))
}
