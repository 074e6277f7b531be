//! Presentation helpers for history entries

pub mod highlighter;

pub use highlighter::{highlight, HighlightedCode, Palette, StyledSpan, TokenColor};
