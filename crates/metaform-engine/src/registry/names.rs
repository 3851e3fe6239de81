//! Identifier checks for type, namespace and enum value names

use once_cell::sync::Lazy;
use regex::Regex;

// Excluded characters: '.', whitespace and operator/punctuation characters.
static FULLY_QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[^.0-9\s|,;:&*=+\-()\[\]{}^%#@!~\\]",
        r"([^\s|,;:&*=+\-()\[\]{}^%#@!~\\]*[^.\s|,;:&*=+\-()\[\]{}^%#@!~\\])?$",
    ))
    .expect("identifier pattern compiles")
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^.0-9\s|,;:&*=+\-()\[\]{}^%#@!~\\][^.\s|,;:&*=+\-()\[\]{}^%#@!~\\]*$")
        .expect("identifier pattern compiles")
});

/// Words a binding can never be registered under
pub const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "implements", "import", "in", "instanceof", "interface", "let", "new", "null", "package",
    "private", "protected", "public", "return", "static", "super", "switch", "this", "throw",
    "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
];

/// Well-formed dotted identifier sequence (`A`, `A.B.C`)
pub fn is_fully_qualified_identifier(name: &str) -> bool {
    FULLY_QUALIFIED.is_match(name)
}

/// Single identifier segment (no dots)
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Whether `word` is a reserved language keyword
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}
