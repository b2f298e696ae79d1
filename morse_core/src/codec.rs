//! Character ⇄ pattern lookup over the static Morse table.

use crate::types::{Mark, Pattern};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// International Morse for every character the trainer can teach
const MORSE_TABLE: &[(char, &str)] = &[
    ('A', ".-"),
    ('B', "-..."),
    ('C', "-.-."),
    ('D', "-.."),
    ('E', "."),
    ('F', "..-."),
    ('G', "--."),
    ('H', "...."),
    ('I', ".."),
    ('J', ".---"),
    ('K', "-.-"),
    ('L', ".-.."),
    ('M', "--"),
    ('N', "-."),
    ('O', "---"),
    ('P', ".--."),
    ('Q', "--.-"),
    ('R', ".-."),
    ('S', "..."),
    ('T', "-"),
    ('U', "..-"),
    ('V', "...-"),
    ('W', ".--"),
    ('X', "-..-"),
    ('Y', "-.--"),
    ('Z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('=', "-...-"),
    ('/', "-..-."),
];

static PATTERNS: Lazy<HashMap<char, Pattern>> = Lazy::new(|| {
    MORSE_TABLE
        .iter()
        .map(|&(ch, symbols)| {
            let marks = symbols.chars().filter_map(Mark::from_symbol).collect();
            (ch, Pattern::new(marks))
        })
        .collect()
});

static REVERSE: Lazy<HashMap<Pattern, char>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .map(|(&ch, pattern)| (pattern.clone(), ch))
        .collect()
});

/// Every supported character, in table order
pub fn alphabet() -> impl Iterator<Item = char> {
    MORSE_TABLE.iter().map(|&(ch, _)| ch)
}

fn normalize(ch: char) -> char {
    ch.to_ascii_uppercase()
}

/// Look up the canonical pattern for a character
///
/// Letters are matched case-insensitively. Returns `None` for anything outside
/// the table; callers must never synthesize a pattern themselves.
pub fn to_pattern(ch: char) -> Option<Pattern> {
    PATTERNS.get(&normalize(ch)).cloned()
}

pub fn is_supported(ch: char) -> bool {
    PATTERNS.contains_key(&normalize(ch))
}

/// Presentation string using `•`/`−`
pub fn display_glyphs(ch: char) -> Option<String> {
    PATTERNS.get(&normalize(ch)).map(Pattern::to_glyphs)
}

/// Reverse lookup from a pattern to its character
pub fn lookup_pattern(pattern: &Pattern) -> Option<char> {
    REVERSE.get(pattern).copied()
}

/// Spoken form, e.g. `K sounds like 'dahdidah'`
pub fn mnemonic(ch: char) -> Option<String> {
    let pattern = PATTERNS.get(&normalize(ch))?;
    let sound: String = pattern
        .marks()
        .iter()
        .map(|m| match m {
            Mark::Dot => "di",
            Mark::Dash => "dah",
        })
        .collect();
    Some(format!("{} sounds like '{}'", normalize(ch), sound))
}

/// Word form used by pattern family listings, e.g. `long-short-long`
pub fn pattern_words(ch: char) -> Option<String> {
    let pattern = PATTERNS.get(&normalize(ch))?;
    let words: Vec<&str> = pattern
        .marks()
        .iter()
        .map(|m| match m {
            Mark::Dot => "short",
            Mark::Dash => "long",
        })
        .collect();
    Some(words.join("-"))
}
